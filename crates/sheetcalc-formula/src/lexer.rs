//! Formula tokenizer

use crate::error::{FormulaError, FormulaResult};
use sheetcalc_core::{CellAddress, ErrorCode};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    // Literals
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorCode),

    // Identifiers and references
    /// Function name or defined name
    Identifier(String),
    CellRef(CellAddress),
    /// `Sheet1!` or `'My Sheet'!`
    SheetPrefix(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,
    Ampersand,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,
    Semicolon,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    Eof,
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Split formula text into tokens, ending with [`Token::Eof`]
///
/// `base` is added to every offset so positions refer to the caller's
/// original string.
pub(crate) fn tokenize(input: &str, base: usize) -> FormulaResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        base,
    };
    let mut tokens = Vec::new();
    loop {
        lexer.skip_whitespace();
        let offset = base + lexer.pos;
        let token = lexer.scan_token()?;
        let done = token == Token::Eof;
        tokens.push(Spanned { token, offset });
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Lexer<'a> {
    fn error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.base + self.pos, message)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().map_or(false, &pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn single(&mut self, token: Token) -> FormulaResult<Token> {
        self.advance();
        Ok(token)
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        match c {
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Star),
            '/' => self.single(Token::Slash),
            '^' => self.single(Token::Caret),
            '%' => self.single(Token::Percent),
            '&' => self.single(Token::Ampersand),
            ':' => self.single(Token::Colon),
            ',' => self.single(Token::Comma),
            ';' => self.single(Token::Semicolon),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '{' => self.single(Token::LeftBrace),
            '}' => self.single(Token::RightBrace),
            '=' => self.single(Token::Equal),
            '<' => {
                self.advance();
                match self.peek_char() {
                    Some('=') => self.single(Token::LessEqual),
                    Some('>') => self.single(Token::NotEqual),
                    _ => Ok(Token::LessThan),
                }
            }
            '>' => {
                self.advance();
                match self.peek_char() {
                    Some('=') => self.single(Token::GreaterEqual),
                    _ => Ok(Token::GreaterThan),
                }
            }
            '"' => self.scan_string(),
            '\'' => self.scan_quoted_sheet(),
            '#' => self.scan_error(),
            c if c.is_ascii_digit()
                || (c == '.' && self.peek_char_at(1).map_or(false, |d| d.is_ascii_digit())) =>
            {
                self.scan_number()
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => Ok(self.scan_identifier()),
            other => Err(self.error(format!("Unexpected character '{other}'"))),
        }
    }

    /// Read up to a closing `quote`, unescaping doubled quotes
    fn scan_quoted(&mut self, quote: char) -> FormulaResult<String> {
        let start = self.pos;
        self.advance();
        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    if self.peek_char() == Some(quote) {
                        s.push(quote);
                        self.advance();
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => {
                    return Err(FormulaError::parse(
                        self.base + start,
                        format!("Unterminated {quote}-quoted text"),
                    ))
                }
            }
        }
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        self.scan_quoted('"').map(Token::Text)
    }

    fn scan_quoted_sheet(&mut self) -> FormulaResult<Token> {
        let name = self.scan_quoted('\'')?;
        if self.peek_char() != Some('!') {
            return Err(self.error("Expected '!' after quoted sheet name"));
        }
        self.advance();
        Ok(Token::SheetPrefix(name))
    }

    fn scan_error(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance();
        self.advance_while(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '!' | '?'));
        let text = &self.input[start..self.pos];
        ErrorCode::parse(text)
            .map(Token::Error)
            .ok_or_else(|| FormulaError::parse(self.base + start, format!("Unknown error literal '{text}'")))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        // exponent only when digits follow
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let digit_at = match self.peek_char_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char_at(digit_at).map_or(false, |c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Token::Number)
            .ok_or_else(|| FormulaError::parse(self.base + start, format!("Invalid number '{text}'")))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.advance_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'));
        let text = &self.input[start..self.pos];

        if self.peek_char() == Some('!') {
            self.advance();
            return Token::SheetPrefix(text.to_string());
        }

        // followed by '(' it is always a function call (LOG10, TRUE)
        if self.peek_char() == Some('(') {
            return Token::Identifier(text.to_string());
        }

        if text.eq_ignore_ascii_case("TRUE") {
            return Token::Boolean(true);
        }
        if text.eq_ignore_ascii_case("FALSE") {
            return Token::Boolean(false);
        }

        match CellAddress::parse(text) {
            Ok(address) => Token::CellRef(address),
            Err(_) => Token::Identifier(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("1<=2<>3>=4"),
            vec![
                Token::Number(1.0),
                Token::LessEqual,
                Token::Number(2.0),
                Token::NotEqual,
                Token::Number(3.0),
                Token::GreaterEqual,
                Token::Number(4.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens(".5")[0], Token::Number(0.5));
        assert_eq!(tokens("1.5E+3")[0], Token::Number(1500.0));
        assert_eq!(tokens("2e-1")[0], Token::Number(0.2));
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(tokens(r#""say ""hi""""#)[0], Token::Text("say \"hi\"".into()));
        let err = tokenize("\"open", 1).unwrap_err();
        assert!(matches!(err, FormulaError::Parse { offset: 1, .. }));
    }

    #[test]
    fn test_references_and_names() {
        assert_eq!(tokens("$B$2")[0], Token::CellRef(CellAddress::parse("$B$2").unwrap()));
        assert_eq!(tokens("LOG10(")[0], Token::Identifier("LOG10".into()));
        assert_eq!(tokens("Rates")[0], Token::Identifier("Rates".into()));
        assert_eq!(tokens("NORM.S.INV")[0], Token::Identifier("NORM.S.INV".into()));
        assert_eq!(tokens("true")[0], Token::Boolean(true));
        assert_eq!(tokens("TRUE()")[0], Token::Identifier("TRUE".into()));
    }

    #[test]
    fn test_sheet_prefixes() {
        assert_eq!(tokens("Data!A1")[0], Token::SheetPrefix("Data".into()));
        assert_eq!(
            tokens("'My ''Q1'' Sheet'!A1")[0],
            Token::SheetPrefix("My 'Q1' Sheet".into())
        );
        assert!(tokenize("'Sheet A1", 0).is_err());
        assert!(tokenize("'Sheet'A1", 0).is_err());
    }

    #[test]
    fn test_error_literals() {
        assert_eq!(tokens("#DIV/0!")[0], Token::Error(ErrorCode::Div0));
        assert_eq!(tokens("#N/A")[0], Token::Error(ErrorCode::Na));
        assert_eq!(tokens("#name?")[0], Token::Error(ErrorCode::Name));
        assert!(tokenize("#BOGUS!", 0).is_err());
    }

    #[test]
    fn test_offsets() {
        let spans = tokenize("1 + A2", 1).unwrap();
        let offsets: Vec<usize> = spans.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("1 @ 2", 0).unwrap_err();
        assert!(matches!(err, FormulaError::Parse { offset: 2, .. }));
    }
}
