//! Formula parser
//!
//! A recursive descent parser with Excel operator precedence, lowest first:
//!
//! 1. comparison: `=`, `<>`, `<`, `<=`, `>`, `>=`
//! 2. concatenation: `&`
//! 3. additive: `+`, `-`
//! 4. multiplicative: `*`, `/`
//! 5. exponent: `^` (left associative, so `2^3^2` is 64)
//! 6. prefix sign: `-`, `+` (so `-2^2` is 4)
//! 7. postfix percent: `%`
//! 8. range: `:`

use crate::ast::{BinaryOperator, Expr, RangeRef, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Spanned, Token};
use sheetcalc_core::{CellAddress, CellRange};

/// Parse formula text into an expression tree
///
/// The leading `=` is optional.
///
/// # Example
/// ```rust
/// use sheetcalc_formula::parse_formula;
///
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let trimmed = formula.trim_start();
    let mut base = formula.len() - trimmed.len();
    let body = match trimmed.strip_prefix('=') {
        Some(body) => {
            base += 1;
            body
        }
        None => trimmed,
    };

    let mut parser = FormulaParser {
        tokens: tokenize(body, base)?,
        pos: 0,
    };
    if matches!(parser.current(), Token::Eof) {
        return Err(parser.error("Empty formula"));
    }
    let expr = parser.parse_expression()?;
    if !matches!(parser.current(), Token::Eof) {
        return Err(parser.error(format!("Unexpected {:?} after expression", parser.current())));
    }
    Ok(expr)
}

struct FormulaParser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl FormulaParser {
    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map_or(&Token::Eof, |spanned| &spanned.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |spanned| spanned.offset)
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.offset(), message)
    }

    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> FormulaResult<()> {
        if self.current() == expected {
            self.consume();
            Ok(())
        } else {
            Err(self.error(format!("Expected {what}, got {:?}", self.current())))
        }
    }

    fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn unary(op: UnaryOperator, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match self.current() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };
            self.consume();
            let right = self.parse_concatenation()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_concatenation(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_additive()?;

        while matches!(self.current(), Token::Ampersand) {
            self.consume();
            let right = self.parse_additive()?;
            left = Self::binary(BinaryOperator::Concat, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.consume();
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_power()?;

        loop {
            let op = match self.current() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.consume();
            let right = self.parse_power()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        while matches!(self.current(), Token::Caret) {
            self.consume();
            let right = self.parse_unary()?;
            left = Self::binary(BinaryOperator::Power, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        match self.current() {
            Token::Minus => {
                self.consume();
                let operand = self.parse_unary()?;
                Ok(Self::unary(UnaryOperator::Negate, operand))
            }
            Token::Plus => {
                self.consume();
                let operand = self.parse_unary()?;
                Ok(Self::unary(UnaryOperator::Plus, operand))
            }
            _ => self.parse_percent(),
        }
    }

    fn parse_percent(&mut self) -> FormulaResult<Expr> {
        let mut expr = self.parse_range()?;

        while matches!(self.current(), Token::Percent) {
            self.consume();
            expr = Self::unary(UnaryOperator::Percent, expr);
        }

        Ok(expr)
    }

    fn parse_range(&mut self) -> FormulaResult<Expr> {
        let left = self.parse_primary()?;
        if !matches!(self.current(), Token::Colon) {
            return Ok(left);
        }

        let colon_offset = self.offset();
        self.consume();
        let right = self.parse_primary()?;

        match (left, right) {
            (Expr::Reference(start), Expr::Reference(end))
                if start.is_single_cell() && end.is_single_cell() =>
            {
                let sheet = match (start.sheet, end.sheet) {
                    (Some(a), Some(b)) if !a.eq_ignore_ascii_case(&b) => {
                        return Err(FormulaError::parse(
                            colon_offset,
                            "Range corners must be on the same sheet",
                        ))
                    }
                    (a, b) => a.or(b),
                };
                Ok(Expr::Reference(RangeRef {
                    sheet,
                    range: CellRange::new(start.range.start, end.range.start),
                }))
            }
            _ => Err(FormulaError::parse(
                colon_offset,
                "Range operator needs a cell reference on both sides",
            )),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.consume() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Text(s) => Ok(Expr::Text(s)),
            Token::Boolean(b) => Ok(Expr::Boolean(b)),
            Token::Error(e) => Ok(Expr::Error(e)),

            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(expr)
            }

            Token::LeftBrace => self.parse_array(),

            Token::CellRef(address) => Ok(Self::cell(None, address)),

            Token::SheetPrefix(sheet) => match self.consume() {
                Token::CellRef(address) => Ok(Self::cell(Some(sheet), address)),
                _ => {
                    self.pos -= 1;
                    Err(self.error(format!("Expected cell reference after '{sheet}!'")))
                }
            },

            Token::Identifier(name) => {
                if matches!(self.current(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Ok(Expr::Name(name))
                }
            }

            token => {
                self.pos -= 1;
                Err(self.error(format!("Unexpected {token:?}")))
            }
        }
    }

    fn cell(sheet: Option<String>, address: CellAddress) -> Expr {
        Expr::Reference(RangeRef {
            sheet,
            range: CellRange::new(address, address),
        })
    }

    fn parse_array(&mut self) -> FormulaResult<Expr> {
        if matches!(self.current(), Token::RightBrace) {
            return Err(self.error("Empty array constant"));
        }

        let mut rows = Vec::new();
        let mut row = vec![self.parse_expression()?];
        loop {
            match self.consume() {
                Token::Comma => row.push(self.parse_expression()?),
                Token::Semicolon => {
                    rows.push(std::mem::take(&mut row));
                    row.push(self.parse_expression()?);
                }
                Token::RightBrace => break,
                _ => {
                    self.pos -= 1;
                    return Err(self.error("Expected ',' ';' or '}' in array"));
                }
            }
        }
        rows.push(row);

        Ok(Expr::Array(rows))
    }

    fn parse_argument(&mut self) -> FormulaResult<Expr> {
        match self.current() {
            Token::Comma | Token::RightParen => Ok(Expr::Missing),
            _ => self.parse_expression(),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        self.expect(&Token::LeftParen, "'('")?;

        let mut args = Vec::new();
        if !matches!(self.current(), Token::RightParen) {
            args.push(self.parse_argument()?);
            while matches!(self.current(), Token::Comma) {
                self.consume();
                args.push(self.parse_argument()?);
            }
        }

        self.expect(&Token::RightParen, "')'")?;

        Ok(Expr::Function {
            name: name.to_uppercase(),
            args,
        })
    }
}
