//! Formula abstract syntax tree

use sheetcalc_core::{CellRange, ErrorCode};
use std::fmt;

/// A parsed formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorCode),

    // === References ===
    /// A cell or block of cells, optionally on another sheet
    Reference(RangeRef),
    /// Defined name
    Name(String),

    // === Operators ===
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call; the name is stored upper-case
    Function { name: String, args: Vec<Expr> },

    /// Array constant such as `{1,2;3,4}`, stored as rows
    Array(Vec<Vec<Expr>>),

    /// Omitted argument, as in `IF(A1,,1)`
    Missing,
}

/// Reference to a range; a single cell is a 1x1 range
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRef {
    pub sheet: Option<String>,
    pub range: CellRange,
}

impl RangeRef {
    pub fn is_single_cell(&self) -> bool {
        self.range.cell_count() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Concat,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Concat => "&",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    /// Postfix `%`
    Percent,
}

fn write_sheet(f: &mut fmt::Formatter<'_>, sheet: &str) -> fmt::Result {
    let plain = sheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if plain {
        write!(f, "{sheet}!")
    } else {
        write!(f, "'{}'!", sheet.replace('\'', "''"))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write_sheet(f, sheet)?;
        }
        write!(f, "{}", self.range)
    }
}

/// Renders the expression back to formula text (without the leading `=`)
///
/// Binary operations are always parenthesized.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(&crate::value::format_number(*n)),
            Expr::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Expr::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Expr::Error(e) => write!(f, "{e}"),
            Expr::Reference(r) => write!(f, "{r}"),
            Expr::Name(name) => f.write_str(name),
            Expr::Missing => Ok(()),
            Expr::Unary { op, operand } => match op {
                UnaryOperator::Negate => write!(f, "-{operand}"),
                UnaryOperator::Plus => write!(f, "+{operand}"),
                UnaryOperator::Percent => write!(f, "{operand}%"),
            },
            Expr::Binary { op, left, right } => {
                write!(f, "({left}{}{right})", op.symbol())
            }
            Expr::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Array(rows) => {
                f.write_str("{")?;
                for (r, row) in rows.iter().enumerate() {
                    if r > 0 {
                        f.write_str(";")?;
                    }
                    for (c, item) in row.iter().enumerate() {
                        if c > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{item}")?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}
