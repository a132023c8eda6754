use std::fmt;

use crate::lexer::escape_char;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Assign(String, Box<Expr>),
    /// `array[index] = value`
    IndexAssign(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `array[index] op= value`. The array and index are evaluated once.
    IndexUpdate(BinOpKind, Box<Expr>, Box<Expr>, Box<Expr>),
    Binary(BinOpKind, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Call(String, Vec<Expr>),
    Field(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Literal(Literal),
    Ident(String),
    Grouped(Box<Expr>),
}

impl Expr {
    /// Dotted name of an identifier or a member chain, e.g. `System.out.println`.
    pub fn path(&self) -> Option<String> {
        match self {
            Expr::Ident(name) => Some(name.clone()),
            Expr::Field(object, member) => object.path().map(|p| format!("{}.{}", p, member)),
            _ => None,
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::LogicalOr => "||",
            BinOpKind::LogicalAnd => "&&",
            BinOpKind::Equal => "==",
            BinOpKind::NotEqual => "!=",
            BinOpKind::LessThan => "<",
            BinOpKind::LessEqual => "<=",
            BinOpKind::GreaterThan => ">",
            BinOpKind::GreaterEqual => ">=",
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        BinOpKind::ALL.into_iter().find(|op| op.symbol() == s)
    }

    pub const ALL: [BinOpKind; 13] = [
        BinOpKind::LogicalOr,
        BinOpKind::LogicalAnd,
        BinOpKind::Equal,
        BinOpKind::NotEqual,
        BinOpKind::LessThan,
        BinOpKind::LessEqual,
        BinOpKind::GreaterThan,
        BinOpKind::GreaterEqual,
        BinOpKind::Add,
        BinOpKind::Sub,
        BinOpKind::Mul,
        BinOpKind::Div,
        BinOpKind::Mod,
    ];

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOpKind::LogicalOr | BinOpKind::LogicalAnd)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinOpKind::Equal | BinOpKind::NotEqual)
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            BinOpKind::LessThan
                | BinOpKind::LessEqual
                | BinOpKind::GreaterThan
                | BinOpKind::GreaterEqual
        )
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    LogicalNot,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::PrefixIncrement | UnaryOp::PostfixIncrement => "++",
            UnaryOp::PrefixDecrement | UnaryOp::PostfixDecrement => "--",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{:?}", value),
            Literal::Str(s) => write!(f, "\"{}\"", s),
            Literal::Char(c) => write!(f, "'{}'", escape_char(*c)),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        let println = Expr::Field(
            Box::new(Expr::Field(
                Box::new(Expr::Ident("System".to_string())),
                "out".to_string(),
            )),
            "println".to_string(),
        );
        assert_eq!(println.path().as_deref(), Some("System.out.println"));
        assert_eq!(Expr::int(1).path(), None);
    }

    #[test]
    fn test_symbols_round_trip() {
        for op in BinOpKind::ALL {
            assert_eq!(BinOpKind::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinOpKind::from_symbol("^"), None);
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Float(3.0).to_string(), "3.0");
        assert_eq!(Literal::Str("hi".to_string()).to_string(), "\"hi\"");
        assert_eq!(Literal::Char('\n').to_string(), "'\\n'");
        assert_eq!(Literal::Null.to_string(), "null");
    }
}
