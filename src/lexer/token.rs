use std::fmt;

use phf::phf_map;

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "class" => TokenKind::Class,
    "public" => TokenKind::Public,
    "private" => TokenKind::Private,
    "static" => TokenKind::Static,
    "void" => TokenKind::Void,
    "int" => TokenKind::Int,
    "float" => TokenKind::Float,
    "boolean" => TokenKind::Boolean,
    "char" => TokenKind::Char,
    "String" => TokenKind::StringType,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "do" => TokenKind::Do,
    "return" => TokenKind::Return,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "new" => TokenKind::New,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "null" => TokenKind::Null,
};

pub static TWO_SYMBOLS_TOKENS: phf::Map<&'static str, TokenKind> = phf_map! {
    "++" => TokenKind::Increment,
    "--" => TokenKind::Decrement,
    "+=" => TokenKind::PlusAssign,
    "-=" => TokenKind::MinusAssign,
    "==" => TokenKind::DoubleEqual,
    "!=" => TokenKind::NotEqual,
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
    "&&" => TokenKind::LogicalAnd,
    "||" => TokenKind::LogicalOr,
};

pub static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '%' => TokenKind::Percent,
    '=' => TokenKind::Assign,
    '<' => TokenKind::LessThan,
    '>' => TokenKind::GreaterThan,
    '!' => TokenKind::Not,
    '(' => TokenKind::LeftParen,
    ')' => TokenKind::RightParen,
    '{' => TokenKind::LeftBrace,
    '}' => TokenKind::RightBrace,
    '[' => TokenKind::LeftBracket,
    ']' => TokenKind::RightBracket,
    ';' => TokenKind::SemiColon,
    ',' => TokenKind::Comma,
    '.' => TokenKind::Dot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Class,
    Public,
    Private,
    Static,
    Void,
    Int,
    Float,
    Boolean,
    Char,
    StringType,
    If,
    Else,
    While,
    For,
    Do,
    Return,
    Break,
    Continue,
    New,
    This,
    True,
    False,
    Null,

    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    Increment,
    Decrement,
    PlusAssign,
    MinusAssign,
    DoubleEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    LessThan,
    GreaterThan,
    Not,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    SemiColon,
    Comma,
    Dot,

    Comment,
    Error,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:?}", self))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub const fn eof(line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            line,
            column,
        }
    }
}

/// Decodes the body of a character literal, resolving a single backslash escape.
pub fn decode_char(lexeme: &str) -> char {
    let mut chars = lexeme.chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), Some(escaped)) => match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        },
        (Some(c), _) => c,
        (None, _) => '\0',
    }
}

/// Inverse of [`decode_char`].
pub fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\0' => "\\0".to_string(),
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_escapes() {
        assert_eq!(decode_char("a"), 'a');
        assert_eq!(decode_char("\\n"), '\n');
        assert_eq!(decode_char("\\'"), '\'');
        assert_eq!(decode_char(""), '\0');
        for c in ['x', '\n', '\\', '\''] {
            assert_eq!(decode_char(&escape_char(c)), c);
        }
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:<8}|", TokenKind::If), "If      |");
    }
}
