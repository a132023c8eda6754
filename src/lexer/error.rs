use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("Unrecognized character '{0}'")]
    UnrecognizedCharacter(char),
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated character literal")]
    UnterminatedChar,
    #[error("Unterminated block comment")]
    UnterminatedComment,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Lexical error at line {line}, column {column}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}
