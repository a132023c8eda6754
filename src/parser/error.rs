use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("Missing '{expected}' {context}")]
    Missing {
        expected: &'static str,
        context: &'static str,
    },
    #[error("Expected {0}")]
    Expected(&'static str),
    #[error("Left side of an assignment must be a variable or an array element")]
    InvalidAssignmentTarget,
    #[error("Unexpected expression: '{0}'")]
    UnexpectedExpression(String),
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected '{0}' in class body")]
    UnexpectedMember(String),
    #[error("Integer literal '{0}' is out of range")]
    IntegerOutOfRange(String),
    #[error("Iteration limit exceeded (possible infinite loop)")]
    IterationLimit,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("L{line}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
}

impl SyntaxError {
    pub fn is_critical(&self) -> bool {
        self.kind == SyntaxErrorKind::IterationLimit
    }
}
