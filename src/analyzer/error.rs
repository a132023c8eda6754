use thiserror::Error;

use crate::parser::BinOpKind;

use super::Ty;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("Variable '{name}' already declared at line {first_line}")]
    AlreadyDeclared { name: String, first_line: usize },
    #[error("Variable '{0}' is not declared")]
    Undeclared(String),
    #[error("'{0}' is not an array")]
    NotAnArray(String),
    #[error("Cannot assign '{value}' to variable of type '{target}'")]
    CannotAssign { target: Ty, value: Ty },
    #[error("Array index must be 'int', found '{0}'")]
    IndexNotInt(Ty),
    #[error("The condition of {construct} must be boolean, found '{found}'")]
    NonBooleanCondition { construct: &'static str, found: Ty },
    #[error("Operator '{0}' cannot be applied to String")]
    StringOperand(BinOpKind),
    #[error("Operator '{0}' cannot be applied to boolean")]
    BooleanOperand(BinOpKind),
    #[error("Operator '{op}' is not applicable to '{lhs}' and '{rhs}'")]
    NotApplicable { op: BinOpKind, lhs: Ty, rhs: Ty },
    #[error("Operator '{op}' requires boolean operands, found '{found}'")]
    RequiresBoolean { op: &'static str, found: Ty },
    #[error("Operator '{op}' requires a numeric operand, found '{found}'")]
    RequiresNumeric { op: &'static str, found: Ty },
    #[error("'{0}' outside of a loop")]
    OutsideLoop(&'static str),
    #[error("Unbalanced brackets in array literal")]
    UnbalancedArrayLiteral,
    #[error("Critical error: iteration limit exceeded")]
    IterationLimit,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Error at line {line}: {kind}")]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub line: usize,
}

impl SemanticError {
    pub fn is_critical(&self) -> bool {
        self.kind == SemanticErrorKind::IterationLimit
    }
}
