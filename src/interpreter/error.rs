use thiserror::Error;

use crate::{
    codegen::{Label, UnaryOperator},
    parser::BinOpKind,
};

/// Upper bound on the length of a single array.
pub const MAX_ARRAY_LEN: usize = 1 << 20;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Instruction limit of {0} reached (possible infinite loop)")]
    InstructionLimit(usize),
    #[error("Unknown label {0}")]
    UnknownLabel(Label),
    #[error("Operator '{op}' cannot be applied to '{lhs}' and '{rhs}'")]
    InvalidOperands {
        op: BinOpKind,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("Operator '{op}' cannot be applied to '{operand}'")]
    InvalidOperand {
        op: UnaryOperator,
        operand: &'static str,
    },
    #[error("'{0}' is not an array")]
    NotAnArray(String),
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("Array index must be an int, found '{0}'")]
    InvalidIndex(&'static str),
    #[error("Array size {0} exceeds the limit of {max}", max = MAX_ARRAY_LEN)]
    ArrayTooLarge(usize),
}
