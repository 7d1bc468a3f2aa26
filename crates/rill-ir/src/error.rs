//! Evaluation errors.

use crate::module::GlobalId;
use thiserror::Error;

/// Errors raised by the reference interpreter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("unknown global definition '{0}'")]
    UnknownGlobal(GlobalId),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("called with {found} arguments, expected {expected}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("tuple index {index} out of bounds for tuple of {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("integer division by zero")]
    DivisionByZero,
}
