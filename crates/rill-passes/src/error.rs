//! Pass errors.
//!
//! The error surface is deliberately small. An equivalence mismatch is a
//! normal boolean result, not an error, and unsupported constructs are
//! unrepresentable: `ExprKind` is a closed sum matched exhaustively by
//! every pass, so an unknown variant is a compile error rather than a
//! runtime one.

use rill_ir::GlobalId;
use thiserror::Error;

/// Pass result type.
pub type Result<T> = std::result::Result<T, PassError>;

/// Errors raised by the canonicalization passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PassError {
    /// A variable with no dominating binder was reached during
    /// sequential-form conversion. This is a programming error in the
    /// caller and surfaces immediately.
    #[error("unbound variable '{0}' during sequential-form conversion")]
    UnboundVariable(String),

    /// A global reference names a definition the module does not contain.
    #[error("unknown global definition '{0}'")]
    UnknownGlobal(GlobalId),
}
