// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # Rill IR
//!
//! Node model for a functional, expression-based intermediate
//! representation. Expressions live in an append-only [`ExprArena`] and are
//! addressed by [`ExprId`] handles, so structural sharing is expressed as
//! two handles holding the same value rather than aliased references.
//!
//! The crate also carries the two test collaborators the canonicalization
//! passes depend on: a compact text printer ([`print`]) and a reference
//! interpreter ([`interp`]) used to check that transforms preserve
//! evaluation results.
//!
//! The passes themselves (sequential-binding form, shared-graph form,
//! alpha-equivalence, feature detection) live in `rill-passes`.

pub mod arena;
pub mod error;
pub mod expr;
pub mod foundation;
pub mod interp;
pub mod module;
pub mod print;

pub use arena::{ExprArena, ExprId, VarId};
pub use error::EvalError;
pub use expr::{Expr, ExprKind};
pub use foundation::{Literal, PrimOp, Type};
pub use interp::{Interpreter, Value};
pub use module::{GlobalId, Module};
pub use print::expr_to_text;
