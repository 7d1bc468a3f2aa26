//! Expression node variants.
//!
//! `ExprKind` is a closed tagged union matched exhaustively by every pass,
//! so adding or removing a variant is a compile-time-checked change across
//! the whole core.
//!
//! # Atoms and compounds
//!
//! - **Atomic**: `Var`, `Constant`, `Prim`, `Global` — carry no
//!   substructure that needs naming; the sequential-form converter returns
//!   them as-is.
//! - **Compound**: everything else — a binding candidate.
//!
//! # Effects
//!
//! `RefCreate`, `RefRead`, `RefWrite` (and, by construal, any `Call`) are
//! effectful. No pass may reorder, duplicate, or eliminate them; a
//! transform may change where such a value is *named* but never when it is
//! evaluated relative to other effects.

use crate::arena::{ExprId, VarId};
use crate::foundation::{Literal, PrimOp, Type};
use crate::module::GlobalId;

/// A single expression node: variant plus optional pass-through type
/// annotation.
///
/// Nodes are immutable once constructed. Transforms append new nodes to
/// the arena instead of mutating existing ones, so an input expression is
/// never changed by converting it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression variant
    pub kind: ExprKind,
    /// Optional type annotation, copied verbatim by the passes
    pub ty: Option<Type>,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Reference to a binding introduced by a `Let`, a function parameter,
    /// or — identity-wise — nothing else. Identity is the declaration-site
    /// [`VarId`], never the printed name.
    Var(VarId),

    /// Atomic literal value.
    Constant(Literal),

    /// Primitive operator used as a callee value.
    Prim(PrimOp),

    /// Reference to a top-level, possibly mutually recursive, named
    /// definition. Resolved by lookup in the [`Module`](crate::Module)
    /// table, never inlined.
    Global(GlobalId),

    /// `let var = value in body`. The binder is exclusively owned by this
    /// node; its scope is exactly `body`.
    Let {
        var: VarId,
        value: ExprId,
        body: ExprId,
    },

    /// Closure value. The body is a nested scope whose free variables are
    /// parameters or bindings from enclosing scopes.
    Function { params: Vec<VarId>, body: ExprId },

    /// Application of a function value (closure, primitive, or global) to
    /// argument expressions, evaluated left to right.
    Call { callee: ExprId, args: Vec<ExprId> },

    /// Conditional. Each branch is its own nested scope: bindings created
    /// while transforming one branch never appear in the sibling branch or
    /// above the condition.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },

    /// Product construction.
    Tuple(Vec<ExprId>),

    /// Field access on a tuple value.
    Project { tuple: ExprId, index: usize },

    /// Allocate a mutable cell with an initial value. Effectful.
    RefCreate { init: ExprId },

    /// Read a mutable cell. Effectful.
    RefRead { cell: ExprId },

    /// Write a mutable cell, evaluating to unit. Effectful.
    RefWrite { cell: ExprId, value: ExprId },
}

impl ExprKind {
    /// Whether this variant is atomic: returned as-is by the
    /// sequential-form converter, never bound.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            ExprKind::Var(_) | ExprKind::Constant(_) | ExprKind::Prim(_) | ExprKind::Global(_)
        )
    }

    /// Child expression handles, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Var(_)
            | ExprKind::Constant(_)
            | ExprKind::Prim(_)
            | ExprKind::Global(_) => Vec::new(),
            ExprKind::Let { value, body, .. } => vec![*value, *body],
            ExprKind::Function { body, .. } => vec![*body],
            ExprKind::Call { callee, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*callee);
                out.extend_from_slice(args);
                out
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => vec![*cond, *then_branch, *else_branch],
            ExprKind::Tuple(elems) => elems.clone(),
            ExprKind::Project { tuple, .. } => vec![*tuple],
            ExprKind::RefCreate { init } => vec![*init],
            ExprKind::RefRead { cell } => vec![*cell],
            ExprKind::RefWrite { cell, value } => vec![*cell, *value],
        }
    }
}
