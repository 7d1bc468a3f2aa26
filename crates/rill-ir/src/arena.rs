//! Arena allocation for expression nodes and binders.
//!
//! Shared-graph form needs "two edges point at one node" to be expressible
//! under any ownership discipline, so nodes are arena-allocated and
//! addressed by plain index handles: two [`ExprId`]s holding the same value
//! are two references to one shared node.
//!
//! The arena is append-only. Transforms allocate their output nodes into
//! the same arena; existing nodes are never mutated, so input handles stay
//! valid across any number of conversions.
//!
//! Binders get the same treatment: a [`VarId`] identifies a declaration
//! site. The printed name stored alongside it is a hint for diagnostics
//! and the printer, never an identity. Fresh binders come from a monotonic
//! counter, so generated names cannot collide with anything already in the
//! program.

use crate::expr::{Expr, ExprKind};
use crate::foundation::{Literal, PrimOp, Type};
use std::fmt;

/// Handle to an expression node in an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Handle to a binder declaration site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Declaration-site record for a binder.
#[derive(Debug, Clone)]
pub struct VarInfo {
    /// Printable name hint (unique by construction, but identity is the id)
    pub name: String,
    /// Optional pass-through type annotation for the binder
    pub ty: Option<Type>,
}

/// Append-only storage for expression nodes and binders.
#[derive(Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    vars: Vec<VarInfo>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated expression nodes.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Whether the arena holds no expressions.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Allocate a node with no type annotation.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.alloc_typed(kind, None)
    }

    /// Allocate a node carrying a type annotation.
    pub fn alloc_typed(&mut self, kind: ExprKind, ty: Option<Type>) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, ty });
        id
    }

    /// Variant of the node behind `id`.
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.0 as usize].kind
    }

    /// Type annotation of the node behind `id`, if any.
    pub fn ty(&self, id: ExprId) -> Option<&Type> {
        self.exprs[id.0 as usize].ty.as_ref()
    }

    /// Full node behind `id`.
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    /// Declare a fresh binder. The stored name is `hint` suffixed with the
    /// binder's ordinal, so no two binders ever print identically.
    pub fn fresh_var(&mut self, hint: &str) -> VarId {
        self.fresh_var_typed(hint, None)
    }

    /// Declare a fresh binder with a type annotation.
    pub fn fresh_var_typed(&mut self, hint: &str, ty: Option<Type>) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarInfo {
            name: format!("{}.{}", hint, id.0),
            ty,
        });
        id
    }

    /// Declaration record for a binder.
    pub fn var(&self, id: VarId) -> &VarInfo {
        &self.vars[id.0 as usize]
    }

    /// Printable name of a binder.
    pub fn var_name(&self, id: VarId) -> &str {
        &self.vars[id.0 as usize].name
    }

    /// Name hint of a binder: the stored name without the ordinal suffix.
    pub fn var_hint(&self, id: VarId) -> &str {
        let name = self.var_name(id);
        name.rsplit_once('.').map(|(hint, _)| hint).unwrap_or(name)
    }

    // === Construction helpers ===

    /// Allocate a variable use site.
    pub fn var_expr(&mut self, var: VarId) -> ExprId {
        let ty = self.vars[var.0 as usize].ty.clone();
        self.alloc_typed(ExprKind::Var(var), ty)
    }

    /// Allocate a constant.
    pub fn constant(&mut self, lit: Literal) -> ExprId {
        self.alloc(ExprKind::Constant(lit))
    }

    /// Allocate an integer constant.
    pub fn int(&mut self, v: i64) -> ExprId {
        self.constant(Literal::Int(v))
    }

    /// Allocate a float constant.
    pub fn float(&mut self, v: f64) -> ExprId {
        self.constant(Literal::Float(v))
    }

    /// Allocate a boolean constant.
    pub fn bool(&mut self, v: bool) -> ExprId {
        self.constant(Literal::Bool(v))
    }

    /// Allocate a primitive operator value.
    pub fn prim(&mut self, op: PrimOp) -> ExprId {
        self.alloc(ExprKind::Prim(op))
    }

    /// Allocate a global reference.
    pub fn global(&mut self, id: crate::module::GlobalId) -> ExprId {
        self.alloc(ExprKind::Global(id))
    }

    /// Allocate a `let` expression.
    pub fn let_(&mut self, var: VarId, value: ExprId, body: ExprId) -> ExprId {
        self.alloc(ExprKind::Let { var, value, body })
    }

    /// Allocate a function value.
    pub fn function(&mut self, params: Vec<VarId>, body: ExprId) -> ExprId {
        self.alloc(ExprKind::Function { params, body })
    }

    /// Allocate a call.
    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>) -> ExprId {
        self.alloc(ExprKind::Call { callee, args })
    }

    /// Allocate a primitive application, e.g. `add(a, b)`.
    pub fn call_prim(&mut self, op: PrimOp, args: Vec<ExprId>) -> ExprId {
        let callee = self.prim(op);
        self.call(callee, args)
    }

    /// Allocate a conditional.
    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.alloc(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    /// Allocate a tuple construction.
    pub fn tuple(&mut self, elems: Vec<ExprId>) -> ExprId {
        self.alloc(ExprKind::Tuple(elems))
    }

    /// Allocate a tuple projection.
    pub fn project(&mut self, tuple: ExprId, index: usize) -> ExprId {
        self.alloc(ExprKind::Project { tuple, index })
    }

    /// Allocate a cell creation.
    pub fn ref_create(&mut self, init: ExprId) -> ExprId {
        self.alloc(ExprKind::RefCreate { init })
    }

    /// Allocate a cell read.
    pub fn ref_read(&mut self, cell: ExprId) -> ExprId {
        self.alloc(ExprKind::RefRead { cell })
    }

    /// Allocate a cell write.
    pub fn ref_write(&mut self, cell: ExprId, value: ExprId) -> ExprId {
        self.alloc(ExprKind::RefWrite { cell, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_vars_never_collide() {
        let mut arena = ExprArena::new();
        let a = arena.fresh_var("x");
        let b = arena.fresh_var("x");
        assert_ne!(a, b);
        assert_ne!(arena.var_name(a), arena.var_name(b));
        assert_eq!(arena.var_hint(a), "x");
        assert_eq!(arena.var_hint(b), "x");
    }

    #[test]
    fn test_nodes_are_immutable_handles() {
        let mut arena = ExprArena::new();
        let one = arena.int(1);
        let sum = arena.call_prim(PrimOp::Add, vec![one, one]);

        // Allocating more nodes does not disturb earlier ones.
        let _ = arena.tuple(vec![sum, one]);
        assert_eq!(*arena.kind(one), ExprKind::Constant(Literal::Int(1)));
        match arena.kind(sum) {
            ExprKind::Call { args, .. } => assert_eq!(args, &vec![one, one]),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_var_expr_carries_binder_annotation() {
        let mut arena = ExprArena::new();
        let v = arena.fresh_var_typed("n", Some(Type::Int));
        let use_site = arena.var_expr(v);
        assert_eq!(arena.ty(use_site), Some(&Type::Int));
    }
}
