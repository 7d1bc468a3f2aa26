//! Scope tracker for the sequential-form converter.
//!
//! A [`ScopeTree`] mirrors the binder nesting of the expression being
//! converted: one scope per Function body and per If branch, all rooted at
//! the top-level scope. Each scope carries an ordered list of pending
//! bindings. Converting a compound value pushes a fresh binding into the
//! scope that owns the value and gets back a variable to use in its place;
//! when the construct owning a scope finishes, [`ScopeTree::wrap`] drains
//! the pending list into nested `let`s around the construct's result, so
//! bindings can never leak into a sibling branch or the parent scope.
//!
//! The scope that owns a shared value is the lowest common ancestor of the
//! scopes of all its consumers — the innermost scope whose binder set
//! covers every free variable of the value. [`ScopeTree::lca`] computes it
//! pairwise as consumers are discovered.

use rill_ir::{ExprArena, ExprId, VarId};
use std::fmt;

/// Handle to a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug)]
struct ScopeData {
    parent: Option<ScopeId>,
    depth: u32,
    /// Pending bindings in insertion order
    pending: Vec<(VarId, ExprId)>,
}

/// Tree of binding scopes with per-scope pending-binding lists.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    /// The top-level scope, present from construction.
    pub const ROOT: ScopeId = ScopeId(0);

    /// Create a tree holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                parent: None,
                depth: 0,
                pending: Vec::new(),
            }],
        }
    }

    /// Open a child scope under `parent`.
    pub fn enter(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent: Some(parent),
            depth: self.scopes[parent.0 as usize].depth + 1,
            pending: Vec::new(),
        });
        id
    }

    /// Lowest common ancestor of two scopes.
    pub fn lca(&self, a: ScopeId, b: ScopeId) -> ScopeId {
        let (mut a, mut b) = (a, b);
        while self.scopes[a.0 as usize].depth > self.scopes[b.0 as usize].depth {
            a = self.parent_of(a);
        }
        while self.scopes[b.0 as usize].depth > self.scopes[a.0 as usize].depth {
            b = self.parent_of(b);
        }
        while a != b {
            a = self.parent_of(a);
            b = self.parent_of(b);
        }
        a
    }

    fn parent_of(&self, scope: ScopeId) -> ScopeId {
        match self.scopes[scope.0 as usize].parent {
            Some(p) => p,
            // lca never walks above the root: both cursors stop there
            None => scope,
        }
    }

    /// Append a binding to a scope's pending list.
    pub fn push_binding(&mut self, scope: ScopeId, var: VarId, value: ExprId) {
        self.scopes[scope.0 as usize].pending.push((var, value));
    }

    /// Bind `value` in `scope` under a fresh variable and return a use
    /// site for it. The fresh name comes from the arena's monotonic
    /// counter and cannot collide with any existing name.
    pub fn bind(
        &mut self,
        scope: ScopeId,
        arena: &mut ExprArena,
        hint: &str,
        value: ExprId,
    ) -> ExprId {
        let ty = arena.ty(value).cloned();
        let var = arena.fresh_var_typed(hint, ty);
        self.push_binding(scope, var, value);
        arena.var_expr(var)
    }

    /// Number of pending bindings in a scope.
    pub fn pending_len(&self, scope: ScopeId) -> usize {
        self.scopes[scope.0 as usize].pending.len()
    }

    /// Drain a scope's pending bindings, wrapping them around `body` as
    /// nested `let`s in insertion order (first pending binding outermost).
    pub fn wrap(&mut self, scope: ScopeId, body: ExprId, arena: &mut ExprArena) -> ExprId {
        let pending = std::mem::take(&mut self.scopes[scope.0 as usize].pending);
        pending
            .into_iter()
            .rev()
            .fold(body, |acc, (var, value)| arena.let_(var, value, acc))
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
