//! Conversion to sequential-binding form.
//!
//! Rewrites an expression so that every compound intermediate value is
//! named by an explicit binding, in deterministic post-order evaluation
//! order. Atoms (variables, constants, primitives, global references) are
//! returned as-is; functions are rebuilt with a normalized body and
//! returned standalone, never bound at their construction site.
//!
//! The converter runs in two phases over the expression DAG:
//!
//! 1. **Scope analysis** — a topological walk assigns every compound node
//!    the scope it will be bound in: the lowest common ancestor of the
//!    scopes of all its consumers. Function bodies and each If branch open
//!    child scopes, so a value consumed only inside one branch is bound
//!    inside that branch, while a value shared across branches is bound
//!    once, above the If.
//! 2. **Fill** — a memoized post-order rewrite. Children convert before
//!    parents, each compound result is pushed into its assigned scope's
//!    pending list, and closing a Function body or If branch wraps that
//!    scope's pending bindings around the result. Let binders from the
//!    input are reused (renamed fresh): the renamed binder is passed down
//!    to the value's conversion, which pushes the converted value directly
//!    under it — never under an intermediate fresh name — which is what
//!    makes the output independent of how the caller nested its Lets.
//!
//! Memoization keys on node identity, so a shared node is converted and
//! bound exactly once and effectful nodes are never duplicated. Evaluation
//! order along any execution path is preserved: conversion visits
//! subexpressions in original evaluation order and bindings are emitted in
//! visit order.
//!
//! Top-level definitions are converted at most once per invocation,
//! memoized by name with an in-progress guard so mutual recursion
//! terminates; the module is updated in place.

use crate::error::{PassError, Result};
use crate::scope::{ScopeId, ScopeTree};
use rill_ir::{ExprArena, ExprId, ExprKind, GlobalId, Module, VarId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Convert a standalone expression to sequential-binding form.
///
/// # Errors
///
/// Fails fast with [`PassError::UnboundVariable`] if the expression
/// contains a variable not dominated by any binder.
pub fn to_sequential_form(arena: &mut ExprArena, root: ExprId) -> Result<ExprId> {
    Normalizer {
        arena,
        module: None,
        states: HashMap::new(),
    }
    .convert(root)
}

/// Convert an expression against a module of top-level definitions.
///
/// Every global definition reachable from `root` is converted exactly
/// once and replaced in the module in place. References discovered while
/// a definition is mid-conversion resolve to the name and are not
/// followed again, which bounds mutual recursion.
///
/// # Errors
///
/// Fails with [`PassError::UnboundVariable`] on a variable with no
/// dominating binder, or [`PassError::UnknownGlobal`] if a reachable
/// global reference names no definition in `module`.
pub fn to_sequential_form_in(
    arena: &mut ExprArena,
    module: &mut Module,
    root: ExprId,
) -> Result<ExprId> {
    Normalizer {
        arena,
        module: Some(module),
        states: HashMap::new(),
    }
    .convert(root)
}

/// Per-name conversion state for top-level definitions.
enum DefState {
    /// Conversion started; nested references resolve to the name only.
    InProgress,
    /// Converted result already written back to the module.
    Done,
}

struct Normalizer<'a> {
    arena: &'a mut ExprArena,
    module: Option<&'a mut Module>,
    states: HashMap<GlobalId, DefState>,
}

impl Normalizer<'_> {
    fn convert(&mut self, root: ExprId) -> Result<ExprId> {
        let mut scopes = ScopeTree::new();
        let plan = ScopePlan::analyze(self.arena, root, &mut scopes);
        trace!(nodes = plan.node_scope.len(), "scope analysis complete");

        let mut fill = Fill {
            norm: self,
            plan,
            scopes,
            memo: HashMap::new(),
            var_map: HashMap::new(),
        };
        let result = fill.fill(root, None)?;
        let Fill {
            norm, mut scopes, ..
        } = fill;
        Ok(scopes.wrap(ScopeTree::ROOT, result, norm.arena))
    }

    /// Convert a top-level definition at most once, updating the module
    /// in place. No-op without a module or when the name is already in
    /// progress or done.
    fn transform_global(&mut self, name: &GlobalId) -> Result<()> {
        if self.states.contains_key(name) {
            return Ok(());
        }
        let def = match &self.module {
            Some(module) => module
                .def(name)
                .ok_or_else(|| PassError::UnknownGlobal(name.clone()))?,
            None => return Ok(()),
        };

        self.states.insert(name.clone(), DefState::InProgress);
        debug!(global = %name, "converting top-level definition");
        let converted = self.convert(def)?;
        if let Some(module) = self.module.as_deref_mut() {
            module.define(name.clone(), converted);
        }
        self.states.insert(name.clone(), DefState::Done);
        Ok(())
    }
}

/// Scope assignment for one conversion: which scope each compound node is
/// bound in, and the child scope opened by each Function body and If
/// branch edge.
struct ScopePlan {
    node_scope: HashMap<ExprId, ScopeId>,
    branch_scope: HashMap<(ExprId, usize), ScopeId>,
}

/// Child-slot keys for scope-opening edges.
const SLOT_BODY: usize = 0;
const SLOT_THEN: usize = 1;
const SLOT_ELSE: usize = 2;

impl ScopePlan {
    /// Walk the DAG parents-first, assigning each node the LCA of the
    /// scopes it is consumed from.
    fn analyze(arena: &ExprArena, root: ExprId, scopes: &mut ScopeTree) -> Self {
        let mut plan = ScopePlan {
            node_scope: HashMap::new(),
            branch_scope: HashMap::new(),
        };
        plan.node_scope.insert(root, ScopeTree::ROOT);

        for node in topological(arena, root) {
            let scope = plan.node_scope[&node];
            match arena.kind(node) {
                ExprKind::Function { body, .. } => {
                    let body_scope = scopes.enter(scope);
                    plan.branch_scope.insert((node, SLOT_BODY), body_scope);
                    plan.merge(scopes, *body, body_scope);
                }
                ExprKind::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    plan.merge(scopes, *cond, scope);
                    let then_scope = scopes.enter(scope);
                    plan.branch_scope.insert((node, SLOT_THEN), then_scope);
                    plan.merge(scopes, *then_branch, then_scope);
                    let else_scope = scopes.enter(scope);
                    plan.branch_scope.insert((node, SLOT_ELSE), else_scope);
                    plan.merge(scopes, *else_branch, else_scope);
                }
                kind => {
                    for child in kind.children() {
                        plan.merge(scopes, child, scope);
                    }
                }
            }
        }
        plan
    }

    fn merge(&mut self, scopes: &ScopeTree, node: ExprId, consumer: ScopeId) {
        self.node_scope
            .entry(node)
            .and_modify(|current| *current = scopes.lca(*current, consumer))
            .or_insert(consumer);
    }
}

/// Post-order over the DAG reversed: every node appears before all nodes
/// it consumes, visiting each distinct node once.
fn topological(arena: &ExprArena, root: ExprId) -> Vec<ExprId> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node) {
            continue;
        }
        stack.push((node, true));
        for child in arena.kind(node).children().into_iter().rev() {
            if !visited.contains(&child) {
                stack.push((child, false));
            }
        }
    }
    order.reverse();
    order
}

struct Fill<'n, 'a> {
    norm: &'n mut Normalizer<'a>,
    plan: ScopePlan,
    scopes: ScopeTree,
    /// Converted atom per input node; keys a shared node to one binding.
    memo: HashMap<ExprId, ExprId>,
    /// Input binder to the output expression standing for it.
    var_map: HashMap<VarId, ExprId>,
}

impl Fill<'_, '_> {
    fn scope_of(&self, node: ExprId) -> ScopeId {
        self.plan.node_scope[&node]
    }

    fn branch_scope(&self, node: ExprId, slot: usize) -> ScopeId {
        self.plan.branch_scope[&(node, slot)]
    }

    /// Name `converted` in the scope assigned to its input node: under the
    /// reused binder of an owning Let when one was passed down, under a
    /// fresh variable otherwise. Returns the variable standing for it.
    fn bind(&mut self, input: ExprId, converted: ExprId, dest: Option<VarId>) -> ExprId {
        let scope = self.scope_of(input);
        match dest {
            Some(var) => {
                self.scopes.push_binding(scope, var, converted);
                self.norm.arena.var_expr(var)
            }
            None => self.scopes.bind(scope, self.norm.arena, "t", converted),
        }
    }

    /// An atom stands for itself unless an owning Let asked for its binder
    /// to be kept, in which case the atom is bound under that binder.
    fn keep_atom(&mut self, input: ExprId, atom: ExprId, dest: Option<VarId>) -> ExprId {
        if dest.is_some() {
            self.bind(input, atom, dest)
        } else {
            atom
        }
    }

    /// `dest` is the renamed binder of the Let that owns `node` as its
    /// bound value, if any; the converted node is bound under it directly.
    fn fill(&mut self, node: ExprId, dest: Option<VarId>) -> Result<ExprId> {
        if let Some(done) = self.memo.get(&node) {
            return Ok(*done);
        }

        let ty = self.norm.arena.ty(node).cloned();
        let out = match self.norm.arena.kind(node).clone() {
            ExprKind::Var(var) => {
                let standing = *self.var_map.get(&var).ok_or_else(|| {
                    PassError::UnboundVariable(self.norm.arena.var_name(var).to_string())
                })?;
                self.keep_atom(node, standing, dest)
            }

            ExprKind::Constant(_) | ExprKind::Prim(_) => self.keep_atom(node, node, dest),

            ExprKind::Global(name) => {
                self.norm.transform_global(&name)?;
                self.keep_atom(node, node, dest)
            }

            ExprKind::Let { var, value, body } => {
                // The renamed binder travels down into the value's
                // conversion and receives the converted value directly. A
                // value already named by an earlier consumer keeps that
                // name instead of gaining an alias.
                let named = match self.memo.get(&value) {
                    Some(done) => *done,
                    None => {
                        let hint = self.norm.arena.var_hint(var).to_string();
                        let var_ty = self.norm.arena.var(var).ty.clone();
                        let renamed = self.norm.arena.fresh_var_typed(&hint, var_ty);
                        self.fill(value, Some(renamed))?
                    }
                };
                self.var_map.insert(var, named);
                self.fill(body, dest)?
            }

            ExprKind::Function { params, body } => {
                let renamed: Vec<VarId> = params
                    .iter()
                    .map(|param| {
                        let hint = self.norm.arena.var_hint(*param).to_string();
                        let param_ty = self.norm.arena.var(*param).ty.clone();
                        let fresh = self.norm.arena.fresh_var_typed(&hint, param_ty);
                        let use_site = self.norm.arena.var_expr(fresh);
                        self.var_map.insert(*param, use_site);
                        fresh
                    })
                    .collect();
                let body_scope = self.branch_scope(node, SLOT_BODY);
                let body = self.fill(body, None)?;
                let body = self.scopes.wrap(body_scope, body, self.norm.arena);
                // A function is a standalone atomic value once built.
                let rebuilt = self.norm.arena.alloc_typed(
                    ExprKind::Function {
                        params: renamed,
                        body,
                    },
                    ty,
                );
                self.keep_atom(node, rebuilt, dest)
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.fill(cond, None)?;
                let then_scope = self.branch_scope(node, SLOT_THEN);
                let then_branch = self.fill(then_branch, None)?;
                let then_branch = self.scopes.wrap(then_scope, then_branch, self.norm.arena);
                let else_scope = self.branch_scope(node, SLOT_ELSE);
                let else_branch = self.fill(else_branch, None)?;
                let else_branch = self.scopes.wrap(else_scope, else_branch, self.norm.arena);
                let rebuilt = self.norm.arena.alloc_typed(
                    ExprKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    ty,
                );
                self.bind(node, rebuilt, dest)
            }

            ExprKind::Call { callee, args } => {
                let callee = self.fill(callee, None)?;
                let args = self.fill_all(args)?;
                let rebuilt = self
                    .norm
                    .arena
                    .alloc_typed(ExprKind::Call { callee, args }, ty);
                self.bind(node, rebuilt, dest)
            }

            ExprKind::Tuple(elems) => {
                let elems = self.fill_all(elems)?;
                let rebuilt = self.norm.arena.alloc_typed(ExprKind::Tuple(elems), ty);
                self.bind(node, rebuilt, dest)
            }

            ExprKind::Project { tuple, index } => {
                let tuple = self.fill(tuple, None)?;
                let rebuilt = self
                    .norm
                    .arena
                    .alloc_typed(ExprKind::Project { tuple, index }, ty);
                self.bind(node, rebuilt, dest)
            }

            ExprKind::RefCreate { init } => {
                let init = self.fill(init, None)?;
                let rebuilt = self.norm.arena.alloc_typed(ExprKind::RefCreate { init }, ty);
                self.bind(node, rebuilt, dest)
            }

            ExprKind::RefRead { cell } => {
                let cell = self.fill(cell, None)?;
                let rebuilt = self.norm.arena.alloc_typed(ExprKind::RefRead { cell }, ty);
                self.bind(node, rebuilt, dest)
            }

            ExprKind::RefWrite { cell, value } => {
                let cell = self.fill(cell, None)?;
                let value = self.fill(value, None)?;
                let rebuilt = self
                    .norm
                    .arena
                    .alloc_typed(ExprKind::RefWrite { cell, value }, ty);
                self.bind(node, rebuilt, dest)
            }
        };

        self.memo.insert(node, out);
        Ok(out)
    }

    fn fill_all(&mut self, nodes: Vec<ExprId>) -> Result<Vec<ExprId>> {
        nodes.into_iter().map(|node| self.fill(node, None)).collect()
    }
}
