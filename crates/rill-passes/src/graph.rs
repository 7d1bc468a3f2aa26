//! Conversion to shared-graph form.
//!
//! The inverse of sequential-binding conversion: every `let` is removed by
//! substituting the bound value's node at each use site of its variable.
//! Substitution is by handle, so a value used at two occurrences becomes
//! two references to one shared node, never two copies. If branches and
//! Function bodies keep their boundaries; only `Let` forms disappear.
//!
//! Variables that are not let-bound (function parameters, free variables
//! of an open subtree) are kept as-is. Unchanged subtrees reuse their
//! original node handles, so conversion preserves whatever sharing the
//! input already had.

use rill_ir::{ExprArena, ExprId, ExprKind, VarId};
use std::collections::HashMap;

/// Convert an expression to shared-graph form.
pub fn to_graph_form(arena: &mut ExprArena, root: ExprId) -> ExprId {
    GraphForm {
        arena,
        subst: HashMap::new(),
        memo: HashMap::new(),
    }
    .convert(root)
}

struct GraphForm<'a> {
    arena: &'a mut ExprArena,
    /// Let-bound variable to its converted value node.
    subst: HashMap<VarId, ExprId>,
    memo: HashMap<ExprId, ExprId>,
}

impl GraphForm<'_> {
    fn convert(&mut self, node: ExprId) -> ExprId {
        if let Some(done) = self.memo.get(&node) {
            return *done;
        }

        let ty = self.arena.ty(node).cloned();
        let out = match self.arena.kind(node).clone() {
            ExprKind::Var(var) => self.subst.get(&var).copied().unwrap_or(node),

            ExprKind::Constant(_) | ExprKind::Prim(_) | ExprKind::Global(_) => node,

            ExprKind::Let { var, value, body } => {
                let value = self.convert(value);
                self.subst.insert(var, value);
                self.convert(body)
            }

            ExprKind::Function { params, body } => {
                let converted = self.convert(body);
                if converted == body {
                    node
                } else {
                    self.arena.alloc_typed(
                        ExprKind::Function {
                            params,
                            body: converted,
                        },
                        ty,
                    )
                }
            }

            ExprKind::Call { callee, args } => {
                let new_callee = self.convert(callee);
                let new_args: Vec<ExprId> = args.iter().map(|arg| self.convert(*arg)).collect();
                if new_callee == callee && new_args == args {
                    node
                } else {
                    self.arena.alloc_typed(
                        ExprKind::Call {
                            callee: new_callee,
                            args: new_args,
                        },
                        ty,
                    )
                }
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let new_cond = self.convert(cond);
                let new_then = self.convert(then_branch);
                let new_else = self.convert(else_branch);
                if new_cond == cond && new_then == then_branch && new_else == else_branch {
                    node
                } else {
                    self.arena.alloc_typed(
                        ExprKind::If {
                            cond: new_cond,
                            then_branch: new_then,
                            else_branch: new_else,
                        },
                        ty,
                    )
                }
            }

            ExprKind::Tuple(elems) => {
                let converted: Vec<ExprId> = elems.iter().map(|e| self.convert(*e)).collect();
                if converted == elems {
                    node
                } else {
                    self.arena.alloc_typed(ExprKind::Tuple(converted), ty)
                }
            }

            ExprKind::Project { tuple, index } => {
                let converted = self.convert(tuple);
                if converted == tuple {
                    node
                } else {
                    self.arena.alloc_typed(
                        ExprKind::Project {
                            tuple: converted,
                            index,
                        },
                        ty,
                    )
                }
            }

            ExprKind::RefCreate { init } => {
                let converted = self.convert(init);
                if converted == init {
                    node
                } else {
                    self.arena
                        .alloc_typed(ExprKind::RefCreate { init: converted }, ty)
                }
            }

            ExprKind::RefRead { cell } => {
                let converted = self.convert(cell);
                if converted == cell {
                    node
                } else {
                    self.arena
                        .alloc_typed(ExprKind::RefRead { cell: converted }, ty)
                }
            }

            ExprKind::RefWrite { cell, value } => {
                let new_cell = self.convert(cell);
                let new_value = self.convert(value);
                if new_cell == cell && new_value == value {
                    node
                } else {
                    self.arena.alloc_typed(
                        ExprKind::RefWrite {
                            cell: new_cell,
                            value: new_value,
                        },
                        ty,
                    )
                }
            }
        };

        self.memo.insert(node, out);
        out
    }
}
