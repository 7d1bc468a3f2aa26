//! Structural equivalence up to renaming of bound variables.
//!
//! Two expressions are alpha-equivalent when their variants match
//! structurally and every binder on the left corresponds to exactly one
//! binder on the right. The correspondence is maintained in both
//! directions and is scoped: entering a `Let` or `Function` on both sides
//! pairs the binders for the duration of the nested comparison, and the
//! previous pairing (if any) is restored on exit so shadowing compares
//! correctly.
//!
//! Constants compare by value, globals by name, free variables by
//! declaration-site identity. The check never mutates either input.

use rill_ir::{ExprArena, ExprId, ExprKind, VarId};
use std::collections::HashMap;

/// Decide whether two expressions are equal up to consistent renaming of
/// bound variables.
pub fn alpha_equal(arena: &ExprArena, a: ExprId, b: ExprId) -> bool {
    AlphaEq {
        arena,
        left_to_right: HashMap::new(),
        right_to_left: HashMap::new(),
    }
    .equal(a, b)
}

struct AlphaEq<'a> {
    arena: &'a ExprArena,
    left_to_right: HashMap<VarId, VarId>,
    right_to_left: HashMap<VarId, VarId>,
}

impl AlphaEq<'_> {
    fn equal(&mut self, a: ExprId, b: ExprId) -> bool {
        match (self.arena.kind(a), self.arena.kind(b)) {
            (ExprKind::Var(x), ExprKind::Var(y)) => self.vars_equal(*x, *y),

            (ExprKind::Constant(l), ExprKind::Constant(r)) => l == r,

            (ExprKind::Prim(l), ExprKind::Prim(r)) => l == r,

            (ExprKind::Global(l), ExprKind::Global(r)) => l == r,

            (
                ExprKind::Let {
                    var: lv,
                    value: lval,
                    body: lbody,
                },
                ExprKind::Let {
                    var: rv,
                    value: rval,
                    body: rbody,
                },
            ) => {
                let (lv, rv) = (*lv, *rv);
                let (lval, rval) = (*lval, *rval);
                let (lbody, rbody) = (*lbody, *rbody);
                self.equal(lval, rval) && self.with_pairs(&[(lv, rv)], |s| s.equal(lbody, rbody))
            }

            (
                ExprKind::Function {
                    params: lp,
                    body: lbody,
                },
                ExprKind::Function {
                    params: rp,
                    body: rbody,
                },
            ) => {
                if lp.len() != rp.len() {
                    return false;
                }
                let pairs: Vec<(VarId, VarId)> =
                    lp.iter().copied().zip(rp.iter().copied()).collect();
                let (lbody, rbody) = (*lbody, *rbody);
                self.with_pairs(&pairs, |s| s.equal(lbody, rbody))
            }

            (
                ExprKind::Call {
                    callee: lc,
                    args: la,
                },
                ExprKind::Call {
                    callee: rc,
                    args: ra,
                },
            ) => {
                let (lc, rc) = (*lc, *rc);
                let (la, ra) = (la.clone(), ra.clone());
                self.equal(lc, rc) && self.all_equal(&la, &ra)
            }

            (
                ExprKind::If {
                    cond: lc,
                    then_branch: lt,
                    else_branch: le,
                },
                ExprKind::If {
                    cond: rc,
                    then_branch: rt,
                    else_branch: re,
                },
            ) => {
                let (lc, lt, le) = (*lc, *lt, *le);
                let (rc, rt, re) = (*rc, *rt, *re);
                self.equal(lc, rc) && self.equal(lt, rt) && self.equal(le, re)
            }

            (ExprKind::Tuple(l), ExprKind::Tuple(r)) => {
                let (l, r) = (l.clone(), r.clone());
                self.all_equal(&l, &r)
            }

            (
                ExprKind::Project {
                    tuple: lt,
                    index: li,
                },
                ExprKind::Project {
                    tuple: rt,
                    index: ri,
                },
            ) => {
                let (lt, rt) = (*lt, *rt);
                li == ri && self.equal(lt, rt)
            }

            (ExprKind::RefCreate { init: l }, ExprKind::RefCreate { init: r }) => {
                let (l, r) = (*l, *r);
                self.equal(l, r)
            }

            (ExprKind::RefRead { cell: l }, ExprKind::RefRead { cell: r }) => {
                let (l, r) = (*l, *r);
                self.equal(l, r)
            }

            (
                ExprKind::RefWrite {
                    cell: lc,
                    value: lv,
                },
                ExprKind::RefWrite {
                    cell: rc,
                    value: rv,
                },
            ) => {
                let (lc, lv) = (*lc, *lv);
                let (rc, rv) = (*rc, *rv);
                self.equal(lc, rc) && self.equal(lv, rv)
            }

            _ => false,
        }
    }

    fn vars_equal(&self, x: VarId, y: VarId) -> bool {
        match (self.left_to_right.get(&x), self.right_to_left.get(&y)) {
            // Both bound: must resolve to each other.
            (Some(mapped), Some(back)) => *mapped == y && *back == x,
            // Both free: equal only as the same declaration site.
            (None, None) => x == y,
            // One bound, one free: never equal.
            _ => false,
        }
    }

    fn all_equal(&mut self, ls: &[ExprId], rs: &[ExprId]) -> bool {
        ls.len() == rs.len() && ls.iter().zip(rs).all(|(l, r)| self.equal(*l, *r))
    }

    /// Pair binders for the duration of `f`, restoring any shadowed
    /// correspondence afterwards.
    fn with_pairs(&mut self, pairs: &[(VarId, VarId)], f: impl FnOnce(&mut Self) -> bool) -> bool {
        let mut saved = Vec::with_capacity(pairs.len());
        for (l, r) in pairs {
            saved.push((
                *l,
                *r,
                self.left_to_right.insert(*l, *r),
                self.right_to_left.insert(*r, *l),
            ));
        }
        let result = f(self);
        for (l, r, old_lr, old_rl) in saved.into_iter().rev() {
            match old_lr {
                Some(prev) => {
                    self.left_to_right.insert(l, prev);
                }
                None => {
                    self.left_to_right.remove(&l);
                }
            }
            match old_rl {
                Some(prev) => {
                    self.right_to_left.insert(r, prev);
                }
                None => {
                    self.right_to_left.remove(&r);
                }
            }
        }
        result
    }
}
