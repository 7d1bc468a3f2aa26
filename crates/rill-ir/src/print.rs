//! Compact text rendering for expressions.
//!
//! Used by tests to assert textual presence or absence of binding syntax
//! (`let`), and by diagnostics. Shared nodes print once per reference —
//! the printer renders the tree a reader would evaluate, not the arena
//! layout.

use crate::arena::{ExprArena, ExprId};
use crate::expr::ExprKind;
use std::fmt::Write;

/// Render an expression to text.
pub fn expr_to_text(arena: &ExprArena, root: ExprId) -> String {
    let mut out = String::new();
    write_expr(arena, root, 0, &mut out);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_expr(arena: &ExprArena, expr: ExprId, depth: usize, out: &mut String) {
    match arena.kind(expr) {
        ExprKind::Var(v) => {
            let _ = write!(out, "%{}", arena.var_name(*v));
        }
        ExprKind::Constant(lit) => {
            let _ = write!(out, "{}", lit);
        }
        ExprKind::Prim(op) => {
            let _ = write!(out, "{}", op);
        }
        ExprKind::Global(name) => {
            let _ = write!(out, "{}", name);
        }
        ExprKind::Let { var, value, body } => {
            let _ = write!(out, "let %{} = ", arena.var_name(*var));
            write_expr(arena, *value, depth, out);
            out.push_str(";\n");
            indent(out, depth);
            write_expr(arena, *body, depth, out);
        }
        ExprKind::Function { params, body } => {
            out.push_str("fn(");
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "%{}", arena.var_name(*p));
            }
            out.push_str(") {\n");
            indent(out, depth + 1);
            write_expr(arena, *body, depth + 1, out);
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
        ExprKind::Call { callee, args } => {
            write_expr(arena, *callee, depth, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(arena, *arg, depth, out);
            }
            out.push(')');
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push_str("if ");
            write_expr(arena, *cond, depth, out);
            out.push_str(" {\n");
            indent(out, depth + 1);
            write_expr(arena, *then_branch, depth + 1, out);
            out.push('\n');
            indent(out, depth);
            out.push_str("} else {\n");
            indent(out, depth + 1);
            write_expr(arena, *else_branch, depth + 1, out);
            out.push('\n');
            indent(out, depth);
            out.push('}');
        }
        ExprKind::Tuple(elems) => {
            out.push('(');
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(arena, *elem, depth, out);
            }
            if elems.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        ExprKind::Project { tuple, index } => {
            write_expr(arena, *tuple, depth, out);
            let _ = write!(out, ".{}", index);
        }
        ExprKind::RefCreate { init } => {
            out.push_str("ref_new(");
            write_expr(arena, *init, depth, out);
            out.push(')');
        }
        ExprKind::RefRead { cell } => {
            out.push_str("ref_get(");
            write_expr(arena, *cell, depth, out);
            out.push(')');
        }
        ExprKind::RefWrite { cell, value } => {
            out.push_str("ref_set(");
            write_expr(arena, *cell, depth, out);
            out.push_str(", ");
            write_expr(arena, *value, depth, out);
            out.push(')');
        }
    }
}
