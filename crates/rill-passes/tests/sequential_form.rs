//! End-to-end tests for the sequential-binding form converter.
//!
//! Each scenario follows the same shape: build an expression (or module),
//! evaluate it, convert, and check that the converted form evaluates to the
//! same value while satisfying the structural contract — every compound
//! subexpression reached through a `let` binder, atoms left in place.

use rill_ir::{ExprArena, ExprKind, GlobalId, Interpreter, Module, PrimOp};
use rill_passes::{
    alpha_equal, detect_features, detect_features_in, to_sequential_form, to_sequential_form_in,
    Feature, PassError,
};

fn eval_int(arena: &ExprArena, root: rill_ir::ExprId) -> i64 {
    Interpreter::new(arena).eval(root).unwrap().as_int().unwrap()
}

fn eval_int_in(arena: &ExprArena, module: &Module, root: rill_ir::ExprId) -> i64 {
    Interpreter::with_module(arena, module)
        .eval(root)
        .unwrap()
        .as_int()
        .unwrap()
}

/// A shared compound subexpression is computed once through a binder.
///
/// Verifies: `add(add(add(1,1), same), same)` over a shared `add(1,1)` node
/// evaluates to 8 before and after, and the converted form gains `let`.
#[test]
fn test_shared_node_bound_once() {
    let mut arena = ExprArena::new();
    let one = arena.int(1);
    let x = arena.call_prim(PrimOp::Add, vec![one, one]);
    let y = arena.call_prim(PrimOp::Add, vec![x, x]);
    let root = arena.call_prim(PrimOp::Add, vec![y, y]);

    assert_eq!(eval_int(&arena, root), 8);
    assert!(!detect_features(&arena, root).contains(Feature::Let));

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 8);
    assert!(detect_features(&arena, seq).contains(Feature::Let));
    assert!(!detect_features(&arena, seq).contains(Feature::Graph));
}

/// Bindings appear in evaluation order, with constants left inline.
#[test]
fn test_binding_order() {
    let mut arena = ExprArena::new();
    let one = arena.int(1);
    let two = arena.int(2);
    let three = arena.int(3);
    let product = arena.call_prim(PrimOp::Mul, vec![two, three]);
    let root = arena.call_prim(PrimOp::Add, vec![one, product]);

    let seq = to_sequential_form(&mut arena, root).unwrap();

    // let d = mul(2, 3); let e = add(1, d); e
    let d = arena.fresh_var("d");
    let e = arena.fresh_var("e");
    let two = arena.int(2);
    let three = arena.int(3);
    let du = arena.var_expr(d);
    let one = arena.int(1);
    let eu = arena.var_expr(e);
    let product = arena.call_prim(PrimOp::Mul, vec![two, three]);
    let sum = arena.call_prim(PrimOp::Add, vec![one, du]);
    let inner = arena.let_(e, sum, eu);
    let expected = arena.let_(d, product, inner);

    assert!(alpha_equal(&arena, seq, expected));
    assert_eq!(eval_int(&arena, seq), 7);
}

/// Conditionals are bound like any other compound node, and each branch
/// keeps its own bindings.
#[test]
fn test_if() {
    let mut arena = ExprArena::new();
    let cond = arena.bool(true);
    let one_a = arena.int(1);
    let one_b = arena.int(1);
    let then_branch = arena.call_prim(PrimOp::Add, vec![one_a, one_b]);
    let one_c = arena.int(1);
    let one_d = arena.int(1);
    let else_branch = arena.call_prim(PrimOp::Mul, vec![one_c, one_d]);
    let root = arena.if_(cond, then_branch, else_branch);

    assert_eq!(eval_int(&arena, root), 2);

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 2);

    // The root is a binding whose value is the conditional.
    let ExprKind::Let { value, body, .. } = arena.kind(seq) else {
        panic!("expected the conditional to be let-bound");
    };
    assert!(matches!(arena.kind(*value), ExprKind::If { .. }));
    assert!(matches!(arena.kind(*body), ExprKind::Var(_)));
}

/// Existing bindings survive with fresh binders; nesting flattens into
/// evaluation order.
#[test]
fn test_existing_let() {
    let mut arena = ExprArena::new();
    let x = arena.fresh_var("x");
    let y = arena.fresh_var("y");
    let four = arena.int(4);
    let two = arena.int(2);
    let value = arena.call_prim(PrimOp::Add, vec![four, two]);
    let xu = arena.var_expr(x);
    let yu_a = arena.var_expr(y);
    let yu_b = arena.var_expr(y);
    let sum = arena.call_prim(PrimOp::Add, vec![yu_a, yu_b]);
    let inner = arena.let_(y, xu, sum);
    let root = arena.let_(x, value, inner);

    assert_eq!(eval_int(&arena, root), 12);

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 12);
}

/// Mutable-cell effects keep their order through conversion.
///
/// Verifies: create(1), read, write(2), read — the two reads see 1 and 2,
/// so the sum is 3 both before and after conversion.
#[test]
fn test_ref_effect_order() {
    let mut arena = ExprArena::new();
    let r = arena.fresh_var("r");
    let f = arena.fresh_var("f");
    let w = arena.fresh_var("w");

    let one = arena.int(1);
    let cell_init = arena.ref_create(one);
    let ru = arena.var_expr(r);
    let first = arena.ref_read(ru);
    let ru = arena.var_expr(r);
    let two = arena.int(2);
    let write = arena.ref_write(ru, two);
    let ru = arena.var_expr(r);
    let second = arena.ref_read(ru);
    let fu = arena.var_expr(f);
    let sum = arena.call_prim(PrimOp::Add, vec![fu, second]);

    // let r = ref(1); let f = read(r); let w = write(r, 2); add(f, read(r))
    let after_write = arena.let_(w, write, sum);
    let after_first = arena.let_(f, first, after_write);
    let root = arena.let_(r, cell_init, after_first);

    assert_eq!(eval_int(&arena, root), 3);

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 3);
}

/// Functions are atoms: a function value is never let-bound, and its body
/// is normalized in its own scope.
#[test]
fn test_function_stays_atomic() {
    let mut arena = ExprArena::new();
    let x = arena.fresh_var("x");
    let xu_a = arena.var_expr(x);
    let xu_b = arena.var_expr(x);
    let body = arena.call_prim(PrimOp::Add, vec![xu_a, xu_b]);
    let f = arena.function(vec![x], body);
    let four = arena.int(4);
    let root = arena.call(f, vec![four]);

    assert_eq!(eval_int(&arena, root), 8);

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 8);

    // The call is bound; its callee is the function itself, not a binder.
    let ExprKind::Let { value, .. } = arena.kind(seq) else {
        panic!("expected the call to be let-bound");
    };
    let ExprKind::Call { callee, .. } = arena.kind(*value) else {
        panic!("expected a call as the bound value");
    };
    assert!(matches!(arena.kind(*callee), ExprKind::Function { .. }));
}

/// A self-recursive global definition converts without diverging, and the
/// module is updated in place.
#[test]
fn test_recursive_global() {
    let mut arena = ExprArena::new();
    let mut module = Module::new();
    let f = GlobalId::new("f");

    // f(n) = if eq(n, 0) { 0 } else { add(m, f(sub(n, 1))) } with m = mul(n, 2)
    let n = arena.fresh_var("n");
    let nu_a = arena.var_expr(n);
    let zero_a = arena.int(0);
    let cond = arena.call_prim(PrimOp::Eq, vec![nu_a, zero_a]);
    let zero_b = arena.int(0);
    let nu_b = arena.var_expr(n);
    let two = arena.int(2);
    let m = arena.call_prim(PrimOp::Mul, vec![nu_b, two]);
    let nu_c = arena.var_expr(n);
    let one = arena.int(1);
    let pred = arena.call_prim(PrimOp::Sub, vec![nu_c, one]);
    let fg = arena.global(f.clone());
    let rec = arena.call(fg, vec![pred]);
    let else_branch = arena.call_prim(PrimOp::Add, vec![m, rec]);
    let body = arena.if_(cond, zero_b, else_branch);
    let def = arena.function(vec![n], body);
    module.define(f.clone(), def);

    let fg = arena.global(f.clone());
    let five = arena.int(5);
    let root = arena.call(fg, vec![five]);

    assert_eq!(eval_int_in(&arena, &module, root), 30);

    let seq = to_sequential_form_in(&mut arena, &mut module, root).unwrap();
    assert_eq!(eval_int_in(&arena, &module, seq), 30);

    // The definition itself was rewritten into binding form.
    let new_def = module.def(&f).unwrap();
    assert_ne!(new_def, def);
    assert!(detect_features(&arena, new_def).contains(Feature::Let));
}

/// Mutually recursive definitions each convert exactly once.
#[test]
fn test_mutual_recursion() {
    let mut arena = ExprArena::new();
    let mut module = Module::new();
    let even = GlobalId::new("even");
    let odd = GlobalId::new("odd");

    // even(n) = if eq(n, 0) { true } else { odd(sub(n, 1)) }
    let n = arena.fresh_var("n");
    let nu = arena.var_expr(n);
    let zero = arena.int(0);
    let cond = arena.call_prim(PrimOp::Eq, vec![nu, zero]);
    let t = arena.bool(true);
    let nu = arena.var_expr(n);
    let one = arena.int(1);
    let pred = arena.call_prim(PrimOp::Sub, vec![nu, one]);
    let og = arena.global(odd.clone());
    let rec = arena.call(og, vec![pred]);
    let body = arena.if_(cond, t, rec);
    let even_def = arena.function(vec![n], body);
    module.define(even.clone(), even_def);

    // odd(n) = if eq(n, 0) { false } else { even(sub(n, 1)) }
    let n = arena.fresh_var("n");
    let nu = arena.var_expr(n);
    let zero = arena.int(0);
    let cond = arena.call_prim(PrimOp::Eq, vec![nu, zero]);
    let f = arena.bool(false);
    let nu = arena.var_expr(n);
    let one = arena.int(1);
    let pred = arena.call_prim(PrimOp::Sub, vec![nu, one]);
    let eg = arena.global(even.clone());
    let rec = arena.call(eg, vec![pred]);
    let body = arena.if_(cond, f, rec);
    let odd_def = arena.function(vec![n], body);
    module.define(odd.clone(), odd_def);

    let eg = arena.global(even.clone());
    let four = arena.int(4);
    let root = arena.call(eg, vec![four]);

    let mut interp = Interpreter::with_module(&arena, &module);
    assert_eq!(interp.eval(root).unwrap().as_bool(), Some(true));

    let seq = to_sequential_form_in(&mut arena, &mut module, root).unwrap();
    let mut interp = Interpreter::with_module(&arena, &module);
    assert_eq!(interp.eval(seq).unwrap().as_bool(), Some(true));

    let features = detect_features_in(&arena, &module, seq);
    assert!(features.contains(Feature::Let));
    assert!(features.contains(Feature::Global));
}

/// A value consumed only inside a conditional branch is bound inside that
/// branch, not hoisted above the conditional.
#[test]
fn test_branch_scope_containment() {
    let mut arena = ExprArena::new();
    let cond = arena.bool(false);
    let one = arena.int(1);
    let two = arena.int(2);
    let then_branch = arena.call_prim(PrimOp::Add, vec![one, two]);
    let zero = arena.int(0);
    let root = arena.if_(cond, then_branch, zero);

    let seq = to_sequential_form(&mut arena, root).unwrap();
    assert_eq!(eval_int(&arena, seq), 0);

    // Top level binds only the conditional; the add lives in the branch.
    let ExprKind::Let { value, .. } = arena.kind(seq) else {
        panic!("expected the conditional to be let-bound");
    };
    let ExprKind::If { then_branch, .. } = arena.kind(*value) else {
        panic!("expected a conditional as the bound value");
    };
    assert!(matches!(arena.kind(*then_branch), ExprKind::Let { .. }));
}

/// The converted form depends on the expression's structure, not on the
/// order its nodes were allocated or on how the input nested its bindings.
#[test]
fn test_order_independence() {
    let mut arena = ExprArena::new();

    // add(1, mul(2, 3)), operands allocated before operators.
    let one = arena.int(1);
    let two = arena.int(2);
    let three = arena.int(3);
    let product = arena.call_prim(PrimOp::Mul, vec![two, three]);
    let a = arena.call_prim(PrimOp::Add, vec![one, product]);

    // The same expression, allocation interleaved.
    let two = arena.int(2);
    let three = arena.int(3);
    let product = arena.call_prim(PrimOp::Mul, vec![two, three]);
    let one = arena.int(1);
    let b = arena.call_prim(PrimOp::Add, vec![one, product]);

    let seq_a = to_sequential_form(&mut arena, a).unwrap();
    let seq_b = to_sequential_form(&mut arena, b).unwrap();
    assert!(alpha_equal(&arena, seq_a, seq_b));

    // One computation, two binding nestings:
    //   let x = add(4, 2) in let y = x in add(y, y)
    //   let y = (let x = add(4, 2) in x) in add(y, y)
    let x = arena.fresh_var("x");
    let y = arena.fresh_var("y");
    let four = arena.int(4);
    let two = arena.int(2);
    let value = arena.call_prim(PrimOp::Add, vec![four, two]);
    let xu = arena.var_expr(x);
    let yu1 = arena.var_expr(y);
    let yu2 = arena.var_expr(y);
    let body = arena.call_prim(PrimOp::Add, vec![yu1, yu2]);
    let inner = arena.let_(y, xu, body);
    let flat = arena.let_(x, value, inner);

    let x = arena.fresh_var("x");
    let y = arena.fresh_var("y");
    let four = arena.int(4);
    let two = arena.int(2);
    let value = arena.call_prim(PrimOp::Add, vec![four, two]);
    let xu = arena.var_expr(x);
    let named = arena.let_(x, value, xu);
    let yu1 = arena.var_expr(y);
    let yu2 = arena.var_expr(y);
    let body = arena.call_prim(PrimOp::Add, vec![yu1, yu2]);
    let nested = arena.let_(y, named, body);

    let seq_flat = to_sequential_form(&mut arena, flat).unwrap();
    let seq_nested = to_sequential_form(&mut arena, nested).unwrap();
    assert!(alpha_equal(&arena, seq_flat, seq_nested));
    assert_eq!(eval_int(&arena, seq_flat), 12);
    assert_eq!(eval_int(&arena, seq_nested), 12);
}

/// Converting an already-converted expression is a fixpoint up to binder
/// names.
#[test]
fn test_idempotent() {
    let mut arena = ExprArena::new();
    let one = arena.int(1);
    let x = arena.call_prim(PrimOp::Add, vec![one, one]);
    let y = arena.call_prim(PrimOp::Mul, vec![x, x]);
    let root = arena.call_prim(PrimOp::Add, vec![y, x]);

    let once = to_sequential_form(&mut arena, root).unwrap();
    let twice = to_sequential_form(&mut arena, once).unwrap();
    assert!(alpha_equal(&arena, once, twice));
}

/// A free variable with no binder is reported, not silently kept.
#[test]
fn test_unbound_variable_rejected() {
    let mut arena = ExprArena::new();
    let x = arena.fresh_var("x");
    let xu = arena.var_expr(x);
    let one = arena.int(1);
    let root = arena.call_prim(PrimOp::Add, vec![xu, one]);

    let err = to_sequential_form(&mut arena, root).unwrap_err();
    assert!(matches!(err, PassError::UnboundVariable(_)));
}
