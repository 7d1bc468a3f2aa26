//! Reference interpreter.
//!
//! A plain tree-walking evaluator over the node model, used by tests to
//! check that the canonicalization passes preserve evaluation results.
//! Performance is a non-goal; clarity of the evaluation order is the point,
//! because the effect-ordering properties of the passes are stated in terms
//! of what this evaluator observes.
//!
//! Mutable cells live in a store owned by the interpreter; a `Ref` value is
//! an index into that store. Closures capture their environment by value.
//! Globals are looked up by name at call time, which is what lets
//! recursive definitions run without any fixpoint machinery.

use crate::arena::{ExprArena, ExprId, VarId};
use crate::error::EvalError;
use crate::expr::ExprKind;
use crate::foundation::{Literal, PrimOp};
use crate::module::Module;
use std::collections::HashMap;
use std::rc::Rc;

/// Runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Unit,
    Tuple(Vec<Value>),
    /// Closure: parameters, body, captured environment
    Closure(Rc<Closure>),
    /// Primitive operator as a first-class value
    Prim(PrimOp),
    /// Global function as a first-class value
    Global(crate::module::GlobalId),
    /// Mutable cell handle into the interpreter's store
    Ref(usize),
}

/// A function value with its captured environment.
#[derive(Debug)]
pub struct Closure {
    pub params: Vec<VarId>,
    pub body: ExprId,
    pub env: Env,
}

type Env = HashMap<VarId, Value>;

impl Value {
    /// Variant name for error messages.
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Unit => "unit",
            Value::Tuple(_) => "tuple",
            Value::Closure(_) => "function",
            Value::Prim(_) => "primitive",
            Value::Global(_) => "global",
            Value::Ref(_) => "ref",
        }
    }

    /// Extract an integer, for test assertions.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a float, for test assertions.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a boolean, for test assertions.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Tree-walking evaluator over an arena, with an optional module for
/// global lookup.
pub struct Interpreter<'a> {
    arena: &'a ExprArena,
    module: Option<&'a Module>,
    cells: Vec<Value>,
}

impl<'a> Interpreter<'a> {
    /// Evaluator for a standalone expression.
    pub fn new(arena: &'a ExprArena) -> Self {
        Self {
            arena,
            module: None,
            cells: Vec::new(),
        }
    }

    /// Evaluator with global definitions available.
    pub fn with_module(arena: &'a ExprArena, module: &'a Module) -> Self {
        Self {
            arena,
            module: Some(module),
            cells: Vec::new(),
        }
    }

    /// Evaluate a closed expression.
    pub fn eval(&mut self, expr: ExprId) -> Result<Value, EvalError> {
        self.eval_in(expr, &Env::new())
    }

    fn eval_in(&mut self, expr: ExprId, env: &Env) -> Result<Value, EvalError> {
        match self.arena.kind(expr).clone() {
            ExprKind::Var(v) => env
                .get(&v)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable(self.arena.var_name(v).to_string())),

            ExprKind::Constant(lit) => Ok(match lit {
                Literal::Int(v) => Value::Int(v),
                Literal::Float(v) => Value::Float(v),
                Literal::Bool(v) => Value::Bool(v),
                Literal::Unit => Value::Unit,
            }),

            ExprKind::Prim(op) => Ok(Value::Prim(op)),

            ExprKind::Global(name) => Ok(Value::Global(name)),

            ExprKind::Let { var, value, body } => {
                let bound = self.eval_in(value, env)?;
                let mut inner = env.clone();
                inner.insert(var, bound);
                self.eval_in(body, &inner)
            }

            ExprKind::Function { params, body } => Ok(Value::Closure(Rc::new(Closure {
                params,
                body,
                env: env.clone(),
            }))),

            ExprKind::Call { callee, args } => {
                let callee = self.eval_in(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval_in(arg, env)?);
                }
                self.apply(callee, arg_values)
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => match self.eval_in(cond, env)? {
                Value::Bool(true) => self.eval_in(then_branch, env),
                Value::Bool(false) => self.eval_in(else_branch, env),
                other => Err(EvalError::TypeMismatch {
                    expected: "bool",
                    found: other.kind_name(),
                }),
            },

            ExprKind::Tuple(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for elem in elems {
                    values.push(self.eval_in(elem, env)?);
                }
                Ok(Value::Tuple(values))
            }

            ExprKind::Project { tuple, index } => match self.eval_in(tuple, env)? {
                Value::Tuple(values) => values
                    .get(index)
                    .cloned()
                    .ok_or(EvalError::IndexOutOfBounds {
                        index,
                        len: values.len(),
                    }),
                other => Err(EvalError::TypeMismatch {
                    expected: "tuple",
                    found: other.kind_name(),
                }),
            },

            ExprKind::RefCreate { init } => {
                let value = self.eval_in(init, env)?;
                self.cells.push(value);
                Ok(Value::Ref(self.cells.len() - 1))
            }

            ExprKind::RefRead { cell } => match self.eval_in(cell, env)? {
                Value::Ref(idx) => Ok(self.cells[idx].clone()),
                other => Err(EvalError::TypeMismatch {
                    expected: "ref",
                    found: other.kind_name(),
                }),
            },

            ExprKind::RefWrite { cell, value } => {
                let cell = self.eval_in(cell, env)?;
                let value = self.eval_in(value, env)?;
                match cell {
                    Value::Ref(idx) => {
                        self.cells[idx] = value;
                        Ok(Value::Unit)
                    }
                    other => Err(EvalError::TypeMismatch {
                        expected: "ref",
                        found: other.kind_name(),
                    }),
                }
            }
        }
    }

    fn apply(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match callee {
            Value::Closure(closure) => {
                if closure.params.len() != args.len() {
                    return Err(EvalError::ArityMismatch {
                        expected: closure.params.len(),
                        found: args.len(),
                    });
                }
                let mut env = closure.env.clone();
                for (param, arg) in closure.params.iter().zip(args) {
                    env.insert(*param, arg);
                }
                self.eval_in(closure.body, &env)
            }

            Value::Prim(op) => apply_prim(op, &args),

            Value::Global(name) => {
                let def = self
                    .module
                    .and_then(|m| m.def(&name))
                    .ok_or_else(|| EvalError::UnknownGlobal(name.clone()))?;
                // Definitions are closed function values; evaluating one in
                // an empty environment yields its closure.
                let func = self.eval_in(def, &Env::new())?;
                self.apply(func, args)
            }

            other => Err(EvalError::TypeMismatch {
                expected: "function",
                found: other.kind_name(),
            }),
        }
    }
}

fn apply_prim(op: PrimOp, args: &[Value]) -> Result<Value, EvalError> {
    let unary = |args: &[Value]| -> Result<Value, EvalError> {
        if args.len() != 1 {
            return Err(EvalError::ArityMismatch {
                expected: 1,
                found: args.len(),
            });
        }
        Ok(args[0].clone())
    };
    let binary = |args: &[Value]| -> Result<(Value, Value), EvalError> {
        if args.len() != 2 {
            return Err(EvalError::ArityMismatch {
                expected: 2,
                found: args.len(),
            });
        }
        Ok((args[0].clone(), args[1].clone()))
    };

    match op {
        PrimOp::Neg => match unary(args)? {
            Value::Int(v) => Ok(Value::Int(-v)),
            Value::Float(v) => Ok(Value::Float(-v)),
            other => Err(EvalError::TypeMismatch {
                expected: "number",
                found: other.kind_name(),
            }),
        },

        PrimOp::Add | PrimOp::Sub | PrimOp::Mul | PrimOp::Div => {
            let (lhs, rhs) = binary(args)?;
            match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(match op {
                    PrimOp::Add => a + b,
                    PrimOp::Sub => a - b,
                    PrimOp::Mul => a * b,
                    PrimOp::Div => a.checked_div(b).ok_or(EvalError::DivisionByZero)?,
                    _ => unreachable!(),
                })),
                (Value::Float(a), Value::Float(b)) => Ok(Value::Float(match op {
                    PrimOp::Add => a + b,
                    PrimOp::Sub => a - b,
                    PrimOp::Mul => a * b,
                    PrimOp::Div => a / b,
                    _ => unreachable!(),
                })),
                (lhs, rhs) => Err(EvalError::TypeMismatch {
                    expected: "two numbers of the same kind",
                    found: if matches!(lhs, Value::Int(_) | Value::Float(_)) {
                        rhs.kind_name()
                    } else {
                        lhs.kind_name()
                    },
                }),
            }
        }

        PrimOp::Eq | PrimOp::Ne => {
            let (lhs, rhs) = binary(args)?;
            let equal = match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => a == b,
                (Value::Float(a), Value::Float(b)) => a == b,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Unit, Value::Unit) => true,
                _ => {
                    return Err(EvalError::TypeMismatch {
                        expected: "two comparable values of the same kind",
                        found: rhs.kind_name(),
                    })
                }
            };
            Ok(Value::Bool(if op == PrimOp::Eq { equal } else { !equal }))
        }

        PrimOp::Lt | PrimOp::Le | PrimOp::Gt | PrimOp::Ge => {
            let (lhs, rhs) = binary(args)?;
            let ordering = match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
                (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
                _ => {
                    return Err(EvalError::TypeMismatch {
                        expected: "two numbers of the same kind",
                        found: rhs.kind_name(),
                    })
                }
            };
            let Some(ordering) = ordering else {
                // NaN comparisons are false for every ordering operator
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match op {
                PrimOp::Lt => ordering.is_lt(),
                PrimOp::Le => ordering.is_le(),
                PrimOp::Gt => ordering.is_gt(),
                PrimOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            }))
        }
    }
}
