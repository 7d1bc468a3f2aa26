//! Foundation value types: literals, primitive operators, type annotations.
//!
//! These are the small copy-able values that expression nodes carry. Type
//! annotations are pass-through: the passes copy them verbatim onto rebuilt
//! nodes but never validate or recompute them — that is the type checker's
//! job, which sits outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic literal value. No substructure; never bound by the
/// sequential-form converter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Signed integer scalar
    Int(i64),
    /// Floating-point scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// Unit value (result of effectful operations like a cell write)
    Unit,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}f", v),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Unit => write!(f, "()"),
        }
    }
}

/// Primitive operator.
///
/// Primitives are first-class atomic callee values: `add(a, b)` is a
/// `Call` whose callee is `Prim(Add)`. They carry no substructure and are
/// never bound, mirroring how user-visible operators desugar to a fixed
/// operator registry in the surrounding toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl PrimOp {
    /// Printable operator name.
    pub fn name(&self) -> &'static str {
        match self {
            PrimOp::Add => "add",
            PrimOp::Sub => "sub",
            PrimOp::Mul => "mul",
            PrimOp::Div => "div",
            PrimOp::Neg => "neg",
            PrimOp::Eq => "eq",
            PrimOp::Ne => "ne",
            PrimOp::Lt => "lt",
            PrimOp::Le => "le",
            PrimOp::Gt => "gt",
            PrimOp::Ge => "ge",
        }
    }
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type annotation attached to an expression node.
///
/// Annotations are optional and opaque to the passes: a node built by the
/// front end may carry one, and any node a pass rebuilds keeps the
/// original's annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Bool,
    Unit,
    /// Product type
    Tuple(Vec<Type>),
    /// Function type
    Fn {
        params: Vec<Type>,
        result: Box<Type>,
    },
    /// Mutable cell holding a value of the inner type
    Ref(Box<Type>),
    /// Not yet inferred
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Bool => write!(f, "Bool"),
            Type::Unit => write!(f, "Unit"),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
            Type::Fn { params, result } => {
                write!(f, "fn(")?;
                for (i, t) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ") -> {}", result)
            }
            Type::Ref(inner) => write!(f, "Ref<{}>", inner),
            Type::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Int(3).to_string(), "3");
        assert_eq!(Literal::Float(2.5).to_string(), "2.5f");
        assert_eq!(Literal::Bool(true).to_string(), "true");
        assert_eq!(Literal::Unit.to_string(), "()");
    }

    #[test]
    fn test_type_display() {
        let ty = Type::Fn {
            params: vec![Type::Int, Type::Tuple(vec![Type::Bool, Type::Unknown])],
            result: Box::new(Type::Ref(Box::new(Type::Float))),
        };
        assert_eq!(ty.to_string(), "fn(Int, (Bool, ?)) -> Ref<Float>");
    }
}
