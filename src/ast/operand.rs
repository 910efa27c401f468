use std::fmt;

use super::{FieldPath, Notation, Operator};
use crate::error::SyntaxError;
use crate::value::Value;

/// Handle to an expression owned by a query backend.
///
/// The engine never looks inside; it only hands the handle back to the
/// backend at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpaqueHandle(pub u64);

/// Any value-producing node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A typed constant; its declared type is the value's type
    Literal(Value),

    /// A field of the document or query root
    Reference(FieldPath),

    /// An operator applied to operands
    Operation(Operation),

    /// A backend-supplied expression
    Opaque(OpaqueHandle),
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Operand {
        Operand::Literal(value.into())
    }

    pub fn null() -> Operand {
        Operand::Literal(Value::Null)
    }

    /// A reference to `path`; an empty path (nothing but separators) yields `None`.
    pub fn reference(path: &str) -> Option<Operand> {
        FieldPath::parse(path).map(Operand::Reference)
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Operand::Literal(Value::Null))
    }
}

impl From<Operation> for Operand {
    fn from(op: Operation) -> Self {
        Operand::Operation(op)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<FieldPath> for Operand {
    fn from(path: FieldPath) -> Self {
        Operand::Reference(path)
    }
}

/// An operator together with exactly `operator.arity` operands.
///
/// Operations are immutable; equality and hashing are structural, so two
/// parses of equivalent text compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    operator: &'static Operator,
    operands: Vec<Operand>,
}

impl Operation {
    /// Builds an operation, rejecting an operand count that contradicts the operator.
    pub fn new(operator: &'static Operator, operands: Vec<Operand>) -> Result<Self, SyntaxError> {
        if operands.len() < operator.arity {
            return Err(SyntaxError::MissingOperand {
                operator: operator.name,
            });
        }
        if operands.len() > operator.arity {
            return Err(SyntaxError::NoOperation(format!(
                "'{}' takes {} operands, got {}",
                operator.name,
                operator.arity,
                operands.len()
            )));
        }
        Ok(Operation { operator, operands })
    }

    /// Builds a one-operand operation. The caller guarantees the arity.
    pub fn unary(operator: &'static Operator, operand: impl Into<Operand>) -> Self {
        debug_assert_eq!(operator.arity, 1);
        Operation {
            operator,
            operands: vec![operand.into()],
        }
    }

    /// Builds a two-operand operation. The caller guarantees the arity.
    pub fn binary(
        operator: &'static Operator,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> Self {
        debug_assert_eq!(operator.arity, 2);
        Operation {
            operator,
            operands: vec![left.into(), right.into()],
        }
    }

    /// Builds a three-operand operation. The caller guarantees the arity.
    pub fn ternary(
        operator: &'static Operator,
        first: impl Into<Operand>,
        second: impl Into<Operand>,
        third: impl Into<Operand>,
    ) -> Self {
        debug_assert_eq!(operator.arity, 3);
        Operation {
            operator,
            operands: vec![first.into(), second.into(), third.into()],
        }
    }

    pub fn operator(&self) -> &'static Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Reference(path) => write!(f, "{}", path),
            Operand::Operation(op) => write!(f, "{}", op),
            Operand::Opaque(handle) => write!(f, "#{}", handle.0),
        }
    }
}

/// Fully parenthesized rendering with canonical operator names.
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.operator.name;
        match (self.operator.notation, self.operands.as_slice()) {
            (Notation::Infix, [left, right]) => write!(f, "({} {} {})", left, name, right),
            (Notation::Prefix, [operand]) => write!(f, "{}{}", name, operand),
            (_, operands) => {
                write!(f, "{}(", name)?;
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", operand)?;
                }
                f.write_str(")")
            }
        }
    }
}
