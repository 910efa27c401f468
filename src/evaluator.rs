use std::{cmp::Ordering, collections::HashSet};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{FieldPath, Operand, Operation, Operator, OperatorKind},
    error::EvalError,
    value::{Value, ValueType},
};

/// Reduces an operation tree to a [`Value`].
///
/// Evaluation is pure. Field references resolve against an optional
/// document; without one, evaluating a reference fails with
/// [`EvalError::UnboundReference`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator<'d> {
    document: Option<&'d Value>,
}

impl<'d> Evaluator<'d> {
    /// An evaluator for literal-only trees.
    pub fn new() -> Self {
        Evaluator { document: None }
    }

    /// An evaluator that resolves references against `document`.
    pub fn with_document(document: &'d Value) -> Self {
        Evaluator {
            document: Some(document),
        }
    }

    pub fn evaluate(&self, operand: &Operand) -> Result<Value, EvalError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Reference(path) => self.resolve(path),
            Operand::Operation(op) => self.apply(op),
            Operand::Opaque(handle) => Err(EvalError::Opaque(handle.0)),
        }
    }

    /// Walks `path` field by field. A null (or missing) field ends the walk with null.
    pub fn resolve(&self, path: &FieldPath) -> Result<Value, EvalError> {
        let mut current = self
            .document
            .ok_or_else(|| EvalError::UnboundReference(path.to_string()))?;

        for segment in path.segments() {
            current = match current {
                Value::Null => return Ok(Value::Null),
                Value::Object(fields) => match fields.get(segment) {
                    Some(value) => value,
                    None => return Ok(Value::Null),
                },
                other => {
                    return Err(EvalError::NotAnObject {
                        path: path.to_string(),
                        segment: segment.clone(),
                        found: other.type_name(),
                    });
                }
            };
        }

        Ok(current.clone())
    }

    pub fn apply(&self, operation: &Operation) -> Result<Value, EvalError> {
        let op = operation.operator();
        let operands = operation.operands();
        if operands.len() != op.arity {
            return Err(EvalError::Malformed {
                operator: op.name,
                expected: op.arity,
                found: operands.len(),
            });
        }

        match op.kind {
            OperatorKind::And => {
                // right side only when the left does not decide
                if !truth(op, self.evaluate(&operands[0])?)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(truth(op, self.evaluate(&operands[1])?)?))
            }
            OperatorKind::Or => {
                if truth(op, self.evaluate(&operands[0])?)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(truth(op, self.evaluate(&operands[1])?)?))
            }
            OperatorKind::Not => Ok(Value::Boolean(!truth(op, self.evaluate(&operands[0])?)?)),
            OperatorKind::Equals => {
                let (left, right) = self.pair(operands)?;
                Ok(Value::Boolean(left == right))
            }
            OperatorKind::NotEquals => {
                let (left, right) = self.pair(operands)?;
                Ok(Value::Boolean(left != right))
            }
            OperatorKind::GreaterThan
            | OperatorKind::GreaterThanOrEquals
            | OperatorKind::LessThan
            | OperatorKind::LessThanOrEquals => {
                let (left, right) = self.pair(operands)?;
                compare(op, &left, &right)
            }
            OperatorKind::In => {
                let (left, right) = self.pair(operands)?;
                Ok(Value::Boolean(match right {
                    Value::List(items) => items.contains(&left),
                    other => left == other,
                }))
            }
            OperatorKind::Add
            | OperatorKind::Sub
            | OperatorKind::Mul
            | OperatorKind::Div
            | OperatorKind::Mod => {
                let (left, right) = self.pair(operands)?;
                arithmetic(op, &left, &right)
            }
            OperatorKind::Concat => {
                let (left, right) = self.pair(operands)?;
                Ok(Value::String(left.as_text() + &right.as_text()))
            }
            OperatorKind::Substring => {
                let (subject, pattern) = self.pair(operands)?;
                Ok(Value::Boolean(subject.as_text().contains(&pattern.as_text())))
            }
            OperatorKind::StartsWith => {
                let (subject, pattern) = self.pair(operands)?;
                Ok(Value::Boolean(subject.as_text().starts_with(&pattern.as_text())))
            }
            OperatorKind::EndsWith => {
                let (subject, pattern) = self.pair(operands)?;
                Ok(Value::Boolean(subject.as_text().ends_with(&pattern.as_text())))
            }
            OperatorKind::If => {
                if condition(op, &self.evaluate(&operands[0])?)? {
                    self.evaluate(&operands[1])
                } else {
                    self.evaluate(&operands[2])
                }
            }
            OperatorKind::Count => Ok(Value::Long(match self.evaluate(&operands[0])? {
                Value::Null => 0,
                Value::List(items) => items.len() as i64,
                _ => 1,
            })),
            OperatorKind::CountDistinct => Ok(Value::Long(match self.evaluate(&operands[0])? {
                Value::Null => 0,
                Value::List(items) => items.iter().collect::<HashSet<_>>().len() as i64,
                _ => 1,
            })),
            // the alias names the value, it does not change it
            OperatorKind::As => self.evaluate(&operands[0]),
        }
    }

    fn pair(&self, operands: &[Operand]) -> Result<(Value, Value), EvalError> {
        Ok((self.evaluate(&operands[0])?, self.evaluate(&operands[1])?))
    }
}

impl Operation {
    /// Evaluates without a document; references fail.
    ///
    /// ```
    /// use clause_lang::{dialect, Value};
    ///
    /// let tree = dialect::java().unwrap().parse("8 - 4 - 2").unwrap();
    /// assert_eq!(tree.evaluate().unwrap(), Value::Integer(2));
    /// ```
    pub fn evaluate(&self) -> Result<Value, EvalError> {
        Evaluator::new().apply(self)
    }

    /// Evaluates with references resolved against `document`.
    pub fn evaluate_with(&self, document: &Value) -> Result<Value, EvalError> {
        Evaluator::with_document(document).apply(self)
    }
}

/// Boolean operands for logical operators; null counts as false.
fn truth(op: &'static Operator, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Boolean(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(EvalError::TypeMismatch {
            operator: op.name,
            message: format!("expected boolean, got {}", other.type_name()),
        }),
    }
}

/// Condition of `if`: booleans as-is, null false, numbers false when zero.
fn condition(op: &'static Operator, value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Integer(n) => Ok(*n != 0),
        Value::Long(n) => Ok(*n != 0),
        Value::Double(n) => Ok(*n != 0.0),
        other => Err(EvalError::TypeMismatch {
            operator: op.name,
            message: format!("cannot use {} as a condition", other.type_name()),
        }),
    }
}

/// Ordering comparisons. A null on either side compares as equal.
fn compare(op: &'static Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = if left.is_null() || right.is_null() {
        Ordering::Equal
    } else {
        left.compare(right).ok_or_else(|| EvalError::TypeMismatch {
            operator: op.name,
            message: format!("cannot compare {} with {}", left.type_name(), right.type_name()),
        })?
    };

    Ok(Value::Boolean(match op.kind {
        OperatorKind::GreaterThan => ordering == Ordering::Greater,
        OperatorKind::GreaterThanOrEquals => ordering != Ordering::Less,
        OperatorKind::LessThan => ordering == Ordering::Less,
        _ => ordering != Ordering::Greater,
    }))
}

/// Result type of an arithmetic operation: double when either side is a
/// double, else the first non-null operand's type, else integer.
fn result_type(op: &'static Operator, left: &Value, right: &Value) -> Result<ValueType, EvalError> {
    for value in [left, right] {
        if !value.is_null() && !value.value_type().is_numeric() {
            return Err(EvalError::TypeMismatch {
                operator: op.name,
                message: format!("expected number, got {}", value.type_name()),
            });
        }
    }

    let types = [left.value_type(), right.value_type()];
    if types.contains(&ValueType::Double) {
        return Ok(ValueType::Double);
    }
    Ok(types
        .into_iter()
        .find(|t| *t != ValueType::Null)
        .unwrap_or(ValueType::Integer))
}

fn arithmetic(op: &'static Operator, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match result_type(op, left, right)? {
        ValueType::Double => Ok(Value::Double(double_op(op, as_f64(left), as_f64(right)))),
        target => integral_op(op, target, as_i64(left), as_i64(right)),
    }
}

fn decimal_op(op: &Operator, a: Decimal, b: Decimal) -> Option<Decimal> {
    match op.kind {
        OperatorKind::Add => a.checked_add(b),
        OperatorKind::Sub => a.checked_sub(b),
        OperatorKind::Mul => a.checked_mul(b),
        OperatorKind::Div => a.checked_div(b),
        OperatorKind::Mod => a.checked_rem(b),
        _ => None,
    }
}

/// Doubles go through `Decimal` when both sides convert, so `0.1 + 0.2`
/// yields `0.3`; anything `Decimal` cannot express (division by zero,
/// magnitudes beyond its range) falls back to IEEE arithmetic.
fn double_op(op: &Operator, a: f64, b: f64) -> f64 {
    if let Some(da) = Decimal::from_f64(a)
        && let Some(db) = Decimal::from_f64(b)
        && let Some(result) = decimal_op(op, da, db)
        && let Some(result) = result.to_f64()
    {
        return result;
    }
    match op.kind {
        OperatorKind::Add => a + b,
        OperatorKind::Sub => a - b,
        OperatorKind::Mul => a * b,
        OperatorKind::Div => a / b,
        _ => a % b,
    }
}

/// Exact integral arithmetic; the quotient is truncated toward zero and
/// the result must fit the target type.
fn integral_op(op: &'static Operator, target: ValueType, a: i64, b: i64) -> Result<Value, EvalError> {
    if b == 0 && matches!(op.kind, OperatorKind::Div | OperatorKind::Mod) {
        return Err(EvalError::DivisionByZero { operator: op.name });
    }
    let overflow = || EvalError::Overflow { operator: op.name };
    let result = decimal_op(op, Decimal::from(a), Decimal::from(b))
        .ok_or_else(overflow)?
        .trunc();

    match target {
        ValueType::Long => result.to_i64().map(Value::Long).ok_or_else(overflow),
        _ => result.to_i32().map(Value::Integer).ok_or_else(overflow),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => f64::from(*n),
        Value::Long(n) => *n as f64,
        Value::Double(n) => *n,
        _ => 0.0,
    }
}

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Integer(n) => i64::from(*n),
        Value::Long(n) => *n,
        _ => 0,
    }
}
