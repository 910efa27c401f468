use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// A runtime value produced by literals, references and operators.
///
/// Numbers keep their declared width: `Integer` is 32 bit, `Long` is 64 bit
/// and `Double` is a binary float. Arithmetic picks its result type from the
/// operands' declared types, so the distinction matters.
///
/// Equality is exact and never coerces: `Integer(5) != Long(5)` and
/// `Integer(5) != Double(5.0)`. Doubles compare by bit pattern, which makes
/// equality reflexive (`NaN == NaN`) and lets values be hashed.
///
/// # Examples
///
/// ```
/// use clause_lang::Value;
///
/// assert_eq!(Value::Integer(42).to_string(), "42");
/// assert_eq!(Value::Long(42).to_string(), "42L");
/// assert_eq!(Value::Double(42.0).to_string(), "42.0");
/// assert_eq!(Value::String("x".into()).to_string(), "'x'");
/// assert_ne!(Value::Integer(5), Value::Long(5));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// 32-bit integer
    Integer(i32),

    /// 64-bit integer (`5L`)
    Long(i64),

    /// Floating-point number
    Double(f64),

    /// UTF-8 string
    String(String),

    /// GUID
    Guid(Uuid),

    /// Calendar date
    Date(NaiveDate),

    /// Date and time without zone
    DateTime(NaiveDateTime),

    /// Ordered collection
    List(Vec<Value>),

    /// Named fields; the object graph references descend through
    Object(BTreeMap<String, Value>),
}

/// Declared type of a value or backend expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Integer,
    Long,
    Double,
    String,
    Guid,
    Date,
    DateTime,
    List,
    Object,
}

impl ValueType {
    /// Returns true for `Integer`, `Long` and `Double`.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Long | ValueType::Double)
    }

    /// Returns true for collection types (`is-empty` applies instead of `is-null`).
    pub fn is_collection(self) -> bool {
        matches!(self, ValueType::List)
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Guid => "guid",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::List => "list",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Guid(_) => ValueType::Guid,
            Value::Date(_) => ValueType::Date,
            Value::DateTime(_) => ValueType::DateTime,
            Value::List(_) => ValueType::List,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form used by string operators: strings are unquoted, null is empty.
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Orders two values of comparable types.
    ///
    /// Numbers compare across widths; strings, booleans, GUIDs, dates and
    /// date-times compare within their own type. Everything else is
    /// incomparable and yields `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Long(a), Long(b)) => Some(a.cmp(b)),
            (Integer(a), Long(b)) => Some(i64::from(*a).cmp(b)),
            (Long(a), Integer(b)) => Some(a.cmp(&i64::from(*b))),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (Double(a), Integer(b)) => a.partial_cmp(&f64::from(*b)),
            (Integer(a), Double(b)) => f64::from(*a).partial_cmp(b),
            (Double(a), Long(b)) => a.partial_cmp(&(*b as f64)),
            (Long(a), Double(b)) => (*a as f64).partial_cmp(b),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Guid(a), Guid(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Guid(a), Guid(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Long(n) => n.hash(state),
            Value::Double(n) => n.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Guid(g) => g.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(d) => d.hash(state),
            Value::List(items) => items.hash(state),
            Value::Object(map) => map.hash(state),
        }
    }
}

/// Renders the value in literal syntax, so that a rendered literal
/// classifies back to an equal value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}L", n),
            // Debug keeps the fraction ("5.0"), Display would print "5"
            Value::Double(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Guid(g) => write!(f, "{}", g.hyphenated()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_compare_by_bits() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
    }

    #[test]
    fn test_numbers_order_across_widths() {
        assert_eq!(Value::Integer(2).compare(&Value::Long(3)), Some(Ordering::Less));
        assert_eq!(Value::Double(2.5).compare(&Value::Integer(2)), Some(Ordering::Greater));
        assert_eq!(Value::Integer(1).compare(&Value::String("1".into())), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Value::Null.as_text(), "");
        assert_eq!(Value::String("abc".into()).as_text(), "abc");
        assert_eq!(Value::Integer(7).as_text(), "7");
    }
}
