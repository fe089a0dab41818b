use std::cmp::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use plait_schema::PType;

use crate::Record;

/// A single value within a record.
///
/// Equality is structural: `I32(1)` and `I64(1)` are different values. Use [`Value::compare`]
/// for the numeric-widening comparison that predicates apply.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// An absent value.
    #[default]
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Utf8(Arc<str>),
    Binary(Bytes),
    /// The occurrences of a repeated field, in order.
    List(Vec<Value>),
    /// A nested group.
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The primitive type this value can be stored as, or `None` for nulls, lists and records.
    pub fn ptype(&self) -> Option<PType> {
        match self {
            Value::Bool(_) => Some(PType::Bool),
            Value::I32(_) => Some(PType::I32),
            Value::I64(_) => Some(PType::I64),
            Value::F32(_) => Some(PType::F32),
            Value::F64(_) => Some(PType::F64),
            Value::Utf8(_) => Some(PType::Utf8),
            Value::Binary(_) => Some(PType::Binary),
            Value::Null | Value::List(_) | Value::Record(_) => None,
        }
    }

    /// A short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::Utf8(_) => "utf8",
            Value::Binary(_) => "binary",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer values widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric values widened to `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I32(v) => Some(f64::from(*v)),
            Value::I64(v) => Some(*v as f64),
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Utf8(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Compare two primitive values.
    ///
    /// Integers compare with integers and any number compares with floats after widening.
    /// Strings and bytes compare lexicographically. Nulls, lists, records and mismatched kinds
    /// are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
            (Value::Binary(a), Value::Binary(b)) => Some(a.cmp(b)),
            (lhs, rhs) => match (lhs.as_i64(), rhs.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Utf8(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Utf8(value.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::Utf8(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Binary(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Value::I32(3), Value::I64(3), Some(Ordering::Equal))]
    #[case(Value::I32(3), Value::I64(4), Some(Ordering::Less))]
    #[case(Value::F32(85.0), Value::I32(85), Some(Ordering::Equal))]
    #[case(Value::F64(1.5), Value::F32(1.0), Some(Ordering::Greater))]
    #[case(Value::from("ELECTRIC"), Value::from("PETROL"), Some(Ordering::Less))]
    #[case(Value::from("1"), Value::I32(1), None)]
    #[case(Value::Null, Value::Null, None)]
    #[case(Value::Bool(false), Value::Bool(true), Some(Ordering::Less))]
    fn compare(#[case] lhs: Value, #[case] rhs: Value, #[case] expected: Option<Ordering>) {
        assert_eq!(lhs.compare(&rhs), expected);
    }

    #[test]
    fn structural_equality() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_eq!(Value::from(vec![1i64, 2]), Value::List(vec![Value::I64(1), Value::I64(2)]));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
    }

    #[test]
    fn ptypes() {
        assert_eq!(Value::from(2014).ptype(), Some(PType::I32));
        assert_eq!(Value::from(1374084640i64).ptype(), Some(PType::I64));
        assert_eq!(Value::Null.ptype(), None);
        assert_eq!(Value::List(vec![]).ptype(), None);
    }
}
