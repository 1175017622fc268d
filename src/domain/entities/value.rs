use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A single field value read from a row, and the rendered content of a cell.
///
/// Serializes to the matching JSON scalar, so `Null` becomes `null` and
/// `Text` a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total order used by in-memory collections: null first, then numbers,
    /// then NaN, then text. Integers and reals compare exactly.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.rank(), other.rank()) {
            (1, 1) => match (self.numeric(), other.numeric()) {
                (Some(Numeric::Int(a)), Some(Numeric::Int(b))) => a.cmp(&b),
                (Some(Numeric::Real(a)), Some(Numeric::Real(b))) => {
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                }
                (Some(Numeric::Int(a)), Some(Numeric::Real(b))) => cmp_int_real(a, b),
                (Some(Numeric::Real(a)), Some(Numeric::Int(b))) => cmp_int_real(b, a).reverse(),
                _ => Ordering::Equal,
            },
            (3, 3) => match (self, other) {
                (Value::Text(a), Value::Text(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
            (left, right) => left.cmp(&right),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Real(value) if value.is_nan() => 2,
            Value::Bool(_) | Value::Integer(_) | Value::Real(_) => 1,
            Value::Text(_) => 3,
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Bool(value) => Some(Numeric::Int(i64::from(*value))),
            Value::Integer(value) => Some(Numeric::Int(*value)),
            Value::Real(value) => Some(Numeric::Real(*value)),
            Value::Null | Value::Text(_) => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Real(f64),
}

/// Compares without rounding the integer through `f64`. `real` is never NaN.
fn cmp_int_real(int: i64, real: f64) -> Ordering {
    // 2^63, the first float above every i64.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if real >= I64_BOUND {
        return Ordering::Less;
    }
    if real < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = real.trunc();
    // `whole` lies in [-2^63, 2^63), so the cast is exact.
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&real).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
