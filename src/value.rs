//! Native-container values materialized from a parsed tree.
//!
//! [`Value`] is what [`ObjectifyVisitor`](crate::ObjectifyVisitor) produces:
//! integers come back as `i64` when they fit (promoted to a big integer
//! beyond that), dicts become insertion-ordered maps and sets ordered unique
//! collections. Dict and set equality is order-insensitive, so a value
//! compares equal to its canonically re-serialized round-trip.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{from_slice, Value};
//!
//! let value = from_slice(b"{'name': 'Sally', 'scores': [1, 2]}").unwrap();
//! let dict = value.as_dict().unwrap();
//! assert_eq!(dict.get(&Value::from("name")), Some(&Value::from("Sally")));
//! ```

use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use std::hash::{Hash, Hasher};

/// A dynamically-typed native value.
///
/// # Examples
///
/// ```rust
/// use serpentine::Value;
///
/// let v = Value::from(42);
/// assert!(v.is_int());
/// assert_eq!(v.as_i64(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    /// Integers within the native machine range.
    Int(i64),
    /// Integers beyond the `i64` range, kept exact.
    BigInt(BigInt),
    Float(f64),
    Complex {
        real: f64,
        imag: f64,
    },
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(IndexMap<Value, Value>),
    Set(IndexSet<Value>),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn hash_f64<H: Hasher>(f: f64, state: &mut H) {
            let f = if f == 0.0 { 0.0 } else { f };
            f.to_bits().hash(state);
        }

        std::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::BigInt(i) => i.hash(state),
            Value::Float(f) => hash_f64(*f, state),
            Value::Complex { real, imag } => {
                hash_f64(*real, state);
                hash_f64(*imag, state);
            }
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::List(items) | Value::Tuple(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            // Unordered containers compare order-insensitively, so only the
            // length participates in the hash.
            Value::Dict(entries) => entries.len().hash(state),
            Value::Set(items) => items.len().hash(state),
        }
    }
}

impl Value {
    /// Returns `true` if the value is `None`.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is an integer of either width.
    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_))
    }

    /// Returns `true` if the value is a float.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Returns `true` if the value is a byte sequence.
    #[inline]
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Returns `true` if the value is a list or tuple.
    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Value::List(_) | Value::Tuple(_))
    }

    /// Returns `true` if the value is a dict.
    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// Returns `true` if the value is a set.
    #[inline]
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Value::Set(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer that fits `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::Value;
    ///
    /// assert_eq!(Value::Int(42).as_i64(), Some(42));
    /// assert_eq!(Value::Float(42.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::BigInt(i) => i64::try_from(i).ok(),
            _ => None,
        }
    }

    /// If the value is numeric, returns it as `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a byte sequence, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is a list or tuple, returns its elements.
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// If the value is a dict, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// If the value is a set, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
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
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<Value, Value>> for Value {
    fn from(value: IndexMap<Value, Value>) -> Self {
        Value::Dict(value)
    }
}

impl From<IndexSet<Value>> for Value {
    fn from(value: IndexSet<Value>) -> Self {
        Value::Set(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert!(Value::None.is_none());
        assert!(Value::from("hi").as_i64().is_none());
    }

    #[test]
    fn test_bigint_narrows_when_it_fits() {
        let small = Value::from(BigInt::from(7));
        assert_eq!(small, Value::Int(7));

        let big = Value::from(BigInt::from(u64::MAX));
        assert!(matches!(big, Value::BigInt(_)));
        assert!(big.is_int());
    }

    #[test]
    fn test_dict_equality_ignores_order() {
        let mut a = IndexMap::new();
        a.insert(Value::from(1), Value::from("one"));
        a.insert(Value::from(2), Value::from("two"));

        let mut b = IndexMap::new();
        b.insert(Value::from(2), Value::from("two"));
        b.insert(Value::from(1), Value::from("one"));

        assert_eq!(Value::Dict(a), Value::Dict(b));
    }

    #[test]
    fn test_value_usable_as_dict_key() {
        let mut dict = IndexMap::new();
        dict.insert(Value::from("name"), Value::from("Sally"));
        dict.insert(Value::Int(42), Value::from("fortytwo"));
        assert_eq!(dict.get(&Value::from("name")), Some(&Value::from("Sally")));
        assert_eq!(dict.get(&Value::Int(42)), Some(&Value::from("fortytwo")));
    }
}
