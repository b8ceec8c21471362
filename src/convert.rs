//! Conversions from native Rust values into [`Node`] trees.
//!
//! This is the type-dispatch table of the serialize path: each supported
//! category has a `From` impl, so `to_bytes(value)` accepts anything
//! `Into<Node>`. Fixed-size collections (arrays, Rust tuples) become tuple
//! syntax, resizable sequences become lists, set types become sets and map
//! types dicts. Scalar types with no literal of their own — decimals,
//! UUIDs, timestamps, durations — are encoded as their canonical text, so
//! they survive any peer as plain strings.
//!
//! Arbitrary structured values go through the two host-supplied capability
//! traits instead of reflection: [`ExtractState`] for values that opt in to
//! custom state, [`PublicFields`] for plain field listings tagged with
//! `'__class__'`.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{to_bytes, strip_header};
//! use std::collections::BTreeMap;
//!
//! let mut scores = BTreeMap::new();
//! scores.insert("sally", 16);
//! let bytes = to_bytes(scores).unwrap();
//! assert_eq!(strip_header(&bytes), b"{'sally':16}");
//! ```

use crate::ser::float_text;
use crate::Node;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use uuid::Uuid;

/// Host-supplied custom state extraction for structured values.
///
/// A value implementing this serializes as a dict over exactly the returned
/// pairs, with no class marker — the wire form is indistinguishable from a
/// plain mapping.
pub trait ExtractState {
    fn extract_state(&self) -> Vec<(String, Node)>;
}

/// Host-supplied field listing for structured values without custom state.
///
/// Serializes as a dict over the returned fields plus a leading
/// `'__class__'` entry carrying [`type_name`](PublicFields::type_name).
pub trait PublicFields {
    fn type_name(&self) -> &str;
    fn public_fields(&self) -> Vec<(String, Node)>;
}

impl From<()> for Node {
    fn from((): ()) -> Self {
        Node::None
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

macro_rules! int_from {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Int(BigInt::from(value))
                }
            }
        )+
    };
}

int_from!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl From<BigInt> for Node {
    fn from(value: BigInt) -> Self {
        Node::Int(value)
    }
}

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        Node::Float(value as f64)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<char> for Node {
    fn from(value: char) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Str(value)
    }
}

/// Exact decimal text in quotes: the format has no arbitrary-precision
/// decimal literal, so exactness is preserved through string encoding.
impl From<Decimal> for Node {
    fn from(value: Decimal) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<Uuid> for Node {
    fn from(value: Uuid) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(value: DateTime<Utc>) -> Self {
        Node::Str(value.to_rfc3339())
    }
}

impl From<NaiveDateTime> for Node {
    fn from(value: NaiveDateTime) -> Self {
        Node::Str(value.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDate> for Node {
    fn from(value: NaiveDate) -> Self {
        Node::Str(value.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveTime> for Node {
    fn from(value: NaiveTime) -> Self {
        Node::Str(value.format("%H:%M:%S%.f").to_string())
    }
}

/// Durations carry no unit on the wire; the convention is total seconds as
/// decimal text.
impl From<chrono::Duration> for Node {
    fn from(value: chrono::Duration) -> Self {
        let seconds = value.num_seconds() as f64 + value.subsec_nanos() as f64 / 1e9;
        Node::Str(float_text(seconds))
    }
}

impl From<std::time::Duration> for Node {
    fn from(value: std::time::Duration) -> Self {
        Node::Str(float_text(value.as_secs_f64()))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Node::None,
        }
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(value: Vec<T>) -> Self {
        Node::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Node>> From<&[T]> for Node {
    fn from(value: &[T]) -> Self {
        Node::List(value.iter().cloned().map(Into::into).collect())
    }
}

/// Fixed-size collections take tuple syntax.
impl<T: Into<Node>, const N: usize> From<[T; N]> for Node {
    fn from(value: [T; N]) -> Self {
        Node::Tuple(value.into_iter().map(Into::into).collect())
    }
}

macro_rules! tuple_from {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($name: Into<Node>),+> From<($($name,)+)> for Node {
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Node::Tuple(vec![$($name.into()),+])
            }
        }
    };
}

tuple_from!(A);
tuple_from!(A, B);
tuple_from!(A, B, C);
tuple_from!(A, B, C, D);
tuple_from!(A, B, C, D, E);
tuple_from!(A, B, C, D, E, F);

impl<T: Into<Node>> From<HashSet<T>> for Node {
    fn from(value: HashSet<T>) -> Self {
        Node::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> From<BTreeSet<T>> for Node {
    fn from(value: BTreeSet<T>) -> Self {
        Node::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> From<IndexSet<T>> for Node {
    fn from(value: IndexSet<T>) -> Self {
        Node::Set(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Node>, V: Into<Node>> From<HashMap<K, V>> for Node {
    fn from(value: HashMap<K, V>) -> Self {
        Node::Dict(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<Node>, V: Into<Node>> From<BTreeMap<K, V>> for Node {
    fn from(value: BTreeMap<K, V>) -> Self {
        Node::Dict(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<Node>, V: Into<Node>> From<IndexMap<K, V>> for Node {
    fn from(value: IndexMap<K, V>) -> Self {
        Node::Dict(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{strip_header, to_bytes};
    use std::str::FromStr;

    fn text(node: impl Into<Node>) -> String {
        String::from_utf8(strip_header(&to_bytes(node).unwrap()).to_vec()).unwrap()
    }

    #[test]
    fn test_scalar_table() {
        assert_eq!(text(()), "None");
        assert_eq!(text(true), "True");
        assert_eq!(text(12345u32), "12345");
        assert_eq!(text(12345678912345678912u64), "12345678912345678912");
        assert_eq!(text(99.1234), "99.1234");
        assert_eq!(text('x'), "'x'");
        assert_eq!(text(Option::<i32>::None), "None");
    }

    #[test]
    fn test_decimal_exact_text() {
        let d = Decimal::from_str("1234.9999999999").unwrap();
        assert_eq!(text(d), "'1234.9999999999'");
    }

    #[test]
    fn test_uuid_text() {
        let u = Uuid::from_str("f1f8d00e-49a5-4662-ac1d-d5f0426ed293").unwrap();
        assert_eq!(text(u), "'f1f8d00e-49a5-4662-ac1d-d5f0426ed293'");
    }

    #[test]
    fn test_naive_datetime_text() {
        let dt = NaiveDate::from_ymd_opt(2013, 1, 20)
            .unwrap()
            .and_hms_micro_opt(23, 59, 45, 999888)
            .unwrap();
        assert_eq!(text(dt), "'2013-01-20T23:59:45.999888'");

        let t = NaiveTime::from_hms_opt(23, 59, 45).unwrap();
        assert_eq!(text(t), "'23:59:45'");
    }

    #[test]
    fn test_duration_total_seconds() {
        assert_eq!(text(chrono::Duration::seconds(12345)), "'12345.0'");
        assert_eq!(
            text(std::time::Duration::from_micros(91_720_999_888)),
            "'91720.999888'"
        );
    }

    #[test]
    fn test_collection_syntax() {
        assert_eq!(text(vec![1, 2, 3]), "[1,2,3]");
        assert_eq!(text([1, 2, 3]), "(1,2,3)");
        assert_eq!(text((1, "two", 3.0)), "(1,'two',3.0)");

        let set: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(text(set), "{1,2,3}");

        let mut map = HashMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        assert_eq!(text(map), "{1:'one',2:'two'}");
    }

    #[test]
    fn test_state_extraction_has_no_class_key() {
        struct Custom;
        impl ExtractState for Custom {
            fn extract_state(&self) -> Vec<(String, Node)> {
                vec![("attr".to_string(), Node::from(42))]
            }
        }
        assert_eq!(text(Node::from_state(&Custom)), "{'attr':42}");
    }

    #[test]
    fn test_public_fields_get_class_key() {
        struct Sample {
            age: u32,
            name: String,
        }
        impl PublicFields for Sample {
            fn type_name(&self) -> &str {
                "Sample"
            }
            fn public_fields(&self) -> Vec<(String, Node)> {
                vec![
                    ("age".to_string(), Node::from(self.age)),
                    ("name".to_string(), Node::from(self.name.clone())),
                ]
            }
        }
        let sample = Sample {
            age: 26,
            name: "Sally".to_string(),
        };
        assert_eq!(
            text(Node::from_fields(&sample)),
            "{'__class__':'Sample','age':26,'name':'Sally'}"
        );
    }
}
