//! The abstract syntax tree produced by the parser.
//!
//! A parsed document is an [`Ast`] owning a single [`Node`] tree. Nodes are
//! immutable once built: the parser creates them bottom-up and consumers
//! traverse them through the [`Visitor`](crate::Visitor) contract or pattern
//! matching. The tree is purely owned, so reference cycles cannot be
//! represented at all.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{parse, Node};
//!
//! let ast = parse(b"[1, 2.5, 'three']").unwrap();
//! match ast.root() {
//!     Node::List(items) => assert_eq!(items.len(), 3),
//!     _ => panic!("expected a list"),
//! }
//! ```

use crate::visit::Visitor;
use num_bigint::BigInt;
use serde::de::{MapAccess, SeqAccess};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A tagged value node in the parsed tree.
///
/// Containers keep their children in source order. `Dict` keys and `Set`
/// elements are pairwise distinct under structural equality; the parser
/// rejects duplicates instead of letting a later entry win.
///
/// `Bytes` never appears in source syntax directly. It arises when a parsed
/// dict has exactly the shape `{'encoding':'base64','data':...}`, which is
/// canonicalized into the decoded byte payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    None,
    Bool(bool),
    /// Arbitrary-precision integer; never clamped to a machine width.
    Int(BigInt),
    Float(f64),
    Complex {
        real: f64,
        imag: f64,
    },
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Node>),
    Tuple(Vec<Node>),
    /// Key/value pairs in source order, keys unique.
    Dict(Vec<(Node, Node)>),
    /// Elements in source order, unique.
    Set(Vec<Node>),
}

// Equality is structural. Floats use `==` (so `0.0 == -0.0`), and NaN never
// occurs in a parsed tree because the grammar has no NaN literal.
impl Eq for Node {}

fn hash_f64<H: Hasher>(f: f64, state: &mut H) {
    // Keep Hash consistent with Eq for the one bit pattern `==` conflates.
    let f = if f == 0.0 { 0.0 } else { f };
    f.to_bits().hash(state);
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Node::None => {}
            Node::Bool(b) => b.hash(state),
            Node::Int(i) => i.hash(state),
            Node::Float(f) => hash_f64(*f, state),
            Node::Complex { real, imag } => {
                hash_f64(*real, state);
                hash_f64(*imag, state);
            }
            Node::Str(s) => s.hash(state),
            Node::Bytes(b) => b.hash(state),
            Node::List(items) | Node::Tuple(items) | Node::Set(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Node::Dict(entries) => {
                entries.len().hash(state);
                for (key, value) in entries {
                    key.hash(state);
                    value.hash(state);
                }
            }
        }
    }
}

impl Node {
    /// Creates a complex-number node from its real and imaginary parts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::Node;
    ///
    /// let c = Node::complex(0.0, 3.0);
    /// assert_eq!(c.to_string(), "(0+3j)");
    /// ```
    #[must_use]
    pub fn complex(real: f64, imag: f64) -> Self {
        Node::Complex { real, imag }
    }

    /// Creates a raw-bytes node. On the wire this becomes the two-entry
    /// dict `{'encoding':'base64','data':...}`.
    #[must_use]
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Node::Bytes(data.into())
    }

    /// Builds a dict node from host-supplied custom state, without a class
    /// marker. This is the opt-in extraction path for structured values.
    #[must_use]
    pub fn from_state<T: crate::ExtractState + ?Sized>(value: &T) -> Self {
        Node::Dict(
            value
                .extract_state()
                .into_iter()
                .map(|(name, node)| (Node::Str(name), node))
                .collect(),
        )
    }

    /// Builds a dict node from a value's public fields, with a leading
    /// `'__class__'` entry naming its type.
    #[must_use]
    pub fn from_fields<T: crate::PublicFields + ?Sized>(value: &T) -> Self {
        let mut entries = vec![(
            Node::Str("__class__".to_string()),
            Node::Str(value.type_name().to_string()),
        )];
        entries.extend(
            value
                .public_fields()
                .into_iter()
                .map(|(name, node)| (Node::Str(name), node)),
        );
        Node::Dict(entries)
    }

    /// Dispatches to the visitor method for this node's kind.
    ///
    /// Containers visit each child in stored order (dict entries as key
    /// then value) and then report completion with the element count, so a
    /// visitor can assemble nested results bottom-up.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) {
        match self {
            Node::None => visitor.visit_none(),
            Node::Bool(b) => visitor.visit_bool(*b),
            Node::Int(i) => visitor.visit_int(i),
            Node::Float(f) => visitor.visit_float(*f),
            Node::Complex { real, imag } => visitor.visit_complex(*real, *imag),
            Node::Str(s) => visitor.visit_str(s),
            Node::Bytes(b) => visitor.visit_bytes(b),
            Node::List(items) => {
                visitor.begin_list(items.len());
                for item in items {
                    item.accept(visitor);
                }
                visitor.end_list(items.len());
            }
            Node::Tuple(items) => {
                visitor.begin_tuple(items.len());
                for item in items {
                    item.accept(visitor);
                }
                visitor.end_tuple(items.len());
            }
            Node::Dict(entries) => {
                visitor.begin_dict(entries.len());
                for (key, value) in entries {
                    key.accept(visitor);
                    value.accept(visitor);
                }
                visitor.end_dict(entries.len());
            }
            Node::Set(items) => {
                visitor.begin_set(items.len());
                for item in items {
                    item.accept(visitor);
                }
                visitor.end_set(items.len());
            }
        }
    }
}

impl fmt::Display for Node {
    /// Renders the compact literal form in stored order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::ser::write_literal(&mut out, self);
        f.write_str(&out)
    }
}

/// A parsed document: single root node, exclusively owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    root: Node,
}

impl Ast {
    #[must_use]
    pub fn new(root: Node) -> Self {
        Ast { root }
    }

    /// The root node of the tree.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consumes the tree, returning its root.
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Runs a visitor over the whole tree.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) {
        self.root.accept(visitor);
    }

    /// Materializes the tree into native containers.
    ///
    /// Convenience wrapper around [`ObjectifyVisitor`](crate::ObjectifyVisitor).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::parse;
    ///
    /// let value = parse(b"{'answer': 42}").unwrap().objectify();
    /// let dict = value.as_dict().unwrap();
    /// assert_eq!(dict.len(), 1);
    /// ```
    #[must_use]
    pub fn objectify(&self) -> crate::Value {
        let mut visitor = crate::ObjectifyVisitor::new();
        self.accept(&mut visitor);
        visitor.into_value()
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::None => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => {
                if let Ok(v) = i64::try_from(i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.collect_str(i)
                }
            }
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::Complex { real, imag } => (real, imag).serialize(serializer),
            Node::Str(s) => serializer.serialize_str(s),
            Node::Bytes(b) => serializer.serialize_bytes(b),
            Node::List(items) | Node::Tuple(items) | Node::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> serde::de::Visitor<'de> for NodeVisitor {
            type Value = Node;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any literal-expression value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Node, E> {
                Ok(Node::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Node, E> {
                Ok(Node::Int(BigInt::from(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Node, E> {
                Ok(Node::Int(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Node, E> {
                Ok(Node::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Node, E> {
                Ok(Node::Str(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Node, E> {
                Ok(Node::Str(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Node, E> {
                Ok(Node::Bytes(value.to_vec()))
            }

            fn visit_unit<E>(self) -> std::result::Result<Node, E> {
                Ok(Node::None)
            }

            fn visit_none<E>(self) -> std::result::Result<Node, E> {
                Ok(Node::None)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Node, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Node, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Node::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Node, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Node::Dict(entries))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Converts an objectified [`Value`](crate::Value) back into an AST node,
/// so materialized data can be re-serialized.
impl From<crate::Value> for Node {
    fn from(value: crate::Value) -> Self {
        use crate::Value;
        match value {
            Value::None => Node::None,
            Value::Bool(b) => Node::Bool(b),
            Value::Int(i) => Node::Int(BigInt::from(i)),
            Value::BigInt(i) => Node::Int(i),
            Value::Float(f) => Node::Float(f),
            Value::Complex { real, imag } => Node::Complex { real, imag },
            Value::Str(s) => Node::Str(s),
            Value::Bytes(b) => Node::Bytes(b),
            Value::List(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Tuple(items) => Node::Tuple(items.into_iter().map(Node::from).collect()),
            Value::Dict(entries) => Node::Dict(
                entries
                    .into_iter()
                    .map(|(k, v)| (Node::from(k), Node::from(v)))
                    .collect(),
            ),
            Value::Set(items) => Node::Set(items.into_iter().map(Node::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Node::Int(BigInt::from(1)), Node::Int(BigInt::from(1)));
        assert_ne!(Node::Int(BigInt::from(1)), Node::Float(1.0));
        assert_eq!(Node::Float(0.0), Node::Float(-0.0));
    }

    #[test]
    fn test_hash_consistent_with_eq_for_zero() {
        let mut set = HashSet::new();
        set.insert(Node::Float(0.0));
        assert!(set.contains(&Node::Float(-0.0)));
    }

    #[test]
    fn test_display_is_compact_literal() {
        let node = Node::Dict(vec![
            (Node::Int(BigInt::from(42)), Node::Str("fortytwo".into())),
            (Node::Str("ok".into()), Node::Bool(false)),
        ]);
        assert_eq!(node.to_string(), "{42:'fortytwo','ok':False}");
    }

    #[test]
    fn test_accept_reports_counts() {
        struct Counter {
            leaves: usize,
            dicts: usize,
        }
        impl Visitor for Counter {
            fn visit_none(&mut self) {
                self.leaves += 1;
            }
            fn visit_bool(&mut self, _: bool) {
                self.leaves += 1;
            }
            fn visit_int(&mut self, _: &BigInt) {
                self.leaves += 1;
            }
            fn visit_float(&mut self, _: f64) {
                self.leaves += 1;
            }
            fn visit_complex(&mut self, _: f64, _: f64) {
                self.leaves += 1;
            }
            fn visit_str(&mut self, _: &str) {
                self.leaves += 1;
            }
            fn visit_bytes(&mut self, _: &[u8]) {
                self.leaves += 1;
            }
            fn end_list(&mut self, _: usize) {}
            fn end_tuple(&mut self, _: usize) {}
            fn end_dict(&mut self, _: usize) {
                self.dicts += 1;
            }
            fn end_set(&mut self, _: usize) {}
        }

        let node = Node::Dict(vec![(
            Node::Str("xs".into()),
            Node::List(vec![Node::Int(BigInt::from(1)), Node::None]),
        )]);
        let mut counter = Counter { leaves: 0, dicts: 0 };
        node.accept(&mut counter);
        assert_eq!(counter.leaves, 3);
        assert_eq!(counter.dicts, 1);
    }
}
