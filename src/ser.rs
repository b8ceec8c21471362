//! Type-directed serialization of native values to literal-syntax bytes.
//!
//! The [`Serializer`] walks a [`Node`] tree and emits canonical text: sets
//! and dict entries are sorted under a total order before emission, so
//! logically equal inputs produce byte-identical output no matter what
//! iteration order the producer saw. Quoting, numeric formatting and
//! pretty-printing all live here.
//!
//! The module also provides [`NodeSerializer`], a `serde::Serializer` that
//! builds a [`Node`] from any `T: Serialize` (the [`to_value`](crate::to_value)
//! entry point), mirroring the conversion path used for dynamic values.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{to_bytes, strip_header};
//!
//! let bytes = to_bytes(vec![1, 2, 3]).unwrap();
//! assert_eq!(strip_header(&bytes), b"[1,2,3]");
//! ```

use crate::{Error, Node, Options, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigInt;
use serde::{ser, Serialize};
use std::cmp::Ordering;

/// First line of every serialized payload: format tag, encoding, producer.
const HEADER: &str = concat!(
    "# serpent utf-8 rust-serpentine",
    env!("CARGO_PKG_VERSION"),
    "\n"
);

/// The literal-syntax serializer.
///
/// A pure function of value and [`Options`] apart from the crate version
/// embedded in the header line. Never fails on finite, bounded-depth trees.
pub struct Serializer {
    options: Options,
}

impl Serializer {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Serializer { options }
    }

    /// Serializes a tree to wire bytes, header line included.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedType`] on non-finite floats (the
    /// grammar has no literal for them) and [`Error::DepthExceeded`] past
    /// the nesting limit.
    pub fn serialize(&self, node: &Node) -> Result<Vec<u8>> {
        let mut out = String::with_capacity(256);
        out.push_str(HEADER);
        self.emit(&mut out, node, 0, self.options.indent)?;
        Ok(out.into_bytes())
    }

    fn emit(&self, out: &mut String, node: &Node, depth: usize, indent: bool) -> Result<()> {
        match node {
            Node::None => out.push_str("None"),
            Node::Bool(true) => out.push_str("True"),
            Node::Bool(false) => out.push_str("False"),
            Node::Int(i) => out.push_str(&i.to_string()),
            Node::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::unsupported_type(format!(
                        "the format has no literal for the float {f}"
                    )));
                }
                out.push_str(&float_text(*f));
            }
            Node::Complex { real, imag } => {
                if !real.is_finite() || !imag.is_finite() {
                    return Err(Error::unsupported_type(
                        "the format has no literal for non-finite complex parts",
                    ));
                }
                out.push_str(&complex_text(*real, *imag));
            }
            Node::Str(s) => write_quoted(out, s),
            Node::Bytes(data) => {
                // Fixed entry order, exempt from canonical key sorting.
                let pairs = bytes_wire_pairs(data);
                let refs: Vec<(&Node, &Node)> = pairs.iter().map(|(k, v)| (k, v)).collect();
                self.emit_pairs(out, &refs, depth, indent)?;
            }
            Node::List(items) => {
                let refs: Vec<&Node> = items.iter().collect();
                self.emit_seq(out, '[', ']', &refs, depth, indent, false)?;
            }
            Node::Tuple(items) => {
                let refs: Vec<&Node> = items.iter().collect();
                self.emit_seq(out, '(', ')', &refs, depth, indent, true)?;
            }
            Node::Set(items) => {
                // `{}` is the empty dict, so the empty set goes out in its
                // only parseable spelling, the empty tuple.
                if items.is_empty() {
                    out.push_str("()");
                } else {
                    let sorted = self.sorted(items, depth)?;
                    self.emit_seq(out, '{', '}', &sorted, depth, indent, false)?;
                }
            }
            Node::Dict(entries) => {
                let sorted = self.sorted_pairs(entries, depth)?;
                self.emit_pairs(out, &sorted, depth, indent)?;
            }
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<usize> {
        let inner = depth + 1;
        if inner > self.options.max_depth {
            return Err(Error::depth_exceeded(self.options.max_depth));
        }
        Ok(inner)
    }

    fn emit_seq(
        &self,
        out: &mut String,
        open: char,
        close: char,
        items: &[&Node],
        depth: usize,
        indent: bool,
        single_trailing_comma: bool,
    ) -> Result<()> {
        let inner = self.check_depth(depth)?;
        if items.is_empty() {
            out.push(open);
            out.push(close);
            return Ok(());
        }

        out.push(open);
        if indent {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                push_indent(out, inner);
                self.emit(out, item, inner, indent)?;
            }
            out.push('\n');
            push_indent(out, depth);
        } else {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.emit(out, item, inner, indent)?;
            }
            // A lone tuple element needs the comma to stay a tuple on any
            // reader of the source grammar.
            if single_trailing_comma && items.len() == 1 {
                out.push(',');
            }
        }
        out.push(close);
        Ok(())
    }

    fn emit_pairs(
        &self,
        out: &mut String,
        entries: &[(&Node, &Node)],
        depth: usize,
        indent: bool,
    ) -> Result<()> {
        let inner = self.check_depth(depth)?;
        if entries.is_empty() {
            out.push_str("{}");
            return Ok(());
        }

        out.push('{');
        if indent {
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                push_indent(out, inner);
                self.emit(out, key, inner, indent)?;
                out.push_str(": ");
                self.emit(out, value, inner, indent)?;
            }
            out.push('\n');
            push_indent(out, depth);
        } else {
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.emit(out, key, inner, indent)?;
                out.push(':');
                self.emit(out, value, inner, indent)?;
            }
        }
        out.push('}');
        Ok(())
    }

    fn sorted<'n>(&self, items: &'n [Node], depth: usize) -> Result<Vec<&'n Node>> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            keyed.push((self.sort_key(item, depth)?, item));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }

    fn sorted_pairs<'n>(
        &self,
        entries: &'n [(Node, Node)],
        depth: usize,
    ) -> Result<Vec<(&'n Node, &'n Node)>> {
        let mut keyed = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            keyed.push((self.sort_key(key, depth)?, (key, value)));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, pair)| pair).collect())
    }

    /// Total-order key: numbers sort before text before everything else;
    /// numbers by value (digit text breaking approximation ties), text by
    /// code points, the rest by canonical serialized bytes.
    fn sort_key(&self, node: &Node, depth: usize) -> Result<SortKey> {
        Ok(match node {
            Node::Int(i) => SortKey::Number(Approx(big_to_f64(i)), i.to_string()),
            Node::Float(f) => SortKey::Number(Approx(*f), float_text(*f)),
            Node::Str(s) => SortKey::Text(s.clone()),
            other => {
                let mut text = String::new();
                self.emit(&mut text, other, depth, false)?;
                SortKey::Other(text)
            }
        })
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(Approx, String),
    Text(String),
    Other(String),
}

/// Totally ordered f64 wrapper; NaN cannot occur because non-finite floats
/// are rejected before sort keys are built.
#[derive(PartialEq, PartialOrd)]
struct Approx(f64);

impl Eq for Approx {}

impl Ord for Approx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

fn big_to_f64(i: &BigInt) -> f64 {
    // Saturates to infinity for values beyond f64 range, which still sorts
    // them above every in-range number; the digit-text tie-break keeps the
    // order total.
    i.to_string().parse().unwrap_or(f64::INFINITY)
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn bytes_wire_pairs(data: &[u8]) -> [(Node, Node); 2] {
    [
        (
            Node::Str("encoding".to_string()),
            Node::Str("base64".to_string()),
        ),
        (Node::Str("data".to_string()), Node::Str(BASE64.encode(data))),
    ]
}

/// Shortest round-trip float text, with `.0` appended to integral values so
/// the literal re-parses as a float rather than an integer.
pub(crate) fn float_text(f: f64) -> String {
    let mut text = f.to_string();
    if !text.contains('.') && !text.contains('e') && !text.contains("inf") && !text.contains("NaN")
    {
        text.push_str(".0");
    }
    text
}

/// `(real<sign>abs(imag)j)` with both parts in their plain shortest form
/// and the sign always explicit.
pub(crate) fn complex_text(real: f64, imag: f64) -> String {
    let sign = if imag >= 0.0 { '+' } else { '-' };
    format!("({real}{sign}{}j)", imag.abs())
}

/// Quote-selection: single quotes by default; a string containing `'` but
/// no `"` goes in double quotes; otherwise single quotes with embedded `'`
/// escaped. Only the chosen quote and the backslash itself are escaped —
/// everything else, control characters included, passes through raw.
pub(crate) fn write_quoted(out: &mut String, s: &str) {
    let (quote, escape_single) = if s.contains('\'') && !s.contains('"') {
        ('"', false)
    } else {
        ('\'', true)
    };
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' if escape_single => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out.push(quote);
}

/// Compact literal rendering in stored order, used by `Display`. Unlike the
/// serializer this never reorders, never fails, and writes non-finite
/// floats in their debug form.
pub(crate) fn write_literal(out: &mut String, node: &Node) {
    match node {
        Node::None => out.push_str("None"),
        Node::Bool(true) => out.push_str("True"),
        Node::Bool(false) => out.push_str("False"),
        Node::Int(i) => out.push_str(&i.to_string()),
        Node::Float(f) => out.push_str(&float_text(*f)),
        Node::Complex { real, imag } => out.push_str(&complex_text(*real, *imag)),
        Node::Str(s) => write_quoted(out, s),
        Node::Bytes(data) => {
            let pairs = bytes_wire_pairs(data);
            out.push('{');
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_literal(out, key);
                out.push(':');
                write_literal(out, value);
            }
            out.push('}');
        }
        Node::List(items) => write_literal_seq(out, '[', ']', items, false),
        Node::Tuple(items) => write_literal_seq(out, '(', ')', items, true),
        Node::Set(items) if items.is_empty() => out.push_str("()"),
        Node::Set(items) => write_literal_seq(out, '{', '}', items, false),
        Node::Dict(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_literal(out, key);
                out.push(':');
                write_literal(out, value);
            }
            out.push('}');
        }
    }
}

fn write_literal_seq(
    out: &mut String,
    open: char,
    close: char,
    items: &[Node],
    single_trailing_comma: bool,
) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_literal(out, item);
    }
    if single_trailing_comma && items.len() == 1 {
        out.push(',');
    }
    out.push(close);
}

/// Builds a [`Node`] from anything serde can serialize.
///
/// Sets and maps coming through serde arrive as sequences and maps in the
/// serde data model; the `From`-impl table on `Node` is the full-fidelity
/// path for set/tuple/complex-aware conversion.
pub struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SeqCollector;
    type SerializeTuple = TupleCollector;
    type SerializeTupleStruct = TupleCollector;
    type SerializeTupleVariant = TupleVariantCollector;
    type SerializeMap = MapCollector;
    type SerializeStruct = StructCollector;
    type SerializeStructVariant = StructVariantCollector;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Int(BigInt::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::Int(BigInt::from(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::Int(BigInt::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::Int(BigInt::from(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        Ok(Node::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        Ok(Node::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Ok(Node::Dict(vec![(
            Node::Str(variant.to_string()),
            value.serialize(NodeSerializer)?,
        )]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqCollector {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(TupleCollector {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(TupleVariantCollector {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapCollector {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructCollector {
            entries: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(StructVariantCollector {
            variant,
            entries: Vec::with_capacity(len),
        })
    }
}

pub struct SeqCollector {
    items: Vec<Node>,
}

impl ser::SerializeSeq for SeqCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::List(self.items))
    }
}

pub struct TupleCollector {
    items: Vec<Node>,
}

impl ser::SerializeTuple for TupleCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Tuple(self.items))
    }
}

impl ser::SerializeTupleStruct for TupleCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Tuple(self.items))
    }
}

pub struct TupleVariantCollector {
    variant: &'static str,
    items: Vec<Node>,
}

impl ser::SerializeTupleVariant for TupleVariantCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dict(vec![(
            Node::Str(self.variant.to_string()),
            Node::Tuple(self.items),
        )]))
    }
}

pub struct MapCollector {
    entries: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

impl ser::SerializeMap for MapCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pending_key = Some(key.serialize(NodeSerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        self.entries.push((key, value.serialize(NodeSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dict(self.entries))
    }
}

pub struct StructCollector {
    entries: Vec<(Node, Node)>,
}

impl ser::SerializeStruct for StructCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push((
            Node::Str(key.to_string()),
            value.serialize(NodeSerializer)?,
        ));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dict(self.entries))
    }
}

pub struct StructVariantCollector {
    variant: &'static str,
    entries: Vec<(Node, Node)>,
}

impl ser::SerializeStructVariant for StructVariantCollector {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push((
            Node::Str(key.to_string()),
            value.serialize(NodeSerializer)?,
        ));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dict(vec![(
            Node::Str(self.variant.to_string()),
            Node::Dict(self.entries),
        )]))
    }
}
