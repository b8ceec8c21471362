//! # serpentine
//!
//! A codec for Python literal-expression syntax — the grammar of `None`,
//! `True`, numbers, quoted strings, lists, tuples, dicts and sets — built
//! for cross-language RPC and data exchange rather than arbitrary object
//! persistence.
//!
//! ## How it works
//!
//! One side serializes native values into canonical literal-syntax bytes;
//! the other side parses those bytes into an abstract syntax tree and
//! materializes native containers from it:
//!
//! ```text
//! native value -> Serializer -> bytes -> Tokenizer -> Parser -> Ast -> Visitor -> native value
//! ```
//!
//! Both directions are pure, synchronous transformations. The serializer
//! sorts set elements and dict entries under a total order before emission,
//! so logically equal inputs always produce byte-identical output —
//! serialized payloads can be compared across processes.
//!
//! ## Quick start
//!
//! ```rust
//! use serpentine::{from_slice, to_bytes, Value};
//! use std::collections::BTreeMap;
//!
//! let mut data = BTreeMap::new();
//! data.insert("name", "Sally");
//! data.insert("job", "engineer");
//!
//! // Serialize to literal-syntax bytes (a `#` header line plus the body).
//! let bytes = to_bytes(data).unwrap();
//!
//! // Parse and materialize on the other side.
//! let value = from_slice(&bytes).unwrap();
//! let dict = value.as_dict().unwrap();
//! assert_eq!(dict.get(&Value::from("name")), Some(&Value::from("Sally")));
//! ```
//!
//! ## Working with the tree
//!
//! [`parse`] yields an [`Ast`] that can be inspected directly, dumped with
//! [`DebugVisitor`], or materialized with [`ObjectifyVisitor`] (or the
//! [`Ast::objectify`] shorthand):
//!
//! ```rust
//! use serpentine::{parse, DebugVisitor};
//!
//! let ast = parse(b"{'numbers': (1, 2.5)}").unwrap();
//! let mut dump = DebugVisitor::new();
//! ast.accept(&mut dump);
//! assert!(dump.into_string().starts_with("dict (1 entries)"));
//! ```
//!
//! ## Supported native types
//!
//! `Node` converts from booleans, every integer width (plus `BigInt` —
//! integers on the wire are unbounded), floats, strings, `Decimal`, `Uuid`,
//! `chrono` date/time types, durations, `Vec`/slices (lists), arrays and
//! Rust tuples (tuple syntax), the standard set and map types, and
//! `Option`. Raw bytes use [`Node::bytes`] and travel as a
//! `{'encoding':'base64','data':...}` dict. Structured host values plug in
//! through the [`ExtractState`] / [`PublicFields`] capability traits, and
//! anything `serde::Serialize` converts via [`to_value`].

pub mod ast;
pub mod convert;
pub mod error;
pub mod macros;
pub mod options;
pub mod parse;
pub mod ser;
pub mod token;
pub mod value;
pub mod visit;

pub use ast::{Ast, Node};
pub use convert::{ExtractState, PublicFields};
pub use error::{Error, Result};
pub use options::Options;
pub use parse::Parser;
pub use ser::{NodeSerializer, Serializer};
pub use token::{Token, TokenKind, Tokenizer};
pub use value::Value;
pub use visit::{DebugVisitor, ObjectifyVisitor, Visitor};

use serde::Serialize;
use std::io;

/// Parses wire bytes into an [`Ast`].
///
/// A leading `#` line is consumed as an opaque producer header; the rest
/// must be exactly one literal-expression value plus optional trailing
/// whitespace.
///
/// # Examples
///
/// ```rust
/// use serpentine::parse;
///
/// let ast = parse(b"[1, 2, 3]").unwrap();
/// assert_eq!(ast.to_string(), "[1,2,3]");
/// ```
///
/// # Errors
///
/// Returns [`Error::Lex`] or [`Error::Parse`] on malformed input and
/// [`Error::DepthExceeded`] past the default nesting limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(input: &[u8]) -> Result<Ast> {
    Parser::new(input)?.parse()
}

/// Like [`parse`] with an explicit [`Options`] (for the depth limit).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(input: &[u8], options: Options) -> Result<Ast> {
    Parser::with_options(input, options)?.parse()
}

/// Parses wire bytes and materializes native containers in one step.
///
/// # Examples
///
/// ```rust
/// use serpentine::{from_slice, Value};
///
/// let value = from_slice(b"(1, 2)").unwrap();
/// assert_eq!(value, Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
/// ```
///
/// # Errors
///
/// Same failure modes as [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(input: &[u8]) -> Result<Value> {
    Ok(parse(input)?.objectify())
}

/// Reads all bytes from a reader, then parses and materializes them.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise as [`from_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Value> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(e.to_string()))?;
    from_slice(&buf)
}

/// Serializes a native value to compact literal-syntax bytes.
///
/// The output starts with a `# serpent utf-8 ...` header line; use
/// [`strip_header`] to get at the body.
///
/// # Examples
///
/// ```rust
/// use serpentine::{to_bytes, strip_header};
///
/// let bytes = to_bytes("blerp").unwrap();
/// assert_eq!(strip_header(&bytes), b"'blerp'");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for non-finite floats and
/// [`Error::DepthExceeded`] for trees nested past the limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes<T: Into<Node>>(value: T) -> Result<Vec<u8>> {
    to_bytes_with_options(value, Options::default())
}

/// Serializes a native value with 2-space pretty-printing.
///
/// # Errors
///
/// Same failure modes as [`to_bytes`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes_pretty<T: Into<Node>>(value: T) -> Result<Vec<u8>> {
    to_bytes_with_options(value, Options::pretty())
}

/// Serializes a native value with explicit [`Options`].
///
/// # Examples
///
/// ```rust
/// use serpentine::{to_bytes_with_options, strip_header, Options};
///
/// let bytes = to_bytes_with_options(vec![1], Options::pretty()).unwrap();
/// assert_eq!(strip_header(&bytes), b"[\n  1\n]");
/// ```
///
/// # Errors
///
/// Same failure modes as [`to_bytes`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_bytes_with_options<T: Into<Node>>(value: T, options: Options) -> Result<Vec<u8>> {
    Serializer::new(options).serialize(&value.into())
}

/// Serializes a native value and writes the bytes to a writer.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails, otherwise as [`to_bytes`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W: io::Write, T: Into<Node>>(writer: W, value: T) -> Result<()> {
    to_writer_with_options(writer, value, Options::default())
}

/// Serializes with explicit [`Options`] and writes the bytes to a writer.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails, otherwise as [`to_bytes`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W: io::Write, T: Into<Node>>(
    mut writer: W,
    value: T,
    options: Options,
) -> Result<()> {
    let bytes = to_bytes_with_options(value, options)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Error::io(e.to_string()))
}

/// Converts any `T: Serialize` into a [`Node`] through the serde data
/// model.
///
/// Serde has no set or tuple-vs-list distinction, so collections arrive as
/// lists and maps as dicts; the `From` impls on [`Node`] are the
/// full-fidelity path.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serpentine::{to_value, Node};
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let node = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(node.to_string(), "{'x':1,'y':2}");
/// ```
///
/// # Errors
///
/// Returns whatever the value's `Serialize` impl reports.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Node>
where
    T: ?Sized + Serialize,
{
    value.serialize(NodeSerializer)
}

/// Returns the payload body after the optional `#` header line.
///
/// If the input does not start with `#`, it is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use serpentine::strip_header;
///
/// assert_eq!(strip_header(b"# header\nfirst-line"), b"first-line");
/// assert_eq!(strip_header(b"42"), b"42");
/// ```
#[must_use]
pub fn strip_header(data: &[u8]) -> &[u8] {
    if data.first() != Some(&b'#') {
        return data;
    }
    match data.iter().position(|&b| b == b'\n') {
        Some(nl) => &data[nl + 1..],
        None => &data[data.len()..],
    }
}
