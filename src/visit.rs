//! Visitor contract and the two reference consumers.
//!
//! Every [`Node`](crate::Node) supports [`accept`](crate::Node::accept),
//! which double-dispatches to the methods below. Containers visit their
//! children in stored order before the `end_*` notification fires with the
//! element count, so a visitor can pop completed children off a stack and
//! assemble results bottom-up. Dict entries arrive as key then value.
//!
//! Two consumers ship with the crate: [`DebugVisitor`] renders a
//! deterministic diagnostic dump of the tree shape, and [`ObjectifyVisitor`]
//! materializes native [`Value`]s.

use crate::Value;
use indexmap::{IndexMap, IndexSet};
use num_bigint::BigInt;

/// Per-kind callbacks invoked by [`Node::accept`].
///
/// The `begin_*` hooks default to no-ops; `end_*` hooks receive the element
/// count (entry count for dicts).
pub trait Visitor {
    fn visit_none(&mut self);
    fn visit_bool(&mut self, value: bool);
    fn visit_int(&mut self, value: &BigInt);
    fn visit_float(&mut self, value: f64);
    fn visit_complex(&mut self, real: f64, imag: f64);
    fn visit_str(&mut self, value: &str);
    fn visit_bytes(&mut self, data: &[u8]);

    fn begin_list(&mut self, _len: usize) {}
    fn end_list(&mut self, len: usize);
    fn begin_tuple(&mut self, _len: usize) {}
    fn end_tuple(&mut self, len: usize);
    fn begin_dict(&mut self, _len: usize) {}
    fn end_dict(&mut self, len: usize);
    fn begin_set(&mut self, _len: usize) {}
    fn end_set(&mut self, len: usize);
}

/// Renders a deterministic, indented dump of the tree: one line per node,
/// each showing the node's kind and value (containers show their counts).
/// Intended for diagnostics, not round-tripping.
///
/// # Examples
///
/// ```rust
/// use serpentine::{parse, DebugVisitor};
///
/// let ast = parse(b"[1, 'two']").unwrap();
/// let mut dv = DebugVisitor::new();
/// ast.accept(&mut dv);
/// assert_eq!(dv.into_string(), "list (2 items)\n  int 1\n  str 'two'\n");
/// ```
#[derive(Debug, Default)]
pub struct DebugVisitor {
    out: String,
    depth: usize,
}

impl DebugVisitor {
    #[must_use]
    pub fn new() -> Self {
        DebugVisitor::default()
    }

    /// The accumulated dump.
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: String) {
        self.line(&header);
        self.depth += 1;
    }
}

impl std::fmt::Display for DebugVisitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.out)
    }
}

impl Visitor for DebugVisitor {
    fn visit_none(&mut self) {
        self.line("none");
    }

    fn visit_bool(&mut self, value: bool) {
        self.line(if value { "bool True" } else { "bool False" });
    }

    fn visit_int(&mut self, value: &BigInt) {
        self.line(&format!("int {value}"));
    }

    fn visit_float(&mut self, value: f64) {
        self.line(&format!("float {}", crate::ser::float_text(value)));
    }

    fn visit_complex(&mut self, real: f64, imag: f64) {
        self.line(&format!("complex {}", crate::ser::complex_text(real, imag)));
    }

    fn visit_str(&mut self, value: &str) {
        let mut quoted = String::new();
        crate::ser::write_quoted(&mut quoted, value);
        self.line(&format!("str {quoted}"));
    }

    fn visit_bytes(&mut self, data: &[u8]) {
        self.line(&format!("bytes ({} bytes)", data.len()));
    }

    fn begin_list(&mut self, len: usize) {
        self.open(format!("list ({len} items)"));
    }

    fn end_list(&mut self, _len: usize) {
        self.depth -= 1;
    }

    fn begin_tuple(&mut self, len: usize) {
        self.open(format!("tuple ({len} items)"));
    }

    fn end_tuple(&mut self, _len: usize) {
        self.depth -= 1;
    }

    fn begin_dict(&mut self, len: usize) {
        self.open(format!("dict ({len} entries)"));
    }

    fn end_dict(&mut self, _len: usize) {
        self.depth -= 1;
    }

    fn begin_set(&mut self, len: usize) {
        self.open(format!("set ({len} items)"));
    }

    fn end_set(&mut self, _len: usize) {
        self.depth -= 1;
    }
}

/// Materializes native [`Value`]s from a tree, bottom-up.
///
/// Completed children wait on a stack; each `end_*` notification pops that
/// container's children and pushes the assembled collection. Integers come
/// back as [`Value::Int`] unless they exceed the `i64` range, in which case
/// they are promoted to [`Value::BigInt`]. A dict whose keys include
/// `'__class__'` stays a plain dict; re-hydrating host types is the
/// caller's business.
///
/// # Examples
///
/// ```rust
/// use serpentine::{parse, ObjectifyVisitor, Value};
///
/// let ast = parse(b"(1, 2)").unwrap();
/// let mut visitor = ObjectifyVisitor::new();
/// ast.accept(&mut visitor);
/// let value = visitor.into_value();
/// assert_eq!(value, Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
/// ```
#[derive(Debug, Default)]
pub struct ObjectifyVisitor {
    stack: Vec<Value>,
}

impl ObjectifyVisitor {
    #[must_use]
    pub fn new() -> Self {
        ObjectifyVisitor::default()
    }

    /// The materialized root value.
    #[must_use]
    pub fn into_value(mut self) -> Value {
        debug_assert!(self.stack.len() <= 1, "visitor left {} values", self.stack.len());
        self.stack.pop().unwrap_or(Value::None)
    }

    fn pop_children(&mut self, len: usize) -> Vec<Value> {
        self.stack.split_off(self.stack.len() - len)
    }
}

impl Visitor for ObjectifyVisitor {
    fn visit_none(&mut self) {
        self.stack.push(Value::None);
    }

    fn visit_bool(&mut self, value: bool) {
        self.stack.push(Value::Bool(value));
    }

    fn visit_int(&mut self, value: &BigInt) {
        let value = match i64::try_from(value) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(value.clone()),
        };
        self.stack.push(value);
    }

    fn visit_float(&mut self, value: f64) {
        self.stack.push(Value::Float(value));
    }

    fn visit_complex(&mut self, real: f64, imag: f64) {
        self.stack.push(Value::Complex { real, imag });
    }

    fn visit_str(&mut self, value: &str) {
        self.stack.push(Value::Str(value.to_string()));
    }

    fn visit_bytes(&mut self, data: &[u8]) {
        self.stack.push(Value::Bytes(data.to_vec()));
    }

    fn end_list(&mut self, len: usize) {
        let items = self.pop_children(len);
        self.stack.push(Value::List(items));
    }

    fn end_tuple(&mut self, len: usize) {
        let items = self.pop_children(len);
        self.stack.push(Value::Tuple(items));
    }

    fn end_dict(&mut self, len: usize) {
        let mut flat = self.pop_children(len * 2);
        let mut entries = IndexMap::with_capacity(len);
        // Children arrived as key, value, key, value in source order.
        let mut values = flat.drain(..);
        while let (Some(key), Some(value)) = (values.next(), values.next()) {
            entries.insert(key, value);
        }
        self.stack.push(Value::Dict(entries));
    }

    fn end_set(&mut self, len: usize) {
        let items: IndexSet<Value> = self.pop_children(len).into_iter().collect();
        self.stack.push(Value::Set(items));
    }
}
