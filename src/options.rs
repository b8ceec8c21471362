//! Configuration shared by the serializer and parser.
//!
//! [`Options`] controls pretty-printing on the serialize path and the
//! nesting-depth guard on both paths.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{to_bytes_with_options, Options};
//!
//! let options = Options::default().with_indent(true);
//! let bytes = to_bytes_with_options(vec![1, 2], options).unwrap();
//! assert!(bytes.ends_with(b"[\n  1,\n  2\n]"));
//! ```

/// Codec configuration.
///
/// `indent` switches the serializer between compact output and 2-space
/// pretty-printing. `max_depth` bounds container nesting on both the parse
/// and serialize paths; exceeding it fails with
/// [`Error::DepthExceeded`](crate::Error::DepthExceeded) instead of
/// exhausting the call stack.
#[derive(Clone, Debug)]
pub struct Options {
    pub indent: bool,
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: false,
            max_depth: 128,
        }
    }
}

impl Options {
    /// Compact output, default depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed output with 2-space indentation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::Options;
    ///
    /// let options = Options::pretty();
    /// assert!(options.indent);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        Options {
            indent: true,
            ..Default::default()
        }
    }

    /// Sets whether output is pretty-printed.
    #[must_use]
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the maximum container-nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
