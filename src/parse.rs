//! Recursive-descent parser from wire bytes to an [`Ast`].
//!
//! The parser owns header detection: when the first byte is `#`, the whole
//! first line is an opaque producer header and grammar parsing starts after
//! its newline. The body must be UTF-8 and contain exactly one value,
//! optionally followed by whitespace.
//!
//! Ambiguous productions are resolved with bounded look-ahead rather than
//! backtracking: a colon after the first element decides dict vs. set for
//! the whole container, and the two-term parenthesized complex form is
//! recognized by peeking three tokens before committing to the tuple rule.
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::parse;
//!
//! let ast = parse(b"# serpent utf-8 some-producer\n{'a': (1, 2)}").unwrap();
//! assert_eq!(ast.to_string(), "{'a':(1,2)}");
//! ```

use crate::token::{Token, TokenKind, Tokenizer};
use crate::{Ast, Error, Node, Options, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigInt;
use std::collections::{HashSet, VecDeque};

/// Recursive-descent parser over a token stream.
///
/// Most callers use [`parse`](crate::parse) or
/// [`parse_with_options`](crate::parse_with_options) instead of driving
/// this type directly.
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    peeked: VecDeque<Token>,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Prepares a parser over the raw wire bytes, stripping the optional
    /// header line.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Lex`] if the body is not valid UTF-8.
    pub fn new(input: &'a [u8]) -> Result<Self> {
        Self::with_options(input, Options::default())
    }

    /// Like [`Parser::new`] with an explicit nesting-depth limit.
    pub fn with_options(input: &'a [u8], options: Options) -> Result<Self> {
        let (body, base, line) = strip_header(input);
        let body = std::str::from_utf8(body).map_err(|e| {
            let bad = base + e.valid_up_to();
            Error::lex(bad, line, 1, "input is not valid UTF-8")
        })?;
        Ok(Parser {
            tokens: Tokenizer::new(body, base, line),
            peeked: VecDeque::new(),
            max_depth: options.max_depth,
            depth: 0,
        })
    }

    /// Parses the whole input into a tree.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Lex`]/[`Error::Parse`] on malformed input and
    /// [`Error::DepthExceeded`] past the nesting limit. There is no partial
    /// result: either the full tree parses or an error comes back.
    pub fn parse(mut self) -> Result<Ast> {
        let root = self.parse_value()?;
        let trailing = self.advance()?;
        if trailing.kind != TokenKind::Eof {
            return Err(expected_err(&trailing, "end of input"));
        }
        Ok(Ast::new(root))
    }

    fn peek(&mut self, n: usize) -> Result<&Token> {
        while self.peeked.len() <= n {
            let tok = self.tokens.next_token()?;
            self.peeked.push_back(tok);
        }
        Ok(&self.peeked[n])
    }

    fn advance(&mut self) -> Result<Token> {
        match self.peeked.pop_front() {
            Some(tok) => Ok(tok),
            None => self.tokens.next_token(),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::depth_exceeded(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<Node> {
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::Ident(ref name) => match name.as_str() {
                "None" => Ok(Node::None),
                "True" => Ok(Node::Bool(true)),
                "False" => Ok(Node::Bool(false)),
                other => Err(parse_err(&tok, format!("unexpected identifier '{other}'"))),
            },
            TokenKind::Number {
                ref lexeme,
                float,
                imaginary,
            } => {
                if imaginary {
                    return Err(parse_err(
                        &tok,
                        "imaginary literal is only valid inside a parenthesized complex value",
                    ));
                }
                if float {
                    let value: f64 = lexeme
                        .parse()
                        .map_err(|_| parse_err(&tok, format!("invalid float literal '{lexeme}'")))?;
                    Ok(Node::Float(value))
                } else {
                    let value: BigInt = lexeme
                        .parse()
                        .map_err(|_| parse_err(&tok, format!("invalid integer literal '{lexeme}'")))?;
                    Ok(Node::Int(value))
                }
            }
            TokenKind::Str(text) => Ok(Node::Str(text)),
            TokenKind::LeftBracket => {
                self.enter()?;
                let items = self.parse_elements(&TokenKind::RightBracket)?;
                self.leave();
                Ok(Node::List(items))
            }
            TokenKind::LeftParen => {
                self.enter()?;
                let node = self.parse_tuple_or_complex()?;
                self.leave();
                Ok(node)
            }
            TokenKind::LeftBrace => {
                self.enter()?;
                let node = self.parse_dict_or_set(&tok)?;
                self.leave();
                Ok(node)
            }
            _ => Err(expected_err(&tok, "a value")),
        }
    }

    /// Comma-separated values up to `close`, trailing comma permitted.
    fn parse_elements(&mut self, close: &TokenKind) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        loop {
            if &self.peek(0)?.kind == close {
                self.advance()?;
                return Ok(items);
            }
            items.push(self.parse_value()?);
            let sep = self.advance()?;
            if &sep.kind == close {
                return Ok(items);
            }
            if sep.kind != TokenKind::Comma {
                return Err(expected_err(
                    &sep,
                    &format!("',' or {}", close.describe()),
                ));
            }
        }
    }

    /// Inside `(` ... `)`: either the two-term complex form or a tuple.
    ///
    /// The complex form is committed to only when the next three tokens are
    /// exactly a non-imaginary number, a sign-prefixed imaginary number and
    /// the closing parenthesis.
    fn parse_tuple_or_complex(&mut self) -> Result<Node> {
        if let Some(node) = self.try_complex()? {
            return Ok(node);
        }
        let items = self.parse_elements(&TokenKind::RightParen)?;
        Ok(Node::Tuple(items))
    }

    fn try_complex(&mut self) -> Result<Option<Node>> {
        let real = match &self.peek(0)?.kind {
            TokenKind::Number {
                lexeme,
                imaginary: false,
                ..
            } => lexeme.clone(),
            _ => return Ok(None),
        };
        let imag = match &self.peek(1)?.kind {
            TokenKind::Number {
                lexeme,
                imaginary: true,
                ..
            } if lexeme.starts_with('+') || lexeme.starts_with('-') => lexeme.clone(),
            _ => return Ok(None),
        };
        if self.peek(2)?.kind != TokenKind::RightParen {
            return Ok(None);
        }

        let real_tok = self.advance()?;
        let real = real
            .parse::<f64>()
            .map_err(|_| parse_err(&real_tok, format!("invalid number '{real}'")))?;
        let imag_tok = self.advance()?;
        let imag = imag
            .parse::<f64>()
            .map_err(|_| parse_err(&imag_tok, format!("invalid number '{imag}'")))?;
        self.advance()?; // ')'
        Ok(Some(Node::Complex { real, imag }))
    }

    /// Inside `{` ... `}`: `{}` is the empty dict; otherwise a colon after
    /// the first element decides dict vs. set for the whole container.
    fn parse_dict_or_set(&mut self, open: &Token) -> Result<Node> {
        if self.peek(0)?.kind == TokenKind::RightBrace {
            self.advance()?;
            return Ok(Node::Dict(Vec::new()));
        }

        let first_at = self.peek(0)?.clone();
        let first = self.parse_value()?;
        if self.peek(0)?.kind == TokenKind::Colon {
            self.parse_dict(open, first_at, first)
        } else {
            self.parse_set(first_at, first)
        }
    }

    fn parse_dict(&mut self, open: &Token, first_at: Token, first_key: Node) -> Result<Node> {
        let mut seen: HashSet<Node> = HashSet::new();
        let mut entries: Vec<(Node, Node)> = Vec::new();

        let mut key_at = first_at;
        let mut key = first_key;
        loop {
            let colon = self.advance()?;
            if colon.kind != TokenKind::Colon {
                return Err(expected_err(&colon, "':' (containers cannot mix dict and set elements)"));
            }
            if !seen.insert(key.clone()) {
                return Err(parse_err(&key_at, format!("duplicate dict key {key}")));
            }
            let value = self.parse_value()?;
            entries.push((key, value));

            let sep = self.advance()?;
            match sep.kind {
                TokenKind::RightBrace => break,
                TokenKind::Comma => {
                    if self.peek(0)?.kind == TokenKind::RightBrace {
                        self.advance()?;
                        break;
                    }
                    key_at = self.peek(0)?.clone();
                    key = self.parse_value()?;
                }
                _ => return Err(expected_err(&sep, "',' or '}'")),
            }
        }

        recognize_bytes_dict(entries, open)
    }

    fn parse_set(&mut self, first_at: Token, first: Node) -> Result<Node> {
        let mut seen: HashSet<Node> = HashSet::new();
        let mut items: Vec<Node> = Vec::new();

        let mut item_at = first_at;
        let mut item = first;
        loop {
            if !seen.insert(item.clone()) {
                return Err(parse_err(&item_at, format!("duplicate set element {item}")));
            }
            items.push(item);

            let sep = self.advance()?;
            match sep.kind {
                TokenKind::RightBrace => break,
                TokenKind::Comma => {
                    if self.peek(0)?.kind == TokenKind::RightBrace {
                        self.advance()?;
                        break;
                    }
                    item_at = self.peek(0)?.clone();
                    item = self.parse_value()?;
                }
                TokenKind::Colon => {
                    return Err(expected_err(
                        &sep,
                        "',' or '}' (containers cannot mix dict and set elements)",
                    ))
                }
                _ => return Err(expected_err(&sep, "',' or '}'")),
            }
        }

        Ok(Node::Set(items))
    }
}

/// Splits off the optional `#`-header. Returns the grammar body, its byte
/// offset within the input, and the line number it starts on.
fn strip_header(input: &[u8]) -> (&[u8], usize, usize) {
    if input.first() != Some(&b'#') {
        return (input, 0, 1);
    }
    match input.iter().position(|&b| b == b'\n') {
        Some(nl) => (&input[nl + 1..], nl + 1, 2),
        // A header with no newline leaves an empty body; the missing value
        // is reported by the grammar.
        None => (&input[input.len()..], input.len(), 1),
    }
}

/// Canonicalizes `{'encoding':'base64','data':...}` into a bytes node.
///
/// The shape is duck-typed on the wire: any dict with exactly these two
/// keys decodes as bytes, whether or not a serializer produced it.
fn recognize_bytes_dict(entries: Vec<(Node, Node)>, open: &Token) -> Result<Node> {
    if entries.len() == 2 {
        let mut encoding = None;
        let mut data = None;
        for (key, value) in &entries {
            match (key, value) {
                (Node::Str(k), Node::Str(v)) if k == "encoding" => encoding = Some(v.as_str()),
                (Node::Str(k), Node::Str(v)) if k == "data" => data = Some(v.as_str()),
                _ => {}
            }
        }
        if let (Some("base64"), Some(text)) = (encoding, data) {
            let decoded = BASE64
                .decode(text)
                .map_err(|e| parse_err(open, format!("invalid base64 in bytes value: {e}")))?;
            return Ok(Node::Bytes(decoded));
        }
    }
    Ok(Node::Dict(entries))
}

fn parse_err(tok: &Token, msg: impl Into<String>) -> Error {
    Error::parse(tok.start, tok.line, tok.column, msg)
}

fn expected_err(tok: &Token, expected: &str) -> Error {
    Error::expected(tok.start, tok.line, tok.column, expected, tok.kind.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_scalars() {
        assert_eq!(parse(b"None").unwrap().into_root(), Node::None);
        assert_eq!(parse(b"True").unwrap().into_root(), Node::Bool(true));
        assert_eq!(
            parse(b"-17").unwrap().into_root(),
            Node::Int(BigInt::from(-17))
        );
        assert_eq!(parse(b"2.5e3").unwrap().into_root(), Node::Float(2500.0));
        assert_eq!(
            parse(b"'text'").unwrap().into_root(),
            Node::Str("text".into())
        );
    }

    #[test]
    fn test_unbounded_integer() {
        let big = "123456789012345678901234567890123456789";
        let node = parse(big.as_bytes()).unwrap().into_root();
        assert_eq!(node, Node::Int(big.parse::<BigInt>().unwrap()));
    }

    #[test]
    fn test_header_is_skipped_unvalidated() {
        let ast = parse(b"# serpent utf-8 anything at all\n42").unwrap();
        assert_eq!(ast.into_root(), Node::Int(BigInt::from(42)));
    }

    #[test]
    fn test_no_header_starts_at_byte_zero() {
        assert_eq!(parse(b"42").unwrap().into_root(), Node::Int(BigInt::from(42)));
    }

    #[test]
    fn test_trailing_comma_in_containers() {
        assert_eq!(parse(b"[1,2,]").unwrap().to_string(), "[1,2]");
        assert_eq!(parse(b"(1,)").unwrap().to_string(), "(1,)");
        assert_eq!(parse(b"{1:2,}").unwrap().to_string(), "{1:2}");
        assert_eq!(parse(b"{1,2,}").unwrap().to_string(), "{1,2}");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(parse(b"[]").unwrap().into_root(), Node::List(vec![]));
        assert_eq!(parse(b"()").unwrap().into_root(), Node::Tuple(vec![]));
        // There is no empty-set literal; {} is always the empty dict.
        assert_eq!(parse(b"{}").unwrap().into_root(), Node::Dict(vec![]));
    }

    #[test]
    fn test_complex_lookahead() {
        assert_eq!(
            parse(b"(2.2+3.3j)").unwrap().into_root(),
            Node::complex(2.2, 3.3)
        );
        assert_eq!(
            parse(b"(-2-3j)").unwrap().into_root(),
            Node::complex(-2.0, -3.0)
        );
        assert_eq!(
            parse(b"(1e3+2e-4j)").unwrap().into_root(),
            Node::complex(1000.0, 0.0002)
        );
        // A comma makes it a tuple, which rejects the imaginary element.
        assert!(parse(b"(1+2j,)").is_err());
    }

    #[test]
    fn test_bare_imaginary_rejected() {
        assert!(matches!(parse(b"3.3j"), Err(Error::Parse { .. })));
        assert!(matches!(parse(b"[1, 2j]"), Err(Error::Parse { .. })));
        assert!(matches!(parse(b"(3j)"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_dict_set_disambiguation() {
        assert_eq!(
            parse(b"{1: 'one'}").unwrap().into_root(),
            Node::Dict(vec![(Node::Int(BigInt::from(1)), Node::Str("one".into()))])
        );
        assert_eq!(
            parse(b"{1, 2}").unwrap().into_root(),
            Node::Set(vec![Node::Int(BigInt::from(1)), Node::Int(BigInt::from(2))])
        );
    }

    #[test]
    fn test_mixed_container_rejected() {
        assert!(matches!(parse(b"{1: 2, 3}"), Err(Error::Parse { .. })));
        assert!(matches!(parse(b"{1, 2: 3}"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(matches!(parse(b"{'a':1,'a':2}"), Err(Error::Parse { .. })));
        assert!(matches!(parse(b"{1,1}"), Err(Error::Parse { .. })));
        // Structurally distinct keys may coexist.
        assert!(parse(b"{1: 'int', 1.0: 'float'}").is_ok());
    }

    #[test]
    fn test_truncated_dict() {
        assert!(matches!(parse(b"{1:2,"), Err(Error::Lex { .. } | Error::Parse { .. })));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse(b"1 2").is_err());
        assert!(parse(b"[] []").is_err());
        // Trailing whitespace is fine.
        assert!(parse(b"[1]  \n").is_ok());
    }

    #[test]
    fn test_bytes_dict_recognized() {
        let node = parse(b"{'encoding':'base64','data':'YWJjZGVm'}")
            .unwrap()
            .into_root();
        assert_eq!(node, Node::Bytes(b"abcdef".to_vec()));
    }

    #[test]
    fn test_bytes_dict_key_order_irrelevant() {
        let node = parse(b"{'data':'YWJjZGVm','encoding':'base64'}")
            .unwrap()
            .into_root();
        assert_eq!(node, Node::Bytes(b"abcdef".to_vec()));
    }

    #[test]
    fn test_other_encodings_stay_dicts() {
        let node = parse(b"{'encoding':'utf-8','data':'abc'}").unwrap().into_root();
        assert!(matches!(node, Node::Dict(_)));
    }

    #[test]
    fn test_invalid_base64_is_parse_error() {
        assert!(matches!(
            parse(b"{'encoding':'base64','data':'not base64!'}"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut deep = String::new();
        for _ in 0..200 {
            deep.push('[');
        }
        deep.push('1');
        for _ in 0..200 {
            deep.push(']');
        }
        assert!(matches!(
            parse(deep.as_bytes()),
            Err(Error::DepthExceeded { limit: 128 })
        ));

        let ok = crate::parse_with_options(b"[[1]]", Options::default().with_max_depth(2));
        assert!(ok.is_ok());
        let too_deep = crate::parse_with_options(b"[[[1]]]", Options::default().with_max_depth(2));
        assert!(matches!(too_deep, Err(Error::DepthExceeded { limit: 2 })));
    }

    #[test]
    fn test_error_positions() {
        match parse(b"[1, ?]") {
            Err(Error::Lex { offset, line, column, .. }) => {
                assert_eq!(offset, 4);
                assert_eq!(line, 1);
                assert_eq!(column, 5);
            }
            other => panic!("expected lex error, got {other:?}"),
        }

        match parse(b"# header\n[1, :]") {
            Err(Error::Parse { offset, line, .. }) => {
                assert_eq!(offset, 13);
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_single_parenthesized_value_is_tuple() {
        assert_eq!(
            parse(b"(1)").unwrap().into_root(),
            Node::Tuple(vec![Node::Int(BigInt::from(1))])
        );
    }
}
