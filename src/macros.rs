/// Builds a [`Node`](crate::Node) tree from literal-like syntax.
///
/// Brackets build lists, parentheses tuples, braces with `key: value`
/// entries dicts and braces without colons sets. `None`, `True` and `False`
/// are the format's spellings. Anything else is converted with
/// `Node::from`.
///
/// # Examples
///
/// ```rust
/// use serpentine::{node, Node};
///
/// let tree = node!({
///     "name": "Sally",
///     "scores": [1, 2, 3],
///     "flags": {True}
/// });
/// assert!(matches!(tree, Node::Dict(_)));
/// ```
#[macro_export]
macro_rules! node {
    (None) => {
        $crate::Node::None
    };

    (True) => {
        $crate::Node::Bool(true)
    };

    (False) => {
        $crate::Node::Bool(false)
    };

    ([]) => {
        $crate::Node::List(vec![])
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Node::List(vec![$($crate::node!($elem)),+])
    };

    (()) => {
        $crate::Node::Tuple(vec![])
    };

    (( $($elem:tt),+ $(,)? )) => {
        $crate::Node::Tuple(vec![$($crate::node!($elem)),+])
    };

    ({}) => {
        $crate::Node::Dict(vec![])
    };

    ({ $($key:tt : $value:tt),+ $(,)? }) => {
        $crate::Node::Dict(vec![$(($crate::node!($key), $crate::node!($value))),+])
    };

    ({ $($elem:tt),+ $(,)? }) => {
        $crate::Node::Set(vec![$($crate::node!($elem)),+])
    };

    ($other:expr) => {
        $crate::Node::from($other)
    };
}
