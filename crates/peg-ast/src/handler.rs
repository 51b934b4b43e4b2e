//! Semantic actions attached to rules and choice alternatives.

/// A semantic action post-processing a rule's successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    /// An opaque action body in the target language of the compiled parser.
    /// Invoked with the source location and the captured value(s); the
    /// parameter shape depends on the operator the handler is attached to.
    Action(String),
    /// A structural rearrangement of the captured value.
    Mapping(Mapping),
}

impl Handler {
    /// A functional action from its body text.
    pub fn action(body: impl Into<String>) -> Self {
        Handler::Action(body.into())
    }
}

/// A structural mapping literal.
///
/// Numbers select elements of the captured value: on a sequence, `1` selects
/// the first element; on a regex, `0` is the full match and `1` the first
/// capture group; on any scalar capture a number selects the value itself.
/// Strings are emitted literally and arrays construct recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    /// A literal string.
    Str(String),
    /// An element selector.
    Index(i64),
    /// Recursive array construction.
    List(Vec<Mapping>),
}

impl From<i64> for Mapping {
    fn from(n: i64) -> Self {
        Mapping::Index(n)
    }
}

impl From<&str> for Mapping {
    fn from(s: &str) -> Self {
        Mapping::Str(s.to_string())
    }
}

impl From<Vec<Mapping>> for Mapping {
    fn from(items: Vec<Mapping>) -> Self {
        Mapping::List(items)
    }
}
