//! Parse state and results.

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// The immutable cursor a combinator runs at: the full input plus a byte
/// position into it. Combinators derive new states for sub-calls with
/// [`State::at`]; they never move a caller's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State<'a> {
    /// The complete input being parsed.
    pub input: &'a str,
    /// Current byte offset. Always on a character boundary.
    pub pos: usize,
}

impl<'a> State<'a> {
    /// A state at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        State { input, pos: 0 }
    }

    /// The same input at a different position.
    pub fn at(self, pos: usize) -> Self {
        State { pos, ..self }
    }

    /// The unparsed remainder.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

/// A matched span: starting offset and length, both in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    /// Offset the match started at.
    pub pos: usize,
    /// Number of bytes consumed.
    pub length: usize,
}

/// A successful parse result.
///
/// Invariant: `pos == loc.pos + loc.length`. Failure is the absence of a
/// `Parsed` (`Option::None`); no other failure signal propagates through
/// combinators.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The span this result covers.
    pub loc: Loc,
    /// The next position to parse.
    pub pos: usize,
    /// The semantic value.
    pub value: Value,
}

impl Parsed {
    /// A zero-width success at `pos` carrying an absent value, as produced
    /// by lookaheads and failed optionals.
    pub fn empty_at(pos: usize) -> Self {
        Parsed { loc: Loc { pos, length: 0 }, pos, value: Value::Null }
    }
}

/// A dynamically-shaped semantic value.
///
/// Atoms produce strings (a literal match) or lists (a regex match array:
/// element 0 is the full match, later elements are capture groups, `Null`
/// where a group did not participate). Composites produce lists of their
/// sub-values. `Null` is the absent value of optionals and lookaheads.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent.
    Null,
    /// A string value.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

// Serialized as plain JSON (null / string / array) so results can be
// compared against expected documents in tests and logged as data.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
