//! Raw document tree

use indexmap::IndexMap;
use std::fmt;

/// Ordered mapping of keys to nodes (declaration order is preserved)
pub type NodeMap = IndexMap<String, Node>;

/// A node of the parsed, unevaluated document
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Null value (`~`, `null` or an empty entry)
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// String value (may be a formula, see [`crate::formula_payload`])
    String(String),

    /// Sequence of nodes
    Seq(Vec<Node>),

    /// Mapping with string keys, in source order
    Map(NodeMap),
}

impl Node {
    /// Create an empty mapping node
    pub fn map() -> Self {
        Node::Map(NodeMap::new())
    }

    /// Create a string node
    pub fn string<S: Into<String>>(s: S) -> Self {
        Node::String(s.into())
    }

    /// Check if the node is null
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Check if the node is a mapping
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// Check if the node is a sequence
    pub fn is_seq(&self) -> bool {
        matches!(self, Node::Seq(_))
    }

    /// Check if the node is a formula string
    pub fn is_formula(&self) -> bool {
        matches!(self, Node::String(s) if crate::formula::is_formula(s))
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Int(i) => Some(*i as f64),
            Node::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get the value as a mapping
    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get the value as a sequence
    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key, if this is a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Insert a key into a mapping node
    ///
    /// Does nothing if the node is not a mapping.
    pub fn insert<K: Into<String>, V: Into<Node>>(&mut self, key: K, value: V) {
        if let Node::Map(m) = self {
            m.insert(key.into(), value.into());
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Int(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Seq(_) => "sequence",
            Node::Map(_) => "mapping",
        }
    }
}

/// Format a float the way a document author expects to read it back
///
/// Integral values keep a trailing `.0` so they stay distinguishable from
/// integers; very large and very small magnitudes use exponent notation.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => Ok(()),
            Node::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Node::Int(i) => write!(f, "{}", i),
            Node::Float(x) => write!(f, "{}", format_float(*x)),
            Node::String(s) => write!(f, "{}", s),
            Node::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Node::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Int(i)
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Int(i as i64)
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Float(f)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Node::Map(map)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
