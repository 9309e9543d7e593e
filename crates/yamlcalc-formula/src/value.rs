//! Values produced by formula evaluation

use crate::ast::Expr;
use crate::container::{MapContainer, SeqContainer};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionDef;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use yamlcalc_core::{format_float, Node, NodeMap, Result};

/// Ordered dictionary built by a formula (`{k: v}` literals, `dict` results)
pub type ValueMap<'d> = IndexMap<String, Value<'d>>;

/// Largest string or list a formula may build in one step
pub const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// Value types during formula evaluation
///
/// `'d` is the lifetime of the document the value may point into: nested
/// mappings and sequences of the document are handed out as lazy
/// containers rather than copies.
#[derive(Debug, Clone, Default)]
pub enum Value<'d> {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value<'d>>),
    Dict(ValueMap<'d>),
    /// A mapping of the document
    Map(MapContainer<'d>),
    /// A sequence of the document
    Seq(SeqContainer<'d>),
    Function(Callable),
}

/// Something that can be called from a formula
#[derive(Clone)]
pub enum Callable {
    /// Entry of the built-in function registry
    Builtin(&'static FunctionDef),
    /// Function declared in the definitions preamble
    User(Arc<UserFunction>),
}

/// A `def` from the definitions preamble
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
}

impl Callable {
    /// Name the function was declared with
    pub fn name(&self) -> &str {
        match self {
            Callable::Builtin(def) => def.name,
            Callable::User(func) => &func.name,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name())
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Builtin(a), Callable::Builtin(b)) => std::ptr::eq(*a, *b),
            (Callable::User(a), Callable::User(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'d> Value<'d> {
    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Map(_) => "mapping",
            Value::Seq(_) => "sequence",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness, as used by `if`, `and`, `or` and `not`
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Dict(map) => !map.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Seq(seq) => !seq.is_empty(),
            Value::Function(_) => true,
        }
    }

    /// Check if this is None
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Integer view of the value (booleans count as 0 and 1)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value (booleans and integers widen to float)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the value takes part in arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    /// Collect the items iteration would produce
    ///
    /// Mappings iterate over their keys, strings over their characters.
    /// Formula elements of document sequences are evaluated.
    pub fn iter_values(&self) -> FormulaResult<Vec<Value<'d>>> {
        match self {
            Value::List(items) => Ok(items.clone()),
            Value::Dict(map) => Ok(map.keys().map(|k| Value::Str(k.clone())).collect()),
            Value::Map(map) => Ok(map.keys().map(|k| Value::Str(k.to_string())).collect()),
            Value::Seq(seq) => Ok(seq.iter().collect::<Result<Vec<_>>>()?),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            other => Err(FormulaError::Type(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// Number of items, for `len`
    pub fn len(&self) -> FormulaResult<usize> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::List(items) => Ok(items.len()),
            Value::Dict(map) => Ok(map.len()),
            Value::Map(map) => Ok(map.len()),
            Value::Seq(seq) => Ok(seq.len()),
            other => Err(FormulaError::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        }
    }

    /// Convert into a fully evaluated document node
    ///
    /// Containers are resolved recursively. Functions become their
    /// `<function name>` text.
    pub fn to_node(&self) -> Result<Node> {
        Ok(match self {
            Value::None => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Int(i) => Node::Int(*i),
            Value::Float(f) => Node::Float(*f),
            Value::Str(s) => Node::String(s.clone()),
            Value::List(items) => Node::Seq(
                items
                    .iter()
                    .map(Value::to_node)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Dict(map) => {
                let mut out = NodeMap::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.to_node()?);
                }
                Node::Map(out)
            }
            Value::Map(map) => map.resolve()?,
            Value::Seq(seq) => seq.resolve()?,
            Value::Function(func) => Node::String(format!("<function {}>", func.name())),
        })
    }

    /// Text produced by `str(value)`
    pub fn to_text(&self) -> FormulaResult<String> {
        match self {
            Value::Str(s) => Ok(s.clone()),
            other => {
                let mut out = String::new();
                other.write_repr(&mut out)?;
                Ok(out)
            }
        }
    }

    /// Text of the value as it appears inside a printed collection
    pub fn repr(&self) -> FormulaResult<String> {
        let mut out = String::new();
        self.write_repr(&mut out)?;
        Ok(out)
    }

    fn write_repr(&self, out: &mut String) -> FormulaResult<()> {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&format_float(*f)),
            Value::Str(s) => quote_into(out, s),
            Value::List(items) => write_list(out, items.iter().map(|v| Ok(v.clone())))?,
            Value::Seq(seq) => write_list(out, seq.iter().map(|r| r.map_err(Into::into)))?,
            Value::Dict(map) => {
                write_dict(out, map.iter().map(|(k, v)| Ok((k.as_str(), v.clone()))))?
            }
            Value::Map(map) => {
                write_dict(out, map.iter().map(|(k, r)| Ok::<_, FormulaError>((k, r?))))?
            }
            Value::Function(func) => {
                out.push_str("<function ");
                out.push_str(func.name());
                out.push('>');
            }
        }
        Ok(())
    }

    /// Copy the value out of any document it borrows from
    ///
    /// Only plain data can outlive an evaluation; document containers
    /// are refused.
    pub fn into_detached(self) -> FormulaResult<Value<'static>> {
        Ok(match self {
            Value::None => Value::None,
            Value::Bool(b) => Value::Bool(b),
            Value::Int(i) => Value::Int(i),
            Value::Float(f) => Value::Float(f),
            Value::Str(s) => Value::Str(s),
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::into_detached)
                    .collect::<FormulaResult<Vec<_>>>()?,
            ),
            Value::Dict(map) => {
                let mut out = ValueMap::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key, value.into_detached()?);
                }
                Value::Dict(out)
            }
            Value::Function(func) => Value::Function(func),
            Value::Map(_) | Value::Seq(_) => {
                return Err(FormulaError::Type(
                    "document containers cannot be stored in definitions".into(),
                ))
            }
        })
    }
}

fn quote_into(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

fn write_list<'d, I>(out: &mut String, items: I) -> FormulaResult<()>
where
    I: Iterator<Item = FormulaResult<Value<'d>>>,
{
    out.push('[');
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item?.write_repr(out)?;
    }
    out.push(']');
    Ok(())
}

fn write_dict<'a, 'd, I>(out: &mut String, entries: I) -> FormulaResult<()>
where
    I: Iterator<Item = FormulaResult<(&'a str, Value<'d>)>>,
{
    out.push('{');
    for (i, entry) in entries.enumerate() {
        let (key, value) = entry?;
        if i > 0 {
            out.push_str(", ");
        }
        quote_into(out, key);
        out.push_str(": ");
        value.write_repr(out)?;
    }
    out.push('}');
    Ok(())
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a.same_node(b),
            (Value::Seq(a), Value::Seq(b)) => a.same_node(b),
            (Value::Function(a), Value::Function(b)) => a == b,
            (a, b) => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => x == y,
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            },
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value<'_> {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<'d> From<Vec<Value<'d>>> for Value<'d> {
    fn from(items: Vec<Value<'d>>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Int(-1).is_truthy());
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_ne!(Value::None, Value::Int(0));
    }

    #[test]
    fn test_repr() {
        let value = Value::List(vec![
            Value::Int(1),
            Value::Float(2.0),
            Value::from("a"),
            Value::None,
            Value::Bool(true),
        ]);
        assert_eq!(value.to_text().unwrap(), "[1, 2.0, 'a', None, True]");

        let mut map = ValueMap::new();
        map.insert("k".into(), Value::from("it's"));
        assert_eq!(Value::Dict(map).to_text().unwrap(), "{'k': \"it's\"}");

        assert_eq!(Value::from("plain").to_text().unwrap(), "plain");
    }

    #[test]
    fn test_to_node() {
        let value = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(
            value.to_node().unwrap(),
            Node::Seq(vec![Node::Int(1), Node::from("x")])
        );
        assert_eq!(Value::None.to_node().unwrap(), Node::Null);
    }

    #[test]
    fn test_iter_values() {
        let chars = Value::from("ab").iter_values().unwrap();
        assert_eq!(chars, vec![Value::from("a"), Value::from("b")]);
        assert!(Value::Int(3).iter_values().is_err());
    }

    #[test]
    fn test_into_detached() {
        let value = Value::List(vec![Value::Int(1), Value::from("x")]);
        let detached: Value<'static> = value.clone().into_detached().unwrap();
        assert_eq!(detached, value);
    }
}
