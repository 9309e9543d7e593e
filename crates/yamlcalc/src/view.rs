//! View path queries
//!
//! A view is a sub-tree of the document located by a small path language:
//!
//! - `$` is the document root
//! - `.name` selects a mapping key
//! - `[0]` selects a sequence element
//! - `['name']` and `["name"]` select keys that contain dots or brackets
//!
//! The leading `$` may be left out, so `report.chart` and `$.report.chart`
//! are the same path.

use std::fmt;
use std::str::FromStr;

use lazy_regex::regex;
use thiserror::Error;
use yamlcalc_core::{Error as CoreError, Node};
use yamlcalc_formula::{MapContainer, Value};

/// Errors locating a view
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// The path text is malformed
    #[error("Invalid view path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A step of the path names an absent key or index
    #[error("View '{path}' not found: {source}")]
    NotFound { path: String, source: CoreError },

    /// A step of the path indexes into a scalar, or uses the wrong kind of
    /// step for its container
    #[error("View '{path}' cannot be reached: {message}")]
    NotIndexable { path: String, message: String },

    /// Evaluating the view's cells failed fatally
    #[error(transparent)]
    Document(#[from] CoreError),
}

/// One step of a view path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) if is_plain_key(key) => write!(f, ".{}", key),
            Segment::Key(key) => write!(f, "['{}']", key),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && regex!(r"^[^.\[\]'\s]+$").is_match(key)
}

/// A parsed view path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPath {
    segments: Vec<Segment>,
}

impl ViewPath {
    /// The path of the document root
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// A path of a single top-level key
    pub fn field<S: Into<String>>(key: S) -> Self {
        Self {
            segments: vec![Segment::Key(key.into())],
        }
    }

    /// Parse path text
    pub fn parse(text: &str) -> Result<Self, ViewError> {
        let invalid = |message: String| ViewError::InvalidPath {
            path: text.to_string(),
            message,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid("path is empty".into()));
        }

        let mut rest = match trimmed.strip_prefix('$') {
            Some(rest) => rest.to_string(),
            None if trimmed.starts_with('[') => trimmed.to_string(),
            None => format!(".{}", trimmed),
        };

        let step = regex!(r#"^(?:\.([^.\[\]'\s]+)|\[(\d+)\]|\['([^']*)'\]|\["([^"]*)"\])"#);
        let mut segments = Vec::new();
        while !rest.is_empty() {
            let captures = step
                .captures(&rest)
                .ok_or_else(|| invalid(format!("unexpected '{}'", rest)))?;

            let segment = if let Some(index) = captures.get(2) {
                let index = index
                    .as_str()
                    .parse()
                    .map_err(|_| invalid(format!("index {} is too large", index.as_str())))?;
                Segment::Index(index)
            } else {
                let key = captures
                    .get(1)
                    .or_else(|| captures.get(3))
                    .or_else(|| captures.get(4))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                Segment::Key(key)
            };
            segments.push(segment);

            let consumed = captures.get(0).map_or(0, |m| m.end());
            rest = rest[consumed..].to_string();
        }

        Ok(Self { segments })
    }

    /// Steps from the root
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk the path from the root container
    ///
    /// Formula cells met along the way are evaluated, so a path may step
    /// into a mapping or list computed by a formula.
    pub fn resolve<'d>(&self, root: MapContainer<'d>) -> Result<Value<'d>, ViewError> {
        let mut current = Value::Map(root);
        for segment in &self.segments {
            let not_found = |source: CoreError| self.failure(source);
            current = match (&current, segment) {
                (Value::Map(map), Segment::Key(key)) => map.get(key).map_err(not_found)?,
                (Value::Seq(seq), Segment::Index(index)) => seq.get(*index).map_err(not_found)?,
                (Value::Dict(dict), Segment::Key(key)) => dict
                    .get(key)
                    .cloned()
                    .ok_or_else(|| not_found(CoreError::KeyNotFound(key.clone())))?,
                (Value::List(items), Segment::Index(index)) => {
                    items.get(*index).cloned().ok_or_else(|| {
                        not_found(CoreError::IndexOutOfRange {
                            index: *index,
                            len: items.len(),
                        })
                    })?
                }
                (other, segment) => {
                    return Err(ViewError::NotIndexable {
                        path: self.to_string(),
                        message: format!("cannot apply '{}' to a value of type {}", segment, other.type_name()),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Walk the path and evaluate everything below it into a plain tree
    pub fn resolve_node(&self, root: MapContainer<'_>) -> Result<Node, ViewError> {
        Ok(self.resolve(root)?.to_node()?)
    }

    fn failure(&self, source: CoreError) -> ViewError {
        if source.is_lookup() {
            ViewError::NotFound {
                path: self.to_string(),
                source,
            }
        } else {
            ViewError::Document(source)
        }
    }
}

impl fmt::Display for ViewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for ViewPath {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, ViewError> {
        Self::parse(s)
    }
}
