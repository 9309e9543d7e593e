//! Lazy containers
//!
//! Read-only views over the mappings and sequences of a loaded document.
//! Reading an element returns it as stored, except that formula strings are
//! evaluated on every read and nested mappings and sequences come back as
//! containers themselves.
//!
//! Every container knows the evaluation depth it was reached at. A formula
//! read through it runs one level deeper, so a cycle between cells runs
//! into the depth bound instead of recursing forever.

use crate::scope::DepthCounter;
use crate::session::Session;
use crate::value::Value;
use std::fmt;
use yamlcalc_core::{formula_payload, Error, Node, NodeMap, Result, TOP_KEY};

/// Resolve one stored element
///
/// `parent` builds the container holding the element at a given depth; a
/// formula sees it as `self` one level below `depth`.
fn wrap<'d>(
    session: &'d Session,
    node: &'d Node,
    depth: DepthCounter,
    parent: impl FnOnce(DepthCounter) -> Value<'d>,
) -> Result<Value<'d>> {
    Ok(match node {
        Node::Null => Value::None,
        Node::Bool(b) => Value::Bool(*b),
        Node::Int(i) => Value::Int(*i),
        Node::Float(f) => Value::Float(*f),
        Node::String(s) => match formula_payload(s) {
            Some(payload) => return session.evaluate_cell(payload, depth, parent),
            None => Value::Str(s.clone()),
        },
        Node::Seq(items) => Value::Seq(SeqContainer::new(session, items, depth)),
        Node::Map(map) => Value::Map(MapContainer::new(session, map, depth)),
    })
}

/// A mapping of the document
#[derive(Clone, Copy)]
pub struct MapContainer<'d> {
    session: &'d Session,
    node: &'d NodeMap,
    depth: DepthCounter,
}

impl<'d> MapContainer<'d> {
    pub(crate) fn new(session: &'d Session, node: &'d NodeMap, depth: DepthCounter) -> Self {
        Self {
            session,
            node,
            depth,
        }
    }

    /// Evaluation depth this container was reached at
    pub fn depth(&self) -> DepthCounter {
        self.depth
    }

    pub(crate) fn at_depth(self, depth: DepthCounter) -> Self {
        Self { depth, ..self }
    }

    /// Check if this is the document root
    pub fn is_root(&self) -> bool {
        std::ptr::eq(self.node, self.session.raw_root())
    }

    /// Check if two containers view the same mapping
    pub fn same_node(&self, other: &Self) -> bool {
        std::ptr::eq(self.node, other.node)
    }

    /// Read an element
    ///
    /// On the root, `_top` is the root itself whether or not the document
    /// has such a key.
    pub fn get(&self, key: &str) -> Result<Value<'d>> {
        if key == TOP_KEY && self.is_root() {
            return Ok(Value::Map(*self));
        }

        let node = self
            .node
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let this = *self;
        wrap(self.session, node, self.depth, |depth| Value::Map(this.at_depth(depth)))
    }

    /// Check if the mapping has a key
    pub fn contains_key(&self, key: &str) -> bool {
        self.node.contains_key(key)
    }

    /// Keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &'d str> + 'd {
        self.node.keys().map(String::as_str)
    }

    /// Elements in document order
    pub fn values(&self) -> impl Iterator<Item = Result<Value<'d>>> + 'd {
        self.iter().map(|(_, value)| value)
    }

    /// (key, element) pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&'d str, Result<Value<'d>>)> + 'd {
        let this = *self;
        self.node
            .iter()
            .map(move |(key, node)| {
                let value = wrap(this.session, node, this.depth, |depth| {
                    Value::Map(this.at_depth(depth))
                });
                (key.as_str(), value)
            })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.node.len()
    }

    /// Check if the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    /// Unevaluated content
    pub fn raw(&self) -> &'d NodeMap {
        self.node
    }

    /// Evaluate every element, recursively, into a plain node
    pub fn resolve(&self) -> Result<Node> {
        let mut out = NodeMap::with_capacity(self.len());
        for (key, value) in self.iter() {
            out.insert(key.to_string(), value?.to_node()?);
        }
        Ok(Node::Map(out))
    }
}

impl fmt::Debug for MapContainer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContainer")
            .field("keys", &self.node.keys().collect::<Vec<_>>())
            .field("root", &self.is_root())
            .field("depth", &self.depth.current())
            .finish()
    }
}

/// A sequence of the document
#[derive(Clone, Copy)]
pub struct SeqContainer<'d> {
    session: &'d Session,
    items: &'d [Node],
    depth: DepthCounter,
}

impl<'d> SeqContainer<'d> {
    pub(crate) fn new(session: &'d Session, items: &'d [Node], depth: DepthCounter) -> Self {
        Self {
            session,
            items,
            depth,
        }
    }

    /// Evaluation depth this container was reached at
    pub fn depth(&self) -> DepthCounter {
        self.depth
    }

    pub(crate) fn at_depth(self, depth: DepthCounter) -> Self {
        Self { depth, ..self }
    }

    /// Check if two containers view the same sequence
    pub fn same_node(&self, other: &Self) -> bool {
        std::ptr::eq(self.items, other.items)
    }

    /// Read an element
    pub fn get(&self, index: usize) -> Result<Value<'d>> {
        let node = self.items.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        let this = *self;
        wrap(self.session, node, self.depth, |depth| Value::Seq(this.at_depth(depth)))
    }

    /// Elements in document order
    pub fn iter(&self) -> impl Iterator<Item = Result<Value<'d>>> + 'd {
        let this = *self;
        self.items
            .iter()
            .map(move |node| {
                wrap(this.session, node, this.depth, |depth| {
                    Value::Seq(this.at_depth(depth))
                })
            })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unevaluated content
    pub fn raw(&self) -> &'d [Node] {
        self.items
    }

    /// Evaluate every element, recursively, into a plain node
    pub fn resolve(&self) -> Result<Node> {
        let items = self
            .iter()
            .map(|value| value?.to_node())
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::Seq(items))
    }
}

impl fmt::Debug for SeqContainer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqContainer")
            .field("len", &self.items.len())
            .field("depth", &self.depth.current())
            .finish()
    }
}
