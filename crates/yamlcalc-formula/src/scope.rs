//! Evaluation scope
//!
//! A formula sees three namespaces: its local overlay (`self`, comprehension
//! variables) layered over the document root, then the definitions
//! namespace, then the built-in functions.

use crate::container::MapContainer;
use crate::definitions::Definitions;
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::value::{Callable, Value};
use ahash::AHashMap;
use yamlcalc_core::{Result, TOP_KEY};

/// Read-through mapping that keeps its writes to itself
///
/// Reads consult the local writes first and fall through to the base
/// mapping. Writes and removals only ever touch the local layer, so the
/// base document is never modified. The overlay lives for one evaluation.
#[derive(Debug, Default)]
pub struct Overlay<'d> {
    base: Option<MapContainer<'d>>,
    writes: AHashMap<String, Value<'d>>,
}

impl<'d> Overlay<'d> {
    /// Create an overlay on top of a document mapping
    pub fn new(base: MapContainer<'d>) -> Self {
        Self {
            base: Some(base),
            writes: AHashMap::new(),
        }
    }

    /// Create an overlay with nothing underneath
    pub fn detached() -> Self {
        Self::default()
    }

    /// Look up a key
    ///
    /// Returns `None` when neither layer has the key. Reading a formula cell
    /// of the base evaluates it.
    pub fn get(&self, key: &str) -> Result<Option<Value<'d>>> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }

        match self.base {
            Some(base) if base.contains_key(key) || (key == TOP_KEY && base.is_root()) => {
                base.get(key).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Check if the key was written in this overlay
    pub fn is_written(&self, key: &str) -> bool {
        self.writes.contains_key(key)
    }

    /// Value written to this overlay, ignoring the base
    pub fn local(&self, key: &str) -> Option<&Value<'d>> {
        self.writes.get(key)
    }

    /// Write a key, returning the value it shadowed in this overlay
    pub fn set<K: Into<String>>(&mut self, key: K, value: Value<'d>) -> Option<Value<'d>> {
        self.writes.insert(key.into(), value)
    }

    /// Remove a local write; the base shows through again
    pub fn remove(&mut self, key: &str) -> Option<Value<'d>> {
        self.writes.remove(key)
    }
}

/// Stack left before a nested evaluation switches to a fresh segment
pub(crate) const STACK_RED_ZONE: usize = 1024 * 1024;

/// Size of each stack segment added for deep evaluations
pub(crate) const STACK_GROW_SIZE: usize = 8 * 1024 * 1024;

/// Bound on nested evaluations
///
/// A counter is a plain value: entering a level yields the counter for
/// that level and leaves the original untouched. Scopes and containers
/// carry the counter of the level they belong to, so every formula read
/// and every user function call runs one level below its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthCounter {
    max: usize,
    current: usize,
}

impl DepthCounter {
    /// Create a top-level counter allowing `max` nested levels
    pub fn new(max: usize) -> Self {
        Self { max, current: 0 }
    }

    /// Maximum nesting
    pub fn max(&self) -> usize {
        self.max
    }

    /// Current nesting
    pub fn current(&self) -> usize {
        self.current
    }

    /// Counter for the next level down
    pub fn enter(self) -> FormulaResult<Self> {
        let next = self.current + 1;
        if next > self.max {
            return Err(FormulaError::RecursionLimit(self.max));
        }
        Ok(Self {
            current: next,
            ..self
        })
    }
}

/// Everything a formula can see while it is evaluated
#[derive(Debug)]
pub struct Scope<'a, 'd> {
    definitions: &'a Definitions,
    depth: DepthCounter,
    locals: Overlay<'d>,
}

impl<'a, 'd> Scope<'a, 'd> {
    /// Create a new scope
    pub fn new(definitions: &'a Definitions, depth: DepthCounter, locals: Overlay<'d>) -> Self {
        Self {
            definitions,
            depth,
            locals,
        }
    }

    /// Resolve a bare name
    pub fn lookup(&self, name: &str) -> FormulaResult<Value<'d>> {
        if let Some(value) = self.locals.get(name)? {
            return Ok(value);
        }

        if let Some(value) = self.definitions.get(name) {
            return Ok(value.clone());
        }

        if let Some(def) = functions::lookup(name) {
            return Ok(Value::Function(Callable::Builtin(def)));
        }

        Err(FormulaError::Name(name.to_string()))
    }

    /// Definitions namespace
    pub fn definitions(&self) -> &'a Definitions {
        self.definitions
    }

    /// Depth bound shared by nested evaluations
    pub fn depth(&self) -> DepthCounter {
        self.depth
    }

    /// Local overlay
    pub fn locals(&self) -> &Overlay<'d> {
        &self.locals
    }

    /// Local overlay, for binding variables
    pub fn locals_mut(&mut self) -> &mut Overlay<'d> {
        &mut self.locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detached_overlay() {
        let mut overlay = Overlay::detached();
        assert_eq!(overlay.get("x").unwrap(), None);

        assert_eq!(overlay.set("x", Value::Int(1)), None);
        assert_eq!(overlay.get("x").unwrap(), Some(Value::Int(1)));
        assert_eq!(overlay.set("x", Value::Int(2)), Some(Value::Int(1)));

        assert_eq!(overlay.remove("x"), Some(Value::Int(2)));
        assert!(!overlay.is_written("x"));
        assert_eq!(overlay.get("x").unwrap(), None);
    }

    #[test]
    fn test_depth_counter() {
        let top = DepthCounter::new(2);
        let first = top.enter().unwrap();
        let second = first.enter().unwrap();
        assert_eq!(top.current(), 0);
        assert_eq!(second.current(), 2);
        assert_eq!(second.max(), 2);
        assert_eq!(
            second.enter().unwrap_err(),
            FormulaError::RecursionLimit(2)
        );

        // Siblings start from the same level
        assert_eq!(top.enter().unwrap(), first);
    }

    #[test]
    fn test_scope_lookup_order() {
        let mut definitions = Definitions::new();
        definitions.insert("len", Value::Int(7));
        definitions.insert("rate", Value::Float(0.5));

        let mut locals = Overlay::detached();
        locals.set("rate", Value::Int(1));
        let scope = Scope::new(&definitions, DepthCounter::new(8), locals);

        // Locals shadow definitions, definitions shadow built-ins
        assert_eq!(scope.lookup("rate").unwrap(), Value::Int(1));
        assert_eq!(scope.lookup("len").unwrap(), Value::Int(7));
        assert!(matches!(scope.lookup("sum").unwrap(), Value::Function(_)));
        assert_eq!(
            scope.lookup("nope").unwrap_err(),
            FormulaError::Name("nope".into())
        );
    }
}
