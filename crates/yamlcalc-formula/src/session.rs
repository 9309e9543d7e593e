//! Evaluation session
//!
//! A session owns everything the formulas of one document share: the raw
//! tree, the definitions namespace, the expression engine and the options.
//! Containers borrow the session, so there is no global state.

use crate::container::MapContainer;
use crate::definitions::{Definitions, DEFAULT_MAX_DEPTH};
use crate::engine::ExpressionEngine;
use crate::scope::{DepthCounter, Overlay, Scope, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::value::Value;
use std::fmt;
use yamlcalc_core::{Error, NodeMap, Result, SELF_NAME};

/// Text substituted for a formula that failed to evaluate
pub const FAILURE_SENTINEL: &str = "Error!";

/// Options for formula evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    /// Deepest allowed nesting of formula evaluations and user function
    /// calls
    pub max_depth: usize,
    /// Append the failure reason to the sentinel, as `Error! (<reason>)`
    pub detailed_errors: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detailed_errors: false,
        }
    }
}

/// Shared evaluation state of one document
pub struct Session {
    root: NodeMap,
    definitions: Definitions,
    engine: Box<dyn ExpressionEngine>,
    options: EvalOptions,
}

impl Session {
    /// Create a session over a root mapping
    pub fn new(
        root: NodeMap,
        definitions: Definitions,
        engine: Box<dyn ExpressionEngine>,
        options: EvalOptions,
    ) -> Self {
        Self {
            root,
            definitions,
            engine,
            options,
        }
    }

    /// The root container
    pub fn root(&self) -> MapContainer<'_> {
        MapContainer::new(self, &self.root, DepthCounter::new(self.options.max_depth))
    }

    /// The unevaluated root mapping
    pub fn raw_root(&self) -> &NodeMap {
        &self.root
    }

    /// Definitions namespace
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Evaluation options
    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Evaluate one formula cell
    ///
    /// The cell was read at `depth` and runs one level below it. `parent`
    /// builds the container holding the cell, bound to `self`. Failures
    /// become the failure sentinel, except for exceeding the depth bound,
    /// which aborts the whole read.
    pub(crate) fn evaluate_cell<'d>(
        &'d self,
        payload: &str,
        depth: DepthCounter,
        parent: impl FnOnce(DepthCounter) -> Value<'d>,
    ) -> Result<Value<'d>> {
        let depth = depth
            .enter()
            .map_err(|_| Error::RecursionLimit(self.options.max_depth))?;

        let mut locals = Overlay::new(MapContainer::new(self, &self.root, depth));
        locals.set(SELF_NAME, parent(depth));
        let mut scope = Scope::new(&self.definitions, depth, locals);

        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.engine.evaluate(payload, &mut scope)
        });
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_fatal() => Err(Error::RecursionLimit(self.options.max_depth)),
            Err(err) => Ok(Value::Str(if self.options.detailed_errors {
                format!("{} ({})", FAILURE_SENTINEL, err)
            } else {
                FAILURE_SENTINEL.to_string()
            })),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("keys", &self.root.keys().collect::<Vec<_>>())
            .field("definitions", &self.definitions.names().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Interpreter;
    use pretty_assertions::assert_eq;
    use yamlcalc_core::Node;

    fn session(node: Node, defs: &str, options: EvalOptions) -> Session {
        let root = match node {
            Node::Map(map) => map,
            _ => panic!("test documents are mappings"),
        };
        let engine = Interpreter::new(options.max_depth);
        let definitions = engine.define(defs).unwrap();
        Session::new(root, definitions, Box::new(engine), options)
    }

    fn doc(pairs: &[(&str, Node)]) -> Node {
        let mut node = Node::map();
        for (key, value) in pairs {
            node.insert(*key, value.clone());
        }
        node
    }

    #[test]
    fn test_scalars_pass_through() {
        let s = session(
            doc(&[("n", Node::Int(3)), ("t", Node::from("plain")), ("z", Node::Null)]),
            "",
            EvalOptions::default(),
        );
        let root = s.root();
        assert_eq!(root.get("n").unwrap(), Value::Int(3));
        assert_eq!(root.get("t").unwrap(), Value::from("plain"));
        assert_eq!(root.get("z").unwrap(), Value::None);
    }

    #[test]
    fn test_formula_sees_self_root_and_definitions() {
        let mut inner = Node::map();
        inner.insert("a", 1);
        inner.insert("b", "=self['a'] + base + BONUS");
        let s = session(
            doc(&[("base", Node::Int(10)), ("inner", inner)]),
            "BONUS = 100",
            EvalOptions::default(),
        );

        let inner = match s.root().get("inner").unwrap() {
            Value::Map(map) => map,
            other => panic!("expected a mapping, got {:?}", other),
        };
        assert_eq!(inner.get("b").unwrap(), Value::Int(111));
    }

    #[test]
    fn test_top_only_on_root() {
        let mut inner = Node::map();
        inner.insert("x", 1);
        let s = session(doc(&[("inner", inner)]), "", EvalOptions::default());

        let root = s.root();
        assert!(matches!(root.get("_top").unwrap(), Value::Map(m) if m.is_root()));

        let inner = match root.get("inner").unwrap() {
            Value::Map(map) => map,
            other => panic!("expected a mapping, got {:?}", other),
        };
        assert_eq!(
            inner.get("_top").unwrap_err(),
            Error::KeyNotFound("_top".into())
        );
    }

    #[test]
    fn test_failure_sentinel() {
        let s = session(
            doc(&[("bad", Node::from("=1/0")), ("ok", Node::from("=2"))]),
            "",
            EvalOptions::default(),
        );
        assert_eq!(s.root().get("bad").unwrap(), Value::from("Error!"));
        assert_eq!(s.root().get("ok").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_detailed_failure_sentinel() {
        let options = EvalOptions {
            detailed_errors: true,
            ..EvalOptions::default()
        };
        let s = session(doc(&[("bad", Node::from("=missing"))]), "", options);
        assert_eq!(
            s.root().get("bad").unwrap(),
            Value::from("Error! (Name 'missing' is not defined)")
        );
    }

    #[test]
    fn test_self_reference_hits_depth_bound() {
        let options = EvalOptions {
            max_depth: 16,
            ..EvalOptions::default()
        };
        let s = session(doc(&[("a", Node::from("=a + 1"))]), "", options);
        assert_eq!(s.root().get("a").unwrap_err(), Error::RecursionLimit(16));
        assert_eq!(s.root().get("a").unwrap_err(), Error::RecursionLimit(16));
        assert_eq!(s.root().depth().current(), 0);
    }

    #[test]
    fn test_default_depth_bound_on_spawned_thread() {
        let handle = std::thread::spawn(|| {
            let s = session(
                doc(&[
                    ("a0", Node::from("=a0 + 1")),
                    ("c", Node::from("=sum([x + c for x in [1]])")),
                    ("d", Node::from("=e")),
                    ("e", Node::from("=[d]")),
                ]),
                "",
                EvalOptions::default(),
            );
            let root = s.root();
            let errors = (
                root.get("a0").unwrap_err(),
                root.get("c").unwrap_err(),
                root.get("d").unwrap_err(),
            );
            errors
        });

        let limit = Error::RecursionLimit(DEFAULT_MAX_DEPTH);
        assert_eq!(handle.join().unwrap(), (limit.clone(), limit.clone(), limit));
    }

    #[test]
    fn test_chain_below_default_bound_on_spawned_thread() {
        let handle = std::thread::spawn(|| {
            let mut root = Node::map();
            for i in 0..90 {
                root.insert(format!("a{}", i), format!("=a{} + 1", i + 1));
            }
            root.insert("a90", 0);
            let s = session(root, "", EvalOptions::default());
            let total = s.root().get("a0").unwrap().as_int();
            total
        });
        assert_eq!(handle.join().unwrap(), Some(90));
    }

    #[test]
    fn test_sequence_formulas_bind_self_to_sequence() {
        let items = Node::Seq(vec![Node::Int(4), Node::from("=self[0] * 2")]);
        let s = session(doc(&[("items", items)]), "", EvalOptions::default());

        let seq = match s.root().get("items").unwrap() {
            Value::Seq(seq) => seq,
            other => panic!("expected a sequence, got {:?}", other),
        };
        assert_eq!(seq.get(1).unwrap(), Value::Int(8));
        assert_eq!(
            seq.get(2).unwrap_err(),
            Error::IndexOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn test_resolve_preserves_order() {
        let s = session(
            doc(&[
                ("z", Node::Int(1)),
                ("b", Node::from("=z + 1")),
                ("y", Node::from("text")),
                ("a", Node::Seq(vec![Node::from("=1+1")])),
                ("m", Node::Null),
            ]),
            "",
            EvalOptions::default(),
        );

        let resolved = s.root().resolve().unwrap();
        let mut expected = Node::map();
        expected.insert("z", 1);
        expected.insert("b", 2);
        expected.insert("y", "text");
        expected.insert("a", vec![2]);
        expected.insert("m", Node::Null);
        assert_eq!(resolved, expected);
        assert_eq!(
            s.root().keys().collect::<Vec<_>>(),
            vec!["z", "b", "y", "a", "m"]
        );
    }

    #[test]
    fn test_session_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}
