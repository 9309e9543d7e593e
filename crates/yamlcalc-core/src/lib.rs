//! # yamlcalc-core
//!
//! Core data structures for the yamlcalc live-document engine.
//!
//! This crate provides the fundamental types used throughout yamlcalc:
//! - [`Node`] - The raw, parsed document tree (scalars, sequences, ordered mappings)
//! - [`formula_payload`] - Detection of formula cells (strings starting with `=`)
//! - [`Error`] - Errors shared by the document model, the binder and the containers
//!
//! ## Example
//!
//! ```rust
//! use yamlcalc_core::{formula_payload, Node};
//!
//! let mut root = Node::map();
//! root.insert("price", 10);
//! root.insert("total", "= price * 2");
//!
//! assert_eq!(root.get("price"), Some(&Node::Int(10)));
//! assert_eq!(formula_payload(" = price * 2"), Some(" price * 2"));
//! ```

pub mod error;
pub mod formula;
pub mod node;

// Re-exports for convenience
pub use error::{Error, Result};
pub use formula::{formula_payload, is_formula, FORMULA_MARKER};
pub use node::{format_float, Node, NodeMap};

/// Reserved key that resolves to the document root when read from the root container
pub const TOP_KEY: &str = "_top";

/// Name under which a formula sees its enclosing container
pub const SELF_NAME: &str = "self";

/// Default top-level field holding the definitions preamble
pub const DEFS_FIELD: &str = "DEFS";

/// Default top-level field holding the view configuration
pub const VIEW_FIELD: &str = "VIEW";
