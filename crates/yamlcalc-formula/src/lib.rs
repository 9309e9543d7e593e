//! # yamlcalc-formula
//!
//! Formula language and lazy evaluation for yamlcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST) for a small expression language
//! - Formula evaluation (AST → value) against a write-isolated scope
//! - Built-in functions (`sum`, `len`, `round`, ...)
//! - The definitions preamble (shared constants and helper functions)
//! - Lazy containers that evaluate formula cells when they are read
//!
//! ## Example
//!
//! ```rust
//! use yamlcalc_core::Node;
//! use yamlcalc_formula::{EvalOptions, ExpressionEngine, Interpreter, Session, Value};
//!
//! let mut root = Node::map();
//! root.insert("price", 40);
//! root.insert("total", "=price * QTY");
//!
//! let engine = Interpreter::default();
//! let definitions = engine.define("QTY = 3").unwrap();
//! let session = Session::new(
//!     root.as_map().unwrap().clone(),
//!     definitions,
//!     Box::new(engine),
//!     EvalOptions::default(),
//! );
//!
//! assert_eq!(session.root().get("total").unwrap(), Value::Int(120));
//! ```

pub mod ast;
pub mod container;
pub mod definitions;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod scope;
pub mod session;
pub mod value;

pub use ast::{BinaryOperator, CompareOperator, Expr, Statement, UnaryOperator};
pub use container::{MapContainer, SeqContainer};
pub use definitions::Definitions;
pub use engine::{ExpressionEngine, Interpreter};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::evaluate;
pub use parser::{parse_definitions, parse_expression, parse_formula};
pub use scope::{DepthCounter, Overlay, Scope};
pub use session::{EvalOptions, Session, FAILURE_SENTINEL};
pub use value::{Callable, UserFunction, Value, ValueMap};
