//! # yamlcalc
//!
//! Live YAML documents: string values starting with `=` are formulas,
//! evaluated against the rest of the document every time they are read.
//!
//! ## Features
//!
//! - Formulas see their enclosing container as `self`, root keys by name
//!   and the whole document as `_top`
//! - A `DEFS` preamble defines constants and helper functions
//! - A failing formula reads as `"Error!"`; the rest of the document is
//!   unaffected
//! - Views render to CSV, SVG charts, AsciiDoc attributes or plain YAML
//!
//! ## Example
//!
//! ```rust
//! use yamlcalc::prelude::*;
//!
//! let doc = Document::from_yaml_str(
//!     r#"
//! DEFS: |
//!   VAT = 0.25
//! items:
//!   net: 80
//!   gross: "=self['net'] * (1 + VAT)"
//! broken: "=1 / 0"
//! "#,
//!     &DocumentOptions::default(),
//! )
//! .unwrap();
//!
//! let resolved = doc.resolve().unwrap();
//! let items = resolved.get("items").unwrap();
//! assert_eq!(items.get("gross"), Some(&Node::Float(100.0)));
//! assert_eq!(resolved.get("broken"), Some(&Node::from("Error!")));
//! ```

pub mod document;
pub mod error;
pub mod prelude;
pub mod render;
pub mod view;
pub mod yaml;

pub use document::{load_document, Document, DocumentOptions};
pub use error::{Error, Result};
pub use render::{
    output_dir, prepare_output_dir, render_to_dir, render_view, resolve_view,
    write_asciidoc_attrs, write_raw, RenderOptions, ViewKind,
};
pub use view::{Segment, ViewError, ViewPath};
pub use yaml::{parse_yaml, to_yaml_string};

// Re-export core types
pub use yamlcalc_core::{
    formula_payload, is_formula, Error as CoreError, Node, NodeMap, Result as CoreResult,
    DEFS_FIELD, SELF_NAME, TOP_KEY, VIEW_FIELD,
};

// Re-export evaluation types
pub use yamlcalc_formula::{
    Definitions, EvalOptions, ExpressionEngine, FormulaError, FormulaResult, Interpreter,
    MapContainer, Scope, SeqContainer, Session, Value, FAILURE_SENTINEL,
};

// Re-export writers
pub use yamlcalc_chart::{
    Chart, ChartError, ChartKind, ChartOptions, DataSeries, Legend, LegendPosition, Style,
    SvgRenderer,
};
pub use yamlcalc_csv::{CsvError, CsvWriteOptions, CsvWriter, LineTerminator};
