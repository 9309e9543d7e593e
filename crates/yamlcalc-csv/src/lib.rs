//! # yamlcalc-csv
//!
//! CSV export of table views.
//!
//! A table view is a mapping with an optional `cols` header row and a
//! `rows` sequence, each row a sequence of cells:
//!
//! ```rust
//! use yamlcalc_core::Node;
//! use yamlcalc_csv::{CsvWriteOptions, CsvWriter};
//!
//! let mut view = Node::map();
//! view.insert("cols", vec!["item", "qty"]);
//! view.insert("rows", Node::Seq(vec![Node::Seq(vec!["apple".into(), 3.into()])]));
//!
//! let text = CsvWriter::to_string(&view, &CsvWriteOptions::default()).unwrap();
//! assert_eq!(text, "item,qty\r\napple,3\r\n");
//! ```

mod error;
mod options;
pub mod table;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvWriteOptions, LineTerminator};
pub use table::TableView;
pub use writer::CsvWriter;
