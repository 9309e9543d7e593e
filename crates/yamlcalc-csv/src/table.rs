//! Table views

use crate::error::{CsvError, CsvResult};
use yamlcalc_core::Node;

/// Key of the optional header row
pub const COLS_KEY: &str = "cols";

/// Key of the data rows
pub const ROWS_KEY: &str = "rows";

/// A resolved view with the shape of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableView<'a> {
    /// Header row, if the view has one
    pub cols: Option<&'a [Node]>,
    /// Data rows, each a sequence of cells
    pub rows: &'a [Node],
}

impl<'a> TableView<'a> {
    /// Borrow the table out of a resolved view
    ///
    /// The view must be a mapping with a `rows` sequence whose entries are
    /// sequences. `cols`, when present, must be a sequence. Other keys are
    /// ignored.
    pub fn from_node(view: &'a Node) -> CsvResult<Self> {
        let map = view.as_map().ok_or_else(|| {
            CsvError::Table(format!("expected a mapping, found {}", view.type_name()))
        })?;

        let cols = match map.get(COLS_KEY) {
            None => None,
            Some(Node::Seq(cols)) => Some(cols.as_slice()),
            Some(other) => {
                return Err(CsvError::Table(format!(
                    "'{}' must be a sequence, found {}",
                    COLS_KEY,
                    other.type_name()
                )))
            }
        };

        let rows = match map.get(ROWS_KEY) {
            Some(Node::Seq(rows)) => rows.as_slice(),
            Some(other) => {
                return Err(CsvError::Table(format!(
                    "'{}' must be a sequence, found {}",
                    ROWS_KEY,
                    other.type_name()
                )))
            }
            None => return Err(CsvError::Table(format!("missing '{}'", ROWS_KEY))),
        };

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| !row.is_seq()) {
            return Err(CsvError::Table(format!(
                "row {} must be a sequence, found {}",
                index,
                row.type_name()
            )));
        }

        Ok(Self { cols, rows })
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of each data row
    pub fn records(&self) -> impl Iterator<Item = &'a [Node]> + 'a {
        self.rows.iter().filter_map(Node::as_seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view(cols: Option<Node>, rows: Node) -> Node {
        let mut node = Node::map();
        if let Some(cols) = cols {
            node.insert(COLS_KEY, cols);
        }
        node.insert(ROWS_KEY, rows);
        node.insert("type", "csv");
        node
    }

    #[test]
    fn test_from_node() {
        let node = view(
            Some(Node::from(vec!["a", "b"])),
            Node::Seq(vec![Node::from(vec![1, 2]), Node::from(vec![3, 4])]),
        );
        let table = TableView::from_node(&node).unwrap();
        assert_eq!(table.cols.map(|c| c.len()), Some(2));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.records().next(), Some(&[Node::Int(1), Node::Int(2)][..]));
    }

    #[test]
    fn test_header_is_optional() {
        let node = view(None, Node::Seq(vec![]));
        let table = TableView::from_node(&node).unwrap();
        assert!(table.cols.is_none());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = TableView::from_node(&Node::from(vec![1])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid table view: expected a mapping, found sequence");

        let err = TableView::from_node(&Node::map()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid table view: missing 'rows'");

        let node = view(None, Node::Seq(vec![Node::from(vec![1]), Node::Int(2)]));
        let err = TableView::from_node(&node).unwrap_err();
        assert_eq!(err.to_string(), "Invalid table view: row 1 must be a sequence, found integer");

        let node = view(Some(Node::from("a,b")), Node::Seq(vec![]));
        let err = TableView::from_node(&node).unwrap_err();
        assert_eq!(err.to_string(), "Invalid table view: 'cols' must be a sequence, found string");
    }
}
