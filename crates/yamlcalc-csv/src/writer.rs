//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::{CsvWriteOptions, LineTerminator};
use crate::table::TableView;
use tracing::debug;
use yamlcalc_core::Node;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a resolved table view to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        view: &Node,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(view, file, options)
    }

    /// Write a resolved table view to a writer
    pub fn write<W: Write>(view: &Node, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let table = TableView::from_node(view)?;
        Self::write_table(&table, writer, options)
    }

    /// Write a table to a writer
    ///
    /// Cells are written in their display form: null cells are empty,
    /// booleans are `True`/`False`. Rows may have different lengths.
    pub fn write_table<W: Write>(
        table: &TableView<'_>,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
            LineTerminator::CR => csv::Terminator::Any(b'\r'),
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        if options.write_header {
            if let Some(cols) = table.cols {
                csv_writer.write_record(cols.iter().map(Node::to_string))?;
            }
        }

        for row in table.records() {
            csv_writer.write_record(row.iter().map(Node::to_string))?;
        }

        csv_writer.flush()?;
        debug!(rows = table.row_count(), "wrote csv table");
        Ok(())
    }

    /// Render a resolved table view to a string
    pub fn to_string(view: &Node, options: &CsvWriteOptions) -> CsvResult<String> {
        let mut buffer = Vec::new();
        Self::write(view, &mut buffer, options)?;
        String::from_utf8(buffer).map_err(|e| CsvError::Table(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sales() -> Node {
        let mut view = Node::map();
        view.insert("type", "csv");
        view.insert("cols", vec!["item", "price", "in stock"]);
        view.insert(
            "rows",
            Node::Seq(vec![
                Node::Seq(vec!["apple".into(), 1.5.into(), true.into()]),
                Node::Seq(vec!["pear, green".into(), 2.into(), Node::Null]),
                Node::Seq(vec!["Error!".into()]),
            ]),
        );
        view
    }

    #[test]
    fn test_write_with_header() {
        let text = CsvWriter::to_string(&sales(), &CsvWriteOptions::default()).unwrap();
        assert_eq!(
            text,
            "item,price,in stock\r\napple,1.5,True\r\n\"pear, green\",2,\r\nError!\r\n"
        );
    }

    #[test]
    fn test_write_options() {
        let options = CsvWriteOptions {
            delimiter: b';',
            write_header: false,
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::default()
        };
        let text = CsvWriter::to_string(&sales(), &options).unwrap();
        assert_eq!(text, "apple;1.5;True\npear, green;2;\nError!\n");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        CsvWriter::write_file(&sales(), &path, &CsvWriteOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("item,price,in stock\r\n"));
        assert_eq!(written.lines().count(), 4);
    }

    #[test]
    fn test_write_rejects_non_table() {
        let err = CsvWriter::to_string(&Node::Int(1), &CsvWriteOptions::default()).unwrap_err();
        assert!(matches!(err, CsvError::Table(_)));
    }
}
