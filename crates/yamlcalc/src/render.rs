//! View rendering
//!
//! A view's `type` picks one of four writers:
//!
//! | type             | output       | content                                  |
//! |------------------|--------------|------------------------------------------|
//! | `csv`            | `data.csv`   | `cols` header and `rows`                 |
//! | `chart`          | `chart.svg`  | chart drawn from `cols` and `rows`       |
//! | `asciidoc-attrs` | `attrs.adoc` | one `{set:key:value}` line per `value`   |
//! | `raw`            | `raw.yml`    | the whole evaluated document as YAML     |
//!
//! A view without `type` is `raw`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use yamlcalc_chart::{Chart, ChartOptions, SvgRenderer};
use yamlcalc_core::{Node, VIEW_FIELD};
use yamlcalc_csv::{CsvWriteOptions, CsvWriter};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::view::ViewPath;
use crate::yaml::to_yaml_string;

/// Key of a view naming its writer
pub const TYPE_KEY: &str = "type";

/// Key of an attribute view's entries
pub const VALUE_KEY: &str = "value";

/// Writers a view can select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// CSV table
    Csv,
    /// SVG chart
    Chart,
    /// AsciiDoc attribute definitions
    AsciidocAttrs,
    /// Evaluated document as YAML
    Raw,
}

impl ViewKind {
    /// All kinds
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Csv,
        ViewKind::Chart,
        ViewKind::AsciidocAttrs,
        ViewKind::Raw,
    ];

    /// Name used as a view's `type`
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Csv => "csv",
            ViewKind::Chart => "chart",
            ViewKind::AsciidocAttrs => "asciidoc-attrs",
            ViewKind::Raw => "raw",
        }
    }

    /// Look up a kind by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// File written into the output directory
    pub fn file_name(self) -> &'static str {
        match self {
            ViewKind::Csv => "data.csv",
            ViewKind::Chart => "chart.svg",
            ViewKind::AsciidocAttrs => "attrs.adoc",
            ViewKind::Raw => "raw.yml",
        }
    }

    /// Kind selected by a resolved view
    pub fn of(view: &Node) -> Result<Self> {
        match view.get(TYPE_KEY) {
            None | Some(Node::Null) => Ok(ViewKind::Raw),
            Some(Node::String(name)) => {
                Self::from_name(name).ok_or_else(|| Error::UnsupportedView(name.clone()))
            }
            Some(other) => Err(Error::UnsupportedView(other.to_string())),
        }
    }
}

/// Options for the writers
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// CSV writer options
    pub csv: CsvWriteOptions,
    /// Chart defaults
    pub chart: ChartOptions,
}

/// Locate and evaluate a view
///
/// With no path, the `VIEW` field is used; a document without one gets an
/// empty view, which renders as `raw`.
pub fn resolve_view(document: &Document, path: Option<&ViewPath>) -> Result<Node> {
    match path {
        Some(path) => Ok(path.resolve_node(document.root())?),
        None if document.root().contains_key(VIEW_FIELD) => {
            Ok(ViewPath::field(VIEW_FIELD).resolve_node(document.root())?)
        }
        None => Ok(Node::map()),
    }
}

/// Write a resolved view with the writer its `type` selects
pub fn render_view<W: Write>(
    document: &Document,
    view: &Node,
    writer: W,
    options: &RenderOptions,
) -> Result<ViewKind> {
    let kind = ViewKind::of(view)?;
    match kind {
        ViewKind::Csv => CsvWriter::write(view, writer, &options.csv)?,
        ViewKind::Chart => {
            let chart = Chart::from_view_with(view, &options.chart)?;
            SvgRenderer::write(&chart, writer)?;
        }
        ViewKind::AsciidocAttrs => write_asciidoc_attrs(view, writer)?,
        ViewKind::Raw => write_raw(document, writer)?,
    }
    Ok(kind)
}

/// Write `{set:key:value}` for every entry of the view's `value` mapping
pub fn write_asciidoc_attrs<W: Write>(view: &Node, mut writer: W) -> Result<()> {
    let entries = match view.get(VALUE_KEY) {
        Some(Node::Map(entries)) => entries,
        Some(other) => {
            return Err(Error::InvalidView(format!(
                "'{}' must be a mapping, found {}",
                VALUE_KEY,
                other.type_name()
            )))
        }
        None => return Err(Error::InvalidView(format!("missing '{}'", VALUE_KEY))),
    };

    for (key, value) in entries {
        writeln!(writer, "{{set:{}:{}}}", key, value)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the whole evaluated document as YAML
pub fn write_raw<W: Write>(document: &Document, mut writer: W) -> Result<()> {
    let text = to_yaml_string(&document.resolve()?)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Output directory for an input file: its path without the extension
pub fn output_dir<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("")
}

/// Create the output directory unless it exists
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Render a view into `outdir`, returning the written file
pub fn render_to_dir(
    document: &Document,
    path: Option<&ViewPath>,
    outdir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let view = resolve_view(document, path)?;
    let kind = ViewKind::of(&view)?;

    prepare_output_dir(outdir)?;
    let target = outdir.join(kind.file_name());
    let file = BufWriter::new(File::create(&target)?);
    render_view(document, &view, file, options)?;

    info!(kind = kind.name(), path = %target.display(), "rendered view");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentOptions;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_yaml_str(text, &DocumentOptions::default()).unwrap()
    }

    fn render(document: &Document, view: &Node) -> String {
        let mut out = Vec::new();
        render_view(document, view, &mut out, &RenderOptions::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_view_kind() {
        for kind in ViewKind::ALL {
            assert_eq!(ViewKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ViewKind::of(&Node::map()).unwrap(), ViewKind::Raw);

        let mut view = Node::map();
        view.insert("type", "pdf");
        assert_eq!(
            ViewKind::of(&view).unwrap_err().to_string(),
            "Unsupported writer: pdf"
        );
    }

    #[test]
    fn test_asciidoc_attrs() {
        let d = doc("price: 3\nVIEW:\n  type: asciidoc-attrs\n  value:\n    total: '=price * 2'\n    name: widget\n    ratio: '=price / 2'\n");
        let view = resolve_view(&d, None).unwrap();
        assert_eq!(
            render(&d, &view),
            "{set:total:6}\n{set:name:widget}\n{set:ratio:1.5}\n"
        );
    }

    #[test]
    fn test_asciidoc_attrs_needs_mapping() {
        let mut view = Node::map();
        view.insert("type", "asciidoc-attrs");
        view.insert("value", vec![1]);
        let mut out = Vec::new();
        let err = write_asciidoc_attrs(&view, &mut out).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid view: 'value' must be a mapping, found sequence"
        );
    }

    #[test]
    fn test_raw_resolves_document() {
        let d = doc("a: 2\nb: '=a ** 3'\nc: [x, '=len(self)']\n");
        assert_eq!(render(&d, &Node::map()), "a: 2\nb: 8\nc:\n- x\n- 2\n");
    }

    #[test]
    fn test_default_view_without_field() {
        let d = doc("a: 1\n");
        assert_eq!(resolve_view(&d, None).unwrap(), Node::map());
    }

    #[test]
    fn test_output_dir() {
        assert_eq!(output_dir("reports/q1.yml"), PathBuf::from("reports/q1"));
        assert_eq!(output_dir("plain"), PathBuf::from("plain"));
    }

    #[test]
    fn test_prepare_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        prepare_output_dir(&nested).unwrap();

        let file = dir.path().join("taken");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            prepare_output_dir(&file),
            Err(Error::NotADirectory(path)) if path == file
        ));
    }
}
