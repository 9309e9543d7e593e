//! Rendering views of a live document into files

use std::fs;

use pretty_assertions::assert_eq;
use yamlcalc::prelude::*;
use yamlcalc::{CsvWriteOptions, LineTerminator, ViewError};

const BUDGET: &str = r#"
DEFS: |
  def share(part, whole): round(100 * part / whole, 1)
months: [jan, feb, mar]
income: [1000, 1200, 900]
costs: [800, 700, "=1/0"]
table:
  type: csv
  cols: "=['month', 'income', 'costs']"
  rows: "=[[m, i, c] for m, i, c in zip(months, income, costs)]"
pie:
  type: chart
  chart: pie
  title: Income
  style: light-green
  rows:
    - [jan, "=income[0]"]
    - [feb, "=income[1]"]
    - [mar, "=income[2]"]
trend:
  type: chart
  chart: line
  cols: "=['series'] + months"
  rows:
    - "=['income'] + income"
    - "=['costs'] + costs"
attrs:
  type: asciidoc-attrs
  value:
    total: "=sum(income)"
    jan-share: "=share(income[0], sum(income))"
VIEW:
  type: raw
"#;

fn budget() -> Document {
    Document::from_yaml_str(BUDGET, &DocumentOptions::default()).unwrap()
}

fn render_path(doc: &Document, path: &str, options: &RenderOptions) -> (ViewKind, String) {
    let view = resolve_view(doc, Some(&path.parse::<ViewPath>().unwrap())).unwrap();
    let mut out = Vec::new();
    let kind = render_view(doc, &view, &mut out, options).unwrap();
    (kind, String::from_utf8(out).unwrap())
}

#[test]
fn test_csv_view() {
    let options = RenderOptions {
        csv: CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..CsvWriteOptions::default()
        },
        ..RenderOptions::default()
    };
    let (kind, text) = render_path(&budget(), "$.table", &options);
    assert_eq!(kind, ViewKind::Csv);
    assert_eq!(
        text,
        "month,income,costs\njan,1000,800\nfeb,1200,700\nmar,900,Error!\n"
    );
}

#[test]
fn test_chart_views() {
    let doc = budget();

    let (kind, svg) = render_path(&doc, "pie", &RenderOptions::default());
    assert_eq!(kind, ViewKind::Chart);
    assert!(svg.contains("class=\"yamlcalc-chart pie\""));
    assert!(svg.contains(">Income</text>"));
    assert!(svg.contains("<title>feb: 1200</title>"));
    assert!(svg.contains("#7dcf30"));

    let (_, svg) = render_path(&doc, "trend", &RenderOptions::default());
    assert!(svg.contains("class=\"yamlcalc-chart line\""));
    assert!(svg.contains(">mar</text>"));
    assert_eq!(svg.matches("class=\"line\"").count(), 2);
}

#[test]
fn test_asciidoc_view() {
    let (kind, text) = render_path(&budget(), "attrs", &RenderOptions::default());
    assert_eq!(kind, ViewKind::AsciidocAttrs);
    assert_eq!(text, "{set:total:3100}\n{set:jan-share:32.3}\n");
}

#[test]
fn test_raw_view_resolves_everything() {
    let doc = budget();
    let (kind, text) = render_path(&doc, "VIEW", &RenderOptions::default());
    assert_eq!(kind, ViewKind::Raw);

    let reparsed = yamlcalc::parse_yaml(&text).unwrap();
    assert_eq!(reparsed, doc.resolve().unwrap());
    assert!(text.contains("- Error!"));
    assert!(!text.contains("=sum"));
}

#[test]
fn test_render_to_dir_writes_expected_files() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("budget");
    let doc = budget();
    let options = RenderOptions::default();

    let cases = [
        (Some("table"), "data.csv"),
        (Some("pie"), "chart.svg"),
        (Some("attrs"), "attrs.adoc"),
        (None, "raw.yml"),
    ];
    for (path, file_name) in cases {
        let path = path.map(|p| p.parse::<ViewPath>().unwrap());
        let written = render_to_dir(&doc, path.as_ref(), &outdir, &options).unwrap();
        assert_eq!(written, outdir.join(file_name));
        assert!(fs::metadata(&written).unwrap().len() > 0);
    }
}

#[test]
fn test_input_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.yml");
    fs::write(&input, "a: 2\nb: '=a * 21'\nVIEW:\n  type: csv\n  rows: [['=b']]\n").unwrap();

    let doc = Document::open(&input, &DocumentOptions::default()).unwrap();
    let outdir = yamlcalc::output_dir(&input);
    let written = render_to_dir(&doc, None, &outdir, &RenderOptions::default()).unwrap();

    assert_eq!(written, dir.path().join("report").join("data.csv"));
    assert_eq!(fs::read_to_string(written).unwrap(), "42\r\n");
}

#[test]
fn test_render_errors() {
    let doc = Document::from_yaml_str(
        "bad_type: {type: pdf}\nbad_chart: {type: chart, chart: radar, rows: []}\nbad_prop: {type: chart, chart: pie, rows: [], colour: red}\n",
        &DocumentOptions::default(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let render = |path: &str| {
        let path: ViewPath = path.parse().unwrap();
        render_to_dir(&doc, Some(&path), dir.path(), &RenderOptions::default()).unwrap_err()
    };

    assert_eq!(render("bad_type").to_string(), "Unsupported writer: pdf");
    assert_eq!(render("bad_chart").to_string(), "Invalid chart type 'radar'");
    assert_eq!(render("bad_prop").to_string(), "Invalid chart property 'colour'");
    assert!(matches!(render("missing"), Error::View(ViewError::NotFound { .. })));
}
