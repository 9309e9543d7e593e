//! Chart model built from a view

use std::str::FromStr;

use crate::error::{ChartError, ChartResult};
use crate::legend::Legend;
use crate::series::{point, DataSeries};
use crate::style::{Style, DEFAULT_STYLE};
use yamlcalc_core::{Node, NodeMap};

/// View keys consumed by the chart builder itself
pub const SPECIAL_KEYS: [&str; 5] = ["type", "chart", "cols", "rows", "style"];

/// View keys copied onto the chart
pub const ALLOWED_PROPERTIES: [&str; 6] =
    ["inner_radius", "title", "x_title", "y_title", "width", "height"];

/// Chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One slice per row
    Pie,
    /// One vertical bar per row
    Bar,
    /// One horizontal bar per row
    HorizontalBar,
    /// Bars of every series side by side per column
    GroupedBar,
    /// Bars of every series on top of each other per column
    StackedBar,
    /// One line per series
    Line,
}

impl ChartKind {
    /// All kinds, in the order they are documented
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::GroupedBar,
        ChartKind::StackedBar,
        ChartKind::Line,
    ];

    /// Name used in views
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal-bar",
            ChartKind::GroupedBar => "grouped-bar",
            ChartKind::StackedBar => "stacked-bar",
            ChartKind::Line => "line",
        }
    }

    /// Look up a kind by its view name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Check if each row holds one labelled value rather than a series
    pub fn is_single_value(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Bar | ChartKind::HorizontalBar)
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> ChartResult<Self> {
        Self::from_name(s).ok_or_else(|| ChartError::InvalidChartType(s.to_string()))
    }
}

/// Options for building charts from views
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Width when the view sets none
    pub width: f64,
    /// Height when the view sets none
    pub height: f64,
    /// Legend placement
    pub legend: Legend,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            legend: Legend::default(),
        }
    }
}

/// Chart definition
#[derive(Debug, Clone)]
pub struct Chart {
    /// Chart kind
    pub kind: ChartKind,
    /// Chart title
    pub title: Option<String>,
    /// Category axis title
    pub x_title: Option<String>,
    /// Value axis title
    pub y_title: Option<String>,
    /// Category labels of series kinds
    pub x_labels: Vec<String>,
    /// Data series
    pub series: Vec<DataSeries>,
    /// Palette
    pub style: &'static Style,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Hole of a pie, as a fraction of its radius
    pub inner_radius: f64,
    /// Legend
    pub legend: Legend,
}

impl Chart {
    /// Create an empty chart
    pub fn new(kind: ChartKind) -> Self {
        Self::with_options(kind, &ChartOptions::default())
    }

    fn with_options(kind: ChartKind, options: &ChartOptions) -> Self {
        Self {
            kind,
            title: None,
            x_title: None,
            y_title: None,
            x_labels: Vec::new(),
            series: Vec::new(),
            style: &DEFAULT_STYLE,
            width: options.width,
            height: options.height,
            inner_radius: 0.0,
            legend: options.legend,
        }
    }

    /// Set chart title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a data series
    pub fn add_series(&mut self, series: DataSeries) {
        self.series.push(series);
    }

    /// Build a chart from a resolved view with default options
    pub fn from_view(view: &Node) -> ChartResult<Self> {
        Self::from_view_with(view, &ChartOptions::default())
    }

    /// Build a chart from a resolved view
    ///
    /// `chart` selects the kind. Rows of single-value kinds are
    /// `[label, value]`; rows of series kinds are `[name, values...]` and
    /// `cols[1:]` labels the categories. Keys outside [`SPECIAL_KEYS`] and
    /// [`ALLOWED_PROPERTIES`] are rejected.
    pub fn from_view_with(view: &Node, options: &ChartOptions) -> ChartResult<Self> {
        let conf = view.as_map().ok_or_else(|| {
            ChartError::InvalidData(format!("expected a mapping, found {}", view.type_name()))
        })?;

        let kind = match conf.get("chart") {
            None | Some(Node::Null) => return Err(ChartError::MissingChartType),
            Some(Node::String(name)) => name.parse::<ChartKind>()?,
            Some(other) => return Err(ChartError::InvalidChartType(other.to_string())),
        };

        let mut chart = Self::with_options(kind, options);
        let rows = rows(conf)?;
        if kind.is_single_value() {
            for (index, row) in rows.into_iter().enumerate() {
                match row {
                    [label, value, ..] => {
                        chart.add_series(DataSeries::new(label.to_string(), vec![point(value)]))
                    }
                    _ => {
                        return Err(ChartError::InvalidData(format!(
                            "row {} needs a label and a value",
                            index
                        )))
                    }
                }
            }
        } else {
            chart.x_labels = match conf.get("cols") {
                Some(Node::Seq(cols)) => cols.iter().skip(1).map(Node::to_string).collect(),
                Some(other) => {
                    return Err(ChartError::InvalidData(format!(
                        "'cols' must be a sequence, found {}",
                        other.type_name()
                    )))
                }
                None => return Err(ChartError::InvalidData("missing 'cols'".into())),
            };
            for (index, row) in rows.into_iter().enumerate() {
                let (name, values) = row.split_first().ok_or_else(|| {
                    ChartError::InvalidData(format!("row {} needs a series name", index))
                })?;
                chart.add_series(DataSeries::from_cells(name.to_string(), values));
            }
        }

        if let Some(style) = conf.get("style") {
            let name = style.to_string();
            chart.style = Style::by_name(&name).ok_or(ChartError::InvalidStyle(name))?;
        }

        for (key, value) in conf {
            if SPECIAL_KEYS.contains(&key.as_str()) {
                continue;
            }
            match key.as_str() {
                "title" => chart.title = text_property(key, value)?,
                "x_title" => chart.x_title = text_property(key, value)?,
                "y_title" => chart.y_title = text_property(key, value)?,
                "width" => chart.width = size_property(key, value)?,
                "height" => chart.height = size_property(key, value)?,
                "inner_radius" => {
                    let radius = number_property(key, value)?;
                    if !(0.0..1.0).contains(&radius) {
                        return Err(invalid(key, "must be at least 0 and below 1"));
                    }
                    chart.inner_radius = radius;
                }
                _ => return Err(ChartError::InvalidProperty(key.clone())),
            }
        }

        Ok(chart)
    }

    /// Number of category slots along the category axis
    pub fn category_count(&self) -> usize {
        if self.kind.is_single_value() {
            return 1;
        }
        self.series
            .iter()
            .map(|s| s.values.len())
            .chain(std::iter::once(self.x_labels.len()))
            .max()
            .unwrap_or(0)
    }
}

fn rows(conf: &NodeMap) -> ChartResult<Vec<&[Node]>> {
    let rows = match conf.get("rows") {
        Some(Node::Seq(rows)) => rows,
        Some(other) => {
            return Err(ChartError::InvalidData(format!(
                "'rows' must be a sequence, found {}",
                other.type_name()
            )))
        }
        None => return Err(ChartError::InvalidData("missing 'rows'".into())),
    };

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            row.as_seq().ok_or_else(|| {
                ChartError::InvalidData(format!(
                    "row {} must be a sequence, found {}",
                    index,
                    row.type_name()
                ))
            })
        })
        .collect()
}

fn invalid(property: &str, message: &str) -> ChartError {
    ChartError::InvalidValue {
        property: property.to_string(),
        message: message.to_string(),
    }
}

fn text_property(key: &str, value: &Node) -> ChartResult<Option<String>> {
    match value {
        Node::Null => Ok(None),
        Node::Seq(_) | Node::Map(_) => Err(invalid(key, "expected text")),
        scalar => Ok(Some(scalar.to_string())),
    }
}

fn number_property(key: &str, value: &Node) -> ChartResult<f64> {
    value.as_f64().ok_or_else(|| invalid(key, "expected a number"))
}

fn size_property(key: &str, value: &Node) -> ChartResult<f64> {
    let size = number_property(key, value)?;
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(invalid(key, "must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: Vec<Node>) -> Node {
        Node::Seq(cells)
    }

    fn pie_view() -> Node {
        let mut view = Node::map();
        view.insert("type", "chart");
        view.insert("chart", "pie");
        view.insert(
            "rows",
            Node::Seq(vec![
                row(vec!["rent".into(), 900.into()]),
                row(vec!["food".into(), 350.5.into()]),
            ]),
        );
        view
    }

    fn line_view() -> Node {
        let mut view = Node::map();
        view.insert("chart", "line");
        view.insert("cols", vec!["name", "jan", "feb", "mar"]);
        view.insert(
            "rows",
            Node::Seq(vec![
                row(vec!["income".into(), 10.into(), 12.into(), 9.into()]),
                row(vec!["costs".into(), 7.into(), "Error!".into()]),
            ]),
        );
        view
    }

    #[test]
    fn test_kind_names() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_name(kind.name()), Some(kind));
        }
        assert!(ChartKind::Pie.is_single_value());
        assert!(ChartKind::HorizontalBar.is_single_value());
        assert!(!ChartKind::StackedBar.is_single_value());
        assert!(matches!(
            "donut".parse::<ChartKind>(),
            Err(ChartError::InvalidChartType(name)) if name == "donut"
        ));
    }

    #[test]
    fn test_single_value_rows() {
        let chart = Chart::from_view(&pie_view()).unwrap();
        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(
            chart.series,
            vec![
                DataSeries::new("rent", vec![Some(900.0)]),
                DataSeries::new("food", vec![Some(350.5)]),
            ]
        );
        assert_eq!(chart.category_count(), 1);
        assert_eq!(chart.style.name, "default");
    }

    #[test]
    fn test_series_rows() {
        let chart = Chart::from_view(&line_view()).unwrap();
        assert_eq!(chart.x_labels, vec!["jan", "feb", "mar"]);
        assert_eq!(chart.series[0].values, vec![Some(10.0), Some(12.0), Some(9.0)]);
        assert_eq!(chart.series[1].values, vec![Some(7.0), None]);
        assert_eq!(chart.category_count(), 3);
    }

    #[test]
    fn test_properties() {
        let mut view = pie_view();
        view.insert("title", "Budget");
        view.insert("width", 400);
        view.insert("height", 300.0);
        view.insert("inner_radius", 0.4);
        view.insert("style", "dark-solarized");

        let chart = Chart::from_view(&view).unwrap();
        assert_eq!(chart.title.as_deref(), Some("Budget"));
        assert_eq!((chart.width, chart.height), (400.0, 300.0));
        assert_eq!(chart.inner_radius, 0.4);
        assert_eq!(chart.style.name, "dark-solarized");
    }

    #[test]
    fn test_missing_and_invalid_kind() {
        let mut view = pie_view();
        view.insert("chart", Node::Null);
        assert!(matches!(Chart::from_view(&view), Err(ChartError::MissingChartType)));

        view.insert("chart", "radar");
        assert_eq!(
            Chart::from_view(&view).unwrap_err().to_string(),
            "Invalid chart type 'radar'"
        );
    }

    #[test]
    fn test_invalid_style_and_property() {
        let mut view = pie_view();
        view.insert("style", "pastel");
        assert_eq!(
            Chart::from_view(&view).unwrap_err().to_string(),
            "Invalid chart style 'pastel'"
        );

        let mut view = pie_view();
        view.insert("colour", "red");
        assert_eq!(
            Chart::from_view(&view).unwrap_err().to_string(),
            "Invalid chart property 'colour'"
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut view = pie_view();
        view.insert("width", "wide");
        assert!(matches!(
            Chart::from_view(&view),
            Err(ChartError::InvalidValue { property, .. }) if property == "width"
        ));

        let mut view = pie_view();
        view.insert("inner_radius", 1);
        assert!(matches!(
            Chart::from_view(&view),
            Err(ChartError::InvalidValue { property, .. }) if property == "inner_radius"
        ));
    }

    #[test]
    fn test_invalid_data() {
        let mut view = pie_view();
        view.insert("rows", Node::Seq(vec![row(vec!["lonely".into()])]));
        assert_eq!(
            Chart::from_view(&view).unwrap_err().to_string(),
            "Invalid chart data: row 0 needs a label and a value"
        );

        let mut view = line_view();
        if let Node::Map(map) = &mut view {
            map.shift_remove("cols");
        }
        assert_eq!(
            Chart::from_view(&view).unwrap_err().to_string(),
            "Invalid chart data: missing 'cols'"
        );
    }

    #[test]
    fn test_options_apply_before_properties() {
        let options = ChartOptions {
            width: 640.0,
            legend: Legend::hidden(),
            ..ChartOptions::default()
        };
        let chart = Chart::from_view_with(&pie_view(), &options).unwrap();
        assert_eq!((chart.width, chart.height), (640.0, 600.0));
        assert!(!chart.legend.visible);
    }
}
