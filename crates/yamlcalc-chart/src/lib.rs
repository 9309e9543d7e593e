//! # yamlcalc-chart
//!
//! Chart views and SVG rendering for yamlcalc.
//!
//! A chart view names its kind under `chart`, an optional palette under
//! `style`, its data under `cols` and `rows`, plus a few display
//! properties:
//!
//! ```rust
//! use yamlcalc_core::Node;
//! use yamlcalc_chart::{Chart, ChartKind, SvgRenderer};
//!
//! let mut view = Node::map();
//! view.insert("chart", "pie");
//! view.insert("title", "Budget");
//! view.insert("rows", Node::Seq(vec![
//!     Node::Seq(vec!["rent".into(), 900.into()]),
//!     Node::Seq(vec!["food".into(), 350.into()]),
//! ]));
//!
//! let chart = Chart::from_view(&view).unwrap();
//! assert_eq!(chart.kind, ChartKind::Pie);
//! assert!(SvgRenderer::render(&chart).contains("Budget"));
//! ```

mod axis;
mod chart;
mod error;
mod legend;
mod series;
mod style;
mod svg;

pub use axis::Axis;
pub use chart::{Chart, ChartKind, ChartOptions, ALLOWED_PROPERTIES, SPECIAL_KEYS};
pub use error::{ChartError, ChartResult};
pub use legend::{Legend, LegendPosition};
pub use series::{point, DataSeries};
pub use style::{Style, DEFAULT_STYLE};
pub use svg::SvgRenderer;
