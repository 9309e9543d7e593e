//! Data series

use yamlcalc_core::Node;

/// A named run of values
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    /// Series name, shown in the legend
    pub name: String,
    /// Values; `None` marks a missing point
    pub values: Vec<Option<f64>>,
}

impl DataSeries {
    /// Create a new data series
    pub fn new<S: Into<String>>(name: S, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a series from resolved cells
    pub fn from_cells<S: Into<String>>(name: S, cells: &[Node]) -> Self {
        Self::new(name, cells.iter().map(point).collect())
    }

    /// Present values, skipping missing points
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Sum of the present values
    pub fn total(&self) -> f64 {
        self.present().sum()
    }
}

/// Convert one resolved cell into a plotted value
///
/// Numbers plot as themselves and booleans as 0 or 1. Anything else,
/// including a failed formula's sentinel text, is a missing point.
pub fn point(cell: &Node) -> Option<f64> {
    match cell {
        Node::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64().filter(|v| v.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_cells() {
        let cells = vec![Node::Int(2), Node::Float(1.5), Node::from("Error!"), Node::Null, Node::Bool(true)];
        let series = DataSeries::from_cells("q1", &cells);
        assert_eq!(series.values, vec![Some(2.0), Some(1.5), None, None, Some(1.0)]);
        assert_eq!(series.total(), 4.5);
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert_eq!(point(&Node::Float(f64::NAN)), None);
        assert_eq!(point(&Node::Float(f64::INFINITY)), None);
    }
}
