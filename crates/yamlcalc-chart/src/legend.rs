//! Legend placement

/// Chart legend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legend {
    /// Position
    pub position: LegendPosition,
    /// Whether the legend is drawn at all
    pub visible: bool,
}

impl Legend {
    /// Create a visible legend
    pub fn new(position: LegendPosition) -> Self {
        Self {
            position,
            visible: true,
        }
    }

    /// Create a legend that is not drawn
    pub fn hidden() -> Self {
        Self {
            position: LegendPosition::default(),
            visible: false,
        }
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new(LegendPosition::default())
    }
}

/// Legend position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    /// Column of entries left of the plot
    #[default]
    Left,
    /// Rows of entries below the plot
    Bottom,
}
