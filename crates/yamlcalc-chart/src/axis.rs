//! Value axis scaling

/// Number of intervals a value axis aims for
const TARGET_TICKS: f64 = 5.0;

/// A linear value axis
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Axis title
    pub title: Option<String>,
    /// Lowest value on the axis
    pub minimum: f64,
    /// Highest value on the axis
    pub maximum: f64,
    /// Distance between ticks
    pub major_unit: f64,
}

impl Axis {
    /// Fit an axis around the given values
    ///
    /// The range always includes zero so bars grow from the baseline, and
    /// the bounds are widened to multiples of a 1, 2 or 5 step.
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (mut low, mut high) = values
            .into_iter()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if high - low <= f64::EPSILON {
            high = low + 1.0;
        }

        let step = nice_step((high - low) / TARGET_TICKS);
        low = (low / step).floor() * step;
        high = (high / step).ceil() * step;

        Self {
            title: None,
            minimum: low,
            maximum: high,
            major_unit: step,
        }
    }

    /// Set axis title
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Tick values from minimum to maximum
    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.maximum - self.minimum) / self.major_unit).round() as usize;
        (0..=count)
            .map(|i| self.minimum + i as f64 * self.major_unit)
            .collect()
    }

    /// Fraction of the axis length at which `value` sits
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.minimum) / (self.maximum - self.minimum)
    }

    /// Tick label text
    pub fn label(&self, value: f64) -> String {
        format_tick(value)
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Format a number for axis labels and SVG coordinates
pub(crate) fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
