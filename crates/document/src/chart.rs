//! Chart models.
//!
//! Constructors validate their data, so a [`Chart`] that exists can always be
//! drawn: every value is finite and lies inside the chart's axis range.

use crate::style::Color;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("chart '{0}' has no data")]
    Empty(String),

    #[error("chart '{chart}': value for '{label}' is not a finite number")]
    NonFinite { chart: String, label: String },

    #[error("chart '{chart}': value {value} for '{label}' is outside {min}..={max}")]
    OutOfRange {
        chart: String,
        label: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("chart '{chart}': series '{series}' has {actual} values for {expected} categories")]
    SeriesLength {
        chart: String,
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("chart '{chart}': bar value {value} for '{label}' is negative")]
    Negative {
        chart: String,
        label: String,
        value: f64,
    },

    #[error("chart '{chart}': axis range {min}..={max} is empty")]
    InvalidRange { chart: String, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Scatter(ScatterChart),
    Bar(BarChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Scatter(chart) => &chart.title,
            Chart::Bar(chart) => &chart.title,
        }
    }
}

impl From<ScatterChart> for Chart {
    fn from(chart: ScatterChart) -> Self {
        Chart::Scatter(chart)
    }
}

impl From<BarChart> for Chart {
    fn from(chart: BarChart) -> Self {
        Chart::Bar(chart)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

/// Labelled points on a fixed square grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub min: f64,
    pub max: f64,
    pub points: Vec<ScatterPoint>,
}

impl ScatterChart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        (min, max): (f64, f64),
        points: Vec<ScatterPoint>,
    ) -> Result<Self, ChartError> {
        let title = title.into();
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ChartError::InvalidRange { chart: title, min, max });
        }
        if points.is_empty() {
            return Err(ChartError::Empty(title));
        }
        for point in &points {
            for value in [point.x, point.y] {
                if !value.is_finite() {
                    return Err(ChartError::NonFinite {
                        chart: title,
                        label: point.label.clone(),
                    });
                }
                if value < min || value > max {
                    return Err(ChartError::OutOfRange {
                        chart: title,
                        label: point.label.clone(),
                        value,
                        min,
                        max,
                    });
                }
            }
        }
        Ok(Self {
            title,
            x_label: x_label.into(),
            y_label: y_label.into(),
            min,
            max,
            points,
        })
    }

    /// Integer grid lines across the range.
    pub fn ticks(&self) -> Vec<f64> {
        let steps = (self.max - self.min).ceil().max(1.0) as usize;
        let step = (self.max - self.min) / steps as f64;
        (0..=steps).map(|i| self.min + step * i as f64).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub color: Color,
    pub values: Vec<f64>,
}

/// Grouped bars: one group per category, one bar per series within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

impl BarChart {
    pub fn new(
        title: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        series: Vec<BarSeries>,
    ) -> Result<Self, ChartError> {
        let title = title.into();
        if categories.is_empty() || series.is_empty() {
            return Err(ChartError::Empty(title));
        }
        for s in &series {
            if s.values.len() != categories.len() {
                return Err(ChartError::SeriesLength {
                    chart: title,
                    series: s.name.clone(),
                    expected: categories.len(),
                    actual: s.values.len(),
                });
            }
            for (category, &value) in categories.iter().zip(&s.values) {
                let label = format!("{} / {}", category, s.name);
                if !value.is_finite() {
                    return Err(ChartError::NonFinite { chart: title, label });
                }
                if value < 0.0 {
                    return Err(ChartError::Negative { chart: title, label, value });
                }
            }
        }
        Ok(Self {
            title,
            y_label: y_label.into(),
            categories,
            series,
        })
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Top of the value axis, rounded up to a readable number.
    pub fn axis_max(&self) -> f64 {
        nice_axis_max(self.max_value())
    }

    /// Five evenly spaced ticks from zero to [`Self::axis_max`].
    pub fn ticks(&self) -> Vec<f64> {
        let max = self.axis_max();
        (0..=5).map(|i| max * i as f64 / 5.0).collect()
    }
}

/// Smallest of 1, 2, 2.5 or 5 times a power of ten that is at least `value`
/// and divides cleanly into five ticks.
pub fn nice_axis_max(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(value.log10().floor() as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&candidate| candidate >= value)
        .unwrap_or(10.0 * magnitude)
}
