//! Chart data transform for the progress screens.
//!
//! Maps an ordered series of (label, value) pairs into screen-space
//! coordinates: a value axis range with headroom, evenly spaced grid lines,
//! line-chart points and bar rectangles. Drawing is left to the caller.
//!
//! All chart kinds share one headroom rule: the axis maximum is the data
//! maximum rounded up to the kind's step, and the minimum is either zero or
//! the data minimum rounded down to the step. A maximum that already sits on
//! a step boundary gets no extra headroom.

use crate::{Error, Result, SeriesKind, TimeSeries};
use serde::{Deserialize, Serialize};

/// Number of intervals between grid lines; `GRID_STEPS + 1` lines are drawn
pub const GRID_STEPS: usize = 5;

/// Pixel frame the chart is drawn into
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChartFrame {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_left_pad")]
    pub left_pad: f64,
    #[serde(default = "default_right_pad")]
    pub right_pad: f64,
    #[serde(default = "default_top_pad")]
    pub top_pad: f64,
    #[serde(default = "default_bottom_pad")]
    pub bottom_pad: f64,
}

fn default_width() -> f64 {
    340.0
}

fn default_height() -> f64 {
    200.0
}

fn default_left_pad() -> f64 {
    40.0
}

fn default_right_pad() -> f64 {
    10.0
}

fn default_top_pad() -> f64 {
    10.0
}

fn default_bottom_pad() -> f64 {
    24.0
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            left_pad: default_left_pad(),
            right_pad: default_right_pad(),
            top_pad: default_top_pad(),
            bottom_pad: default_bottom_pad(),
        }
    }
}

impl ChartFrame {
    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn plot_width(&self) -> f64 {
        self.width - self.left_pad - self.right_pad
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.top_pad - self.bottom_pad
    }

    /// Reject frames whose padding leaves no room to plot
    pub fn validate(&self) -> Result<()> {
        let pads = [self.left_pad, self.right_pad, self.top_pad, self.bottom_pad];
        if pads.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(Error::invalid("chart padding must be non-negative"));
        }
        if !(self.plot_width() > 0.0 && self.plot_height() > 0.0) {
            return Err(Error::invalid(format!(
                "chart frame {}x{} leaves no plot area",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Step rounding applied to the value axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadroomPolicy {
    pub step: f64,
    /// Start the axis at zero instead of the rounded-down minimum
    pub anchor_zero: bool,
}

impl HeadroomPolicy {
    pub fn for_kind(kind: SeriesKind) -> Self {
        match kind {
            SeriesKind::Calorie => Self {
                step: 500.0,
                anchor_zero: true,
            },
            SeriesKind::Sodium => Self {
                step: 500.0,
                anchor_zero: true,
            },
            SeriesKind::Weight => Self {
                step: 2.0,
                anchor_zero: false,
            },
        }
    }

    /// Axis (min, max) covering `data_min..=data_max`
    ///
    /// Values already on a step boundary become the bounds themselves, so
    /// step-aligned data (weight 70..72) touches the plot edges.
    pub fn axis_range(&self, data_min: f64, data_max: f64) -> (f64, f64) {
        let floored = (data_min / self.step).floor() * self.step;
        let axis_min = if self.anchor_zero {
            floored.min(0.0)
        } else {
            floored
        };

        let mut axis_max = (data_max / self.step).ceil() * self.step;
        if axis_max <= axis_min {
            axis_max = axis_min + self.step;
        }

        (axis_min, axis_max)
    }
}

/// A projected data point
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlotPoint {
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

/// A horizontal reference line
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GridLine {
    pub value: f64,
    pub label: String,
    pub y: f64,
}

/// A bar for bar-chart rendering; `y` is the top edge
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BarRect {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything a drawing routine needs for one chart
#[derive(Clone, Debug, Serialize)]
pub struct ChartGeometry {
    pub kind: SeriesKind,
    pub frame: ChartFrame,
    pub axis_min: f64,
    pub axis_max: f64,
    pub points: Vec<PlotPoint>,
    pub grid: Vec<GridLine>,
}

impl ChartGeometry {
    /// Map a value onto the vertical axis
    pub fn y_for(&self, value: f64) -> f64 {
        value_to_y(&self.frame, self.axis_min, self.axis_max, value)
    }

    /// Bars centred in equal slots, `bar_ratio` of the slot wide
    pub fn bars(&self, bar_ratio: f64) -> Result<Vec<BarRect>> {
        if !(bar_ratio > 0.0 && bar_ratio <= 1.0) {
            return Err(Error::invalid(format!(
                "bar ratio must be in (0, 1], got {}",
                bar_ratio
            )));
        }

        let slot = self.frame.plot_width() / self.points.len() as f64;
        let bar_width = slot * bar_ratio;
        let baseline = self.y_for(self.axis_min);

        Ok(self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| BarRect {
                label: point.label.clone(),
                x: self.frame.left_pad + slot * i as f64 + (slot - bar_width) / 2.0,
                y: point.y,
                width: bar_width,
                height: baseline - point.y,
            })
            .collect())
    }
}

fn value_to_y(frame: &ChartFrame, axis_min: f64, axis_max: f64, value: f64) -> f64 {
    let ratio = (value - axis_min) / (axis_max - axis_min);
    frame.top_pad + frame.plot_height() * (1.0 - ratio)
}

/// Horizontal position of point `index` out of `count`
///
/// A single point sits on the left edge of the plot area.
pub fn x_for_index(frame: &ChartFrame, index: usize, count: usize) -> f64 {
    let denominator = count.saturating_sub(1).max(1) as f64;
    frame.left_pad + index as f64 / denominator * frame.plot_width()
}

/// Format an axis value without a trailing `.0`
pub fn format_axis_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Grid lines from the axis minimum (bottom) to the maximum (top)
pub fn grid_lines(frame: &ChartFrame, axis_min: f64, axis_max: f64) -> Vec<GridLine> {
    (0..=GRID_STEPS)
        .map(|i| {
            let value = axis_min + (axis_max - axis_min) * i as f64 / GRID_STEPS as f64;
            GridLine {
                value,
                label: format_axis_label(value),
                y: value_to_y(frame, axis_min, axis_max, value),
            }
        })
        .collect()
}

/// Project a series into the given frame
pub fn project(series: &TimeSeries, frame: &ChartFrame) -> Result<ChartGeometry> {
    frame.validate()?;

    if series.is_empty() {
        return Err(Error::EmptySeries(format!(
            "{:?} series has no points",
            series.kind
        )));
    }
    if let Some(bad) = series.points.iter().find(|p| !p.value.is_finite()) {
        return Err(Error::invalid(format!(
            "point '{}' has non-finite value",
            bad.label
        )));
    }

    let data_min = series
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min);
    let data_max = series
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);

    let (axis_min, axis_max) = HeadroomPolicy::for_kind(series.kind).axis_range(data_min, data_max);

    tracing::debug!(
        "Projecting {} {:?} points onto axis {}..{}",
        series.len(),
        series.kind,
        axis_min,
        axis_max
    );

    let count = series.len();
    let points = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| PlotPoint {
            label: p.label.clone(),
            value: p.value,
            x: x_for_index(frame, i, count),
            y: value_to_y(frame, axis_min, axis_max, p.value),
        })
        .collect();

    Ok(ChartGeometry {
        kind: series.kind,
        frame: *frame,
        axis_min,
        axis_max,
        points,
        grid: grid_lines(frame, axis_min, axis_max),
    })
}
