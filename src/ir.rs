use crate::error::{LineIdError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerLine {
    Scalar(f64),
    Each(Vec<f64>),
}

impl PerLine {
    pub fn broadcast(&self, len: usize, name: &'static str) -> Result<Vec<f64>> {
        match self {
            PerLine::Scalar(value) => Ok(vec![*value; len]),
            PerLine::Each(values) if values.len() == len => Ok(values.clone()),
            PerLine::Each(values) => Err(LineIdError::LengthMismatch {
                name,
                expected: len,
                found: values.len(),
            }),
        }
    }
}

impl From<f64> for PerLine {
    fn from(value: f64) -> Self {
        PerLine::Scalar(value)
    }
}

impl From<Vec<f64>> for PerLine {
    fn from(values: Vec<f64>) -> Self {
        PerLine::Each(values)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineIdInput {
    pub waves: Vec<f64>,
    pub fluxes: Vec<f64>,
    pub labels: Vec<String>,
    pub ypos2: PerLine,
    pub ypos3: PerLine,
    #[serde(default)]
    pub bars: Option<Vec<f64>>,
    #[serde(default)]
    pub bar_scale: Option<f64>,
    #[serde(default)]
    pub edges: Option<(f64, f64)>,
}

impl LineIdInput {
    pub fn new(
        waves: Vec<f64>,
        fluxes: Vec<f64>,
        labels: Vec<String>,
        ypos2: impl Into<PerLine>,
        ypos3: impl Into<PerLine>,
    ) -> Self {
        Self {
            waves,
            fluxes,
            labels,
            ypos2: ypos2.into(),
            ypos3: ypos3.into(),
            bars: None,
            bar_scale: None,
            edges: None,
        }
    }

    pub fn with_bars(mut self, bars: Vec<f64>) -> Self {
        self.bars = Some(bars);
        self
    }

    pub fn with_bar_scale(mut self, scale: f64) -> Self {
        self.bar_scale = Some(scale);
        self
    }

    pub fn with_edges(mut self, left: f64, right: f64) -> Self {
        self.edges = Some((left, right));
        self
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

// Pixel y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotFrame {
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    pub width: f32,
    pub height: f32,
}

impl PlotFrame {
    pub fn new(x_limits: (f64, f64), y_limits: (f64, f64), width: f32, height: f32) -> Self {
        Self {
            x_limits,
            y_limits,
            width,
            height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let span_ok = |(lo, hi): (f64, f64)| lo.is_finite() && hi.is_finite() && lo < hi;
        if !span_ok(self.x_limits) || !(self.width.is_finite() && self.width > 0.0) {
            return Err(LineIdError::DegenerateFrame { axis: "x" });
        }
        if !span_ok(self.y_limits) || !(self.height.is_finite() && self.height > 0.0) {
            return Err(LineIdError::DegenerateFrame { axis: "y" });
        }
        Ok(())
    }

    fn x_scale(&self) -> f64 {
        f64::from(self.width) / (self.x_limits.1 - self.x_limits.0)
    }

    fn y_scale(&self) -> f64 {
        f64::from(self.height) / (self.y_limits.1 - self.y_limits.0)
    }

    pub fn x_to_px(&self, x: f64) -> f32 {
        ((x - self.x_limits.0) * self.x_scale()) as f32
    }

    pub fn y_to_px(&self, y: f64) -> f32 {
        ((self.y_limits.1 - y) * self.y_scale()) as f32
    }

    pub fn px_to_dx(&self, px: f32) -> f64 {
        f64::from(px) / self.x_scale()
    }

    pub fn px_to_dy(&self, px: f32) -> f64 {
        f64::from(px) / self.y_scale()
    }
}
