use crate::error::{LineIdError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When the step-size decay of the box adjuster fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecayTrigger {
    /// Decay only when the iteration count lands exactly on
    /// `max_iter * fd_p` after a pass. Passes advance the count by the number
    /// of labels, so the checkpoint is skipped when that stride does not
    /// divide the threshold.
    #[default]
    Exact,
    /// Decay once, after the first pass that reaches or crosses the threshold.
    Crossing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustConfig {
    /// Iteration budget. One iteration is one label visit, so a pass over
    /// `N` labels consumes `N` iterations.
    pub max_iter: usize,
    pub adjust_factor: f64,
    pub factor_decrement: f64,
    pub fd_p: f64,
    pub decay: DecayTrigger,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            adjust_factor: 0.35,
            factor_decrement: 3.0,
            fd_p: 0.75,
            decay: DecayTrigger::Exact,
        }
    }
}

impl AdjustConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(LineIdError::InvalidParameter {
                name: "max_iter",
                reason: "must be at least 1",
            });
        }
        if !(self.adjust_factor.is_finite() && self.adjust_factor > 0.0) {
            return Err(LineIdError::InvalidParameter {
                name: "adjust_factor",
                reason: "must be a positive finite number",
            });
        }
        if !(self.factor_decrement.is_finite() && self.factor_decrement > 0.0) {
            return Err(LineIdError::InvalidParameter {
                name: "factor_decrement",
                reason: "must be a positive finite number",
            });
        }
        if !(self.fd_p > 0.0 && self.fd_p < 1.0) {
            return Err(LineIdError::InvalidParameter {
                name: "fd_p",
                reason: "must lie strictly between 0 and 1",
            });
        }
        Ok(())
    }

    pub fn decay_threshold(&self) -> f64 {
        self.max_iter as f64 * self.fd_p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rotation {
    Horizontal,
    #[default]
    Vertical,
}

impl Rotation {
    pub fn degrees(self) -> f32 {
        match self {
            Rotation::Horizontal => 0.0,
            Rotation::Vertical => -90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    Left,
    Center,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Center,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelStyle {
    pub font_family: String,
    pub font_size: f32,
    /// Added to `font_size` while measuring, so boxes keep a little slack
    /// once drawn at the real size.
    pub measure_size_bump: f32,
    pub rotation: Rotation,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub color: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_family: "DejaVu Sans, Bitstream Vera Sans, Arial, sans-serif".to_string(),
            font_size: 9.0,
            measure_size_bump: 1.0,
            rotation: Rotation::Vertical,
            h_align: HAlign::Right,
            v_align: VAlign::Bottom,
            color: "black".to_string(),
        }
    }
}

impl LabelStyle {
    pub fn measure_font_size(&self) -> f32 {
        (self.font_size + self.measure_size_bump).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorStyle {
    pub color: String,
    pub line_width: f32,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            line_width: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarStyle {
    pub color: String,
    pub line_width: f32,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            line_width: 1.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub adjust: AdjustConfig,
    pub label: LabelStyle,
    pub connector: ConnectorStyle,
    pub bar: BarStyle,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            // Whole-plot layouts get a larger budget than a bare adjuster call.
            adjust: AdjustConfig {
                max_iter: 10_000,
                ..AdjustConfig::default()
            },
            label: LabelStyle::default(),
            connector: ConnectorStyle::default(),
            bar: BarStyle::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f64>().ok(),
        }
    }

    fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|val| val as f32)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustConfigFile {
    max_iter: Option<usize>,
    adjust_factor: Option<NumberOrString>,
    factor_decrement: Option<NumberOrString>,
    fd_p: Option<NumberOrString>,
    decay: Option<DecayTrigger>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelStyleFile {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    measure_size_bump: Option<NumberOrString>,
    rotation: Option<Rotation>,
    h_align: Option<HAlign>,
    v_align: Option<VAlign>,
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrokeStyleFile {
    color: Option<String>,
    line_width: Option<NumberOrString>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    adjust: Option<AdjustConfigFile>,
    label: Option<LabelStyleFile>,
    connector: Option<StrokeStyleFile>,
    bar: Option<StrokeStyleFile>,
}

impl LayoutConfig {
    pub fn merge(mut self, overrides: ConfigFile) -> Self {
        if let Some(adjust) = overrides.adjust {
            if let Some(v) = adjust.max_iter {
                self.adjust.max_iter = v;
            }
            if let Some(v) = adjust
                .adjust_factor
                .as_ref()
                .and_then(NumberOrString::as_f64)
            {
                self.adjust.adjust_factor = v;
            }
            if let Some(v) = adjust
                .factor_decrement
                .as_ref()
                .and_then(NumberOrString::as_f64)
            {
                self.adjust.factor_decrement = v;
            }
            if let Some(v) = adjust.fd_p.as_ref().and_then(NumberOrString::as_f64) {
                self.adjust.fd_p = v;
            }
            if let Some(v) = adjust.decay {
                self.adjust.decay = v;
            }
        }

        if let Some(label) = overrides.label {
            if let Some(v) = label.font_family {
                self.label.font_family = v;
            }
            if let Some(v) = label.font_size.as_ref().and_then(NumberOrString::as_f32) {
                self.label.font_size = v;
            }
            if let Some(v) = label
                .measure_size_bump
                .as_ref()
                .and_then(NumberOrString::as_f32)
            {
                self.label.measure_size_bump = v;
            }
            if let Some(v) = label.rotation {
                self.label.rotation = v;
            }
            if let Some(v) = label.h_align {
                self.label.h_align = v;
            }
            if let Some(v) = label.v_align {
                self.label.v_align = v;
            }
            if let Some(v) = label.color {
                self.label.color = v;
            }
        }

        if let Some(connector) = overrides.connector {
            if let Some(v) = connector.color {
                self.connector.color = v;
            }
            if let Some(v) = connector
                .line_width
                .as_ref()
                .and_then(NumberOrString::as_f32)
            {
                self.connector.line_width = v;
            }
        }

        if let Some(bar) = overrides.bar {
            if let Some(v) = bar.color {
                self.bar.color = v;
            }
            if let Some(v) = bar.line_width.as_ref().and_then(NumberOrString::as_f32) {
                self.bar.line_width = v;
            }
        }

        self
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<LayoutConfig> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let config = LayoutConfig::default().merge(parsed);
    config.adjust.validate()?;
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "loaded layout config");
    Ok(config)
}
