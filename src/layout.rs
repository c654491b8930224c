use crate::adjust::{AdjustOutcome, adjust_boxes, default_edges};
use crate::config::LayoutConfig;
use crate::error::{LineIdError, Result, check_edges};
use crate::ir::{LineIdInput, PlotFrame};
use crate::text_metrics::LabelMeasure;

/// A label at its adjusted position, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub text: String,
    /// Adjusted x position.
    pub x: f64,
    pub y: f64,
    /// Unadjusted x position, i.e. the line's own wave.
    pub anchor: f64,
    /// Box extent along x, as fed to the adjuster.
    pub width: f64,
    pub height: f64,
}

/// Bent line from a data point up to its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// `(wave, flux)`, `(wave, ypos2)`, `(label x, ypos3)`.
    pub points: [(f64, f64); 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthBar {
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
}

/// Everything needed to draw the identifications. All vectors follow input
/// order.
#[derive(Debug, Clone)]
pub struct LineIdLayout {
    pub frame: PlotFrame,
    pub labels: Vec<LabelPlacement>,
    pub connectors: Vec<Connector>,
    pub bars: Option<Vec<StrengthBar>>,
    pub edges: (f64, f64),
    pub outcome: AdjustOutcome,
}

impl LineIdLayout {
    pub fn positions(&self) -> &[f64] {
        &self.outcome.positions
    }
}

struct CheckedInput {
    ypos2: Vec<f64>,
    ypos3: Vec<f64>,
}

fn check_input(
    input: &LineIdInput,
    frame: &PlotFrame,
    config: &LayoutConfig,
) -> Result<CheckedInput> {
    frame.validate()?;
    if input.is_empty() {
        return Err(LineIdError::EmptyInput);
    }
    let count = input.len();
    if input.fluxes.len() != count {
        return Err(LineIdError::LengthMismatch {
            name: "fluxes",
            expected: count,
            found: input.fluxes.len(),
        });
    }
    if input.labels.len() != count {
        return Err(LineIdError::LengthMismatch {
            name: "labels",
            expected: count,
            found: input.labels.len(),
        });
    }
    if let Some(bars) = &input.bars
        && bars.len() != count
    {
        return Err(LineIdError::LengthMismatch {
            name: "bars",
            expected: count,
            found: bars.len(),
        });
    }
    let ypos2 = input.ypos2.broadcast(count, "ypos2")?;
    let ypos3 = input.ypos3.broadcast(count, "ypos3")?;
    if let Some((left, right)) = input.edges {
        check_edges(left, right)?;
    }
    config.adjust.validate()?;
    Ok(CheckedInput { ypos2, ypos3 })
}

/// Measure, de-overlap and connect the labels of `input`.
///
/// Input shape is validated before anything is measured or moved. A layout
/// whose labels could not be fully separated within the iteration budget is
/// still returned; check `outcome.changed`.
#[tracing::instrument(level = "debug", skip_all, fields(lines = input.len()))]
pub fn place_labels<M: LabelMeasure + ?Sized>(
    input: &LineIdInput,
    frame: &PlotFrame,
    measure: &M,
    config: &LayoutConfig,
) -> Result<LineIdLayout> {
    let CheckedInput { ypos2, ypos3 } = check_input(input, frame, config)?;

    let (widths, heights): (Vec<f64>, Vec<f64>) = input
        .labels
        .iter()
        .map(|text| {
            let extent = measure.measure(text, &config.label);
            (frame.px_to_dx(extent.width), frame.px_to_dy(extent.height))
        })
        .unzip();

    let (left, right) = match input.edges {
        Some(edges) => edges,
        None => default_edges(frame.x_limits, &widths).ok_or(LineIdError::EmptyInput)?,
    };
    let outcome = adjust_boxes(&input.waves, &widths, left, right, &config.adjust)?;
    tracing::debug!(
        iterations = outcome.iterations,
        changed = outcome.changed,
        left,
        right,
        "label positions adjusted"
    );

    let labels = input
        .labels
        .iter()
        .enumerate()
        .map(|(idx, text)| LabelPlacement {
            text: text.clone(),
            x: outcome.positions[idx],
            y: ypos3[idx],
            anchor: input.waves[idx],
            width: widths[idx],
            height: heights[idx],
        })
        .collect();

    let connectors = (0..input.len())
        .map(|idx| {
            let wave = input.waves[idx];
            Connector {
                points: [
                    (wave, input.fluxes[idx]),
                    (wave, ypos2[idx]),
                    (outcome.positions[idx], ypos3[idx]),
                ],
            }
        })
        .collect();

    let bars = input.bars.as_ref().map(|strengths| {
        let scale = input
            .bar_scale
            .unwrap_or_else(|| heights.iter().copied().fold(0.0, f64::max));
        strengths
            .iter()
            .enumerate()
            .map(|(idx, strength)| StrengthBar {
                x: outcome.positions[idx],
                y0: ypos3[idx],
                y1: ypos3[idx] + strength * scale,
            })
            .collect()
    });

    Ok(LineIdLayout {
        frame: *frame,
        labels,
        connectors,
        bars,
        edges: (left, right),
        outcome,
    })
}
