//! One-dimensional box de-overlap.
//!
//! Labels keep their input order and only index neighbours are compared, so a
//! pass is linear in the number of labels. Steps are small enough that
//! neighbours do not swap, which is what keeps the neighbour-only check sound.
//! Relaxation stops when a full pass moves nothing or the iteration budget is
//! spent; in the latter case overlaps may remain.

use crate::config::{AdjustConfig, DecayTrigger};
use crate::error::{LineIdError, Result, check_edges};

/// Slack applied to the virtual neighbours just outside each edge.
const EDGE_WIDTH_FACTOR: f64 = 1.01;

/// Result of one adjuster run.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustOutcome {
    /// Final positions, in input order.
    pub positions: Vec<f64>,
    /// Whether the last completed pass moved any label. `true` here means the
    /// budget ran out before a clean pass.
    pub changed: bool,
    /// Label visits performed. Always a whole number of passes.
    pub iterations: usize,
}

impl AdjustOutcome {
    /// Whether any index-adjacent pair is still closer than half the sum of
    /// its widths. `widths` must be the ones the run was given.
    pub fn has_residual_overlap(&self, widths: &[f64]) -> Result<bool> {
        if widths.len() != self.positions.len() {
            return Err(LineIdError::LengthMismatch {
                name: "widths",
                expected: self.positions.len(),
                found: widths.len(),
            });
        }
        Ok(self
            .positions
            .windows(2)
            .zip(widths.windows(2))
            .any(|(pos, w)| pos[1] - pos[0] < (w[0] + w[1]) / 2.0))
    }
}

/// Nudge boxes centred on `anchors` apart until index neighbours no longer
/// overlap, keeping every position inside `[left_edge, right_edge]`.
///
/// Neither slice is modified. `anchors` and `widths` must have the same
/// length; the edges must be finite with `left_edge < right_edge`. An empty
/// input yields an empty outcome without iterating.
#[tracing::instrument(level = "debug", skip_all, fields(labels = anchors.len()))]
pub fn adjust_boxes(
    anchors: &[f64],
    widths: &[f64],
    left_edge: f64,
    right_edge: f64,
    config: &AdjustConfig,
) -> Result<AdjustOutcome> {
    if widths.len() != anchors.len() {
        return Err(LineIdError::LengthMismatch {
            name: "widths",
            expected: anchors.len(),
            found: widths.len(),
        });
    }
    check_edges(left_edge, right_edge)?;
    config.validate()?;

    let mut positions: Vec<f64> = anchors
        .iter()
        .map(|anchor| anchor.clamp(left_edge, right_edge))
        .collect();
    let count = positions.len();
    let threshold = config.decay_threshold();
    let mut adjust_factor = config.adjust_factor;
    let mut decayed = false;
    let mut iterations = 0usize;
    let mut changed = count > 0;

    while changed && iterations < config.max_iter {
        changed = false;
        for idx in 0..count {
            let (mut diff1, sep1) = if idx > 0 {
                (
                    positions[idx] - positions[idx - 1],
                    (widths[idx] + widths[idx - 1]) / 2.0,
                )
            } else {
                (
                    positions[idx] - left_edge + widths[idx] * EDGE_WIDTH_FACTOR,
                    widths[idx],
                )
            };
            let (mut diff2, sep2) = if idx + 1 < count {
                (
                    positions[idx + 1] - positions[idx],
                    (widths[idx] + widths[idx + 1]) / 2.0,
                )
            } else {
                (
                    right_edge + widths[idx] * EDGE_WIDTH_FACTOR - positions[idx],
                    widths[idx],
                )
            };

            if diff1 < sep1 || diff2 < sep2 {
                if positions[idx] == left_edge {
                    diff1 = 0.0;
                }
                if positions[idx] == right_edge {
                    diff2 = 0.0;
                }
                // Move toward whichever side has more room.
                if diff2 > diff1 {
                    positions[idx] = (positions[idx] + sep2 * adjust_factor).min(right_edge);
                } else {
                    positions[idx] = (positions[idx] - sep1 * adjust_factor).max(left_edge);
                }
                changed = true;
            }
            iterations += 1;
        }

        let decay_now = match config.decay {
            DecayTrigger::Exact => iterations as f64 == threshold,
            DecayTrigger::Crossing => !decayed && iterations as f64 >= threshold,
        };
        if decay_now {
            adjust_factor /= config.factor_decrement;
            decayed = true;
            tracing::debug!(iterations, adjust_factor, "adjust factor decayed");
        }
        tracing::trace!(iterations, changed, "adjust pass complete");

        if iterations >= config.max_iter {
            break;
        }
    }

    if changed {
        tracing::warn!(
            iterations,
            max_iter = config.max_iter,
            "iteration budget exhausted; labels may still overlap"
        );
    } else {
        tracing::debug!(iterations, "labels settled");
    }

    Ok(AdjustOutcome {
        positions,
        changed,
        iterations,
    })
}

/// Default label boundary for an axis spanning `x_limits`: the first label
/// keeps one and a half of its widths clear of the left limit and the last
/// label half a width clear of the right one. Suited to right-aligned
/// vertical labels, whose box extends left of the anchor.
pub fn default_edges(x_limits: (f64, f64), widths: &[f64]) -> Option<(f64, f64)> {
    let first = widths.first()?;
    let last = widths.last()?;
    Some((x_limits.0 + first * 1.5, x_limits.1 - last * 0.5))
}
