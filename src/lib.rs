pub mod adjust;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;

pub use adjust::{AdjustOutcome, adjust_boxes, default_edges};
pub use config::{AdjustConfig, DecayTrigger, LayoutConfig, load_config};
pub use error::LineIdError;
pub use ir::{LineIdInput, PerLine, PlotFrame};
pub use layout::{LineIdLayout, place_labels};
pub use render::render_svg;
pub use text_metrics::{EstimatedMetrics, LabelMeasure, TextExtent};
#[cfg(feature = "fonts")]
pub use text_metrics::FontMetrics;
