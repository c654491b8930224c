use crate::layout::LineIdLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub edges: [f64; 2],
    pub iterations: usize,
    pub changed: bool,
    pub residual_overlap: bool,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub index: usize,
    pub text: String,
    pub anchor: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub connector: Vec<[f64; 2]>,
    pub bar: Option<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &LineIdLayout) -> Self {
        let widths: Vec<f64> = layout.labels.iter().map(|label| label.width).collect();
        let labels = layout
            .labels
            .iter()
            .zip(&layout.connectors)
            .enumerate()
            .map(|(idx, (label, connector))| LabelDump {
                index: idx,
                text: label.text.clone(),
                anchor: label.anchor,
                x: label.x,
                y: label.y,
                width: label.width,
                height: label.height,
                connector: connector.points.iter().map(|(x, y)| [*x, *y]).collect(),
                bar: layout
                    .bars
                    .as_ref()
                    .and_then(|bars| bars.get(idx))
                    .map(|bar| [bar.y0, bar.y1]),
            })
            .collect();

        LayoutDump {
            edges: [layout.edges.0, layout.edges.1],
            iterations: layout.outcome.iterations,
            changed: layout.outcome.changed,
            residual_overlap: layout.outcome.has_residual_overlap(&widths).unwrap_or(true),
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &LineIdLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
