use crate::config::{HAlign, LayoutConfig, Rotation, VAlign};
use crate::ir::PlotFrame;
use crate::layout::LineIdLayout;
use crate::text_metrics::LINE_HEIGHT;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &LineIdLayout, config: &LayoutConfig) -> String {
    let frame = &layout.frame;
    let width = frame.width;
    let height = frame.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    svg.push_str(&format!(
        "<g class=\"connectors\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\">",
        escape_xml(&config.connector.color),
        config.connector.line_width
    ));
    for connector in &layout.connectors {
        svg.push_str(&format!(
            "<polyline points=\"{}\"/>",
            points_to_attr(frame, &connector.points)
        ));
    }
    svg.push_str("</g>");

    if let Some(bars) = &layout.bars {
        svg.push_str(&format!(
            "<g class=\"bars\" stroke=\"{}\" stroke-width=\"{}\">",
            escape_xml(&config.bar.color),
            config.bar.line_width
        ));
        for bar in bars {
            let x = frame.x_to_px(bar.x);
            svg.push_str(&format!(
                "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\"/>",
                frame.y_to_px(bar.y0),
                frame.y_to_px(bar.y1)
            ));
        }
        svg.push_str("</g>");
    }

    let style = &config.label;
    let (anchor, baseline) = text_alignment(style.rotation, style.h_align, style.v_align);
    svg.push_str(&format!(
        "<g class=\"labels\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\">",
        escape_xml(&style.font_family),
        style.font_size,
        escape_xml(&style.color)
    ));
    for label in &layout.labels {
        let x = frame.x_to_px(label.x);
        let y = frame.y_to_px(label.y);
        let rotate = style.rotation.degrees();
        if rotate == 0.0 {
            svg.push_str(&format!("<text x=\"{x:.2}\" y=\"{y:.2}\">"));
        } else {
            svg.push_str(&format!(
                "<text x=\"{x:.2}\" y=\"{y:.2}\" transform=\"rotate({rotate} {x:.2} {y:.2})\">"
            ));
        }
        let lines: Vec<&str> = label.text.split('\n').collect();
        if lines.len() == 1 {
            svg.push_str(&escape_xml(&label.text));
        } else {
            for (idx, line) in lines.iter().enumerate() {
                let dy = if idx == 0 {
                    0.0
                } else {
                    style.font_size * LINE_HEIGHT
                };
                svg.push_str(&format!(
                    "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
                    escape_xml(line)
                ));
            }
        }
        svg.push_str("</text>");
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn text_alignment(
    rotation: Rotation,
    h_align: HAlign,
    v_align: VAlign,
) -> (&'static str, &'static str) {
    match rotation {
        Rotation::Horizontal => {
            let anchor = match h_align {
                HAlign::Left => "start",
                HAlign::Center => "middle",
                HAlign::Right => "end",
            };
            let baseline = match v_align {
                VAlign::Top => "text-before-edge",
                VAlign::Center => "central",
                VAlign::Bottom => "text-after-edge",
            };
            (anchor, baseline)
        }
        // Rotated a quarter turn counter-clockwise: the text runs upward and
        // its ascent points left.
        Rotation::Vertical => {
            let anchor = match v_align {
                VAlign::Bottom => "start",
                VAlign::Center => "middle",
                VAlign::Top => "end",
            };
            let baseline = match h_align {
                HAlign::Right => "text-after-edge",
                HAlign::Center => "central",
                HAlign::Left => "text-before-edge",
            };
            (anchor, baseline)
        }
    }
}

fn points_to_attr(frame: &PlotFrame, points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|&(x, y)| format!("{:.2},{:.2}", frame.x_to_px(x), frame.y_to_px(y)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
