use crate::config::RenderConfig;
use crate::ir::Point;
use crate::layout::{EdgeLayout, Layout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const MIN_CANVAS: f32 = 200.0;
const LABEL_GAP: f32 = 14.0;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(MIN_CANVAS);
    let height = layout.height.max(MIN_CANVAS);
    // Shift into positive space; drag overlays may push nodes above or left of the origin.
    let tx = -layout.min_x;
    let ty = -layout.min_y;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    svg.push_str(&format!("<g transform=\"translate({tx:.2} {ty:.2})\">"));

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge, theme));
    }
    for node in layout.nodes.values() {
        svg.push_str(&node_svg(node, theme, config));
    }

    svg.push_str("</g>");
    svg.push_str("</svg>");
    svg
}

fn edge_svg(edge: &EdgeLayout, theme: &Theme) -> String {
    let dash = if edge.blocked {
        " stroke-dasharray=\"4 3\""
    } else {
        ""
    };
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" opacity=\"{:.2}\"{} marker-end=\"url(#arrow)\" data-from=\"{}\" data-to=\"{}\"/>",
        points_to_path(&edge.points),
        theme.line_color,
        edge.opacity,
        dash,
        escape_xml(&edge.from),
        escape_xml(&edge.to)
    )
}

fn node_svg(node: &NodeLayout, theme: &Theme, config: &RenderConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<g class=\"node\" data-slug=\"{}\" opacity=\"{:.2}\">",
        escape_xml(&node.slug),
        node.opacity
    ));

    let (stroke, stroke_width) = if node.custom_position {
        (theme.dragged_outline.as_str(), 2.5)
    } else {
        (theme.node_border_color.as_str(), 1.4)
    };
    let dash = theme
        .status_dasharray(node.status)
        .map(|pattern| format!(" stroke-dasharray=\"{pattern}\""))
        .unwrap_or_default();
    out.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
        node.x, node.y, node.radius, node.color, stroke, stroke_width, dash
    ));
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        node.x,
        node.y,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.glyph_color,
        escape_xml(&node.icon.glyph())
    ));
    if config.show_labels && !node.name.is_empty() {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            node.x,
            node.y + node.radius + LABEL_GAP,
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&node.name)
        ));
    }
    out.push_str("</g>");
    out
}

fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].x, points[0].y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
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

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
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
