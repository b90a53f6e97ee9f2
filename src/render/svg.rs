use std::fmt::Write;

use crate::graph::Scene;

use super::organization_fill;

/// Canvas geometry for the static document. The drawing area is the canvas
/// minus the margins, with the simulation origin at its center.
#[derive(Clone, Copy, Debug)]
pub struct SvgOptions {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            canvas_width: 750.0,
            canvas_height: 750.0,
            margin_top: 50.0,
            margin_right: 30.0,
            margin_bottom: 120.0,
            margin_left: 60.0,
        }
    }
}

impl SvgOptions {
    fn center(&self) -> (f32, f32) {
        let inner_width = self.canvas_width - self.margin_left - self.margin_right;
        let inner_height = self.canvas_height - self.margin_top - self.margin_bottom;
        (
            self.margin_left + 0.5 * inner_width,
            self.margin_top + 0.5 * inner_height,
        )
    }
}

/// Render the (typically pre-settled) scene as a self-contained SVG document:
/// one line per visible edge, one circle per person, with native `<title>`
/// annotations carrying the tooltip text.
pub fn render_svg(scene: &Scene, options: &SvgOptions) -> String {
    let (center_x, center_y) = options.center();
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = options.canvas_width,
        h = options.canvas_height,
    );
    let _ = writeln!(
        out,
        r##"  <g class="links" stroke="#999" stroke-width="1.5">"##
    );
    for edge in &scene.edges {
        let source = scene.position(edge.source);
        let target = scene.position(edge.target);
        let _ = writeln!(
            out,
            r#"    <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"><title>{} -&gt; {}</title></line>"#,
            center_x + source.x,
            center_y + source.y,
            center_x + target.x,
            center_y + target.y,
            escape_xml(&scene.nodes[edge.source].name),
            escape_xml(&scene.nodes[edge.target].name),
        );
    }
    let _ = writeln!(out, "  </g>");

    let _ = writeln!(out, r#"  <g class="nodes" stroke="black" stroke-width="2">"#);
    for (index, node) in scene.nodes.iter().enumerate() {
        if node.draw_radius <= 0.0 {
            continue;
        }
        let position = scene.position(index);
        let _ = writeln!(
            out,
            r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"><title>Name: {}&#10;Role: {}&#10;Organization: {}</title></circle>"#,
            center_x + position.x,
            center_y + position.y,
            node.draw_radius,
            organization_fill(node.org_index),
            escape_xml(&node.name),
            escape_xml(&node.role),
            escape_xml(&node.organization),
        );
    }
    let _ = writeln!(out, "  </g>");
    let _ = writeln!(out, "</svg>");
    out
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
