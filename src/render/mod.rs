mod report;
mod svg;

pub use report::{LayoutReport, layout_report};
pub use svg::{SvgOptions, render_svg};

use crate::graph::organization_color;

pub(crate) fn organization_fill(index: usize) -> String {
    let (r, g, b) = organization_color(index);
    format!("#{r:02x}{g:02x}{b:02x}")
}
