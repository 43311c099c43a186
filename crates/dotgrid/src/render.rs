//! SVG output for a backdrop frame.
//!
//! The document is self-contained: palette colours are CSS custom properties so
//! a page can restyle it, and the dark palette is selected by a class on the
//! root element.

use crate::grid::{GridPoint, Hotspot, Lattice};
use crate::path::Path;
use std::fmt::Write;

const CSS_PALETTE: &str = r#"<style>
  .dotgrid { --dotgrid-bg: #ffffff; --dotgrid-dot: #d4d4d8; --dotgrid-hotspot: #a1a1aa; --dotgrid-path: #2563eb; --dotgrid-source: #f97316; }
  .dotgrid.dark { --dotgrid-bg: #09090b; --dotgrid-dot: #27272a; --dotgrid-hotspot: #52525b; --dotgrid-path: #60a5fa; --dotgrid-source: #fb923c; }
  .dotgrid .trace { stroke-dasharray: 6 6; animation: dotgrid-dash 1.2s linear infinite; }
  @keyframes dotgrid-dash { to { stroke-dashoffset: -12; } }
</style>
"#;

/// Everything a frame shows.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub lattice: Lattice,
    pub width: u32,
    pub height: u32,
    pub hotspots: &'a [Hotspot],
    pub active: Vec<&'a Path>,
    pub source: Option<GridPoint>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Use the dark palette.
    pub dark_mode: bool,
    /// Animate active path strokes.
    pub animate: bool,
    /// Skip the background dot lattice, drawing only hotspots and paths.
    pub hide_lattice: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn with_hide_lattice(mut self, hide_lattice: bool) -> Self {
        self.hide_lattice = hide_lattice;
        self
    }
}

pub fn render_svg(scene: &Scene<'_>, options: &RenderOptions) -> String {
    let (w, h) = (scene.width, scene.height);
    let class = if options.dark_mode { "dotgrid dark" } else { "dotgrid" };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}" class="{class}">"#
    );
    svg.push_str(CSS_PALETTE);
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="var(--dotgrid-bg)"/>"#
    );

    if !options.hide_lattice {
        svg.push_str("<g fill=\"var(--dotgrid-dot)\">\n");
        for p in scene.lattice.points() {
            let _ = writeln!(svg, r#"<circle cx="{}" cy="{}" r="1.5"/>"#, p.x, p.y);
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("<g fill=\"var(--dotgrid-hotspot)\">\n");
    for hotspot in scene.hotspots {
        let _ = writeln!(
            svg,
            r#"<circle cx="{}" cy="{}" r="3" data-id="{}"/>"#,
            hotspot.x,
            hotspot.y,
            escape_xml(&hotspot.id)
        );
    }
    svg.push_str("</g>\n");

    let trace_class = if options.animate { r#" class="trace""# } else { "" };
    svg.push_str(
        "<g fill=\"none\" stroke=\"var(--dotgrid-path)\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\">\n",
    );
    for path in &scene.active {
        let _ = writeln!(
            svg,
            r#"<polyline points="{}" data-id="{}"{trace_class}/>"#,
            polyline_points(&path.points),
            escape_xml(&path.id)
        );
    }
    svg.push_str("</g>\n");

    if let Some(source) = scene.source {
        let _ = writeln!(
            svg,
            r#"<circle cx="{}" cy="{}" r="5" fill="var(--dotgrid-source)"/>"#,
            source.x, source.y
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn polyline_points(points: &[GridPoint]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", p.x, p.y);
    }
    out
}

fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
