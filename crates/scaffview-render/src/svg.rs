//! SVG output for a laid out [`Scene`].

use crate::layout::{Point, Scene, SceneEdge, SceneNode};
use crate::style::NodeShape;
use base64::Engine as _;
use scaffview_core::{NodeImage, Resolution};
use std::fmt::Write as _;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    /// Fixed output size; the scene is scaled to fit, keeping its aspect ratio.
    /// `None` uses the scene's own extent.
    pub resolution: Option<Resolution>,
    /// Forces high quality rendering regardless of the graph's presentation flags.
    pub force_quality: bool,
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn fmt_num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == r.trunc() {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}

/// Converts an arbitrary graph id into a conservative SVG `id` token.
pub fn sanitize_svg_id(raw: &str) -> String {
    let raw = raw.trim();
    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
        out.push(if ok { ch } else { '-' });
    }
    if !out.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        out.insert_str(0, "g-");
    }
    out
}

/// `href` for a node image: the temporary file when it still exists, otherwise an inline PNG.
fn image_href(image: &NodeImage) -> Option<String> {
    if let Some(path) = image.file.as_deref().filter(|p| p.is_file()) {
        return Some(escape_xml(&path.to_string_lossy()));
    }
    let mut png = Vec::new();
    if let Err(err) = image
        .bitmap
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
    {
        tracing::warn!(error = %err, "failed to inline node image");
        return None;
    }
    Some(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    ))
}

fn write_node(out: &mut String, scene: &Scene, n: &SceneNode) {
    let style = &scene.style;
    let x = n.x - n.width / 2.0;
    let y = n.y - n.height / 2.0;
    let _ = write!(
        out,
        r#"<g class="node" id="node-{}">"#,
        escape_xml(&n.id)
    );
    match style.node_shape {
        NodeShape::Circle => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{}" stroke="{}"/>"#,
                fmt_num(n.x),
                fmt_num(n.y),
                fmt_num(n.width / 2.0),
                fmt_num(n.height / 2.0),
                escape_xml(&style.node_fill),
                escape_xml(&style.node_stroke)
            );
        }
        shape => {
            let rx = if shape == NodeShape::RoundedBox {
                (n.width.min(n.height) * 0.1).min(16.0)
            } else {
                0.0
            };
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(n.width),
                fmt_num(n.height),
                fmt_num(rx),
                escape_xml(&style.node_fill),
                escape_xml(&style.node_stroke)
            );
        }
    }
    if let Some(href) = n.image.as_ref().and_then(image_href) {
        let _ = write!(
            out,
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" href="{}"/>"#,
            fmt_num(n.x - n.content_width / 2.0),
            fmt_num(n.y - n.content_height / 2.0),
            fmt_num(n.content_width),
            fmt_num(n.content_height),
            href
        );
    }
    if let Some(label) = &n.label {
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{}">{}</text>"#,
            fmt_num(n.x),
            fmt_num(n.y + n.height / 2.0 + style.text_size * 1.2),
            fmt_num(style.text_size),
            escape_xml(&style.text_color),
            escape_xml(label)
        );
    }
    out.push_str("</g>");
}

fn path_data(points: &[Point], self_loop: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{},{}", fmt_num(p.x), fmt_num(p.y));
    }
    if self_loop {
        d.push('Z');
    }
    d
}

fn write_edge(out: &mut String, scene: &Scene, e: &SceneEdge) {
    let _ = write!(
        out,
        r#"<path class="edge" id="edge-{}" d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        escape_xml(&e.id),
        path_data(&e.points, e.self_loop),
        escape_xml(&scene.style.edge_color)
    );
}

pub fn render_scene_svg(scene: &Scene, options: &SvgRenderOptions) -> String {
    let b = &scene.bounds;
    let (width, height) = match options.resolution {
        Some(r) => (f64::from(r.width), f64::from(r.height)),
        None => (b.width(), b.height()),
    };
    let quality = options.force_quality || scene.quality;
    let antialias = options.force_quality || scene.antialias;

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" id="{}" width="{}" height="{}" viewBox="{} {} {} {}" preserveAspectRatio="xMidYMid meet" shape-rendering="{}" image-rendering="{}" text-rendering="{}" font-family="Arial, sans-serif">"#,
        sanitize_svg_id(&scene.graph_id),
        fmt_num(width),
        fmt_num(height),
        fmt_num(b.min_x),
        fmt_num(b.min_y),
        fmt_num(b.width()),
        fmt_num(b.height()),
        if antialias { "geometricPrecision" } else { "crispEdges" },
        if quality { "optimizeQuality" } else { "optimizeSpeed" },
        if antialias { "geometricPrecision" } else { "optimizeSpeed" },
    );
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        fmt_num(b.min_x),
        fmt_num(b.min_y),
        fmt_num(b.width()),
        fmt_num(b.height()),
        escape_xml(&scene.style.background)
    );
    out.push_str(r#"<g class="edges">"#);
    for e in &scene.edges {
        write_edge(&mut out, scene, e);
    }
    out.push_str(r#"</g><g class="nodes">"#);
    for n in &scene.nodes {
        write_node(&mut out, scene, n);
    }
    out.push_str("</g></svg>\n");
    out
}
