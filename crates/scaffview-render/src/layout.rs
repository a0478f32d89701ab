//! Deterministic placement used for virtual display and export.
//!
//! Nodes are grouped into rows by level (one row per distinct level, ascending) and ordered by
//! matrix index inside a row. Rows are stacked top to bottom and centered horizontally.

use crate::style::{ResolvedStyle, StyleSheet};
use scaffview_core::{NodeImage, ScaffoldGraph};
use std::collections::BTreeMap;

/// Edge length of the square an image is fitted into before padding is added.
pub const NODE_CONTENT_SIZE: f64 = 160.0;
pub const RANK_SEP: f64 = 80.0;
pub const NODE_SEP: f64 = 40.0;
const LABEL_GAP: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: String,
    pub level: u32,
    /// Center.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Size of the fitted image inside the padded box.
    pub content_width: f64,
    pub content_height: f64,
    pub label: Option<String>,
    pub image: Option<NodeImage>,
}

impl SceneNode {
    pub fn center(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
    pub self_loop: bool,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub graph_id: String,
    pub style: ResolvedStyle,
    pub quality: bool,
    pub antialias: bool,
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub bounds: Bounds,
}

fn fitted_content(image: Option<&NodeImage>) -> (f64, f64) {
    let Some(image) = image else {
        return (NODE_CONTENT_SIZE, NODE_CONTENT_SIZE);
    };
    let w = f64::from(image.width().max(1));
    let h = f64::from(image.height().max(1));
    let scale = NODE_CONTENT_SIZE / w.max(h);
    (w * scale, h * scale)
}

/// Lays out `graph` using the style sheet stored in its presentation metadata.
pub fn layout_graph<T: ?Sized>(graph: &ScaffoldGraph<'_, T>) -> Scene {
    let presentation = graph.presentation();
    let style = ResolvedStyle::from_sheet(&StyleSheet::parse(&presentation.style_sheet));
    let label_height = style.text_size * 1.4;

    let mut nodes: Vec<SceneNode> = graph
        .nodes()
        .map(|n| {
            let (cw, ch) = fitted_content(n.image.as_ref());
            SceneNode {
                id: n.id.clone(),
                level: n.level,
                x: 0.0,
                y: 0.0,
                width: cw + 2.0 * style.node_padding,
                height: ch + 2.0 * style.node_padding,
                content_width: cw,
                content_height: ch,
                label: n.label.clone(),
                image: n.image.clone(),
            }
        })
        .collect();

    let mut ranks: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, n) in nodes.iter().enumerate() {
        ranks.entry(n.level).or_default().push(idx);
    }

    let rank_widths: Vec<f64> = ranks
        .values()
        .map(|ids| {
            let total: f64 = ids.iter().map(|&i| nodes[i].width).sum();
            total + NODE_SEP * ids.len().saturating_sub(1) as f64
        })
        .collect();
    let widest = rank_widths.iter().copied().fold(0.0_f64, f64::max);

    let mut y_cursor = 0.0;
    for (ids, rank_width) in ranks.values().zip(&rank_widths) {
        let max_h = ids.iter().map(|&i| nodes[i].height).fold(0.0_f64, f64::max);
        let has_label = ids.iter().any(|&i| nodes[i].label.is_some());
        let mut x_cursor = (widest - rank_width) / 2.0;
        for &i in ids {
            let n = &mut nodes[i];
            n.x = x_cursor + n.width / 2.0;
            n.y = y_cursor + max_h / 2.0;
            x_cursor += n.width + NODE_SEP;
        }
        y_cursor += max_h + RANK_SEP;
        if has_label {
            y_cursor += label_height + LABEL_GAP;
        }
    }

    let by_id: BTreeMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let edges: Vec<SceneEdge> = graph
        .edges()
        .filter_map(|e| {
            let s = &nodes[*by_id.get(e.source.as_str())?];
            let t = &nodes[*by_id.get(e.target.as_str())?];
            let self_loop = e.is_self_loop();
            let points = if self_loop {
                self_loop_points(s)
            } else {
                vec![
                    clip_to_box(s, t.center()),
                    clip_to_box(t, s.center()),
                ]
            };
            Some(SceneEdge {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                points,
                self_loop,
            })
        })
        .collect();

    let bounds = scene_bounds(&nodes, &edges, &style, label_height);

    Scene {
        graph_id: graph.id().to_string(),
        style,
        quality: presentation.quality,
        antialias: presentation.antialias,
        nodes,
        edges,
        bounds,
    }
}

/// Point where the segment from the node center towards `toward` leaves the node box.
fn clip_to_box(node: &SceneNode, toward: Point) -> Point {
    let dx = toward.x - node.x;
    let dy = toward.y - node.y;
    let hw = node.width / 2.0;
    let hh = node.height / 2.0;
    if dx == 0.0 && dy == 0.0 {
        return node.center();
    }
    let (sx, sy) = if dy.abs() * hw > dx.abs() * hh {
        let sy = if dy < 0.0 { -hh } else { hh };
        (sy * dx / dy, sy)
    } else {
        let sx = if dx < 0.0 { -hw } else { hw };
        (sx, sx * dy / dx)
    };
    Point {
        x: node.x + sx,
        y: node.y + sy,
    }
}

/// Loop anchored on the top-right corner of the node box.
fn self_loop_points(node: &SceneNode) -> Vec<Point> {
    let right = node.x + node.width / 2.0;
    let top = node.y - node.height / 2.0;
    let r = (node.width.min(node.height) / 4.0).max(12.0);
    vec![
        Point {
            x: right - r,
            y: top,
        },
        Point {
            x: right - r,
            y: top - r,
        },
        Point {
            x: right + r,
            y: top - r,
        },
        Point {
            x: right + r,
            y: top + r,
        },
        Point {
            x: right,
            y: top + r,
        },
    ]
}

fn scene_bounds(
    nodes: &[SceneNode],
    edges: &[SceneEdge],
    style: &ResolvedStyle,
    label_height: f64,
) -> Bounds {
    let mut b = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for n in nodes {
        b.include(n.x - n.width / 2.0, n.y - n.height / 2.0);
        let bottom = n.y
            + n.height / 2.0
            + if n.label.is_some() {
                LABEL_GAP + label_height
            } else {
                0.0
            };
        b.include(n.x + n.width / 2.0, bottom);
    }
    for e in edges {
        for p in &e.points {
            b.include(p.x, p.y);
        }
    }
    if !b.min_x.is_finite() {
        b = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
        };
    }
    let pad = style.graph_padding;
    Bounds {
        min_x: b.min_x - pad,
        min_y: b.min_y - pad,
        max_x: b.max_x + pad,
        max_y: b.max_y + pad,
    }
}
