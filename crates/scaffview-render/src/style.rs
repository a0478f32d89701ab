//! Tolerant parser for the CSS-like style sheet carried by a graph.
//!
//! Only `selector { property: value; ... }` blocks are understood. Comma separated selector
//! lists are expanded, later declarations win, and anything that does not parse is skipped.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq)]
struct Rule {
    selector: String,
    declarations: Vec<(String, String)>,
}

impl StyleSheet {
    pub fn parse(text: &str) -> Self {
        let text = strip_comments(text);
        let mut rules = Vec::new();
        let mut rest = text.as_str();
        while let Some(open) = rest.find('{') {
            let selectors = &rest[..open];
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let body = &after[..close];
            rest = &after[close + 1..];

            let declarations: Vec<(String, String)> = body
                .split(';')
                .filter_map(|decl| {
                    let (k, v) = decl.split_once(':')?;
                    let k = k.trim().to_ascii_lowercase();
                    let v = v.trim();
                    if k.is_empty() || v.is_empty() {
                        return None;
                    }
                    Some((k, v.to_string()))
                })
                .collect();

            for selector in selectors.split(',') {
                let selector = selector.trim().to_ascii_lowercase();
                if selector.is_empty() {
                    continue;
                }
                rules.push(Rule {
                    selector,
                    declarations: declarations.clone(),
                });
            }
        }
        Self { rules }
    }

    /// Last value declared for `property` under `selector`.
    pub fn get(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules
            .iter()
            .rev()
            .filter(|r| r.selector == selector)
            .flat_map(|r| r.declarations.iter().rev())
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_length(&self, selector: &str, property: &str) -> Option<f64> {
        parse_length(self.get(selector, property)?)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Parses `60px`, `60`, or `60.5 px`. Multi-value lengths use their first component.
pub fn parse_length(value: &str) -> Option<f64> {
    let first = value.split([' ', ',']).find(|s| !s.is_empty())?;
    let number = first.trim().trim_end_matches("px").trim();
    let v = number.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    RoundedBox,
    Circle,
}

/// Values used by placement and SVG output, resolved from a [`StyleSheet`] with fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub node_padding: f64,
    pub graph_padding: f64,
    pub node_shape: NodeShape,
    pub node_fill: String,
    pub node_stroke: String,
    pub edge_color: String,
    pub text_size: f64,
    pub text_color: String,
    pub background: String,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            node_padding: 8.0,
            graph_padding: 20.0,
            node_shape: NodeShape::Box,
            node_fill: "#ffffff".to_string(),
            node_stroke: "#333333".to_string(),
            edge_color: "#333333".to_string(),
            text_size: 14.0,
            text_color: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

impl ResolvedStyle {
    pub fn from_sheet(sheet: &StyleSheet) -> Self {
        let mut out = Self::default();
        if let Some(v) = sheet.get_length("node", "padding") {
            out.node_padding = v.max(0.0);
        }
        if let Some(v) = sheet.get_length("graph", "padding") {
            out.graph_padding = v.max(0.0);
        }
        if let Some(shape) = sheet.get("node", "shape") {
            out.node_shape = match shape.trim() {
                "rounded-box" => NodeShape::RoundedBox,
                "circle" => NodeShape::Circle,
                _ => NodeShape::Box,
            };
        }
        if let Some(v) = sheet.get("node", "fill-color") {
            out.node_fill = v.to_string();
        }
        if let Some(v) = sheet.get("node", "stroke-color") {
            out.node_stroke = v.to_string();
        }
        if let Some(v) = sheet.get("edge", "fill-color") {
            out.edge_color = v.to_string();
        }
        if let Some(v) = sheet.get_length("node", "text-size") {
            out.text_size = v.max(1.0);
        }
        if let Some(v) = sheet.get("node", "text-color") {
            out.text_color = v.to_string();
        }
        if let Some(v) = sheet.get("graph", "fill-color") {
            out.background = v.to_string();
        }
        out
    }

    pub fn parse(text: &str) -> Self {
        Self::from_sheet(&StyleSheet::parse(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffview_core::config::DEFAULT_STYLE_SHEET;

    #[test]
    fn default_sheet_resolves_paddings_and_shape() {
        let s = ResolvedStyle::parse(DEFAULT_STYLE_SHEET);
        assert_eq!(s.node_padding, 60.0);
        assert_eq!(s.graph_padding, 70.0);
        assert_eq!(s.node_shape, NodeShape::RoundedBox);
    }

    #[test]
    fn later_declarations_win_and_selector_lists_expand() {
        let sheet =
            StyleSheet::parse("node, edge { fill-color: red; } /* x */ node { fill-color: blue; }");
        assert_eq!(sheet.get("node", "fill-color"), Some("blue"));
        assert_eq!(sheet.get("edge", "fill-color"), Some("red"));
    }

    #[test]
    fn garbage_is_ignored() {
        let sheet = StyleSheet::parse("node { padding; : 3; text-size: 12px } graph {");
        assert_eq!(sheet.get_length("node", "text-size"), Some(12.0));
        assert_eq!(sheet.get("node", "padding"), None);
        assert_eq!(sheet.get("graph", "padding"), None);
    }

    #[test]
    fn lengths_accept_units_and_lists() {
        assert_eq!(parse_length("60px"), Some(60.0));
        assert_eq!(parse_length(" 4.5 px"), Some(4.5));
        assert_eq!(parse_length("10px, 20px"), Some(10.0));
        assert_eq!(parse_length("wide"), None);
    }
}
