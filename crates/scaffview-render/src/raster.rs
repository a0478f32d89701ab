use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
        }
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| Error::PngEncode)
}

/// Rasterizes `svg` at its declared size times `scale`.
///
/// The root `width`/`height` fix the pixel size; the root viewBox is fitted into it by usvg.
pub fn svg_to_pixmap(
    svg: &str,
    scale: f32,
    background: Option<&str>,
) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| Error::SvgParse)?;

    let size = tree.size();
    let width_px = (size.width() * scale).round().max(1.0) as u32;
    let height_px = (size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(Error::PixmapAlloc)?;

    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Parses `transparent`, `white`, `black` and `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`.
pub(crate) fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    let [r, g, b, a] = match s.as_str() {
        "transparent" => [0, 0, 0, 0],
        "white" => [255; 4],
        "black" => [0, 0, 0, 255],
        _ => {
            let digits = s
                .strip_prefix('#')?
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<Vec<u8>>>()?;
            let channels: Vec<u8> = match digits.len() {
                3 | 4 => digits.iter().map(|d| d * 17).collect(),
                6 | 8 => digits.chunks(2).map(|p| p[0] * 16 + p[1]).collect(),
                _ => return None,
            };
            [
                channels[0],
                channels[1],
                channels[2],
                channels.get(3).copied().unwrap_or(255),
            ]
        }
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}
