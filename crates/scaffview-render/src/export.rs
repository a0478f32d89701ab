//! PNG export of assembled graphs.
//!
//! Two tiers are offered:
//! - [`Quality::Fast`] rasterizes the view at the configured viewport size and honours the
//!   graph's own quality/antialias flags
//! - [`Quality::High`] lays the graph out again and renders it at the high quality resolution
//!   (3840x2160 by default) with quality and antialiasing forced on
//!
//! Existing files are overwritten.

use crate::error::{Error, Result};
use crate::layout::{Scene, layout_graph};
use crate::raster::{RasterOptions, svg_to_png};
use crate::svg::{SvgRenderOptions, render_scene_svg};
use scaffview_core::config::ensure_writable_dir;
use scaffview_core::{Resolution, ScaffoldGraph, Settings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Fast,
    High,
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "high" => Ok(Self::High),
            other => Err(scaffview_core::Error::InvalidArgument {
                message: format!("unknown export quality: {other} (expected fast or high)"),
            }
            .into()),
        }
    }
}

/// Writes a PNG image of `graph` to `path`.
pub fn export<T: ?Sized>(
    graph: &ScaffoldGraph<'_, T>,
    path: impl AsRef<Path>,
    quality: Quality,
    settings: &Settings,
) -> Result<()> {
    let path = path.as_ref();
    check_output_path(path)?;
    let scene = layout_graph(graph);
    let png = match quality {
        Quality::Fast => rasterize(&scene, settings.viewport, false)?,
        Quality::High => rasterize(&scene, settings.high_quality_resolution, true)?,
    };
    write_png(path, &png)?;
    tracing::debug!(
        graph = graph.id(),
        path = %path.display(),
        ?quality,
        bytes = png.len(),
        "exported graph"
    );
    Ok(())
}

pub fn screenshot<T: ?Sized>(
    graph: &ScaffoldGraph<'_, T>,
    path: impl AsRef<Path>,
    settings: &Settings,
) -> Result<()> {
    export(graph, path, Quality::Fast, settings)
}

pub fn screenshot_high_quality<T: ?Sized>(
    graph: &ScaffoldGraph<'_, T>,
    path: impl AsRef<Path>,
    settings: &Settings,
) -> Result<()> {
    export(graph, path, Quality::High, settings)
}

pub(crate) fn rasterize(
    scene: &Scene,
    resolution: Resolution,
    force_quality: bool,
) -> Result<Vec<u8>> {
    let svg = render_scene_svg(
        scene,
        &SvgRenderOptions {
            resolution: Some(resolution),
            force_quality,
        },
    );
    svg_to_png(
        &svg,
        &RasterOptions {
            scale: 1.0,
            background: Some(scene.style.background.clone()),
        },
    )
}

/// Rejects blank paths and makes sure the parent directory exists and is writable.
pub(crate) fn check_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(scaffview_core::Error::EmptyPath.into());
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_writable_dir(parent)?;
    Ok(())
}

pub(crate) fn write_png(path: &Path, png: &[u8]) -> Result<()> {
    std::fs::write(path, png).map_err(|err| scaffview_core::Error::path(path, err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!("fast".parse::<Quality>().unwrap(), Quality::Fast);
        assert!("best".parse::<Quality>().is_err());
    }

    #[test]
    fn blank_output_path_is_rejected() {
        for p in ["", "   "] {
            assert!(matches!(
                check_output_path(Path::new(p)),
                Err(Error::Core(scaffview_core::Error::EmptyPath))
            ));
        }
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("a").join("b").join("out.png");
        check_output_path(&out).unwrap();
        assert!(tmp.path().join("a").join("b").is_dir());
    }
}
