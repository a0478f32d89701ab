//! Headless virtual display.
//!
//! Showing a graph lays it out once and materializes the view into the working directory as
//! `<graph-id>.svg` or `<graph-id>.png`, depending on [`DisplayBackend`]. The returned
//! [`ViewHandle`] keeps the laid out scene so screenshots of the current view skip placement.

use crate::error::Result;
use crate::export::{check_output_path, rasterize, write_png};
use crate::layout::{Scene, layout_graph};
use crate::svg::{SvgRenderOptions, render_scene_svg, sanitize_svg_id};
use scaffview_core::{DisplayBackend, Resolution, ScaffoldGraph, Settings};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ViewHandle {
    scene: Scene,
    viewport: Resolution,
    backend: DisplayBackend,
    output: PathBuf,
}

impl ViewHandle {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn backend(&self) -> DisplayBackend {
        self.backend
    }

    /// File the view was materialized into.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Fast-tier PNG of the current view.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_output_path(path)?;
        let png = rasterize(&self.scene, self.viewport, false)?;
        write_png(path, &png)
    }
}

pub fn display<T: ?Sized>(graph: &ScaffoldGraph<'_, T>, settings: &Settings) -> Result<ViewHandle> {
    settings.prepare()?;
    let scene = layout_graph(graph);
    let stem = sanitize_svg_id(graph.id());

    let output = match settings.backend {
        DisplayBackend::Svg => {
            let path = settings.working_dir.join(format!("{stem}.svg"));
            let svg = render_scene_svg(
                &scene,
                &SvgRenderOptions {
                    resolution: Some(settings.viewport),
                    force_quality: false,
                },
            );
            std::fs::write(&path, svg).map_err(|err| scaffview_core::Error::path(&path, err))?;
            path
        }
        DisplayBackend::Raster => {
            let path = settings.working_dir.join(format!("{stem}.png"));
            let png = rasterize(&scene, settings.viewport, false)?;
            write_png(&path, &png)?;
            path
        }
    };

    tracing::debug!(
        graph = graph.id(),
        backend = settings.backend.as_str(),
        output = %output.display(),
        "displayed graph"
    );

    Ok(ViewHandle {
        scene,
        viewport: settings.viewport,
        backend: settings.backend,
        output,
    })
}
