#![forbid(unsafe_code)]

//! Headless presentation of scaffold graphs: placement, SVG scenes, PNG export and a virtual
//! display that writes the current view to disk.

pub mod display;
pub mod error;
pub mod export;
pub mod layout;
pub mod raster;
pub mod style;
pub mod svg;

pub use display::{ViewHandle, display};
pub use error::{Error, Result};
pub use export::{Quality, export, screenshot, screenshot_high_quality};
pub use layout::{Scene, layout_graph};
pub use svg::{SvgRenderOptions, render_scene_svg};
