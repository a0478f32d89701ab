use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

pub const DEFAULT_LABEL_NODES: bool = true;
pub const DEFAULT_GRAPH_ID: &str = "Graph";
pub const DEFAULT_STYLE_SHEET: &str = "node { shape: rounded-box; size-mode: fit; padding: 60px; } graph { shape: box; size-mode: fit; padding: 70px; }";
pub const DEFAULT_DEPICTION_SIZE: DepictionSize = DepictionSize {
    width: 2048,
    height: 2048,
};
pub const DEFAULT_WORKING_DIR_NAME: &str = "ScaffoldGraphDisplay";
pub const DEFAULT_TEMP_DIR_NAME: &str = "temp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepictionSize {
    pub width: u32,
    pub height: u32,
}

impl DepictionSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl FromStr for DepictionSize {
    type Err = Error;

    /// Parses `WxH`, e.g. `512x512`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::invalid_argument(format!("expected <width>x<height>, got {s:?}"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width = w.trim().parse::<u32>().map_err(|_| bad())?;
        let height = h.trim().parse::<u32>().map_err(|_| bad())?;
        Ok(Self { width, height })
    }
}

/// Per-assembly options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub label_nodes: bool,
    pub depiction_size: DepictionSize,
    pub style_sheet: String,
    pub graph_id: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_nodes: DEFAULT_LABEL_NODES,
            depiction_size: DEFAULT_DEPICTION_SIZE,
            style_sheet: DEFAULT_STYLE_SHEET.to_string(),
            graph_id: DEFAULT_GRAPH_ID.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn with_graph_id(mut self, id: impl Into<String>) -> Self {
        self.graph_id = id.into();
        self
    }

    pub fn with_labels(mut self, label_nodes: bool) -> Self {
        self.label_nodes = label_nodes;
        self
    }

    pub fn with_style_sheet(mut self, style_sheet: impl Into<String>) -> Self {
        self.style_sheet = style_sheet.into();
        self
    }

    pub fn with_depiction_size(mut self, size: DepictionSize) -> Self {
        self.depiction_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.graph_id.trim().is_empty() {
            return Err(Error::invalid_argument("graph id must not be blank"));
        }
        if self.depiction_size.is_empty() {
            return Err(Error::invalid_argument(format!(
                "depiction size must be positive, got {}x{}",
                self.depiction_size.width, self.depiction_size.height
            )));
        }
        Ok(())
    }
}

/// How the virtual display materializes the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayBackend {
    #[default]
    Svg,
    Raster,
}

impl DisplayBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Raster => "raster",
        }
    }
}

impl FromStr for DisplayBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "raster" | "png" => Ok(Self::Raster),
            _ => Err(Error::UnsupportedBackend {
                name: s.to_string(),
            }),
        }
    }
}

/// Pixel dimensions of a display viewport or export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD_720: Self = Self {
        width: 1280,
        height: 720,
    };
    pub const UHD_4K: Self = Self {
        width: 3840,
        height: 2160,
    };
}

/// Filesystem and display configuration shared by assembly, display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub working_dir: PathBuf,
    /// Parent of the per-assembly depiction directories. Defaults to `<working_dir>/temp`.
    pub temp_dir: Option<PathBuf>,
    pub backend: DisplayBackend,
    pub viewport: Resolution,
    pub high_quality_resolution: Resolution,
}

impl Default for Settings {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            working_dir: cwd.join(DEFAULT_WORKING_DIR_NAME),
            temp_dir: None,
            backend: DisplayBackend::default(),
            viewport: Resolution::HD_720,
            high_quality_resolution: Resolution::UHD_4K,
        }
    }
}

static GLOBAL_SETTINGS: OnceLock<Settings> = OnceLock::new();

impl Settings {
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_backend(mut self, backend: DisplayBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| self.working_dir.join(DEFAULT_TEMP_DIR_NAME))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| Error::invalid_argument(format!("invalid settings JSON: {err}")))
    }

    /// Creates the working and temp directories and checks that both are writable.
    pub fn prepare(&self) -> Result<()> {
        ensure_writable_dir(&self.working_dir)?;
        ensure_writable_dir(&self.temp_dir())
    }

    /// Process-wide defaults used by the convenience entry points.
    ///
    /// Falls back to [`Settings::default`] unless [`Settings::install`] ran first.
    pub fn global() -> &'static Settings {
        GLOBAL_SETTINGS.get_or_init(Settings::default)
    }

    /// Installs the process-wide defaults. Returns the rejected value if they were already set
    /// (or already read through [`Settings::global`]).
    pub fn install(settings: Settings) -> std::result::Result<(), Settings> {
        GLOBAL_SETTINGS.set(settings)
    }
}

/// Creates `dir` (and parents) if needed and verifies it accepts new files.
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::EmptyPath);
    }
    std::fs::create_dir_all(dir).map_err(|err| Error::path(dir, err))?;
    let meta = std::fs::metadata(dir).map_err(|err| Error::path(dir, err))?;
    if !meta.is_dir() {
        return Err(Error::path(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    tempfile::Builder::new()
        .prefix(".scaffview-probe-")
        .tempfile_in(dir)
        .map_err(|err| Error::path(dir, err))?;
    Ok(())
}
