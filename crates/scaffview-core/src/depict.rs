//! Per-node structure depiction.
//!
//! Rendering a structure is delegated to a [`Depicter`]. A failure only affects the node it
//! belongs to: it is logged, recorded as a [`DepictionWarning`] and the node is kept without an
//! image.

use crate::config::DepictionSize;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type Bitmap = image::RgbaImage;

pub type DepictionResult = std::result::Result<Bitmap, DepictionError>;

/// Failure reported by a depiction collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DepictionError {
    #[error("structure cannot be depicted: {message}")]
    Structure { message: String },
    #[error("depiction produced an empty bitmap")]
    EmptyBitmap,
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DepictionError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }
}

/// Renders a structure handle into a bitmap of (at most) the requested size.
pub trait Depicter<S: ?Sized> {
    fn depict(&self, structure: &S, size: DepictionSize) -> DepictionResult;
}

impl<S, F> Depicter<S> for F
where
    S: ?Sized,
    F: Fn(&S, DepictionSize) -> DepictionResult,
{
    fn depict(&self, structure: &S, size: DepictionSize) -> DepictionResult {
        self(structure, size)
    }
}

/// Depicter that never produces an image; every node becomes a placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDepiction;

impl<S: ?Sized> Depicter<S> for NoDepiction {
    fn depict(&self, _structure: &S, _size: DepictionSize) -> DepictionResult {
        Err(DepictionError::structure("depiction disabled"))
    }
}

/// Image attached to a graph node.
#[derive(Debug, Clone)]
pub struct NodeImage {
    pub bitmap: Arc<Bitmap>,
    /// Temporary PNG copy consumed by display/export; `None` if it could not be written.
    pub file: Option<PathBuf>,
}

impl NodeImage {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

/// Recovered per-node depiction failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepictionWarning {
    pub index: usize,
    pub message: String,
}

/// Scoped directory holding the temporary depiction files of one assembled graph.
#[derive(Debug)]
pub struct DepictionScope {
    dir: tempfile::TempDir,
}

impl DepictionScope {
    /// Creates a fresh, uniquely named directory below `parent` (created if missing).
    pub fn create_in(parent: &Path) -> Result<Self> {
        std::fs::create_dir_all(parent).map_err(|err| Error::path(parent, err))?;
        let dir = tempfile::Builder::new()
            .prefix("scaffview-")
            .tempdir_in(parent)
            .map_err(|err| Error::path(parent, err))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file_for(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("node-{index}.png"))
    }

    /// Deletes the directory and every depiction file in it.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// Depicts one node and stores the result in `scope`.
pub fn resolve_depiction<S, D>(
    index: usize,
    structure: &S,
    depicter: &D,
    size: DepictionSize,
    scope: Option<&DepictionScope>,
) -> std::result::Result<NodeImage, DepictionWarning>
where
    S: ?Sized,
    D: Depicter<S> + ?Sized,
{
    let bitmap = depict_node(index, structure, depicter, size)?;
    Ok(store_depiction(index, bitmap, scope))
}

/// Runs `depicter` for the node at `index`. Failures and empty bitmaps are logged and returned
/// as a [`DepictionWarning`].
pub fn depict_node<S, D>(
    index: usize,
    structure: &S,
    depicter: &D,
    size: DepictionSize,
) -> std::result::Result<Bitmap, DepictionWarning>
where
    S: ?Sized,
    D: Depicter<S> + ?Sized,
{
    depicter
        .depict(structure, size)
        .and_then(|bmp| {
            if bmp.width() == 0 || bmp.height() == 0 {
                Err(DepictionError::EmptyBitmap)
            } else {
                Ok(bmp)
            }
        })
        .map_err(|err| {
            tracing::warn!(
                index,
                error = %err,
                "unable to depict structure at index {index}; displaying empty node"
            );
            DepictionWarning {
                index,
                message: err.to_string(),
            }
        })
}

/// Wraps `bitmap` for attachment, saving a PNG copy into `scope` when one is given.
pub fn store_depiction(
    index: usize,
    bitmap: Bitmap,
    scope: Option<&DepictionScope>,
) -> NodeImage {
    let file = scope.and_then(|scope| {
        let path = scope.file_for(index);
        match bitmap.save_with_format(&path, image::ImageFormat::Png) {
            Ok(()) => Some(path),
            Err(err) => {
                tracing::warn!(
                    index,
                    path = %path.display(),
                    error = %err,
                    "failed to write temporary depiction file"
                );
                None
            }
        }
    });

    NodeImage {
        bitmap: Arc::new(bitmap),
        file,
    }
}
