use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid adjacency matrix: {message}")]
    InvalidMatrix { message: String },

    #[error(
        "target graph is not empty ({nodes} nodes, {edges} edges); merging graphs is not supported"
    )]
    NonEmptyTarget { nodes: usize, edges: usize },

    #[error("unsupported display backend: {name} (expected one of: svg, raster)")]
    UnsupportedBackend { name: String },

    #[error("unusable path {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output path must not be blank")]
    EmptyPath,
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            message: message.into(),
        }
    }

    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }
}
