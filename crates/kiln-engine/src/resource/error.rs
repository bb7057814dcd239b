use std::path::PathBuf;

use thiserror::Error;

/// Startup resource errors. All of them are fatal before the first frame.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown shader program '{0}'")]
    UnknownShader(String),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("image {} has zero size", path.display())]
    EmptyImage { path: PathBuf },

    #[error("image {} is {width}x{height}; device limit is {limit}", path.display())]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        limit: u32,
    },
}
