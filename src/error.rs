/// Error types.
///
/// Only asset loading can fail in a way the player sees; everything in the
/// simulation clamps or no-ops instead of erroring.

use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Not a supported image format: {0}")]
    UnsupportedFormat(&'static str),

    #[allow(dead_code)]
    #[error("could not rasterize {path}: {reason}")]
    Svg { path: PathBuf, reason: String },
}

pub type GameResult<T> = Result<T, GameError>;
