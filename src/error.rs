use std::path::PathBuf;

use thiserror::Error;

/// Failures of the caption pipeline, from catalog lookup to JPEG encoding.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("meme not found: {0:?}")]
    MemeNotFound(String),

    #[error("expected {expected} caption(s) for this meme, got {actual}")]
    CaptionCount { expected: usize, actual: usize },

    #[error("invalid color {0:?}: expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("box {index} of meme {meme:?} has a negative width or height")]
    InvalidBox { meme: String, index: usize },

    #[error("font error: {0}")]
    Font(String),

    #[error("failed to read asset {}: {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode background image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to draw text: {0}")]
    Raster(String),

    #[error("failed to encode jpeg: {0}")]
    Encode(#[source] image::ImageError),
}
