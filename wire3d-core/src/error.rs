/// Error types shared across the core pipeline
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures the core reports to its caller.
///
/// Data problems that the pipeline can recover from (a malformed STF line,
/// a dangling point id, an unknown strategy name) are logged and skipped
/// instead of being returned here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid shape: {reason}")]
    InvalidShape { reason: String },

    #[error("degenerate projection: z ({z}) + focal length ({focal_length}) is zero")]
    DegenerateProjection { z: f32, focal_length: f32 },

    #[error("unknown line strategy `{0}`")]
    UnknownStrategy(String),

    #[error("failed to read font file {}: {source}", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write font: {0}")]
    FontWrite(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }
}
