//! Crate-level error for session operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::colormap::ColormapError;
use crate::io::SourceError;
use crate::session::TrackId;

#[derive(Debug, Error)]
pub enum ProhicError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Colormap(#[from] ColormapError),

    #[error("no map is opened")]
    NoMapOpen,

    #[error("no track with id {0}")]
    UnknownTrack(TrackId),

    #[error("unsupported track file: {path}")]
    UnsupportedTrack { path: PathBuf },
}

pub type ProhicResult<T> = Result<T, ProhicError>;
