//! ProHiC Core Library
//!
//! Contact map transforms, colormaps, matrix and track readers, the circular
//! map store and the track alignment session for ProHiC.

pub mod types;
pub mod transform;
pub mod colormap;
pub mod io;
pub mod store;
pub mod track;
pub mod summary;
pub mod session;
pub mod error;

// Re-export commonly used types and functions
pub use types::{ContactMatrix, CurvePoint, GenomicPos, Resolution, Strand};
pub use transform::Pipeline;
pub use io::{open_source, ContactSource, SourceError, SourceKind};
pub use store::{MapStore, StoreDefaults};
pub use track::{Curve, MapListener, Region, Track, TrackKind};
pub use summary::MapSummary;
pub use session::{Browser, SessionSettings, TrackId};
pub use error::{ProhicError, ProhicResult};

/// Version information for the ProHiC core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
