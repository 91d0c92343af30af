//! Error types
//!
//! Configuration errors disable the subsystem that raised them for the rest
//! of the session; they never stop the simulation as a whole.

use thiserror::Error;

use crate::sim::{ContentKind, WallSide};

/// A required collaborator reference was not supplied at session start.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No viewport/camera geometry to stream against.
    #[error("camera viewport is not assigned")]
    MissingCamera,

    /// A content template needed by a spawner is missing.
    #[error("prefab for {0:?} is not assigned")]
    MissingPrefab(ContentKind),

    /// A wall anchor needed to place hazards is missing.
    #[error("{0:?} wall anchor is not assigned")]
    MissingAnchor(WallSide),

    /// The launch controller has nothing to draw its aim on.
    #[error("aim indicator is not assigned")]
    MissingAimIndicator,

    /// The launch controller has no physics body to push.
    #[error("player body is not assigned")]
    MissingBody,

    /// The launch controller has no wall contact sensor to read.
    #[error("wall contact sensor is not assigned")]
    MissingSensor,
}

/// Errors loading or saving persisted data (tuning files, climb records).
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}
