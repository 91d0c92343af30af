//! Wall Climber - a vertical scrolling wall-launch game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (camera climb, content streaming, wall launch)
//! - `tuning`: Data-driven game balance
//! - `records`: Best-climb leaderboard
//! - `error`: Configuration and persistence errors

pub mod error;
pub mod records;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, RecordsError};
pub use records::ClimbRecords;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Smallest tile height the wall tiler will accept (world units)
    pub const MIN_TILE_HEIGHT: f32 = 0.001;

    /// Aim window used when no wall side has been committed yet (degrees)
    pub const FALLBACK_MIN_DEG: f32 = 30.0;
    pub const FALLBACK_MAX_DEG: f32 = 150.0;

    /// Window midpoints the aim snaps to when the committed side flips
    pub const RIGHT_WALL_MID_DEG: f32 = 135.0;
    pub const LEFT_WALL_MID_DEG: f32 = 45.0;

    /// Downward acceleration applied to the player body (world units/s²)
    pub const GRAVITY: f32 = 9.81;

    /// Default 9:16 portrait aspect
    pub const TARGET_ASPECT: (f32, f32) = (9.0, 16.0);
}

/// Unit direction for an angle in degrees (0° = +X, 90° = +Y)
#[inline]
pub fn deg_to_dir(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin()).normalize_or_zero()
}

/// Float comparison with an absolute tolerance
#[inline]
pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
