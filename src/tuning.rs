//! Data-driven game balance
//!
//! Every section carries `#[serde(default)]` so a tuning file only needs the
//! values it overrides. Defaults match the shipped game feel.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_TILE_HEIGHT;
use crate::error::RecordsError;

/// Camera climb ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Initial upward speed (world units/s)
    pub start_speed: f32,
    /// Speed gained per second
    pub accel: f32,
    /// Speed cap
    pub max_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            start_speed: 2.0,
            accel: 0.15,
            max_speed: 8.0,
        }
    }
}

/// Seamless wall tiler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTuning {
    /// Whole tiles kept above the camera's top edge
    pub pieces_above: u32,
    /// Distance below the bottom edge before a tile is reclaimed
    pub cull_margin: f32,
    /// Overlap between neighbouring tiles to hide seams
    pub seam_overlap: f32,
    /// Height used when the renderer cannot report tile bounds
    pub fallback_height: f32,
}

impl Default for WallTuning {
    fn default() -> Self {
        Self {
            pieces_above: 2,
            cull_margin: 2.0,
            seam_overlap: 0.01,
            fallback_height: 1.0,
        }
    }
}

/// Wall spike rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Smallest vertical spacing between rows
    pub min_gap: f32,
    /// Largest vertical spacing between rows
    pub max_gap: f32,
    /// Rows spawned unconditionally at session start
    pub prewarm_count: u32,
    pub cull_margin: f32,
    /// Chance a row carries spikes on both walls
    pub pair_probability: f32,
    /// Strict left, right, left, right placement instead of random rolls
    pub alternate_sides: bool,
    /// Inward offset from the wall anchors
    pub inset: f32,
    /// Radius used for player overlap checks
    pub hit_radius: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            min_gap: 4.0,
            max_gap: 7.0,
            prewarm_count: 2,
            cull_margin: 3.0,
            pair_probability: 0.25,
            alternate_sides: false,
            inset: 0.15,
            hit_radius: 0.25,
        }
    }
}

/// Flyer sway and wing flap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerMotionTuning {
    pub x_amplitude: f32,
    /// Horizontal sway frequency (Hz)
    pub x_freq: f32,
    pub y_amplitude: f32,
    /// Vertical bob frequency (Hz)
    pub y_freq: f32,
    /// Wing rotation amplitude (degrees)
    pub flap_amp_deg: f32,
    /// Wing flap frequency (Hz)
    pub flap_freq: f32,
    /// Resting wing spread (degrees)
    pub wing_base_deg: f32,
    /// Scale sway and flap frequencies with the camera's climb speed
    pub couple_to_camera_speed: bool,
    pub k_horiz: f32,
    pub k_flap: f32,
}

impl Default for FlyerMotionTuning {
    fn default() -> Self {
        Self {
            x_amplitude: 0.7,
            x_freq: 0.2,
            y_amplitude: 0.3,
            y_freq: 1.2,
            flap_amp_deg: 35.0,
            flap_freq: 3.0,
            wing_base_deg: 10.0,
            couple_to_camera_speed: true,
            k_horiz: 0.05,
            k_flap: 0.15,
        }
    }
}

/// Roaming flyers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerTuning {
    /// Vertical spacing between spawns
    pub spawn_gap: f32,
    /// Spawn X range between the walls
    pub x_min: f32,
    pub x_max: f32,
    pub prewarm_count: u32,
    pub cull_margin: f32,
    /// Lookahead above the top edge, in multiples of `spawn_gap`
    pub lookahead_factor: f32,
    pub hit_radius: f32,
    pub motion: FlyerMotionTuning,
}

impl Default for FlyerTuning {
    fn default() -> Self {
        Self {
            spawn_gap: 6.0,
            x_min: -2.5,
            x_max: 2.5,
            prewarm_count: 2,
            cull_margin: 3.0,
            lookahead_factor: 1.5,
            hit_radius: 0.35,
            motion: FlyerMotionTuning::default(),
        }
    }
}

/// Wall contact probes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorTuning {
    /// Probe length from the body centre
    pub probe_distance: f32,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            probe_distance: 0.5,
        }
    }
}

/// Aim sweep and charge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchTuning {
    /// Aim sweep speed (degrees/s)
    pub sweep_speed: f32,
    /// Keep the aim this far from the quadrant edges (degrees)
    pub edge_margin_deg: f32,
    pub min_force: f32,
    pub max_force: f32,
    /// Force gained per second of hold
    pub charge_rate: f32,
    /// Horizontal velocity decay per second while airborne
    pub horizontal_drag: f32,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            sweep_speed: 250.0,
            edge_margin_deg: 8.0,
            min_force: 20.0,
            max_force: 80.0,
            charge_rate: 5.5 / 3.0,
            horizontal_drag: 0.5,
        }
    }
}

/// Distance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub points_per_unit: f32,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            points_per_unit: 1.0,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub camera: CameraTuning,
    pub walls: WallTuning,
    pub hazards: HazardTuning,
    pub flyers: FlyerTuning,
    pub sensor: SensorTuning,
    pub launch: LaunchTuning,
    pub score: ScoreTuning,
}

impl Tuning {
    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning.sanitized())
    }

    /// Save tuning as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Tuning saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Clamp degenerate values to the nearest usable ones
    pub fn sanitized(mut self) -> Self {
        let cam = &mut self.camera;
        if cam.start_speed < 0.0 {
            log::warn!("camera start_speed {} is negative, flooring to 0", cam.start_speed);
            cam.start_speed = 0.0;
        }
        if cam.max_speed < cam.start_speed {
            log::warn!(
                "camera max_speed {} below start_speed {}, raising",
                cam.max_speed,
                cam.start_speed
            );
            cam.max_speed = cam.start_speed;
        }
        cam.accel = cam.accel.max(0.0);

        if self.walls.fallback_height < MIN_TILE_HEIGHT {
            log::warn!("wall fallback_height {} floored", self.walls.fallback_height);
            self.walls.fallback_height = MIN_TILE_HEIGHT;
        }

        let hz = &mut self.hazards;
        (hz.min_gap, hz.max_gap) = ordered_range("hazard gap", hz.min_gap, hz.max_gap);
        hz.min_gap = hz.min_gap.max(MIN_TILE_HEIGHT);
        hz.max_gap = hz.max_gap.max(hz.min_gap);
        hz.pair_probability = hz.pair_probability.clamp(0.0, 1.0);

        let fl = &mut self.flyers;
        (fl.x_min, fl.x_max) = ordered_range("flyer x", fl.x_min, fl.x_max);
        if fl.spawn_gap < MIN_TILE_HEIGHT {
            log::warn!("flyer spawn_gap {} floored", fl.spawn_gap);
            fl.spawn_gap = MIN_TILE_HEIGHT;
        }

        let ln = &mut self.launch;
        (ln.min_force, ln.max_force) = ordered_range("launch force", ln.min_force, ln.max_force);
        ln.charge_rate = ln.charge_rate.max(0.0);

        self
    }
}

/// Collapse `[min, max]` to `[min, min]` when the bounds are inverted
fn ordered_range(name: &str, min: f32, max: f32) -> (f32, f32) {
    if min > max {
        log::warn!("{} range [{}, {}] is inverted, collapsing to {}", name, min, max, min);
        (min, min)
    } else {
        (min, max)
    }
}
