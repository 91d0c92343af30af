//! Flyer sway and wing flap
//!
//! Flyers drift sinusoidally around their spawn point. When coupled, sway
//! and flap frequencies scale with the camera's climb speed, so flyers get
//! livelier as the run speeds up.

use std::f32::consts::TAU;

use glam::Vec2;

use super::camera::CameraState;
use crate::tuning::FlyerMotionTuning;

/// Per-flyer motion state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyerMotion {
    /// Spawn position the sway is centred on
    pub origin: Vec2,
    /// Seconds since spawn
    pub t: f32,
    /// Left wing rotation; the right wing mirrors it (degrees)
    pub wing_angle_deg: f32,
}

impl FlyerMotion {
    pub fn new(origin: Vec2, tuning: &FlyerMotionTuning) -> Self {
        Self {
            origin,
            t: 0.0,
            wing_angle_deg: tuning.wing_base_deg,
        }
    }

    /// Advance by `dt` and return the new position
    pub fn advance(&mut self, dt: f32, camera: &CameraState, tuning: &FlyerMotionTuning) -> Vec2 {
        self.t += dt;

        let speed = if tuning.couple_to_camera_speed {
            camera.climb_speed
        } else {
            0.0
        };
        let xf = tuning.x_freq * (1.0 + tuning.k_horiz * speed);
        let ff = tuning.flap_freq * (1.0 + tuning.k_flap * speed);

        let x = self.origin.x + (TAU * xf * self.t).sin() * tuning.x_amplitude;
        let y = self.origin.y + (TAU * tuning.y_freq * self.t).sin() * tuning.y_amplitude;
        self.wing_angle_deg = tuning.wing_base_deg + (TAU * ff * self.t).sin() * tuning.flap_amp_deg;

        Vec2::new(x, y)
    }
}
