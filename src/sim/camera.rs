//! Camera climb kinematics
//!
//! The camera only ever moves up. Its speed ramps linearly from the start
//! value to a cap; everything else reads the resulting `CameraState`.

use serde::{Deserialize, Serialize};

use crate::tuning::CameraTuning;

/// Camera kinematic state, read-shared by every other subsystem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Camera centre Y (non-decreasing)
    pub y: f32,
    /// Current upward speed, in `[start_speed, max_speed]`
    pub climb_speed: f32,
    /// Half of the visible world height
    pub half_height: f32,
}

impl CameraState {
    #[inline]
    pub fn top_edge(&self) -> f32 {
        self.y + self.half_height
    }

    #[inline]
    pub fn bottom_edge(&self) -> f32 {
        self.y - self.half_height
    }
}

/// Owns and advances the camera state
#[derive(Debug, Clone)]
pub struct CameraKinematics {
    state: CameraState,
    accel: f32,
    max_speed: f32,
}

impl CameraKinematics {
    pub fn new(tuning: &CameraTuning, start_y: f32, half_height: f32) -> Self {
        let start_speed = tuning.start_speed.max(0.0);
        let max_speed = tuning.max_speed.max(start_speed);
        Self {
            state: CameraState {
                y: start_y,
                climb_speed: start_speed,
                half_height: half_height.max(0.0),
            },
            accel: tuning.accel.max(0.0),
            max_speed,
        }
    }

    /// Ramp speed, then move up by the new speed
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.state.climb_speed = (self.state.climb_speed + self.accel * dt).min(self.max_speed);
        self.state.y += self.state.climb_speed * dt;
    }

    #[inline]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[inline]
    pub fn top_edge(&self) -> f32 {
        self.state.top_edge()
    }

    #[inline]
    pub fn bottom_edge(&self) -> f32 {
        self.state.bottom_edge()
    }
}

/// Normalized viewport rectangle (x, y, width, height in `[0, 1]`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Fit a fixed aspect into the window, adding bars on the long axis
pub fn letterbox(target_aspect: (f32, f32), window_w: f32, window_h: f32) -> ViewportRect {
    let full = ViewportRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };
    if window_w <= 0.0 || window_h <= 0.0 || target_aspect.1 <= 0.0 {
        return full;
    }

    let target = target_aspect.0 / target_aspect.1;
    let window = window_w / window_h;

    if window > target {
        // Too wide: pillarbox
        let w = target / window;
        ViewportRect {
            x: (1.0 - w) * 0.5,
            w,
            ..full
        }
    } else {
        // Too tall: letterbox
        let h = window / target;
        ViewportRect {
            y: (1.0 - h) * 0.5,
            h,
            ..full
        }
    }
}
