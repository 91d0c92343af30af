//! Player body
//!
//! A minimal kinematic circle standing in for the physics engine: impulses,
//! gravity with a per-body scale, and confinement to the shaft.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Physical properties of the player character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyRig {
    pub start: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl Default for BodyRig {
    fn default() -> Self {
        Self {
            start: Vec2::new(0.0, 0.3),
            radius: 0.3,
            mass: 1.0,
        }
    }
}

/// The player's ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// 0 while stuck to a wall, 1 in flight
    pub gravity_scale: f32,
}

impl PlayerBody {
    pub fn new(rig: &BodyRig) -> Self {
        Self {
            pos: rig.start,
            vel: Vec2::ZERO,
            radius: rig.radius.max(0.0),
            mass: rig.mass.max(f32::EPSILON),
            gravity_scale: 1.0,
        }
    }

    /// Instant velocity change of `impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.vel += impulse / self.mass;
    }

    /// Semi-implicit Euler step
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.vel.y -= gravity * self.gravity_scale * dt;
        self.pos += self.vel * dt;
    }

    /// Keep the circle between the wall faces and above the floor
    pub fn confine(&mut self, left_face_x: f32, right_face_x: f32, floor_y: Option<f32>) {
        let min_x = left_face_x + self.radius;
        let max_x = right_face_x - self.radius;
        if self.pos.x < min_x {
            self.pos.x = min_x;
            self.vel.x = self.vel.x.max(0.0);
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x = self.vel.x.min(0.0);
        }

        if let Some(floor) = floor_y {
            let min_y = floor + self.radius;
            if self.pos.y < min_y {
                self.pos.y = min_y;
                self.vel.y = self.vel.y.max(0.0);
            }
        }
    }

    #[inline]
    pub fn overlaps(&self, point: Vec2, radius: f32) -> bool {
        self.pos.distance_squared(point) <= (self.radius + radius).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_scales_with_mass() {
        let mut body = PlayerBody::new(&BodyRig {
            mass: 2.0,
            ..Default::default()
        });
        body.apply_impulse(Vec2::new(0.0, 20.0));
        assert_eq!(body.vel, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn test_gravity_respects_scale() {
        let mut body = PlayerBody::new(&BodyRig::default());
        body.gravity_scale = 0.0;
        body.integrate(0.5, 9.81);
        assert_eq!(body.vel, Vec2::ZERO);

        body.gravity_scale = 1.0;
        body.integrate(0.5, 10.0);
        assert_eq!(body.vel.y, -5.0);
    }

    #[test]
    fn test_confine_stops_at_walls_and_floor() {
        let mut body = PlayerBody::new(&BodyRig::default());
        body.pos = Vec2::new(5.0, -1.0);
        body.vel = Vec2::new(3.0, -2.0);
        body.confine(-3.0, 3.0, Some(0.0));
        assert!(body.pos.abs_diff_eq(Vec2::new(2.7, 0.3), 1e-6));
        assert_eq!(body.vel, Vec2::ZERO);
    }
}
