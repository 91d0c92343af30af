//! Wall-contact launch controller
//!
//! While the player clings to a wall the aim indicator ping-pongs inside a
//! window that depends on the wall side. Pressing the action locks the
//! angle, holding charges force, releasing launches.
//!
//! ```text
//!  Idle --touch--> Sweeping --press--> Locked --hold--> Charging
//!    ^                ^                   |                |
//!    |                +---- next tick ----+-- release -----+  (launch)
//!    +------------------- contact lost (charge cancelled) -+
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PlayerBody;
use super::contact::{WallContact, WallContactSensor, WallSide};
use super::input::ActionSignals;
use crate::consts::{FALLBACK_MAX_DEG, FALLBACK_MIN_DEG, LEFT_WALL_MID_DEG, RIGHT_WALL_MID_DEG};
use crate::deg_to_dir;
use crate::error::ConfigError;
use crate::tuning::LaunchTuning;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchPhase {
    /// Airborne: gravity on, indicator hidden
    Idle,
    /// On a wall: aim oscillates
    Sweeping,
    /// Action pressed: angle frozen, charge at minimum
    Locked,
    /// Action held: angle frozen, charge growing
    Charging,
}

impl LaunchPhase {
    pub fn angle_frozen(self) -> bool {
        matches!(self, LaunchPhase::Locked | LaunchPhase::Charging)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    Up,
    Down,
}

/// The aim indicator the controller drives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimRig {
    /// Distance of the indicator from the body centre
    pub orbit_radius: f32,
    /// Added to the aim angle when rotating the sprite
    pub sprite_angle_offset_deg: f32,
    /// Indicator x-scale with no charge
    pub base_scale: f32,
    /// Extra x-scale at full charge
    pub stretch_range: f32,
}

impl Default for AimRig {
    fn default() -> Self {
        Self {
            orbit_radius: 0.5,
            sprite_angle_offset_deg: 0.0,
            base_scale: 0.17,
            stretch_range: 0.5,
        }
    }
}

/// Indicator pose for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPose {
    pub pos: Vec2,
    pub rotation_deg: f32,
    pub visible: bool,
    pub scale_x: f32,
}

/// A launch that happened this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchImpulse {
    pub angle_deg: f32,
    pub force: f32,
    pub impulse: Vec2,
}

/// Allowed aim range for a committed side
pub fn aim_window(side: Option<WallSide>, edge_margin_deg: f32) -> (f32, f32) {
    match side {
        // Upper-left quadrant, away from the wall
        Some(WallSide::Right) => (90.0 + edge_margin_deg, 180.0 - edge_margin_deg),
        // Upper-right quadrant
        Some(WallSide::Left) => (edge_margin_deg, 90.0 - edge_margin_deg),
        None => (FALLBACK_MIN_DEG, FALLBACK_MAX_DEG),
    }
}

fn window_mid(side: Option<WallSide>) -> f32 {
    match side {
        Some(WallSide::Right) => RIGHT_WALL_MID_DEG,
        Some(WallSide::Left) => LEFT_WALL_MID_DEG,
        None => (FALLBACK_MIN_DEG + FALLBACK_MAX_DEG) * 0.5,
    }
}

/// Aim, charge and launch state machine
#[derive(Debug, Clone)]
pub struct LaunchController {
    tuning: LaunchTuning,
    rig: AimRig,
    phase: LaunchPhase,
    angle_deg: f32,
    sweep: SweepDirection,
    charge_force: f32,
    stretch: f32,
    prev_touching: bool,
    /// Side seen on the previous touching tick; `None` outer = not tracking
    tracked_side: Option<Option<WallSide>>,
    pose: AimPose,
}

impl LaunchController {
    /// Fails when the indicator, body or sensor is missing
    pub fn new(
        tuning: &LaunchTuning,
        rig: Option<AimRig>,
        body: Option<&PlayerBody>,
        sensor: Option<&WallContactSensor>,
    ) -> Result<Self, ConfigError> {
        let rig = rig.ok_or(ConfigError::MissingAimIndicator)?;
        let body = body.ok_or(ConfigError::MissingBody)?;
        sensor.ok_or(ConfigError::MissingSensor)?;

        let mut tuning = *tuning;
        if tuning.min_force > tuning.max_force {
            tuning.max_force = tuning.min_force;
        }

        Ok(Self {
            tuning,
            rig,
            phase: LaunchPhase::Idle,
            angle_deg: window_mid(None),
            sweep: SweepDirection::Up,
            charge_force: tuning.min_force,
            stretch: rig.base_scale,
            prev_touching: false,
            tracked_side: None,
            pose: AimPose {
                pos: body.pos,
                rotation_deg: 0.0,
                visible: false,
                scale_x: rig.base_scale,
            },
        })
    }

    /// One tick: stick, sweep, charge, launch, then airborne drag
    pub fn update(
        &mut self,
        dt: f32,
        contact: WallContact,
        signals: ActionSignals,
        body: &mut PlayerBody,
    ) -> Option<LaunchImpulse> {
        let mut launched = None;

        if contact.touching {
            if !self.prev_touching {
                // Landing sticks the ball to the wall
                body.vel = Vec2::ZERO;
            }
            body.gravity_scale = 0.0;
            if self.phase == LaunchPhase::Idle {
                self.phase = LaunchPhase::Sweeping;
            }

            if self.phase == LaunchPhase::Sweeping {
                self.sweep_step(dt, contact.side);
            }
            launched = self.handle_input(dt, signals, body);

            // Window moved under us: restart from its middle
            if let Some(last) = self.tracked_side {
                if last != contact.side {
                    self.angle_deg = window_mid(contact.side);
                    self.sweep = SweepDirection::Up;
                    log::debug!("wall side {:?} -> {:?}, aim reset to {}", last, contact.side, self.angle_deg);
                }
            }
            self.tracked_side = Some(contact.side);
        } else {
            body.gravity_scale = 1.0;
            if self.phase.angle_frozen() {
                log::debug!("wall contact lost mid-charge, charge cancelled at {:.2}", self.charge_force);
                self.charge_force = self.tuning.min_force;
                self.stretch = self.rig.base_scale;
            }
            self.phase = LaunchPhase::Idle;
            self.tracked_side = None;
        }

        self.prev_touching = contact.touching;

        if !contact.touching && body.vel.x.abs() > 0.01 {
            let keep = (1.0 - self.tuning.horizontal_drag * dt).max(0.0);
            body.vel.x *= keep;
        }

        self.pose = self.compute_pose(body.pos, contact.touching);
        launched
    }

    /// Ping-pong between the window bounds
    fn sweep_step(&mut self, dt: f32, side: Option<WallSide>) {
        let (min_deg, max_deg) = aim_window(side, self.tuning.edge_margin_deg);
        let delta = self.tuning.sweep_speed * dt;
        self.angle_deg += match self.sweep {
            SweepDirection::Up => delta,
            SweepDirection::Down => -delta,
        };

        if self.angle_deg > max_deg {
            self.angle_deg = max_deg;
            self.sweep = SweepDirection::Down;
        }
        if self.angle_deg < min_deg {
            self.angle_deg = min_deg;
            self.sweep = SweepDirection::Up;
        }
    }

    fn handle_input(&mut self, dt: f32, signals: ActionSignals, body: &mut PlayerBody) -> Option<LaunchImpulse> {
        if signals.pressed && self.phase == LaunchPhase::Sweeping {
            self.phase = LaunchPhase::Locked;
            self.charge_force = self.tuning.min_force;
            self.stretch = self.rig.base_scale;
        } else if signals.held && self.phase.angle_frozen() {
            self.phase = LaunchPhase::Charging;
            self.charge_force = (self.charge_force + dt * self.tuning.charge_rate)
                .clamp(self.tuning.min_force, self.tuning.max_force);
            self.stretch = self.stretch_for(self.charge_force);
        }

        if signals.released && self.phase.angle_frozen() {
            let launch = self.launch(body);
            // Pressed again before the tick: the new press starts a fresh lock
            if signals.held {
                self.phase = LaunchPhase::Locked;
                self.charge_force = self.tuning.min_force;
            }
            return Some(launch);
        }
        None
    }

    fn launch(&mut self, body: &mut PlayerBody) -> LaunchImpulse {
        let dir = deg_to_dir(self.angle_deg);
        let impulse = dir * self.charge_force;

        body.vel = Vec2::ZERO;
        body.apply_impulse(impulse);
        body.gravity_scale = 1.0;

        self.stretch = self.rig.base_scale;
        self.phase = LaunchPhase::Idle;

        log::debug!(
            "launch at {:.1} deg, force {:.2}, impulse {:?}",
            self.angle_deg,
            self.charge_force,
            impulse
        );
        LaunchImpulse {
            angle_deg: self.angle_deg,
            force: self.charge_force,
            impulse,
        }
    }

    /// Indicator x-scale for a charge level
    pub fn stretch_for(&self, force: f32) -> f32 {
        let span = self.tuning.max_force - self.tuning.min_force;
        if span <= 0.0 {
            return self.rig.base_scale;
        }
        let t = (force - self.tuning.min_force) / span;
        (self.rig.base_scale + t * self.rig.stretch_range).clamp(self.rig.base_scale, 1.0)
    }

    fn compute_pose(&self, body_pos: Vec2, visible: bool) -> AimPose {
        AimPose {
            pos: body_pos + deg_to_dir(self.angle_deg) * self.rig.orbit_radius,
            rotation_deg: self.angle_deg + self.rig.sprite_angle_offset_deg,
            visible,
            scale_x: self.stretch,
        }
    }

    #[inline]
    pub fn phase(&self) -> LaunchPhase {
        self.phase
    }

    #[inline]
    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    #[inline]
    pub fn sweep_direction(&self) -> SweepDirection {
        self.sweep
    }

    #[inline]
    pub fn charge_force(&self) -> f32 {
        self.charge_force
    }

    #[inline]
    pub fn pose(&self) -> AimPose {
        self.pose
    }

    pub fn tuning(&self) -> &LaunchTuning {
        &self.tuning
    }
}
