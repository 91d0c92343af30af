//! Wall contact sensing
//!
//! Three short probes (right, left, down) from the player centre. The
//! resolution order is fixed: right beats left beats down. A down-only hit
//! counts as touching but keeps the previously committed side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::SensorTuning;

/// Which wall the player is stuck to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// Sensor output for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallContact {
    pub touching: bool,
    /// Last committed side; `None` until a side probe has ever hit
    pub side: Option<WallSide>,
}

/// Surface classes a probe may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceMask(u8);

impl SurfaceMask {
    pub const WALLS: SurfaceMask = SurfaceMask(0b01);
    pub const FLOOR: SurfaceMask = SurfaceMask(0b10);
    pub const ALL: SurfaceMask = SurfaceMask(0b11);

    #[inline]
    pub fn contains(self, other: SurfaceMask) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A probe hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub distance: f32,
    pub point: Vec2,
}

/// Ray queries against level geometry
pub trait GeometryProbe {
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: SurfaceMask) -> Option<ProbeHit>;
}

/// The shaft: two vertical wall faces, present only where wall tiles are
/// live, plus an optional starting floor.
#[derive(Debug, Clone, Default)]
pub struct WallGeometry {
    /// Inner face of the left wall
    pub left_face_x: f32,
    /// Inner face of the right wall
    pub right_face_x: f32,
    /// Y spans covered by live wall tiles
    spans: Vec<(f32, f32)>,
    pub floor_y: Option<f32>,
}

impl WallGeometry {
    pub fn new(left_face_x: f32, right_face_x: f32, floor_y: Option<f32>) -> Self {
        Self {
            left_face_x,
            right_face_x,
            spans: Vec::new(),
            floor_y,
        }
    }

    /// Replace covered spans with the given (centre, half height) tiles
    pub fn set_tiles(&mut self, tiles: impl Iterator<Item = (f32, f32)>) {
        self.spans.clear();
        self.spans
            .extend(tiles.map(|(center, half)| (center - half, center + half)));
    }

    fn covered(&self, y: f32) -> bool {
        self.spans.iter().any(|&(lo, hi)| y >= lo && y <= hi)
    }
}

impl GeometryProbe for WallGeometry {
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: SurfaceMask) -> Option<ProbeHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<ProbeHit> = None;
        let mut consider = |t: f32, point: Vec2| {
            if (0.0..=max_distance).contains(&t) && best.is_none_or(|b| t < b.distance) {
                best = Some(ProbeHit { distance: t, point });
            }
        };

        if mask.contains(SurfaceMask::WALLS) && dir.x != 0.0 {
            let face = if dir.x > 0.0 {
                self.right_face_x
            } else {
                self.left_face_x
            };
            let t = (face - origin.x) / dir.x;
            let point = origin + dir * t;
            if self.covered(point.y) {
                consider(t, point);
            }
        }

        if mask.contains(SurfaceMask::FLOOR) && dir.y < 0.0 {
            if let Some(floor) = self.floor_y {
                let t = (floor - origin.y) / dir.y;
                let point = origin + dir * t;
                if point.x >= self.left_face_x && point.x <= self.right_face_x {
                    consider(t, point);
                }
            }
        }

        best
    }
}

/// Fixed-priority contact resolution
pub fn resolve_contact(prev_side: Option<WallSide>, right: bool, left: bool, down: bool) -> WallContact {
    if right {
        WallContact {
            touching: true,
            side: Some(WallSide::Right),
        }
    } else if left {
        WallContact {
            touching: true,
            side: Some(WallSide::Left),
        }
    } else if down {
        WallContact {
            touching: true,
            side: prev_side,
        }
    } else {
        WallContact {
            touching: false,
            side: prev_side,
        }
    }
}

/// Per-tick wall proximity sensor
#[derive(Debug, Clone)]
pub struct WallContactSensor {
    probe_distance: f32,
    mask: SurfaceMask,
    contact: WallContact,
}

impl WallContactSensor {
    pub fn new(tuning: &SensorTuning) -> Self {
        Self {
            probe_distance: tuning.probe_distance.max(0.0),
            mask: SurfaceMask::ALL,
            contact: WallContact::default(),
        }
    }

    /// Probe from `origin` and update the committed contact
    pub fn sense(&mut self, origin: Vec2, geometry: &impl GeometryProbe) -> WallContact {
        let d = self.probe_distance;
        let right = geometry.raycast(origin, Vec2::X, d, self.mask).is_some();
        let left = geometry.raycast(origin, Vec2::NEG_X, d, self.mask).is_some();
        let down = geometry.raycast(origin, Vec2::NEG_Y, d, self.mask).is_some();

        let next = resolve_contact(self.contact.side, right, left, down);
        if next.touching != self.contact.touching {
            log::trace!("wall contact {} (side {:?})", next.touching, next.side);
        }
        self.contact = next;
        next
    }

    #[inline]
    pub fn contact(&self) -> WallContact {
        self.contact
    }
}
