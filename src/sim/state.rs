//! Session state and core simulation types
//!
//! Everything a run needs lives here and is rebuilt from scratch on restart.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{BodyRig, PlayerBody};
use super::camera::CameraKinematics;
use super::contact::{WallContact, WallContactSensor, WallGeometry, WallSide};
use super::launch::{AimRig, LaunchController, LaunchImpulse};
use super::score::ScoreTracker;
use super::spawners::{FlyerPolicy, FlyerSpawner, HazardPolicy, HazardSpawner, WallTilePolicy, WallTiler};
use super::stream::{
    BoundsProbe, ContentKind, EntityId, EntityIds, PrefabId, SpawnPolicy, StreamContext, StreamRequest,
    StreamWindowManager,
};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Camera climbing, player alive
    Playing,
    /// Player hit something; simulation frozen until restart
    GameOver,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Launched(LaunchImpulse),
    PlayerHit { kind: ContentKind, id: EntityId },
    GameOver { score: u64 },
}

/// World-space sizes of materialized templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefabCatalog {
    sizes: Vec<(PrefabId, Vec2)>,
}

impl PrefabCatalog {
    pub fn with(mut self, prefab: PrefabId, size: Vec2) -> Self {
        self.sizes.push((prefab, size));
        self
    }
}

impl BoundsProbe for PrefabCatalog {
    fn measure(&self, prefab: PrefabId) -> Option<Vec2> {
        self.sizes
            .iter()
            .find(|(id, _)| *id == prefab)
            .map(|(_, size)| *size)
    }
}

/// External references supplied by the scene. Anything left `None`
/// disables the subsystems that need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBindings {
    /// Orthographic half-height of the viewport
    pub viewport_half_height: Option<f32>,
    pub camera_start_y: f32,
    pub wall_prefab: Option<PrefabId>,
    /// Position of the first wall tile
    pub tile_anchor: Vec2,
    pub left_spike_prefab: Option<PrefabId>,
    pub right_spike_prefab: Option<PrefabId>,
    pub flyer_prefab: Option<PrefabId>,
    /// Inner face of the left wall
    pub left_anchor: Option<Vec2>,
    /// Inner face of the right wall
    pub right_anchor: Option<Vec2>,
    /// Starting ledge under the player
    pub floor_y: Option<f32>,
    pub aim_indicator: Option<AimRig>,
    pub body: Option<BodyRig>,
    pub prefabs: PrefabCatalog,
}

impl SessionBindings {
    /// The stock shaft: 6 units wide, walls tiled in 2-unit pieces
    pub fn standard() -> Self {
        let wall = PrefabId(1);
        Self {
            viewport_half_height: Some(5.0),
            camera_start_y: 4.0,
            wall_prefab: Some(wall),
            tile_anchor: Vec2::new(0.0, -1.0),
            left_spike_prefab: Some(PrefabId(2)),
            right_spike_prefab: Some(PrefabId(3)),
            flyer_prefab: Some(PrefabId(4)),
            left_anchor: Some(Vec2::new(-3.0, 0.0)),
            right_anchor: Some(Vec2::new(3.0, 0.0)),
            floor_y: Some(0.0),
            aim_indicator: Some(AimRig::default()),
            body: Some(BodyRig::default()),
            prefabs: PrefabCatalog::default().with(wall, Vec2::new(6.4, 2.0)),
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub camera: CameraKinematics,
    pub walls: Option<WallTiler>,
    pub hazards: Option<HazardSpawner>,
    pub flyers: Option<FlyerSpawner>,
    /// Collision shape of the live wall tiles
    pub geometry: WallGeometry,
    pub sensor: Option<WallContactSensor>,
    /// Latest sensor reading
    pub contact: WallContact,
    pub launcher: Option<LaunchController>,
    pub body: Option<PlayerBody>,
    pub score: ScoreTracker,
    /// Spawn/despawn requests produced this tick (or by prewarm)
    pub requests: Vec<StreamRequest>,
    pub events: Vec<GameEvent>,
    /// Subsystems switched off by configuration errors
    pub disabled: Vec<ConfigError>,
    pub(crate) ids: EntityIds,
    pub(crate) tuning: Tuning,
    pub(crate) bindings: SessionBindings,
}

impl GameState {
    /// Build and prewarm a session
    pub fn new(seed: u64, tuning: Tuning, bindings: SessionBindings) -> Self {
        let mut disabled = Vec::new();

        let camera_ok = match bindings.viewport_half_height {
            Some(h) if h > 0.0 => Ok(h),
            _ => Err(ConfigError::MissingCamera),
        };
        let camera = CameraKinematics::new(
            &tuning.camera,
            bindings.camera_start_y,
            camera_ok.unwrap_or(0.0),
        );
        let cam_state = *camera.state();

        let walls = enabled(
            camera_ok
                .and_then(|_| WallTilePolicy::new(bindings.wall_prefab, bindings.tile_anchor, &tuning.walls))
                .map(|p| StreamWindowManager::new(p, &cam_state)),
            &mut disabled,
        );
        let hazards = enabled(
            camera_ok
                .and_then(|_| {
                    HazardPolicy::new(
                        bindings.left_spike_prefab,
                        bindings.right_spike_prefab,
                        bindings.left_anchor,
                        bindings.right_anchor,
                        &tuning.hazards,
                    )
                })
                .map(|p| StreamWindowManager::new(p, &cam_state)),
            &mut disabled,
        );
        let flyers = enabled(
            camera_ok
                .and_then(|_| FlyerPolicy::new(bindings.flyer_prefab, &tuning.flyers))
                .map(|p| StreamWindowManager::new(p, &cam_state)),
            &mut disabled,
        );

        let left_x = bindings.left_anchor.map(|a| a.x);
        let right_x = bindings.right_anchor.map(|a| a.x);
        let geometry = WallGeometry::new(
            left_x.unwrap_or(0.0),
            right_x.unwrap_or(0.0),
            bindings.floor_y,
        );

        let body = bindings.body.as_ref().map(PlayerBody::new);
        let sensor = match (&body, left_x, right_x) {
            (Some(_), Some(_), Some(_)) => Some(WallContactSensor::new(&tuning.sensor)),
            _ => None,
        };
        let launcher = enabled(
            LaunchController::new(&tuning.launch, bindings.aim_indicator, body.as_ref(), sensor.as_ref()),
            &mut disabled,
        );

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            score: ScoreTracker::new(&tuning.score, cam_state.y),
            camera,
            walls,
            hazards,
            flyers,
            geometry,
            sensor,
            contact: WallContact::default(),
            launcher,
            body,
            requests: Vec::new(),
            events: Vec::new(),
            disabled,
            ids: EntityIds::default(),
            tuning,
            bindings,
        };
        state.prewarm();

        log::info!(
            "Session started (seed {}), {} entities prewarmed, {} subsystem(s) disabled",
            seed,
            state.requests.len(),
            state.disabled.len()
        );
        state
    }

    /// Throw the run away and start over with a new seed
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting session (seed {})", seed);
        *self = Self::new(seed, self.tuning.clone(), self.bindings.clone());
    }

    fn prewarm(&mut self) {
        let camera = *self.camera.state();
        let mut ctx = StreamContext {
            camera: &camera,
            rng: &mut self.rng,
            ids: &mut self.ids,
            bounds: &self.bindings.prefabs,
            requests: &mut self.requests,
        };
        if let Some(walls) = self.walls.as_mut() {
            walls.prewarm(&mut ctx);
        }
        if let Some(hazards) = self.hazards.as_mut() {
            hazards.prewarm(&mut ctx);
        }
        if let Some(flyers) = self.flyers.as_mut() {
            flyers.prewarm(&mut ctx);
        }
        self.sync_geometry();
    }

    /// Rebuild wall collision spans from the live tiles
    pub(crate) fn sync_geometry(&mut self) {
        if let Some(walls) = self.walls.as_ref() {
            let half = walls.policy().half_height();
            self.geometry.set_tiles(walls.entities().map(|e| (e.pos.y, half)));
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn bindings(&self) -> &SessionBindings {
        &self.bindings
    }

    /// Live streamed entities of every class
    pub fn entity_count(&self) -> usize {
        self.walls.as_ref().map_or(0, |m| m.len())
            + self.hazards.as_ref().map_or(0, |m| m.len())
            + self.flyers.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_on_wall(&self) -> bool {
        self.contact.touching
    }

    pub fn committed_side(&self) -> Option<WallSide> {
        self.contact.side
    }
}

/// Log a configuration error and keep the session running without it
fn enabled<T>(built: Result<T, ConfigError>, disabled: &mut Vec<ConfigError>) -> Option<T> {
    match built {
        Ok(subsystem) => Some(subsystem),
        Err(err) => {
            log::error!("Subsystem disabled: {}", err);
            disabled.push(err);
            None
        }
    }
}

/// Spawn policies that report a hit radius
pub(crate) trait HitRadius {
    fn hit_radius(&self) -> f32;
}

impl HitRadius for HazardPolicy {
    fn hit_radius(&self) -> f32 {
        self.tuning().hit_radius
    }
}

impl HitRadius for FlyerPolicy {
    fn hit_radius(&self) -> f32 {
        self.tuning().hit_radius
    }
}

/// First entity of `manager` the body overlaps
pub(crate) fn first_overlap<P: SpawnPolicy + HitRadius>(
    manager: Option<&StreamWindowManager<P>>,
    body: &PlayerBody,
) -> Option<(ContentKind, EntityId)> {
    let manager = manager?;
    let radius = manager.policy().hit_radius();
    manager
        .entities()
        .find(|e| body.overlaps(e.pos, radius))
        .map(|e| (e.kind, e.id))
}
