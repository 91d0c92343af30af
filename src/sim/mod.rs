//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each streamer)
//! - No rendering or platform dependencies; spawns leave as requests

pub mod body;
pub mod camera;
pub mod contact;
pub mod flyer;
pub mod input;
pub mod launch;
pub mod score;
pub mod spawners;
pub mod state;
pub mod stream;
pub mod tick;

pub use body::{BodyRig, PlayerBody};
pub use camera::{CameraKinematics, CameraState, ViewportRect, letterbox};
pub use contact::{GeometryProbe, WallContact, WallContactSensor, WallGeometry, WallSide};
pub use flyer::FlyerMotion;
pub use input::{ActionInput, ActionSignals};
pub use launch::{AimPose, AimRig, LaunchController, LaunchImpulse, LaunchPhase, aim_window};
pub use score::ScoreTracker;
pub use spawners::{FlyerPolicy, FlyerSpawner, HazardPolicy, HazardSpawner, WallTilePolicy, WallTiler};
pub use state::{GameEvent, GamePhase, GameState, PrefabCatalog, SessionBindings};
pub use stream::{
    BoundsProbe, ContentKind, EntityId, PrefabId, SpawnPolicy, StreamContext, StreamEntity, StreamRequest,
    StreamWindowManager,
};
pub use tick::{TickInput, tick};
