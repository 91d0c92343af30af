//! Camera-relative content streaming
//!
//! One `StreamWindowManager` per content class keeps the band between the
//! camera's top edge and `top + lookahead` populated, and reclaims content
//! once it falls `cull_margin` below the bottom edge. What gets placed, and
//! how far apart, is delegated to a `SpawnPolicy`.

use std::collections::VecDeque;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::CameraState;
use super::contact::WallSide;
use super::flyer::FlyerMotion;
use crate::consts::MIN_TILE_HEIGHT;

/// Upper bound on spawn events in one fill pass
const MAX_SPAWNS_PER_PASS: usize = 4096;

pub type EntityId = u32;

/// Content classes the generator streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    WallTile,
    Hazard,
    Flyer,
}

/// Opaque template handle, materialized by the renderer/physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabId(pub u32);

/// How an entity came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Spawned during the session-start prewarm
    Prewarm,
    /// Spawned while streaming behind the camera
    Live,
}

/// A piece of streamed content
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntity {
    pub id: EntityId,
    pub kind: ContentKind,
    pub prefab: PrefabId,
    pub pos: Vec2,
    pub rotation_deg: f32,
    /// Wall a hazard is mounted on
    pub side: Option<WallSide>,
    pub lifecycle: Lifecycle,
    /// Sway state (flyers only)
    pub motion: Option<FlyerMotion>,
}

/// One unit a policy wants spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub prefab: PrefabId,
    pub pos: Vec2,
    pub rotation_deg: f32,
    pub side: Option<WallSide>,
}

/// Requests for the renderer/physics collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamRequest {
    Spawn {
        id: EntityId,
        kind: ContentKind,
        prefab: PrefabId,
        pos: Vec2,
        rotation_deg: f32,
    },
    Despawn {
        id: EntityId,
        kind: ContentKind,
    },
}

/// Order in which the cull pass visits entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullScan {
    /// Entities are sorted by height; stop at the first survivor
    OldestFirst,
    /// Entities move; check every one
    Full,
}

/// Reports the world-space size of a materialized template
pub trait BoundsProbe {
    fn measure(&self, prefab: PrefabId) -> Option<Vec2>;
}

/// Session-wide entity id allocator
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: EntityId,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Per-class spawn scheduling
pub trait SpawnPolicy {
    fn kind(&self) -> ContentKind;

    /// Y of the first spawn event
    fn initial_frontier(&self, camera: &CameraState) -> f32;

    /// Spawn events run unconditionally at session start
    fn prewarm_count(&self) -> u32;

    /// Distance above the top edge that must stay populated
    fn lookahead(&self) -> f32;

    fn cull_margin(&self) -> f32;

    fn cull_scan(&self) -> CullScan {
        CullScan::Full
    }

    /// Height compared against the cull line
    fn cull_y(&self, entity: &StreamEntity) -> f32 {
        entity.pos.y
    }

    /// Units for one spawn event at height `y`
    fn place(&mut self, y: f32, rng: &mut Pcg32, out: &mut Vec<Placement>);

    /// Size reported for the first unit this policy ever spawned
    fn on_first_spawn(&mut self, _measured: Option<Vec2>) {}

    /// Frontier advance after a spawn event
    fn next_gap(&mut self, rng: &mut Pcg32) -> f32;
}

/// Everything a manager touches during its pass
pub struct StreamContext<'a> {
    pub camera: &'a CameraState,
    pub rng: &'a mut Pcg32,
    pub ids: &'a mut EntityIds,
    pub bounds: &'a dyn BoundsProbe,
    pub requests: &'a mut Vec<StreamRequest>,
}

/// Windowed spawn/cull engine for one content class
#[derive(Debug, Clone)]
pub struct StreamWindowManager<P: SpawnPolicy> {
    policy: P,
    frontier_y: f32,
    active: VecDeque<StreamEntity>,
    measured: bool,
    placements: Vec<Placement>,
    spawned_total: u64,
    culled_total: u64,
}

impl<P: SpawnPolicy> StreamWindowManager<P> {
    pub fn new(policy: P, camera: &CameraState) -> Self {
        let frontier_y = policy.initial_frontier(camera);
        Self {
            policy,
            frontier_y,
            active: VecDeque::new(),
            measured: false,
            placements: Vec::with_capacity(2),
            spawned_total: 0,
            culled_total: 0,
        }
    }

    /// Populate the initial off-screen band before the first frame
    pub fn prewarm(&mut self, ctx: &mut StreamContext) {
        for _ in 0..self.policy.prewarm_count() {
            self.spawn_event(ctx, Lifecycle::Prewarm);
        }
        while self.needs_fill(ctx.camera) {
            self.spawn_event(ctx, Lifecycle::Prewarm);
        }
        log::debug!(
            "{:?} prewarmed {} entities, frontier at {:.2}",
            self.policy.kind(),
            self.active.len(),
            self.frontier_y
        );
    }

    /// Fill then cull; returns (spawn events, culled entities)
    pub fn simulate(&mut self, ctx: &mut StreamContext) -> (usize, usize) {
        let spawned = self.fill(ctx);
        let culled = self.cull(ctx);
        (spawned, culled)
    }

    /// Spawn until the frontier clears the lookahead line
    pub fn fill(&mut self, ctx: &mut StreamContext) -> usize {
        let mut events = 0;
        while self.needs_fill(ctx.camera) {
            if events >= MAX_SPAWNS_PER_PASS {
                log::warn!(
                    "{:?} fill pass hit {} spawn events, deferring to next tick",
                    self.policy.kind(),
                    MAX_SPAWNS_PER_PASS
                );
                break;
            }
            self.spawn_event(ctx, Lifecycle::Live);
            events += 1;
        }
        events
    }

    /// Destroy everything below `bottom - cull_margin`
    pub fn cull(&mut self, ctx: &mut StreamContext) -> usize {
        let line = ctx.camera.bottom_edge() - self.policy.cull_margin();
        let before = self.active.len();

        match self.policy.cull_scan() {
            CullScan::OldestFirst => {
                while let Some(front) = self.active.front() {
                    if self.policy.cull_y(front) >= line {
                        break;
                    }
                    if let Some(entity) = self.active.pop_front() {
                        ctx.requests.push(StreamRequest::Despawn {
                            id: entity.id,
                            kind: entity.kind,
                        });
                    }
                }
            }
            CullScan::Full => {
                let policy = &self.policy;
                let requests = &mut *ctx.requests;
                self.active.retain(|entity| {
                    let keep = policy.cull_y(entity) >= line;
                    if !keep {
                        requests.push(StreamRequest::Despawn {
                            id: entity.id,
                            kind: entity.kind,
                        });
                    }
                    keep
                });
            }
        }

        let culled = before - self.active.len();
        self.culled_total += culled as u64;
        culled
    }

    fn needs_fill(&self, camera: &CameraState) -> bool {
        self.frontier_y < camera.top_edge() + self.policy.lookahead()
    }

    fn spawn_event(&mut self, ctx: &mut StreamContext, lifecycle: Lifecycle) {
        let y = self.frontier_y;
        let kind = self.policy.kind();

        self.placements.clear();
        self.policy.place(y, ctx.rng, &mut self.placements);

        for placement in &self.placements {
            let id = ctx.ids.next_id();
            ctx.requests.push(StreamRequest::Spawn {
                id,
                kind,
                prefab: placement.prefab,
                pos: placement.pos,
                rotation_deg: placement.rotation_deg,
            });
            self.active.push_back(StreamEntity {
                id,
                kind,
                prefab: placement.prefab,
                pos: placement.pos,
                rotation_deg: placement.rotation_deg,
                side: placement.side,
                lifecycle,
                motion: None,
            });
            self.spawned_total += 1;

            if !self.measured {
                self.measured = true;
                self.policy.on_first_spawn(ctx.bounds.measure(placement.prefab));
            }
        }

        let gap = self.policy.next_gap(ctx.rng).max(MIN_TILE_HEIGHT);
        self.frontier_y += gap;
        log::trace!("{:?} spawn event at {:.2}, next at {:.2}", kind, y, self.frontier_y);
    }

    #[inline]
    pub fn frontier_y(&self) -> f32 {
        self.frontier_y
    }

    pub fn entities(&self) -> impl Iterator<Item = &StreamEntity> {
        self.active.iter()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut StreamEntity> {
        self.active.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn culled_total(&self) -> u64 {
        self.culled_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};

    /// Fixed-gap single-column policy
    struct Column {
        gap: f32,
        prewarm: u32,
        measured: Option<Vec2>,
        scan: CullScan,
    }

    impl Column {
        fn new(gap: f32) -> Self {
            Self {
                gap,
                prewarm: 0,
                measured: None,
                scan: CullScan::OldestFirst,
            }
        }
    }

    impl SpawnPolicy for Column {
        fn kind(&self) -> ContentKind {
            ContentKind::Flyer
        }
        fn initial_frontier(&self, camera: &CameraState) -> f32 {
            camera.top_edge()
        }
        fn prewarm_count(&self) -> u32 {
            self.prewarm
        }
        fn lookahead(&self) -> f32 {
            2.0
        }
        fn cull_margin(&self) -> f32 {
            1.0
        }
        fn cull_scan(&self) -> CullScan {
            self.scan
        }
        fn place(&mut self, y: f32, _rng: &mut Pcg32, out: &mut Vec<Placement>) {
            out.push(Placement {
                prefab: PrefabId(7),
                pos: Vec2::new(0.0, y),
                rotation_deg: 0.0,
                side: None,
            });
        }
        fn on_first_spawn(&mut self, measured: Option<Vec2>) {
            self.measured = measured;
        }
        fn next_gap(&mut self, rng: &mut Pcg32) -> f32 {
            // Jitter keeps the random path exercised
            self.gap + rng.random_range(0.0..=0.01)
        }
    }

    struct FixedBounds(Vec2);

    impl BoundsProbe for FixedBounds {
        fn measure(&self, _prefab: PrefabId) -> Option<Vec2> {
            Some(self.0)
        }
    }

    fn camera_at(y: f32) -> CameraState {
        CameraState {
            y,
            climb_speed: 2.0,
            half_height: 5.0,
        }
    }

    struct Harness {
        rng: Pcg32,
        ids: EntityIds,
        bounds: FixedBounds,
        requests: Vec<StreamRequest>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                rng: Pcg32::seed_from_u64(1),
                ids: EntityIds::default(),
                bounds: FixedBounds(Vec2::new(1.0, 3.0)),
                requests: Vec::new(),
            }
        }

        fn ctx<'a>(&'a mut self, camera: &'a CameraState) -> StreamContext<'a> {
            StreamContext {
                camera,
                rng: &mut self.rng,
                ids: &mut self.ids,
                bounds: &self.bounds,
                requests: &mut self.requests,
            }
        }
    }

    #[test]
    fn test_prewarm_fills_lookahead_band() {
        let mut h = Harness::new();
        let camera = camera_at(0.0);
        let mut mgr = StreamWindowManager::new(Column::new(1.0), &camera);
        mgr.prewarm(&mut h.ctx(&camera));

        // Frontier starts at top (5.0) and must pass 5.0 + 2.0
        assert!(mgr.frontier_y() >= camera.top_edge() + 2.0);
        assert!(mgr.len() >= 2);
        assert!(mgr.entities().all(|e| e.lifecycle == Lifecycle::Prewarm));
        assert_eq!(mgr.policy().measured, Some(Vec2::new(1.0, 3.0)));
    }

    #[test]
    fn test_prewarm_count_spawns_unconditionally() {
        let mut h = Harness::new();
        let camera = camera_at(0.0);
        let mut policy = Column::new(10.0);
        policy.prewarm = 3;
        let mut mgr = StreamWindowManager::new(policy, &camera);
        mgr.prewarm(&mut h.ctx(&camera));
        assert_eq!(mgr.len(), 3);
    }

    #[test]
    fn test_entity_culled_on_first_tick_below_line() {
        let mut h = Harness::new();
        let mut camera = camera_at(0.0);
        let mut mgr = StreamWindowManager::new(Column::new(1.0), &camera);
        mgr.prewarm(&mut h.ctx(&camera));
        let lowest = mgr.entities().map(|e| e.pos.y).fold(f32::MAX, f32::min);

        // Cull line is bottom - 1 = y - 6; put the lowest entity exactly on it
        camera.y = lowest + 6.0;
        mgr.simulate(&mut h.ctx(&camera));
        assert!(mgr.entities().any(|e| e.pos.y == lowest), "not yet below the line");

        camera.y += 0.001;
        h.requests.clear();
        let (_, culled) = mgr.simulate(&mut h.ctx(&camera));
        assert!(culled >= 1);
        assert!(mgr.entities().all(|e| e.pos.y >= camera.bottom_edge() - 1.0));
        let despawns = h
            .requests
            .iter()
            .filter(|r| matches!(r, StreamRequest::Despawn { .. }))
            .count();
        assert_eq!(despawns, culled);
        assert_eq!(mgr.culled_total(), culled as u64);
    }

    #[test]
    fn test_full_scan_culls_out_of_order_entities() {
        let mut h = Harness::new();
        let camera = camera_at(0.0);
        let mut policy = Column::new(1.0);
        policy.scan = CullScan::Full;
        let mut mgr = StreamWindowManager::new(policy, &camera);
        mgr.prewarm(&mut h.ctx(&camera));

        // Drop the newest entity far below the screen
        if let Some(last) = mgr.entities_mut().last() {
            last.pos.y = -100.0;
        }
        let before = mgr.len();
        let culled = mgr.cull(&mut h.ctx(&camera));
        assert_eq!(culled, 1);
        assert_eq!(mgr.len(), before - 1);
    }

    #[test]
    fn test_spawn_requests_match_entities() {
        let mut h = Harness::new();
        let camera = camera_at(0.0);
        let mut mgr = StreamWindowManager::new(Column::new(1.0), &camera);
        mgr.prewarm(&mut h.ctx(&camera));
        let spawn_ids: Vec<EntityId> = h
            .requests
            .iter()
            .filter_map(|r| match r {
                StreamRequest::Spawn { id, .. } => Some(*id),
                StreamRequest::Despawn { .. } => None,
            })
            .collect();
        let live_ids: Vec<EntityId> = mgr.entities().map(|e| e.id).collect();
        assert_eq!(spawn_ids, live_ids);
        assert_eq!(mgr.spawned_total(), live_ids.len() as u64);
    }

    proptest! {
        #[test]
        fn prop_frontier_never_decreases(steps in proptest::collection::vec(0.0f32..3.0, 1..100)) {
            let mut h = Harness::new();
            let mut camera = camera_at(0.0);
            let mut mgr = StreamWindowManager::new(Column::new(0.8), &camera);
            mgr.prewarm(&mut h.ctx(&camera));
            let mut last = mgr.frontier_y();
            for dy in steps {
                camera.y += dy;
                mgr.simulate(&mut h.ctx(&camera));
                prop_assert!(mgr.frontier_y() >= last);
                prop_assert!(mgr.frontier_y() >= camera.top_edge() + 2.0);
                let line = camera.bottom_edge() - 1.0;
                prop_assert!(mgr.entities().all(|e| e.pos.y >= line));
                last = mgr.frontier_y();
            }
        }
    }
}
