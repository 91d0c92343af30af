//! Spawn policies for the three streamed content classes
//!
//! - Wall tiles: seamless column, gap = measured tile height minus overlap
//! - Hazards: spike rows at a random gap, one or both walls per row
//! - Flyers: fixed gap, random X between the walls

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::camera::CameraState;
use super::contact::WallSide;
use super::stream::{
    ContentKind, CullScan, Placement, PrefabId, SpawnPolicy, StreamEntity, StreamWindowManager,
};
use crate::consts::MIN_TILE_HEIGHT;
use crate::error::ConfigError;
use crate::tuning::{FlyerTuning, HazardTuning, WallTuning};

pub type WallTiler = StreamWindowManager<WallTilePolicy>;
pub type HazardSpawner = StreamWindowManager<HazardPolicy>;
pub type FlyerSpawner = StreamWindowManager<FlyerPolicy>;

/// Seamless wall column
#[derive(Debug, Clone)]
pub struct WallTilePolicy {
    prefab: PrefabId,
    anchor: Vec2,
    tuning: WallTuning,
    /// Tile world height; the fallback until the first tile is measured
    height: f32,
    measured: bool,
}

impl WallTilePolicy {
    pub fn new(prefab: Option<PrefabId>, anchor: Vec2, tuning: &WallTuning) -> Result<Self, ConfigError> {
        let prefab = prefab.ok_or(ConfigError::MissingPrefab(ContentKind::WallTile))?;
        Ok(Self {
            prefab,
            anchor,
            tuning: *tuning,
            height: tuning.fallback_height.max(MIN_TILE_HEIGHT),
            measured: false,
        })
    }

    #[inline]
    pub fn tile_height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    pub fn is_measured(&self) -> bool {
        self.measured
    }
}

impl SpawnPolicy for WallTilePolicy {
    fn kind(&self) -> ContentKind {
        ContentKind::WallTile
    }

    fn initial_frontier(&self, _camera: &CameraState) -> f32 {
        self.anchor.y
    }

    /// The first tile always goes at the anchor so it can be measured
    fn prewarm_count(&self) -> u32 {
        1
    }

    fn lookahead(&self) -> f32 {
        self.tuning.pieces_above as f32 * self.height + self.half_height()
    }

    fn cull_margin(&self) -> f32 {
        self.tuning.cull_margin
    }

    fn cull_scan(&self) -> CullScan {
        CullScan::OldestFirst
    }

    /// Top of the tile, so a tile is only reclaimed once fully past the line
    fn cull_y(&self, entity: &StreamEntity) -> f32 {
        entity.pos.y + self.half_height()
    }

    fn place(&mut self, y: f32, _rng: &mut Pcg32, out: &mut Vec<Placement>) {
        out.push(Placement {
            prefab: self.prefab,
            pos: Vec2::new(self.anchor.x, y),
            rotation_deg: 0.0,
            side: None,
        });
    }

    fn on_first_spawn(&mut self, measured: Option<Vec2>) {
        let h = measured.map(|size| size.y).unwrap_or(self.tuning.fallback_height);
        if h < MIN_TILE_HEIGHT {
            log::warn!("measured wall tile height {} floored to {}", h, MIN_TILE_HEIGHT);
        }
        self.height = h.max(MIN_TILE_HEIGHT);
        self.measured = true;
        log::debug!("wall tile height {:.3}", self.height);
    }

    fn next_gap(&mut self, _rng: &mut Pcg32) -> f32 {
        (self.height - self.tuning.seam_overlap).max(MIN_TILE_HEIGHT)
    }
}

/// Which walls get a spike in one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSides {
    pub left: bool,
    pub right: bool,
}

impl RowSides {
    pub fn is_pair(self) -> bool {
        self.left && self.right
    }
}

/// One roll: both walls with `pair_probability`, else a coin flip
pub fn roll_row_sides(rng: &mut Pcg32, pair_probability: f32) -> RowSides {
    if rng.random::<f32>() < pair_probability {
        RowSides {
            left: true,
            right: true,
        }
    } else if rng.random::<f32>() < 0.5 {
        RowSides {
            left: true,
            right: false,
        }
    } else {
        RowSides {
            left: false,
            right: true,
        }
    }
}

/// Spike rows mounted on the wall faces
#[derive(Debug, Clone)]
pub struct HazardPolicy {
    left_prefab: PrefabId,
    right_prefab: PrefabId,
    left_x: f32,
    right_x: f32,
    tuning: HazardTuning,
    /// Used in alternating mode
    next_is_right: bool,
    rows: u64,
    paired_rows: u64,
}

impl HazardPolicy {
    pub fn new(
        left_prefab: Option<PrefabId>,
        right_prefab: Option<PrefabId>,
        left_anchor: Option<Vec2>,
        right_anchor: Option<Vec2>,
        tuning: &HazardTuning,
    ) -> Result<Self, ConfigError> {
        let left_anchor = left_anchor.ok_or(ConfigError::MissingAnchor(WallSide::Left))?;
        let right_anchor = right_anchor.ok_or(ConfigError::MissingAnchor(WallSide::Right))?;
        let left_prefab = left_prefab.ok_or(ConfigError::MissingPrefab(ContentKind::Hazard))?;
        let right_prefab = right_prefab.ok_or(ConfigError::MissingPrefab(ContentKind::Hazard))?;

        let mut tuning = *tuning;
        if tuning.min_gap > tuning.max_gap {
            tuning.max_gap = tuning.min_gap;
        }

        Ok(Self {
            left_prefab,
            right_prefab,
            left_x: left_anchor.x + tuning.inset,
            right_x: right_anchor.x - tuning.inset,
            tuning,
            next_is_right: false,
            rows: 0,
            paired_rows: 0,
        })
    }

    fn row_sides(&mut self, rng: &mut Pcg32) -> RowSides {
        if self.tuning.alternate_sides {
            let sides = RowSides {
                left: !self.next_is_right,
                right: self.next_is_right,
            };
            self.next_is_right = !self.next_is_right;
            sides
        } else {
            roll_row_sides(rng, self.tuning.pair_probability)
        }
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn paired_rows(&self) -> u64 {
        self.paired_rows
    }

    pub fn tuning(&self) -> &HazardTuning {
        &self.tuning
    }
}

impl SpawnPolicy for HazardPolicy {
    fn kind(&self) -> ContentKind {
        ContentKind::Hazard
    }

    fn initial_frontier(&self, camera: &CameraState) -> f32 {
        camera.top_edge() + self.tuning.min_gap
    }

    fn prewarm_count(&self) -> u32 {
        self.tuning.prewarm_count
    }

    fn lookahead(&self) -> f32 {
        self.tuning.max_gap
    }

    fn cull_margin(&self) -> f32 {
        self.tuning.cull_margin
    }

    fn place(&mut self, y: f32, rng: &mut Pcg32, out: &mut Vec<Placement>) {
        let sides = self.row_sides(rng);
        self.rows += 1;
        if sides.is_pair() {
            self.paired_rows += 1;
        }

        // Left spikes point +X, right spikes point -X
        if sides.left {
            out.push(Placement {
                prefab: self.left_prefab,
                pos: Vec2::new(self.left_x, y),
                rotation_deg: 0.0,
                side: Some(WallSide::Left),
            });
        }
        if sides.right {
            out.push(Placement {
                prefab: self.right_prefab,
                pos: Vec2::new(self.right_x, y),
                rotation_deg: 180.0,
                side: Some(WallSide::Right),
            });
        }
    }

    fn next_gap(&mut self, rng: &mut Pcg32) -> f32 {
        rng.random_range(self.tuning.min_gap..=self.tuning.max_gap)
    }
}

/// Roaming flyers at a fixed vertical spacing
#[derive(Debug, Clone)]
pub struct FlyerPolicy {
    prefab: PrefabId,
    tuning: FlyerTuning,
}

impl FlyerPolicy {
    pub fn new(prefab: Option<PrefabId>, tuning: &FlyerTuning) -> Result<Self, ConfigError> {
        let prefab = prefab.ok_or(ConfigError::MissingPrefab(ContentKind::Flyer))?;
        let mut tuning = *tuning;
        if tuning.x_min > tuning.x_max {
            tuning.x_max = tuning.x_min;
        }
        tuning.spawn_gap = tuning.spawn_gap.max(MIN_TILE_HEIGHT);
        Ok(Self { prefab, tuning })
    }

    pub fn tuning(&self) -> &FlyerTuning {
        &self.tuning
    }
}

impl SpawnPolicy for FlyerPolicy {
    fn kind(&self) -> ContentKind {
        ContentKind::Flyer
    }

    fn initial_frontier(&self, camera: &CameraState) -> f32 {
        camera.top_edge() + self.tuning.spawn_gap
    }

    fn prewarm_count(&self) -> u32 {
        self.tuning.prewarm_count
    }

    fn lookahead(&self) -> f32 {
        self.tuning.spawn_gap * self.tuning.lookahead_factor
    }

    fn cull_margin(&self) -> f32 {
        self.tuning.cull_margin
    }

    fn place(&mut self, y: f32, rng: &mut Pcg32, out: &mut Vec<Placement>) {
        let x = rng.random_range(self.tuning.x_min..=self.tuning.x_max);
        out.push(Placement {
            prefab: self.prefab,
            pos: Vec2::new(x, y),
            rotation_deg: 0.0,
            side: None,
        });
    }

    fn next_gap(&mut self, _rng: &mut Pcg32) -> f32 {
        self.tuning.spawn_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stream::{BoundsProbe, EntityIds, StreamContext, StreamRequest};
    use rand::SeedableRng;

    struct TileBounds(Option<Vec2>);

    impl BoundsProbe for TileBounds {
        fn measure(&self, _prefab: PrefabId) -> Option<Vec2> {
            self.0
        }
    }

    fn camera_at(y: f32) -> CameraState {
        CameraState {
            y,
            climb_speed: 2.0,
            half_height: 5.0,
        }
    }

    fn run<P: SpawnPolicy>(
        mgr: &mut StreamWindowManager<P>,
        camera: &CameraState,
        bounds: &TileBounds,
        rng: &mut Pcg32,
        prewarm: bool,
    ) -> Vec<StreamRequest> {
        let mut ids = EntityIds::default();
        let mut requests = Vec::new();
        let mut ctx = StreamContext {
            camera,
            rng,
            ids: &mut ids,
            bounds,
            requests: &mut requests,
        };
        if prewarm {
            mgr.prewarm(&mut ctx);
        } else {
            mgr.simulate(&mut ctx);
        }
        requests
    }

    #[test]
    fn test_wall_tiles_use_measured_height() {
        let camera = camera_at(0.0);
        let bounds = TileBounds(Some(Vec2::new(6.0, 2.5)));
        let mut rng = Pcg32::seed_from_u64(3);
        let policy = WallTilePolicy::new(Some(PrefabId(1)), Vec2::new(0.0, -5.0), &WallTuning::default()).unwrap();
        let mut tiler = WallTiler::new(policy, &camera);
        run(&mut tiler, &camera, &bounds, &mut rng, true);

        assert!(tiler.policy().is_measured());
        assert_eq!(tiler.policy().tile_height(), 2.5);

        let ys: Vec<f32> = tiler.entities().map(|e| e.pos.y).collect();
        assert_eq!(ys[0], -5.0);
        for pair in ys.windows(2) {
            assert!((pair[1] - pair[0] - 2.49).abs() < 1e-4, "tiles overlap by the seam epsilon");
        }
        // Covered past top + 2 tiles
        let top_tile = ys.last().copied().unwrap_or_default() + 1.25;
        assert!(top_tile >= camera.top_edge() + 2.0 * 2.5 - 2.49);
    }

    #[test]
    fn test_wall_tile_degenerate_bounds_floor() {
        let camera = camera_at(0.0);
        let bounds = TileBounds(Some(Vec2::new(1.0, 0.0)));
        let mut rng = Pcg32::seed_from_u64(3);
        let tuning = WallTuning {
            seam_overlap: 0.0,
            ..Default::default()
        };
        let policy = WallTilePolicy::new(Some(PrefabId(1)), Vec2::new(0.0, 4.99), &tuning).unwrap();
        let mut tiler = WallTiler::new(policy, &camera);
        run(&mut tiler, &camera, &bounds, &mut rng, true);
        assert_eq!(tiler.policy().tile_height(), MIN_TILE_HEIGHT);
        assert!(tiler.frontier_y() > 4.99);
    }

    #[test]
    fn test_wall_tile_fallback_height_without_bounds() {
        let camera = camera_at(0.0);
        let bounds = TileBounds(None);
        let mut rng = Pcg32::seed_from_u64(3);
        let policy = WallTilePolicy::new(Some(PrefabId(1)), Vec2::ZERO, &WallTuning::default()).unwrap();
        let mut tiler = WallTiler::new(policy, &camera);
        run(&mut tiler, &camera, &bounds, &mut rng, true);
        assert_eq!(tiler.policy().tile_height(), 1.0);
    }

    #[test]
    fn test_missing_references_are_config_errors() {
        let tuning = HazardTuning::default();
        let err = HazardPolicy::new(Some(PrefabId(1)), Some(PrefabId(2)), None, Some(Vec2::X), &tuning).unwrap_err();
        assert_eq!(err, ConfigError::MissingAnchor(WallSide::Left));

        let err = FlyerPolicy::new(None, &FlyerTuning::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingPrefab(ContentKind::Flyer));

        let err = WallTilePolicy::new(None, Vec2::ZERO, &WallTuning::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingPrefab(ContentKind::WallTile));
    }

    fn hazards(tuning: HazardTuning) -> HazardPolicy {
        HazardPolicy::new(
            Some(PrefabId(10)),
            Some(PrefabId(11)),
            Some(Vec2::new(-3.0, 0.0)),
            Some(Vec2::new(3.0, 0.0)),
            &tuning,
        )
        .unwrap()
    }

    #[test]
    fn test_hazard_rows_start_above_top_and_sit_on_wall_faces() {
        let camera = camera_at(0.0);
        let bounds = TileBounds(None);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut spawner = HazardSpawner::new(hazards(HazardTuning::default()), &camera);
        run(&mut spawner, &camera, &bounds, &mut rng, true);

        assert!(spawner.policy().rows() >= 2);
        let first_y = spawner.entities().map(|e| e.pos.y).fold(f32::MAX, f32::min);
        assert_eq!(first_y, camera.top_edge() + 4.0);
        for e in spawner.entities() {
            match e.side {
                Some(WallSide::Left) => assert!((e.pos.x - -2.85).abs() < 1e-5),
                Some(WallSide::Right) => assert!((e.pos.x - 2.85).abs() < 1e-5),
                None => panic!("hazard without a side"),
            }
        }
    }

    #[test]
    fn test_hazard_gaps_within_range() {
        let mut camera = camera_at(0.0);
        let bounds = TileBounds(None);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut spawner = HazardSpawner::new(hazards(HazardTuning::default()), &camera);
        run(&mut spawner, &camera, &bounds, &mut rng, true);
        for _ in 0..50 {
            camera.y += 3.0;
            run(&mut spawner, &camera, &bounds, &mut rng, false);
        }

        let mut rows: Vec<f32> = spawner.entities().map(|e| e.pos.y).collect();
        rows.dedup();
        for pair in rows.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((4.0 - 1e-4..=7.0 + 1e-4).contains(&gap), "gap {gap}");
        }
    }

    #[test]
    fn test_hazard_alternate_sides() {
        let camera = camera_at(0.0);
        let bounds = TileBounds(None);
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = HazardTuning {
            alternate_sides: true,
            prewarm_count: 6,
            ..Default::default()
        };
        let mut spawner = HazardSpawner::new(hazards(tuning), &camera);
        run(&mut spawner, &camera, &bounds, &mut rng, true);

        let sides: Vec<Option<WallSide>> = spawner.entities().map(|e| e.side).collect();
        assert!(sides.len() >= 6);
        for (i, side) in sides.iter().enumerate() {
            let expected = if i % 2 == 0 { WallSide::Left } else { WallSide::Right };
            assert_eq!(*side, Some(expected));
        }
        assert_eq!(spawner.policy().paired_rows(), 0);
    }

    #[test]
    fn test_pair_fraction_converges() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let trials = 20_000;
        let mut pairs = 0;
        let mut lefts = 0;
        let mut rights = 0;
        for _ in 0..trials {
            let sides = roll_row_sides(&mut rng, 0.25);
            match (sides.left, sides.right) {
                (true, true) => pairs += 1,
                (true, false) => lefts += 1,
                (false, true) => rights += 1,
                (false, false) => panic!("empty row"),
            }
        }
        let fraction = pairs as f32 / trials as f32;
        assert!((fraction - 0.25).abs() < 0.02, "pair fraction {fraction}");
        // Single-side rows split evenly
        let single_ratio = lefts as f32 / (lefts + rights) as f32;
        assert!((single_ratio - 0.5).abs() < 0.03);
    }

    #[test]
    fn test_flyers_fixed_gap_and_x_range() {
        let mut camera = camera_at(0.0);
        let bounds = TileBounds(None);
        let mut rng = Pcg32::seed_from_u64(8);
        let policy = FlyerPolicy::new(Some(PrefabId(20)), &FlyerTuning::default()).unwrap();
        let mut spawner = FlyerSpawner::new(policy, &camera);
        run(&mut spawner, &camera, &bounds, &mut rng, true);
        assert_eq!(spawner.len(), 2);
        camera.y += 20.0;
        run(&mut spawner, &camera, &bounds, &mut rng, false);

        let ys: Vec<f32> = spawner.entities().map(|e| e.pos.y).collect();
        for pair in ys.windows(2) {
            assert!((pair[1] - pair[0] - 6.0).abs() < 1e-4);
        }
        assert!(spawner.entities().all(|e| (-2.5..=2.5).contains(&e.pos.x)));
        assert!(spawner.frontier_y() >= camera.top_edge() + 9.0);
    }
}
