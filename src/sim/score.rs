//! Distance score
//!
//! Points accrue only for upward camera travel.

use serde::{Deserialize, Serialize};

use crate::tuning::ScoreTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTracker {
    points_per_unit: f32,
    last_camera_y: f32,
    /// Total upward distance travelled
    pub distance: f32,
    pub score: f32,
}

impl ScoreTracker {
    pub fn new(tuning: &ScoreTuning, camera_y: f32) -> Self {
        Self {
            points_per_unit: tuning.points_per_unit,
            last_camera_y: camera_y,
            distance: 0.0,
            score: 0.0,
        }
    }

    pub fn update(&mut self, camera_y: f32) {
        let dy = camera_y - self.last_camera_y;
        if dy > 0.0 {
            self.distance += dy;
            self.score = self.distance * self.points_per_unit;
        }
        self.last_camera_y = camera_y;
    }

    /// Whole points for the HUD
    pub fn display(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_upward_motion_scores() {
        let mut score = ScoreTracker::new(&ScoreTuning { points_per_unit: 2.0 }, 0.0);
        score.update(1.5);
        score.update(1.0);
        score.update(3.0);
        assert_eq!(score.distance, 3.5);
        assert_eq!(score.score, 7.0);
        assert_eq!(score.display(), 7);
    }

    #[test]
    fn test_display_floors() {
        let mut score = ScoreTracker::new(&ScoreTuning::default(), 0.0);
        score.update(2.9);
        assert_eq!(score.display(), 2);
    }
}
