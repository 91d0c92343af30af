//! Launch action input
//!
//! Device callbacks feed raw press/release/level changes in between ticks;
//! the simulation takes one snapshot per tick with explicit edges. Presses
//! and releases that both land between two ticks are latched so a quick tap
//! is never lost.

/// Analog values at or above this count as held
pub const HELD_THRESHOLD: f32 = 0.5;

/// Discrete per-tick signals for the launch action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSignals {
    /// Went down since the previous tick
    pub pressed: bool,
    /// Came up since the previous tick
    pub released: bool,
    /// Down right now
    pub held: bool,
}

impl ActionSignals {
    pub const IDLE: ActionSignals = ActionSignals {
        pressed: false,
        released: false,
        held: false,
    };

    pub const PRESS: ActionSignals = ActionSignals {
        pressed: true,
        released: false,
        held: true,
    };

    pub const HOLD: ActionSignals = ActionSignals {
        pressed: false,
        released: false,
        held: true,
    };

    pub const RELEASE: ActionSignals = ActionSignals {
        pressed: false,
        released: true,
        held: false,
    };
}

/// Edge detector between raw device state and the simulation
#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    raw_held: bool,
    prev_held: bool,
    press_latched: bool,
    release_latched: bool,
}

impl ActionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self) {
        if !self.raw_held {
            self.press_latched = true;
        }
        self.raw_held = true;
    }

    pub fn release(&mut self) {
        if self.raw_held {
            self.release_latched = true;
        }
        self.raw_held = false;
    }

    /// Feed an analog level (triggers, touch pressure)
    pub fn set_level(&mut self, value: f32) {
        if value >= HELD_THRESHOLD {
            self.press();
        } else {
            self.release();
        }
    }

    /// Signals for this tick; clears latched edges
    pub fn snapshot(&mut self) -> ActionSignals {
        let signals = ActionSignals {
            pressed: self.press_latched || (!self.prev_held && self.raw_held),
            released: self.release_latched || (self.prev_held && !self.raw_held),
            held: self.raw_held,
        };
        self.prev_held = self.raw_held;
        self.press_latched = false;
        self.release_latched = false;
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_hold_release_edges() {
        let mut input = ActionInput::new();
        assert_eq!(input.snapshot(), ActionSignals::IDLE);

        input.press();
        assert_eq!(input.snapshot(), ActionSignals::PRESS);
        assert_eq!(input.snapshot(), ActionSignals::HOLD);

        input.release();
        assert_eq!(input.snapshot(), ActionSignals::RELEASE);
        assert_eq!(input.snapshot(), ActionSignals::IDLE);
    }

    #[test]
    fn test_tap_between_ticks_is_latched() {
        let mut input = ActionInput::new();
        input.press();
        input.release();
        let signals = input.snapshot();
        assert!(signals.pressed && signals.released && !signals.held);
        assert_eq!(input.snapshot(), ActionSignals::IDLE);
    }

    #[test]
    fn test_analog_level_threshold() {
        let mut input = ActionInput::new();
        input.set_level(0.8);
        assert!(input.snapshot().pressed);
        input.set_level(0.6);
        assert_eq!(input.snapshot(), ActionSignals::HOLD);
        input.set_level(0.2);
        assert!(input.snapshot().released);
    }

    #[test]
    fn test_repeated_press_is_single_edge() {
        let mut input = ActionInput::new();
        input.press();
        input.press();
        assert!(input.snapshot().pressed);
        input.press();
        assert!(!input.snapshot().pressed);
    }
}
