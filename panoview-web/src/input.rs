use glam::Vec3;

/// Key bindings for manual free-look: (key, rate axis, sign). Axes are
/// pitch = 0, yaw = 1, roll = 2, camera-relative.
const BINDINGS: [(char, usize, f32); 6] = [
    ('w', 0, 1.0),
    ('s', 0, -1.0),
    ('a', 1, 1.0),
    ('d', 1, -1.0),
    ('q', 2, -1.0),
    ('e', 2, 1.0),
];

/// Manual angular-rate input driven by keyboard edges.
///
/// A key-down adds its signed unit contribution to its axis exactly once —
/// browser auto-repeat fires duplicate key-downs while a key is held, so
/// each binding latches its active state and ignores repeated edges. The
/// matching key-up removes exactly the same contribution.
pub struct ManualRateInput {
    rate: Vec3,
    active: [bool; BINDINGS.len()],
}

impl ManualRateInput {
    pub fn new() -> Self {
        Self {
            rate: Vec3::ZERO,
            active: [false; BINDINGS.len()],
        }
    }

    /// Current signed angular rate, read once per tick by the scheduler.
    pub fn rate(&self) -> Vec3 {
        self.rate
    }

    /// Returns true when the edge changed the rate.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.edge(key, true)
    }

    /// Returns true when the edge changed the rate.
    pub fn key_up(&mut self, key: &str) -> bool {
        self.edge(key, false)
    }

    fn edge(&mut self, key: &str, pressed: bool) -> bool {
        let mut chars = key.chars();
        let (c, rest) = (chars.next(), chars.next());
        let c = match (c, rest) {
            (Some(c), None) => c.to_ascii_lowercase(),
            _ => return false, // named keys ("Shift", "ArrowUp") are not bound
        };

        for (i, (bound, axis, sign)) in BINDINGS.iter().enumerate() {
            if *bound != c {
                continue;
            }
            if self.active[i] == pressed {
                return false;
            }
            self.active[i] = pressed;
            let delta = if pressed { *sign } else { -*sign };
            self.rate[*axis] += delta;
            return true;
        }
        false
    }
}

impl Default for ManualRateInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_axis_rate() {
        let mut input = ManualRateInput::new();
        assert!(input.key_down("w"));
        assert_eq!(input.rate(), Vec3::new(1.0, 0.0, 0.0));
        assert!(input.key_down("a"));
        assert_eq!(input.rate(), Vec3::new(1.0, 1.0, 0.0));
        assert!(input.key_down("q"));
        assert_eq!(input.rate(), Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_repeat_key_down_accumulates_once() {
        let mut input = ManualRateInput::new();
        assert!(input.key_down("w"));
        assert!(!input.key_down("w"));
        assert!(!input.key_down("w"));
        assert_eq!(input.rate(), Vec3::new(1.0, 0.0, 0.0));
        assert!(input.key_up("w"));
        assert_eq!(input.rate(), Vec3::ZERO);
    }

    #[test]
    fn test_key_up_without_down_is_ignored() {
        let mut input = ManualRateInput::new();
        assert!(!input.key_up("s"));
        assert_eq!(input.rate(), Vec3::ZERO);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = ManualRateInput::new();
        input.key_down("w");
        input.key_down("s");
        assert_eq!(input.rate(), Vec3::ZERO);
        input.key_up("s");
        assert_eq!(input.rate(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_uppercase_and_named_keys() {
        let mut input = ManualRateInput::new();
        assert!(input.key_down("W"));
        assert_eq!(input.rate(), Vec3::new(1.0, 0.0, 0.0));
        assert!(!input.key_down("Shift"));
        assert!(!input.key_down("x"));
        assert_eq!(input.rate(), Vec3::new(1.0, 0.0, 0.0));
    }
}
