// Coordinate triple shared by the roster, the projection, and saved locations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the position with every axis rounded to 2 decimal places.
    pub fn rounded(self) -> Self {
        Self {
            x: round_2dp(self.x),
            y: round_2dp(self.y),
            z: round_2dp(self.z),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Halves round toward positive infinity, matching the plugin's rounding.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_each_axis_to_two_decimals() {
        let position = Position::new(10.456, 64.0, -5.004).rounded();

        assert_eq!(position, Position::new(10.46, 64.0, -5.0));
    }

    #[test]
    fn halves_round_toward_positive_infinity() {
        let position = Position::new(-1.125, 0.125, -0.001).rounded();

        assert_eq!(position.x, -1.12);
        assert_eq!(position.y, 0.13);
        assert_eq!(position.z, 0.0);
    }

    #[test]
    fn negative_values_below_the_half_still_round_down() {
        let position = Position::new(-2.126, -0.375, -10.456).rounded();

        assert_eq!(position, Position::new(-2.13, -0.37, -10.46));
    }

    #[test]
    fn infinity_is_not_finite() {
        assert!(!Position::new(f64::INFINITY, 0.0, 0.0).is_finite());
        assert!(Position::ORIGIN.is_finite());
    }
}
