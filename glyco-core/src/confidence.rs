use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Confidence score clamped to [0.0, 1.0].
/// Used for classification scores, retrieval result scores, and blends.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    /// High confidence threshold. Signals above this are considered reliable.
    pub const HIGH: f64 = 0.8;
    /// Medium confidence threshold.
    pub const MEDIUM: f64 = 0.5;
    /// Low confidence threshold.
    pub const LOW: f64 = 0.3;

    /// Create a new Confidence, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// The zero confidence value.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Check if confidence is above the high threshold.
    pub fn is_high(self) -> bool {
        self.0 >= Self::HIGH
    }

    /// Derive a confidence from a vector-store distance (smaller is closer).
    pub fn from_distance(distance: f64) -> Self {
        Self::new(1.0 - distance)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl Add<f64> for Confidence {
    type Output = Self;
    fn add(self, rhs: f64) -> Self {
        Self::new(self.0 + rhs)
    }
}

impl Sub<f64> for Confidence {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self {
        Self::new(self.0 - rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Confidence::new(1.5).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
    }

    #[test]
    fn distance_inverts() {
        assert_eq!(Confidence::from_distance(0.25).value(), 0.75);
        assert_eq!(Confidence::from_distance(1.8).value(), 0.0);
    }

    #[test]
    fn boost_saturates_at_one() {
        let c = Confidence::new(0.95) + 0.2;
        assert_eq!(c.value(), 1.0);
    }
}
