//! Bounded score values.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// A score or confidence value clamped to `[0.0, 1.0]`.
///
/// Every score and confidence in the engine flows through this type so the
/// range invariant holds by construction, including on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct UnitScore(f64);

impl UnitScore {
    /// The minimum score.
    pub const ZERO: Self = Self(0.0);
    /// The maximum score.
    pub const ONE: Self = Self(1.0);

    /// Creates a score, clamping to `[0.0, 1.0]`. `NaN` maps to `0.0`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering over scores (the inner value is never `NaN`).
    #[must_use]
    pub fn total_cmp(self, other: Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for UnitScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for UnitScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl Serialize for UnitScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for UnitScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if value.is_nan() {
            return Err(de::Error::custom("score must not be NaN"));
        }
        Ok(Self::new(value))
    }
}
