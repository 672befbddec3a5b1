//! Affine unit-to-unit transform

use serde::{Serialize, Deserialize};

/// Directed conversion between two units.
///
/// `offset_first` selects `(value + offset) * ratio`; otherwise the result is
/// `value * ratio + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionData {
    pub ratio: f64,
    pub offset: f64,
    pub offset_first: bool,
}

impl ConversionData {
    pub const fn new(ratio: f64, offset: f64, offset_first: bool) -> Self {
        Self { ratio, offset, offset_first }
    }

    /// Pure scale factor
    pub const fn linear(ratio: f64) -> Self {
        Self::new(ratio, 0.0, false)
    }

    /// Self-conversion
    pub const fn identity() -> Self {
        Self::linear(1.0)
    }

    /// True when applying this transform leaves every value unchanged
    pub fn is_identity(&self) -> bool {
        self.ratio == 1.0 && self.offset == 0.0
    }

    pub fn apply(&self, value: f64) -> f64 {
        if self.offset_first {
            (value + self.offset) * self.ratio
        } else {
            value * self.ratio + self.offset
        }
    }
}

impl Default for ConversionData {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert `value` using `data`. Used for the primary and the suggested results alike.
pub fn convert(value: f64, data: &ConversionData) -> f64 {
    data.apply(value)
}
