//! unitconv Core - Fundamental types
//!
//! This crate provides the core types used throughout unitconv:
//! - `Unit` / `Category`: immutable descriptions of what can be converted
//! - `ConversionData`: the affine transform between two units
//! - `ConverterError`: structured errors with machine-readable codes
//! - `format`: fixed and scientific rendering used by the engine display

mod unit;
mod convert;
mod error;
pub mod format;
pub mod ids;

pub use unit::{
    Unit, Category, CurrencyStaticData, CurrencyRatio,
    RatioMap, UnitRatioMap, CategorySelection, EMPTY_UNIT,
};
pub use convert::{ConversionData, convert};
pub use error::{ConverterError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Unit, Category, ConversionData, ConverterError, RatioMap, EMPTY_UNIT};
    pub use crate::error::codes;
}
