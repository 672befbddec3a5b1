//! unitconv - Unit and currency conversion engine
//!
//! The engine keeps one active category with a from/to pair and two entry
//! buffers. Keypresses arrive as [`Command`]s; every change is pushed to a
//! [`ConverterCallback`](unitconv_loader::ConverterCallback).
//!
//! Units and ratios come from loaders: the built-in tables in `unitconv-units`
//! and, optionally, a currency loader such as the one in `unitconv-currency`.

mod command;
mod engine;
pub mod codec;

pub use command::Command;
pub use engine::{UnitConverter, MAXIMUM_DIGITS_ALLOWED, OPTIMAL_DIGITS_ALLOWED};
pub use codec::{EngineState, Preferences};
pub use unitconv_core::{convert, Category, ConversionData, Unit, EMPTY_UNIT};

impl Default for UnitConverter {
    fn default() -> Self {
        let mut converter = Self::with_standard_units(unitconv_units::UnitsConfig::default());
        converter.initialize();
        converter
    }
}

/// Re-export everything needed to drive the engine
pub mod prelude {
    pub use crate::{Command, UnitConverter};
    pub use unitconv_core::prelude::*;
    pub use unitconv_loader::{ConverterCallback, CurrencyCallback, ConverterEvent, EventSink, LoaderSet};
    pub use unitconv_units::{StandardDataLoader, UnitsConfig};
}
