//! unitconv Loader System
//!
//! Provides the seams between the engine and its collaborators:
//! - Data loaders (standard units, currency)
//! - Observer callbacks (display, currency status)
//! - Routing of categories to the loader that serves them

mod traits;
mod callback;
mod registry;

pub use traits::{ConverterDataLoader, CurrencyConverterDataLoader, NetworkAccessBehavior};
pub use callback::{ConverterCallback, CurrencyCallback, ConverterEvent, EventSink};
pub use registry::{LoaderSet, CurrencyHandle};

/// Re-export core types for loader authors
pub mod prelude {
    pub use crate::{
        ConverterDataLoader, CurrencyConverterDataLoader, NetworkAccessBehavior,
        ConverterCallback, CurrencyCallback, LoaderSet,
    };
    pub use unitconv_core::prelude::*;
}
