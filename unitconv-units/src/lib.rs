//! unitconv Units - Standard unit tables
//!
//! Provides the built-in categories with their units and conversion factors.
//! Region decides which units are offered as the default from/to pair.
//!
//! Categories (display order):
//! - Currency (placeholder, served by the currency loader)
//! - Volume (mL, L, gal, cups, etc.)
//! - Length (m, km, in, ft, mi, etc.)
//! - Weight and Mass (kg, g, lb, oz, etc.)
//! - Temperature (°C, °F, K)
//! - Energy (J, cal, kWh, BTU, etc.)
//! - Area (m², ha, acre, etc.)
//! - Speed (m/s, km/h, mph, knot, etc.)
//! - Time (s, min, h, d, etc.)
//! - Power (W, kW, hp, etc.)
//! - Data (bit, byte, MB, GiB, etc.)
//! - Pressure (atm, bar, Pa, psi, etc.)
//! - Angle (deg, rad, grad)

mod config;
mod units;
mod loader;

pub use config::UnitsConfig;
pub use units::UnitTable;
pub use loader::StandardDataLoader;
