//! Stable identifiers
//!
//! Category ids are persisted in serialized engine state and user preferences,
//! so the numbers below must never change.

pub const VOLUME: i32 = 4;
pub const LENGTH: i32 = 5;
pub const WEIGHT: i32 = 6;
pub const TEMPERATURE: i32 = 7;
pub const ENERGY: i32 = 8;
pub const AREA: i32 = 9;
pub const SPEED: i32 = 10;
pub const TIME: i32 = 11;
pub const POWER: i32 = 12;
pub const DATA: i32 = 13;
pub const PRESSURE: i32 = 14;
pub const ANGLE: i32 = 15;
pub const CURRENCY: i32 = 16;

/// First id handed out to currency units. Standard unit ids stay below it.
pub const CURRENCY_UNIT_BASE: i32 = 10_000;
