//! Cambio Common Types
//!
//! Shared types used across the cambio rate pipeline: normalized currency
//! codes, ordered pair keys and time helpers.

pub mod currency;
pub mod error;
pub mod time;

pub use currency::*;
pub use error::*;
pub use time::*;
