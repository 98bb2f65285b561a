//! Pillar domain module.
//!
//! The 30 fixed progress items, ten per category.

mod model;
mod preset;

pub use model::{Pillar, PillarCategory};
pub use preset::{PILLARS, TOTAL_PILLARS, by_category, find};
