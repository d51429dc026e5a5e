//! Burst variance analysis math utilities.

pub mod math;

pub use math::moments::RunningMoments;
pub use math::stable::*;
