//! Grid modules: cell geometry, ground-truth world, and per-cell masks

pub mod cell;
pub mod mask;
pub mod world;

// Re-export main types
pub use cell::*;
pub use mask::*;
pub use world::*;
