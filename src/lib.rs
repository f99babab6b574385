//! Battlemap generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod branching;
pub mod canvas;
pub mod clusters;
pub mod color;
pub mod compass;
pub mod compositor;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod pixels;
pub mod texture;
