pub mod cell;
pub mod config;
pub mod events;
pub mod grid;
pub mod io;
pub mod pattern;
pub mod render;
pub mod rle;
pub mod rule_set;
pub mod scheduler;

mod parse_util;

/// Index of a [`cell::Cell`] in the grid's arena
pub type CellIndex = usize;

/// Signed grid coordinate. Anything outside the grid is wrapped back onto the torus.
pub type GridOffset = i64;

/// Pixel coordinate on a drawing surface
pub type Pixel = usize;
