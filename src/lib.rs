#![warn(missing_docs)]

//! A solver for LYNE-style path puzzles: choose, for every candidate edge on
//! a grid of colored, terminal, and octagon nodes, whether a line passes over
//! it and in which color, so that each color forms a single line between its
//! two terminals and every node is touched by exactly its desired number of
//! edges.
//!
//! Build a [`Puzzle`] with [`builder::PuzzleBuilder`], then call
//! [`Puzzle::solve`].

pub use kind::{Color, Fill, FillSet, Kind};
pub use location::{Coord, Dimension, Location};
pub use puzzle::{Contradiction, Node, Puzzle};
pub use solver::Path;

pub mod builder;
pub(crate) mod kind;
pub(crate) mod location;
pub(crate) mod puzzle;
pub mod rules;
pub(crate) mod solver;
pub(crate) mod step;
mod tests;
