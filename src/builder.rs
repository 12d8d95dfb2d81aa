//! Constructing [`Puzzle`] values from grid descriptions.

use std::rc::Rc;

use itertools::Itertools;
use ndarray::{Array2, AssignElem};
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::kind::{Color, Fill, FillSet, Kind};
use crate::location::{Dimension, Location};
use crate::puzzle::{Node, Puzzle, Topology};
use crate::step::Step;

/// Reasons a builder may become invalid while being built.
#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub enum BuilderInvalidReason {
    /// A feature was placed outside the bounds specified by `with_dims`.
    #[error("a feature was placed outside the board bounds")]
    FeatureOutOfBounds,
    /// Two features were placed on the same location.
    #[error("a feature was placed on an occupied location")]
    OccupiedLocation,
    /// A color was given more than one terminal pair.
    #[error("a color was given a second terminal pair")]
    DuplicateTerminals,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum BuilderCell {
    Terminal { color: Color },
    Color { color: Color },
    Octagon { passes: usize },
    #[default]
    Empty,
}

/// A builder for puzzles laid out on a rectangular grid, where lines connect
/// king-move neighbors and the two diagonals of a unit cell cross each other.
///
/// Locations left untouched hold no node; lines cannot pass through them.
pub struct PuzzleBuilder {
    // width, height
    dims: (Dimension, Dimension),
    cells: Array2<BuilderCell>,
    terminals: Vec<(Color, (Location, Location))>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl PuzzleBuilder {
    /// An empty builder for a `(width, height)` grid.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), BuilderCell::Empty),
            terminals: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    fn place(&mut self, location: Location, cell: BuilderCell) {
        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return;
        }
        if *self.cells.get(location.as_index()).unwrap() != BuilderCell::Empty {
            self.invalid_reasons.push(BuilderInvalidReason::OccupiedLocation);
            return;
        }
        self.cells.get_mut(location.as_index()).unwrap().assign_elem(cell);
    }

    /// Add `color`'s pair of terminal nodes. Terminals want exactly one
    /// incident solution edge.
    pub fn add_terminals(&mut self, color: Color, locations: (Location, Location)) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if self.terminals.iter().any(|(existing, _)| *existing == color) {
            self.invalid_reasons.push(BuilderInvalidReason::DuplicateTerminals);
            return self;
        }

        self.terminals.push((color, locations));
        for location in [locations.0, locations.1] {
            self.place(location, BuilderCell::Terminal { color });
        }
        self
    }

    /// Add an ordinary colored node, which `color`'s line must pass through.
    pub fn add_color_node(&mut self, color: Color, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }
        self.place(location, BuilderCell::Color { color });
        self
    }

    /// Add a neutral octagon node crossed by lines exactly `passes` times.
    pub fn add_octagon(&mut self, location: Location, passes: usize) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }
        self.place(location, BuilderCell::Octagon { passes });
        self
    }

    /// Convert the state of this builder into a [`Puzzle`].
    pub fn build(&self) -> Result<Puzzle, Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        let nodes = Array2::from_shape_fn(self.cells.raw_dim(), |ind| {
            let location = Location::from(ind);
            match *self.cells.get(ind).unwrap() {
                BuilderCell::Terminal { color } => Some(Node {
                    location,
                    kind: Kind::Terminal(color),
                    desired_edges: 1,
                }),
                BuilderCell::Color { color } => Some(Node {
                    location,
                    kind: Kind::Color(color),
                    desired_edges: 2,
                }),
                BuilderCell::Octagon { passes } => Some(Node {
                    location,
                    kind: Kind::Octagon,
                    desired_edges: 2 * passes,
                }),
                BuilderCell::Empty => None,
            }
        });

        let mut graph: UnGraphMap<Node, usize> = UnGraphMap::with_capacity(
            self.cells.len(),
            // naively allocate for a complete grid, which usually isn't too far off
            4 * self.cells.len(),
        );
        for node in nodes.iter().flatten() {
            graph.add_node(*node);
        }

        let node_at = |location: Location| {
            nodes.get(location.as_index()).copied().flatten()
        };

        let mut edges = Vec::new();
        for y in 0..self.dims.1.get() {
            for x in 0..self.dims.0.get() {
                let location = Location(x, y);
                let Some(node) = node_at(location) else { continue };
                for direction in Step::forward_edge_directions() {
                    let Some(other) = node_at(direction.attempt_from(location)) else { continue };
                    graph.add_edge(node, other, edges.len());
                    edges.push(UnorderedPair::from((node, other)));
                }
            }
        }

        // the two diagonals of each unit cell cross
        let mut crossings = Vec::new();
        for y in 0..self.dims.1.get() {
            for x in 0..self.dims.0.get() {
                let corners = (
                    node_at(Location(x, y)),
                    node_at(Location(x + 1, y + 1)),
                    node_at(Location(x + 1, y)),
                    node_at(Location(x, y + 1)),
                );
                if let (Some(nw), Some(se), Some(ne), Some(sw)) = corners {
                    if let (Some(&main), Some(&anti)) =
                        (graph.edge_weight(nw, se), graph.edge_weight(ne, sw))
                    {
                        crossings.push((main, anti));
                    }
                }
            }
        }

        let terminals = self.terminals.iter()
            .map(|(color, locations)| {
                let pair = (
                    node_at(locations.0).unwrap(),
                    node_at(locations.1).unwrap(),
                );
                (*color, UnorderedPair::from(pair))
            })
            .collect_vec();

        // edges start out able to carry any color in play, or nothing
        let palette = self.terminals.iter()
            .fold(FillSet::only(Fill::Empty), |set, (color, _)| set.with(Fill::Color(*color)));

        let fills = vec![palette; edges.len()];
        Ok(Puzzle {
            topology: Rc::new(Topology {
                graph,
                edges,
                crossings,
                terminals,
                dims: self.dims,
            }),
            fills,
        })
    }
}
