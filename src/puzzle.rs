use std::fmt::{Display, Formatter};
use std::rc::Rc;

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::kind::{Color, Fill, FillSet, Kind};
use crate::location::{Dimension, Location};

/// Raised when an inference or a branch fix would leave an edge with no
/// possible fill. The current propagation or search branch is abandoned;
/// this is never a terminal failure of the whole solve.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("an edge was narrowed to an empty possibility set")]
pub struct Contradiction;

/// A puzzle node. Nodes are plain values; two nodes are the same node exactly
/// when all their fields agree, and ordering by location keeps every
/// enumeration in this crate deterministic.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub struct Node {
    /// Where this node sits on the grid.
    pub location: Location,
    /// What sort of node this is.
    pub kind: Kind,
    /// How many solution edges must touch this node.
    pub desired_edges: usize,
}

/// The static description of a puzzle: nodes, adjacency, which edge pairs
/// cross, and each color's terminal pair. Built once and shared read-only by
/// every [`Puzzle`] state derived during solving.
pub(crate) struct Topology {
    // edge weights index into the fills table of each Puzzle state
    pub(crate) graph: UnGraphMap<Node, usize>,
    pub(crate) edges: Vec<UnorderedPair<Node>>,
    pub(crate) crossings: Vec<(usize, usize)>,
    pub(crate) terminals: Vec<(Color, UnorderedPair<Node>)>,
    pub(crate) dims: (Dimension, Dimension),
}

/// One immutable puzzle state: the shared topology plus the current
/// possibility set of every edge. Narrowing returns a new state and leaves
/// the original untouched, so a rejected search branch is simply dropped.
#[derive(Clone)]
pub struct Puzzle {
    pub(crate) topology: Rc<Topology>,
    pub(crate) fills: Vec<FillSet>,
}

impl PartialEq for Puzzle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.topology, &other.topology) && self.fills == other.fills
    }
}

impl Eq for Puzzle {}

impl Puzzle {
    /// Every node, in grid scan order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.topology.graph.nodes()
    }

    /// Every edge, in a fixed order stable across all states of one puzzle.
    pub fn edges(&self) -> impl Iterator<Item = UnorderedPair<Node>> + '_ {
        self.topology.edges.iter().copied()
    }

    /// The nodes adjacent to `node`.
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.topology.graph.neighbors(node)
    }

    /// Each color's pair of terminal nodes.
    pub fn terminal_pairs(&self) -> impl Iterator<Item = (Color, UnorderedPair<Node>)> + '_ {
        self.topology.terminals.iter().copied()
    }

    /// Pairs of edges that cross each other on the grid.
    pub fn crossings(&self) -> impl Iterator<Item = (UnorderedPair<Node>, UnorderedPair<Node>)> + '_ {
        self.topology.crossings.iter()
            .map(|&(a, b)| (self.topology.edges[a], self.topology.edges[b]))
    }

    fn edge_index(&self, a: Node, b: Node) -> usize {
        *self.topology.graph.edge_weight(a, b)
            .expect("possibilities queried for nodes that are not adjacent")
    }

    /// The fills edge `(a, b)` could still carry. Panics if the nodes are not
    /// adjacent; callers only hand this edges of the same puzzle.
    pub fn possibilities(&self, a: Node, b: Node) -> FillSet {
        self.fills[self.edge_index(a, b)]
    }

    /// A new state with edge `(a, b)` narrowed to the intersection of its
    /// current possibilities and `allowed`.
    pub fn narrowed(&self, a: Node, b: Node, allowed: FillSet) -> Result<Self, Contradiction> {
        let index = self.edge_index(a, b);
        let narrowed = self.fills[index].intersection(allowed);
        if narrowed.is_empty() {
            return Err(Contradiction);
        }

        let mut fills = self.fills.clone();
        fills[index] = narrowed;
        Ok(Self { topology: Rc::clone(&self.topology), fills })
    }

    /// A new state with `fill` no longer possible on edge `(a, b)`.
    pub fn removed(&self, a: Node, b: Node, fill: Fill) -> Result<Self, Contradiction> {
        self.narrowed(a, b, FillSet::full().without(fill))
    }

    /// A new state with edge `(a, b)` fixed to exactly `fill`.
    pub fn fixed(&self, a: Node, b: Node, fill: Fill) -> Result<Self, Contradiction> {
        self.narrowed(a, b, FillSet::only(fill))
    }

    /// Whether every edge is down to a single possible fill.
    pub fn is_determined(&self) -> bool {
        self.fills.iter().all(|fills| fills.len() == 1)
    }
}

impl std::fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.edges().map(|pair| {
                ((pair.0.location, pair.1.location), self.possibilities(pair.0, pair.1))
            }))
            .finish()
    }
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dims = self.topology.dims;
        let mut cells = Array2::from_elem((dims.1.get(), dims.0.get()), '.');
        for node in self.nodes() {
            cells[node.location.as_index()] = match node.kind {
                Kind::Terminal(color) => color.display().to_ascii_uppercase(),
                Kind::Color(color) => color.display(),
                Kind::Octagon => 'o',
            };
        }

        let mut out = String::with_capacity(cells.nrows() * (cells.ncols() + 1));
        for row in cells.rows() {
            for cell in row {
                out.push(*cell);
            }
            out.push('\n');
        }
        write!(f, "{}", out)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::PuzzleBuilder;
    use crate::kind::{Color, Fill, FillSet};
    use crate::location::Location;

    use super::*;

    fn two_terminal_strip() -> Puzzle {
        let mut builder = PuzzleBuilder::with_dims((3.try_into().unwrap(), 1.try_into().unwrap()));
        builder
            .add_terminals(Color::Crimson, (Location(0, 0), Location(2, 0)))
            .add_octagon(Location(1, 0), 1);
        builder.build().unwrap()
    }

    fn node_at(puzzle: &Puzzle, location: Location) -> Node {
        puzzle.nodes().find(|n| n.location == location).unwrap()
    }

    #[test]
    fn narrowing_is_monotonic_and_shares_topology() {
        let puzzle = two_terminal_strip();
        let a = node_at(&puzzle, Location(0, 0));
        let b = node_at(&puzzle, Location(1, 0));

        let before = puzzle.possibilities(a, b);
        let narrowed = puzzle.removed(a, b, Fill::Empty).unwrap();
        let after = narrowed.possibilities(a, b);

        assert!(after.is_subset_of(before));
        assert!(before.contains(Fill::Empty));
        assert!(!after.contains(Fill::Empty));
        // the original state is untouched
        assert_eq!(puzzle.possibilities(a, b), before);
        assert!(Rc::ptr_eq(&puzzle.topology, &narrowed.topology));
    }

    #[test]
    fn emptying_an_edge_contradicts() {
        let puzzle = two_terminal_strip();
        let a = node_at(&puzzle, Location(0, 0));
        let b = node_at(&puzzle, Location(1, 0));

        let fixed = puzzle.fixed(a, b, Fill::Empty).unwrap();
        assert_eq!(
            fixed.narrowed(a, b, FillSet::only(Fill::Color(Color::Crimson))),
            Err(Contradiction),
        );
    }

    #[test]
    fn state_equality_tracks_fills() {
        let puzzle = two_terminal_strip();
        let a = node_at(&puzzle, Location(0, 0));
        let b = node_at(&puzzle, Location(1, 0));

        assert_eq!(puzzle, puzzle.clone());
        let narrowed = puzzle.removed(a, b, Fill::Empty).unwrap();
        assert_ne!(puzzle, narrowed);
        // removing an already-impossible fill changes nothing
        assert_eq!(narrowed, narrowed.removed(a, b, Fill::Empty).unwrap());
    }

    #[test]
    fn display_renders_grid() {
        let puzzle = two_terminal_strip();
        assert_eq!(puzzle.to_string(), "CoC\n");
    }
}
