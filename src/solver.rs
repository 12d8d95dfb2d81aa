//! The backtracking search engine and solution-path reconstruction.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::debug;
use unordered_pair::UnorderedPair;

use crate::kind::{Color, Fill};
use crate::puzzle::{Contradiction, Node, Puzzle};
use crate::rules;

/// One color's solution line: an ordered walk from one of the color's
/// terminals to the other.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Path {
    /// The color whose line this is.
    pub color: Color,
    /// The nodes visited, terminals first and last.
    pub nodes: Vec<Node>,
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.color.display(),
            self.nodes.iter()
                .map(|n| format!("({}, {})", n.location.0, n.location.1))
                .join(" -> "),
        )
    }
}

impl Puzzle {
    /// Solves this puzzle, returning one line per color, or `None` if no
    /// assignment of the edges satisfies the puzzle.
    ///
    /// Propagates constraints as far as they reach, then runs a backtracking
    /// search over the remaining ambiguity, branching on a least-ambiguous
    /// edge first. The first satisfying assignment wins.
    pub fn solve(self) -> Option<Vec<Path>> {
        debug!(
            "solving puzzle with {} nodes, {} edges",
            self.nodes().count(),
            self.edges().count(),
        );
        let narrowed = rules::one_shot_pass(&self).ok()?;
        // a contradiction surfacing here means the puzzle itself is
        // infeasible, not that anything went wrong
        search(narrowed).ok().flatten()
    }
}

fn search(puzzle: Puzzle) -> Result<Option<Vec<Path>>, Contradiction> {
    let puzzle = rules::fixpoint_pass(&puzzle)?;

    let Some(pair) = most_constrained(&puzzle) else {
        return Ok(reconstruct(&puzzle));
    };
    for fill in puzzle.possibilities(pair.0, pair.1).iter() {
        let Ok(branch) = puzzle.fixed(pair.0, pair.1, fill) else {
            continue;
        };
        // a contradiction or a dead end below only exhausts this branch
        if let Ok(Some(paths)) = search(branch) {
            return Ok(Some(paths));
        }
    }
    Ok(None)
}

/// The undetermined edge with the fewest remaining possibilities; ties go to
/// the earliest edge in enumeration order.
pub(crate) fn most_constrained(puzzle: &Puzzle) -> Option<UnorderedPair<Node>> {
    puzzle.edges()
        .filter(|pair| puzzle.possibilities(pair.0, pair.1).len() > 1)
        .min_by_key(|pair| puzzle.possibilities(pair.0, pair.1).len())
}

/// Walks out each color's line through a fully determined puzzle and checks
/// the global validity of the result. Returns `None` when the determined
/// edges do not decompose into satisfying lines.
fn reconstruct(puzzle: &Puzzle) -> Option<Vec<Path>> {
    assert!(
        puzzle.is_determined(),
        "reconstruction requires every edge to be determined",
    );

    // edges are exclusive across all lines, so one used set serves every color
    let mut used_edges = HashSet::new();
    let mut paths = Vec::new();
    for (color, terminals) in puzzle.terminal_pairs() {
        let mut nodes = vec![terminals.0];
        if !extend_path(puzzle, color, &mut nodes, terminals.1, &mut used_edges) {
            return None;
        }
        paths.push(Path { color, nodes });
    }

    // every node must be visited as often as its desired edge count implies:
    // one visit consumes two edges, except a terminal's single edge
    let counts = paths.iter().flat_map(|path| &path.nodes).copied().counts();
    puzzle.nodes()
        .all(|n| counts.get(&n).copied().unwrap_or(0) == (n.desired_edges + 1) / 2)
        .then_some(paths)
}

fn extend_path(
    puzzle: &Puzzle,
    color: Color,
    path: &mut Vec<Node>,
    dest: Node,
    used_edges: &mut HashSet<UnorderedPair<Node>>,
) -> bool {
    let cur = *path.last().unwrap();
    if cur == dest
        && puzzle.nodes()
            .filter(|n| n.kind.color() == Some(color))
            .all(|n| path.iter().filter(|&&m| m == n).count() == 1)
    {
        return true;
    }

    let mut steps = puzzle.neighbors(cur)
        .filter(|n| puzzle.possibilities(cur, *n).contains(Fill::Color(color)))
        .filter(|n| !used_edges.contains(&UnorderedPair::from((cur, *n))))
        // don't return to a terminal we've already visited
        .filter(|n| !(n.kind.is_terminal() && path.contains(n)))
        .collect_vec();
    // arrive at the far terminal only once nothing else remains
    steps.sort_by_key(|n| *n == dest);

    for next in steps {
        let edge = UnorderedPair::from((cur, next));
        path.push(next);
        used_edges.insert(edge);
        if extend_path(puzzle, color, path, dest, used_edges) {
            return true;
        }
        path.pop();
        used_edges.remove(&edge);
    }
    false
}
