//! Inference rules narrowing edge possibility sets, and their composition
//! into the solver's propagation passes.

use itertools::Itertools;
use log::debug;
use strum::VariantArray;

use crate::kind::{Color, Fill, FillSet, Kind};
use crate::puzzle::{Contradiction, Puzzle};

/// A pure inference step: narrow some possibility sets of `puzzle` based on a
/// consistency argument, or report [`Contradiction`] if the state is
/// infeasible. Rules never widen a set and never mutate their input.
pub trait InferenceRule {
    /// A short name for logging.
    fn name(&self) -> &'static str;
    /// Apply this rule to `puzzle`, returning the narrowed state.
    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction>;
}

/// An edge joining two colored nodes can carry only their shared color, or
/// nothing at all if their colors differ.
pub struct ColorColor;

impl InferenceRule for ColorColor {
    fn name(&self) -> &'static str {
        "color-color"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for pair in puzzle.edges() {
            let (Some(a), Some(b)) = (pair.0.kind.color(), pair.1.kind.color()) else {
                continue;
            };
            let mut allowed = FillSet::only(Fill::Empty);
            if a == b {
                allowed = allowed.with(Fill::Color(a));
            }
            current = current.narrowed(pair.0, pair.1, allowed)?;
        }
        Ok(current)
    }
}

/// An edge joining a colored node and an octagon can carry only that node's
/// color, or nothing.
pub struct ColorOctagon;

impl InferenceRule for ColorOctagon {
    fn name(&self) -> &'static str {
        "color-octagon"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for pair in puzzle.edges() {
            let color = match (pair.0.kind, pair.1.kind) {
                (Kind::Octagon, other) | (other, Kind::Octagon) => match other.color() {
                    Some(color) => color,
                    // octagon-octagon edges stay unconstrained
                    None => continue,
                },
                _ => continue,
            };
            let allowed = FillSet::only(Fill::Empty).with(Fill::Color(color));
            current = current.narrowed(pair.0, pair.1, allowed)?;
        }
        Ok(current)
    }
}

/// An edge directly joining a color's two terminals would complete that
/// color's line by itself, which is impossible while other nodes of the color
/// still need visiting.
pub struct TerminalTerminal;

impl InferenceRule for TerminalTerminal {
    fn name(&self) -> &'static str {
        "terminal-terminal"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for pair in puzzle.edges() {
            let (Kind::Terminal(a), Kind::Terminal(b)) = (pair.0.kind, pair.1.kind) else {
                continue;
            };
            if a != b || pair.0.desired_edges != 1 || pair.1.desired_edges != 1 {
                continue;
            }
            if puzzle.nodes().any(|n| n.kind.color() == Some(a) && n != pair.0 && n != pair.1) {
                current = current.removed(pair.0, pair.1, Fill::Color(a))?;
            }
        }
        Ok(current)
    }
}

/// Enforce each node's desired edge count against its incident edges: when
/// the bound becomes tight, undecided edges are forced present or absent, and
/// an unreachable count is a contradiction.
pub struct DesiredEdges;

impl InferenceRule for DesiredEdges {
    fn name(&self) -> &'static str {
        "desired-edges"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for node in puzzle.nodes() {
            let neighbors = current.neighbors(node).collect_vec();
            let present = neighbors.iter()
                .filter(|n| !current.possibilities(node, **n).contains(Fill::Empty))
                .count();
            let undecided = neighbors.iter()
                .filter(|n| {
                    let fills = current.possibilities(node, **n);
                    fills.contains(Fill::Empty) && fills.len() > 1
                })
                .copied()
                .collect_vec();

            if present > node.desired_edges || present + undecided.len() < node.desired_edges {
                return Err(Contradiction);
            }
            if present == node.desired_edges {
                for other in undecided {
                    current = current.narrowed(node, other, FillSet::only(Fill::Empty))?;
                }
            } else if present + undecided.len() == node.desired_edges {
                for other in undecided {
                    current = current.removed(node, other, Fill::Empty)?;
                }
            }
        }
        Ok(current)
    }
}

/// A line may not cross itself: once one edge of a crossing pair is
/// determined to carry a color, the edge it crosses cannot carry the same
/// color. Differently colored lines cross freely.
pub struct CrossingEdges;

impl InferenceRule for CrossingEdges {
    fn name(&self) -> &'static str {
        "crossing-edges"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for (main, anti) in puzzle.crossings() {
            for (edge, crossed) in [(main, anti), (anti, main)] {
                if let Some(Fill::Color(color)) = current.possibilities(edge.0, edge.1).determined() {
                    current = current.removed(crossed.0, crossed.1, Fill::Color(color))?;
                }
            }
        }
        Ok(current)
    }
}

/// A color's edges at an octagon come in pairs, since a line passes through
/// and never ends there, and a line passes a given octagon at most once. A
/// lone candidate edge for a color therefore cannot carry it, and a settled
/// pair excludes the color from the octagon's remaining edges.
pub struct OctagonColorPairs;

impl InferenceRule for OctagonColorPairs {
    fn name(&self) -> &'static str {
        "octagon-color-pairs"
    }

    fn apply(&self, puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
        let mut current = puzzle.clone();
        for node in puzzle.nodes().filter(|n| n.kind == Kind::Octagon) {
            for color in Color::VARIANTS.iter().copied() {
                let fill = Fill::Color(color);
                let carriers = current.neighbors(node)
                    .filter(|n| current.possibilities(node, *n).contains(fill))
                    .collect_vec();
                let settled = carriers.iter()
                    .filter(|n| current.possibilities(node, **n).determined() == Some(fill))
                    .copied()
                    .collect_vec();

                if settled.len() > 2 {
                    return Err(Contradiction);
                }
                if settled.len() == 2 {
                    for other in carriers.iter().filter(|n| !settled.contains(*n)) {
                        current = current.removed(node, *other, fill)?;
                    }
                } else if carriers.len() == 1 {
                    current = current.removed(node, carriers[0], fill)?;
                }
            }
        }
        Ok(current)
    }
}

fn one_shot_rules() -> Vec<Box<dyn InferenceRule>> {
    vec![
        Box::new(ColorColor),
        Box::new(ColorOctagon),
        Box::new(TerminalTerminal),
    ]
}

fn fixpoint_rules() -> Vec<Box<dyn InferenceRule>> {
    vec![
        Box::new(DesiredEdges),
        Box::new(CrossingEdges),
        Box::new(OctagonColorPairs),
    ]
}

/// Apply each one-shot rule once, in order. These rules conclude from the
/// static node layout alone, so a single application each is enough; order
/// only matters in that each rule sees the narrowings of the ones before it.
pub(crate) fn one_shot_pass(puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
    one_shot_rules().iter().try_fold(puzzle.clone(), |p, rule| rule.apply(&p))
}

fn rule_fixpoint(rule: &dyn InferenceRule, mut current: Puzzle) -> Result<Puzzle, Contradiction> {
    loop {
        let next = rule.apply(&current)?;
        if next == current {
            return Ok(next);
        }
        current = next;
    }
}

/// Run the iterated rules until a full sweep changes nothing. Each rule runs
/// to its own fixpoint before the next, and the whole sweep repeats because a
/// later rule's narrowing can re-enable an earlier rule.
pub(crate) fn fixpoint_pass(puzzle: &Puzzle) -> Result<Puzzle, Contradiction> {
    let rules = fixpoint_rules();
    let mut current = puzzle.clone();
    let mut sweeps = 0usize;
    loop {
        sweeps += 1;
        let mut next = current.clone();
        for rule in &rules {
            next = rule_fixpoint(rule.as_ref(), next)?;
        }
        if next == current {
            debug!("propagation stable after {} sweeps", sweeps);
            return Ok(next);
        }
        current = next;
    }
}
