#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use itertools::Itertools;
    use unordered_pair::UnorderedPair;

    use crate::builder::PuzzleBuilder;
    use crate::solver::most_constrained;
    use crate::{rules, Color, Dimension, Fill, Location, Node, Path, Puzzle};

    fn dims(width: usize, height: usize) -> (Dimension, Dimension) {
        (NonZero::new(width).unwrap(), NonZero::new(height).unwrap())
    }

    fn locations(path: &Path) -> Vec<Location> {
        path.nodes.iter().map(|n| n.location).collect_vec()
    }

    /// Checks the invariants any returned solution must satisfy: paths span
    /// their color's terminal pair over adjacent nodes, visit every node of
    /// their color exactly once, never share an edge, and touch every node
    /// `(desired_edges + 1) / 2` times overall.
    fn assert_sound(puzzle: &Puzzle, paths: &[Path]) {
        let mut used_edges = HashSet::new();
        for (path, (color, terminals)) in paths.iter().zip(puzzle.terminal_pairs()) {
            assert_eq!(path.color, color);
            assert_eq!(path.nodes.first(), Some(&terminals.0));
            assert_eq!(path.nodes.last(), Some(&terminals.1));
            for (a, b) in path.nodes.iter().tuple_windows() {
                assert!(puzzle.neighbors(*a).any(|m| m == *b));
                assert!(used_edges.insert(UnorderedPair::from((*a, *b))));
            }
            for node in puzzle.nodes().filter(|n| n.kind.color() == Some(color)) {
                assert_eq!(path.nodes.iter().filter(|&&m| m == node).count(), 1);
            }
        }
        let counts = paths.iter().flat_map(|p| &p.nodes).copied().counts();
        for node in puzzle.nodes() {
            assert_eq!(
                counts.get(&node).copied().unwrap_or(0),
                (node.desired_edges + 1) / 2,
                "{:?}",
                node,
            );
        }
    }

    fn single_edge_puzzle() -> Puzzle {
        let mut builder = PuzzleBuilder::with_dims(dims(2, 1));
        builder.add_terminals(Color::Crimson, (Location(0, 0), Location(1, 0)));
        builder.build().unwrap()
    }

    // the direct diagonal would satisfy both terminals but starve the octagon
    fn octagon_detour_puzzle() -> Puzzle {
        let mut builder = PuzzleBuilder::with_dims(dims(2, 2));
        builder
            .add_terminals(Color::Crimson, (Location(0, 0), Location(1, 1)))
            .add_octagon(Location(1, 0), 1);
        builder.build().unwrap()
    }

    fn two_color_square() -> Puzzle {
        let mut builder = PuzzleBuilder::with_dims(dims(2, 2));
        builder
            .add_terminals(Color::Crimson, (Location(0, 0), Location(1, 1)))
            .add_terminals(Color::Teal, (Location(1, 0), Location(0, 1)));
        builder.build().unwrap()
    }

    fn double_octagon_puzzle() -> Puzzle {
        let mut builder = PuzzleBuilder::with_dims(dims(3, 2));
        builder
            .add_terminals(Color::Crimson, (Location(0, 0), Location(2, 0)))
            .add_terminals(Color::Teal, (Location(0, 1), Location(2, 1)))
            .add_octagon(Location(1, 0), 1)
            .add_octagon(Location(1, 1), 1);
        builder.build().unwrap()
    }

    #[test]
    fn solves_single_direct_edge() {
        let puzzle = single_edge_puzzle();
        let paths = puzzle.clone().solve().unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].color, Color::Crimson);
        assert_eq!(locations(&paths[0]), vec![Location(0, 0), Location(1, 0)]);
        assert_sound(&puzzle, &paths);
    }

    #[test]
    fn routes_through_starving_octagon() {
        let puzzle = octagon_detour_puzzle();
        let paths = puzzle.clone().solve().unwrap();

        assert_eq!(
            locations(&paths[0]),
            vec![Location(0, 0), Location(1, 0), Location(1, 1)],
        );
        assert_sound(&puzzle, &paths);
    }

    #[test]
    fn differently_colored_lines_may_cross() {
        let puzzle = two_color_square();
        let paths = puzzle.clone().solve().unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(locations(&paths[0]), vec![Location(0, 0), Location(1, 1)]);
        assert_eq!(locations(&paths[1]), vec![Location(1, 0), Location(0, 1)]);
        assert_sound(&puzzle, &paths);
    }

    #[test]
    fn solves_two_lines_over_octagons() {
        let puzzle = double_octagon_puzzle();
        let paths = puzzle.clone().solve().unwrap();

        assert_eq!(paths.len(), 2);
        assert_sound(&puzzle, &paths);
    }

    #[test]
    fn disconnected_terminals_have_no_solution() {
        let mut builder = PuzzleBuilder::with_dims(dims(3, 1));
        builder.add_terminals(Color::Crimson, (Location(0, 0), Location(2, 0)));
        let puzzle = builder.build().unwrap();
        assert_eq!(puzzle.solve(), None);
    }

    #[test]
    fn overcommitted_octagon_has_no_solution() {
        let mut builder = PuzzleBuilder::with_dims(dims(3, 1));
        builder
            .add_terminals(Color::Crimson, (Location(0, 0), Location(2, 0)))
            // two passes need four edges; only two exist
            .add_octagon(Location(1, 0), 2);
        let puzzle = builder.build().unwrap();
        assert_eq!(puzzle.solve(), None);
    }

    #[test]
    fn fixpoint_pass_is_idempotent() {
        let puzzle = double_octagon_puzzle();
        let narrowed = rules::one_shot_pass(&puzzle).unwrap();
        let once = rules::fixpoint_pass(&narrowed).unwrap();
        let twice = rules::fixpoint_pass(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn propagation_narrows_monotonically() {
        let puzzle = double_octagon_puzzle();
        let narrowed = rules::one_shot_pass(&puzzle).unwrap();
        let propagated = rules::fixpoint_pass(&narrowed).unwrap();

        for pair in puzzle.edges() {
            let before = puzzle.possibilities(pair.0, pair.1);
            let mid = narrowed.possibilities(pair.0, pair.1);
            let after = propagated.possibilities(pair.0, pair.1);
            assert!(mid.is_subset_of(before));
            assert!(after.is_subset_of(mid));
            assert!(!after.is_empty());
        }
    }

    #[test]
    fn branches_on_most_constrained_edge() {
        let puzzle = two_color_square();
        let node_at =
            |location| puzzle.nodes().find(|n: &Node| n.location == location).unwrap();
        let nw = node_at(Location(0, 0));
        let ne = node_at(Location(1, 0));

        // shrink one edge to two possibilities; the rest still have three
        let narrowed = puzzle.removed(nw, ne, Fill::Color(Color::Teal)).unwrap();
        let chosen = most_constrained(&narrowed).unwrap();
        assert_eq!(chosen, UnorderedPair::from((nw, ne)));
    }

    #[test]
    fn search_avoids_assignment_emptying_a_neighbor() {
        // fixing the diagonal to crimson would leave the octagon starved, so
        // the search must settle on the detour assignment instead
        let puzzle = octagon_detour_puzzle();
        let node_at =
            |location| puzzle.nodes().find(|n: &Node| n.location == location).unwrap();
        let terminal = node_at(Location(0, 0));
        let octagon = node_at(Location(1, 0));

        let paths = puzzle.clone().solve().unwrap();
        let used = paths.iter()
            .flat_map(|p| p.nodes.iter().tuple_windows().map(|(a, b)| UnorderedPair::from((*a, *b))))
            .collect::<HashSet<_>>();
        assert!(used.contains(&UnorderedPair::from((terminal, octagon))));
        assert!(!used.contains(&UnorderedPair::from((terminal, node_at(Location(1, 1))))));
    }
}
