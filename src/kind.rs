use std::fmt::{Debug, Formatter};

use strum::VariantArray;

/// A line color. Every puzzle uses some subset of these, one terminal pair each.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
#[allow(missing_docs)]
pub enum Color {
    Crimson,
    Teal,
    Gold,
    Violet,
}

impl Color {
    /// The lowercase display char for this color; terminals show it uppercased.
    pub fn display(self) -> char {
        match self {
            Self::Crimson => 'c',
            Self::Teal => 't',
            Self::Gold => 'g',
            Self::Violet => 'v',
        }
    }
}

/// What sort of node occupies a grid location.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// An ordinary colored node; its color's line must pass through it.
    Color(Color),
    /// One endpoint of a color's line.
    Terminal(Color),
    /// A neutral node any line may pass through.
    Octagon,
}

impl Kind {
    /// The color of this node, if it has one.
    pub fn color(self) -> Option<Color> {
        match self {
            Self::Color(c) | Self::Terminal(c) => Some(c),
            Self::Octagon => None,
        }
    }

    /// Whether this node is a line endpoint.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// What an edge carries in a solution: a color's line, or nothing.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Fill {
    /// The edge carries this color's line.
    Color(Color),
    /// No line passes over the edge.
    Empty,
}

const EMPTY_BIT: u8 = 1 << Color::VARIANTS.len();

/// The set of fills an edge could still be assigned, as a small bitset.
///
/// Copying a whole puzzle state is then one `Vec<u8>` clone, which keeps
/// backtracking cheap.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct FillSet(u8);

impl FillSet {
    fn bit(fill: Fill) -> u8 {
        match fill {
            Fill::Color(c) => 1 << (c as u8),
            Fill::Empty => EMPTY_BIT,
        }
    }

    /// The set of every fill: all colors plus [`Fill::Empty`].
    pub fn full() -> Self {
        Self(EMPTY_BIT | (EMPTY_BIT - 1))
    }

    /// The singleton set holding only `fill`.
    pub fn only(fill: Fill) -> Self {
        Self(Self::bit(fill))
    }

    /// This set plus `fill`.
    pub fn with(self, fill: Fill) -> Self {
        Self(self.0 | Self::bit(fill))
    }

    /// This set minus `fill`.
    pub fn without(self, fill: Fill) -> Self {
        Self(self.0 & !Self::bit(fill))
    }

    /// The fills present in both sets.
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Whether `fill` is in this set.
    pub fn contains(self, fill: Fill) -> bool {
        self.0 & Self::bit(fill) != 0
    }

    /// How many fills remain in this set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no fills remain. An edge with an empty set witnesses a
    /// contradiction.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every fill in this set is also in `other`.
    pub fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// The sole remaining fill, if this set is down to one element.
    pub fn determined(self) -> Option<Fill> {
        match self.len() {
            1 => self.iter().next(),
            _ => None,
        }
    }

    /// Iterate the fills in this set: colors in declaration order, then
    /// [`Fill::Empty`]. Branch order during search follows this order.
    pub fn iter(self) -> impl Iterator<Item = Fill> {
        Color::VARIANTS.iter()
            .filter(move |c| self.contains(Fill::Color(**c)))
            .map(|c| Fill::Color(*c))
            .chain((self.0 & EMPTY_BIT != 0).then_some(Fill::Empty))
    }
}

impl Debug for FillSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
