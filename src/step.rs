use strum::VariantArray;

use crate::location::Location;

/// A single step between grid locations. Lines connect king-move neighbors,
/// so diagonals are included.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub(crate) enum Step {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Step {
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
            Self::UpLeft => location.offset_by((-1, -1)),
            Self::UpRight => location.offset_by((1, -1)),
            Self::DownLeft => location.offset_by((-1, 1)),
            Self::DownRight => location.offset_by((1, 1)),
        }
    }

    // directions which reach locations not yet visited by a top-left to
    // bottom-right scan; enumerating these once per location yields every
    // edge exactly once
    pub(crate) fn forward_edge_directions() -> &'static [Self] {
        &[Self::Right, Self::DownLeft, Self::Down, Self::DownRight]
    }
}
