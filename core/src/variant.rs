use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Coord2};

/// Relative `(row, col)` displacement reaching a neighbor.
pub type Offset = (i8, i8);

const STANDARD_OFFSETS: [Offset; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const KNIGHT_OFFSETS: [Offset; 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const MANHATTAN_OFFSETS: [Offset; 12] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
];

const CROSS_OFFSETS: [Offset; 8] = [
    (-2, 0),
    (-1, 0),
    (1, 0),
    (2, 0),
    (0, -2),
    (0, -1),
    (0, 1),
    (0, 2),
];

/// Adjacency and clue-encoding rule set applied to a whole board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Standard,
    KnightMove,
    Manhattan,
    ParityWeighted,
    Cross,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Standard,
        Variant::KnightMove,
        Variant::Manhattan,
        Variant::ParityWeighted,
        Variant::Cross,
    ];

    pub const fn offsets(self) -> &'static [Offset] {
        match self {
            Self::Standard | Self::ParityWeighted => &STANDARD_OFFSETS,
            Self::KnightMove => &KNIGHT_OFFSETS,
            Self::Manhattan => &MANHATTAN_OFFSETS,
            Self::Cross => &CROSS_OFFSETS,
        }
    }

    /// In-bounds neighbors of `pos` on a `size` grid under this rule set.
    pub fn neighbors(self, pos: Coord2, size: Coord2) -> NeighborIter {
        NeighborIter {
            offsets: self.offsets(),
            center: pos,
            bounds: size,
            index: 0,
        }
    }

    /// True for the variant whose clue counts odd-parity neighbors against
    /// even-parity ones instead of summing them.
    pub const fn uses_parity_weights(self) -> bool {
        matches!(self, Self::ParityWeighted)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::KnightMove => "knight",
            Self::Manhattan => "manhattan",
            Self::ParityWeighted => "parity",
            Self::Cross => "cross",
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = AnalysisError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "knight" | "knightmove" => Ok(Self::KnightMove),
            "manhattan" => Ok(Self::Manhattan),
            "parity" | "parityweighted" | "oddeven" => Ok(Self::ParityWeighted),
            "cross" => Ok(Self::Cross),
            _ => Err(AnalysisError::UnknownVariant(name.to_owned())),
        }
    }
}

/// Checkerboard class of a position, `(row + col) mod 2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    Odd,
    Even,
}

impl Parity {
    pub const fn of((row, col): Coord2) -> Self {
        if (row as u16 + col as u16) % 2 == 1 {
            Self::Odd
        } else {
            Self::Even
        }
    }

    /// Contribution of one mine of this class to the parity-weighted sum.
    pub const fn weight(self) -> i16 {
        match self {
            Self::Odd => 1,
            Self::Even => -1,
        }
    }
}

/// Applies `offset` to `coords`, returning a value only when it remains in bounds.
fn apply_offset(coords: Coord2, offset: Offset, bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = offset;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    offsets: &'static [Offset],
    center: Coord2,
    bounds: Coord2,
    index: usize,
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let offset = *self.offsets.get(self.index)?;
            self.index += 1;

            if let Some(next_item) = apply_offset(self.center, offset, self.bounds) {
                return Some(next_item);
            }
        }
    }
}
