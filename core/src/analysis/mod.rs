pub use constraints::*;
pub use feasibility::*;
pub use infer::*;

mod constraints;
mod encode;
mod feasibility;
mod infer;

use ndarray::Array2;
use smallvec::SmallVec;

use crate::*;

/// Neighbor list for one cell; no variant defines more than 12 offsets.
pub type NeighborList = SmallVec<[Coord2; 12]>;

/// Precomputed neighbor lists and parity classes for one (shape, variant)
/// pair. Owned by whoever constructs boards and reused across runs until the
/// shape or variant changes.
#[derive(Clone, Debug)]
pub struct NeighborCache {
    size: Coord2,
    variant: Variant,
    neighbors: Array2<NeighborList>,
    parity: Array2<Parity>,
}

impl NeighborCache {
    pub fn new(size: Coord2, variant: Variant) -> Self {
        let neighbors = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            variant
                .neighbors((row as Coord, col as Coord), size)
                .collect()
        });
        let parity = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            Parity::of((row as Coord, col as Coord))
        });
        Self {
            size,
            variant,
            neighbors,
            parity,
        }
    }

    /// True while the cache still describes `board`'s shape and variant.
    pub fn matches(&self, board: &Board) -> bool {
        self.size == board.size() && self.variant == board.variant()
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn neighbors_of(&self, pos: Coord2) -> &[Coord2] {
        &self.neighbors[pos.to_nd_index()]
    }

    pub fn parity_of(&self, pos: Coord2) -> Parity {
        self.parity[pos.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_agrees_with_direct_neighbor_enumeration() {
        let cache = NeighborCache::new((4, 3), Variant::Manhattan);
        for row in 0..4 {
            for col in 0..3 {
                let direct: Vec<_> = Variant::Manhattan
                    .neighbors((row, col), (4, 3))
                    .collect();
                assert_eq!(cache.neighbors_of((row, col)), direct.as_slice());
            }
        }
    }

    #[test]
    fn cache_matches_only_same_shape_and_variant() {
        let cache = NeighborCache::new((3, 3), Variant::Standard);
        let same = Board::empty((3, 3), Variant::Standard, None).unwrap();
        let other_variant = Board::empty((3, 3), Variant::Cross, None).unwrap();
        let other_shape = Board::empty((3, 4), Variant::Standard, None).unwrap();

        assert!(cache.matches(&same));
        assert!(!cache.matches(&other_variant));
        assert!(!cache.matches(&other_shape));
    }

    #[test]
    fn cache_records_parity_classes() {
        let cache = NeighborCache::new((2, 2), Variant::ParityWeighted);
        assert_eq!(cache.parity_of((0, 0)), Parity::Even);
        assert_eq!(cache.parity_of((0, 1)), Parity::Odd);
    }
}
