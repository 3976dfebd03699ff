use core::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Observation snapshot handed to the analysis pipeline: grid shape, the
/// adjacency rule in force, an optional total-mine budget, and one mark per
/// cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    size: Coord2,
    variant: Variant,
    mine_budget: Option<CellCount>,
    marks: Array2<CellMark>,
}

impl Board {
    pub fn new(
        size: Coord2,
        variant: Variant,
        mine_budget: Option<CellCount>,
        marks: Array2<CellMark>,
    ) -> Result<Self> {
        let board = Self {
            size,
            variant,
            mine_budget,
            marks,
        };
        board.validate()?;
        Ok(board)
    }

    /// Fresh all-unknown board.
    pub fn empty(size: Coord2, variant: Variant, mine_budget: Option<CellCount>) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(AnalysisError::InvalidBoardShape);
        }
        Ok(Self {
            size,
            variant,
            mine_budget,
            marks: Array2::from_elem(size.to_nd_index(), CellMark::Unknown),
        })
    }

    /// Builds a board from a row-major grid of observation codes.
    pub fn from_codes(
        size: Coord2,
        variant: Variant,
        mine_budget: Option<CellCount>,
        codes: &[i8],
    ) -> Result<Self> {
        if codes.len() != mult(size.0, size.1) as usize {
            return Err(AnalysisError::InvalidBoardShape);
        }
        let marks = codes
            .iter()
            .map(|&code| CellMark::from_code(code))
            .collect::<Result<Vec<_>>>()?;
        let marks = Array2::from_shape_vec(size.to_nd_index(), marks)
            .map_err(|_| AnalysisError::InvalidBoardShape)?;
        Self::new(size, variant, mine_budget, marks)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(AnalysisError::InvalidBoardShape);
        }
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.marks.dim() != expected {
            return Err(AnalysisError::InvalidBoardShape);
        }
        Ok(())
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn rows(&self) -> Coord {
        self.size.0
    }

    pub fn cols(&self) -> Coord {
        self.size.1
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
    }

    pub fn mine_budget(&self) -> Option<CellCount> {
        self.mine_budget
    }

    pub fn set_mine_budget(&mut self, mine_budget: Option<CellCount>) {
        self.mine_budget = mine_budget;
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.size.0 && coords.1 < self.size.1 {
            Ok(coords)
        } else {
            Err(AnalysisError::InvalidCoords)
        }
    }

    pub fn mark_at(&self, coords: Coord2) -> Result<CellMark> {
        let coords = self.validate_coords(coords)?;
        Ok(self.marks[coords.to_nd_index()])
    }

    /// Replaces the mark at `coords`, returning the previous one.
    pub fn set_mark(&mut self, coords: Coord2, mark: CellMark) -> Result<CellMark> {
        let coords = self.validate_coords(coords)?;
        let slot = &mut self.marks[coords.to_nd_index()];
        let previous = *slot;
        *slot = mark;
        Ok(previous)
    }

    pub fn marks(&self) -> &Array2<CellMark> {
        &self.marks
    }

    /// Row-major walk over every cell.
    pub fn iter_marks(&self) -> impl Iterator<Item = (Coord2, CellMark)> + '_ {
        self.marks
            .indexed_iter()
            .map(|((row, col), &mark)| ((row as Coord, col as Coord), mark))
    }

    /// Number of cells a classification run could still decide.
    pub fn unresolved_count(&self) -> CellCount {
        self.marks
            .iter()
            .filter(|mark| mark.is_unresolved())
            .count() as CellCount
    }
}

impl Index<Coord2> for Board {
    type Output = CellMark;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.marks[coords.to_nd_index()]
    }
}
