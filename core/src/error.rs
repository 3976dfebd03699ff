use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("constraints have no satisfying assignment")]
    InfeasibleConstraints,
    #[error("board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("unrecognized observation code {code}")]
    InvalidMark { code: i8 },
    #[error("unrecognized variant name `{0}`")]
    UnknownVariant(String),
    #[error("cell {cell:?} rejected both forced outcomes after a feasible base check")]
    ProbeConflict { cell: Coord2 },
    #[error("solver backend failure: {0}")]
    Backend(String),
    #[error("classification cancelled")]
    Cancelled,
}

pub type Result<T> = core::result::Result<T, AnalysisError>;
