use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

/// Snapshot exchange code for a cell whose content was never observed.
pub const CODE_UNKNOWN: i8 = -1;
/// Snapshot exchange code for a cell marked as a mine by the player.
pub const CODE_FLAGGED: i8 = -2;
/// Snapshot exchange code for a cell known to carry a clue of unread value.
pub const CODE_CLUE_UNREAD: i8 = -3;

/// Largest clue value a single cell can carry.
pub const MAX_CLUE: u8 = 8;

/// Player-entered observation for a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMark {
    Unknown,
    Flagged,
    Clue(u8),
    ClueUnread,
}

impl CellMark {
    pub fn from_code(code: i8) -> Result<Self> {
        match code {
            CODE_UNKNOWN => Ok(Self::Unknown),
            CODE_FLAGGED => Ok(Self::Flagged),
            CODE_CLUE_UNREAD => Ok(Self::ClueUnread),
            0..=8 => Ok(Self::Clue(code as u8)),
            _ => Err(AnalysisError::InvalidMark { code }),
        }
    }

    pub const fn code(self) -> i8 {
        match self {
            Self::Unknown => CODE_UNKNOWN,
            Self::Flagged => CODE_FLAGGED,
            Self::ClueUnread => CODE_CLUE_UNREAD,
            Self::Clue(count) => count as i8,
        }
    }

    /// True for the marks a classification run may still decide.
    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::Unknown | Self::ClueUnread)
    }

    /// True when the mark pins the mine indicator true.
    pub const fn forces_mine(self) -> bool {
        matches!(self, Self::Flagged)
    }

    /// True for cells that carry a clue, read or not.
    pub const fn is_clue(self) -> bool {
        matches!(self, Self::Clue(_) | Self::ClueUnread)
    }
}

impl Default for CellMark {
    fn default() -> Self {
        Self::Unknown
    }
}
