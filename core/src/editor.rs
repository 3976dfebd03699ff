use serde::{Deserialize, Serialize};

use crate::*;

/// Smallest square grid the editing surface allows.
pub const MIN_EDIT_SIZE: Coord = 3;
/// Largest square grid the editing surface allows.
pub const MAX_EDIT_SIZE: Coord = 20;

/// Interactive board store: the working snapshot, an undo history, and the
/// transient classification highlights. The highlights are cleared by any
/// cell edit, since a stale classification no longer describes the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardEditor {
    board: Board,
    history: Vec<(Coord2, CellMark)>,
    highlights: Classification,
}

impl BoardEditor {
    pub fn new(size: Coord2, variant: Variant, mine_budget: Option<CellCount>) -> Result<Self> {
        Ok(Self {
            board: Board::empty(size, variant, mine_budget)?,
            history: Vec::new(),
            highlights: Classification::default(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn highlights(&self) -> &Classification {
        &self.highlights
    }

    /// Steps a cell through the entry order: unknown and flagged cells become
    /// an unread clue, an unread clue opens at 0, and clues count up before
    /// wrapping back to unread after 8.
    pub fn cycle_cell(&mut self, pos: Coord2) -> Result<()> {
        let next = match self.board.mark_at(pos)? {
            CellMark::Unknown | CellMark::Flagged => CellMark::ClueUnread,
            CellMark::ClueUnread => CellMark::Clue(0),
            CellMark::Clue(count) if count >= MAX_CLUE => CellMark::ClueUnread,
            CellMark::Clue(count) => CellMark::Clue(count + 1),
        };
        self.apply(pos, next)
    }

    pub fn toggle_flag(&mut self, pos: Coord2) -> Result<()> {
        let next = if self.board.mark_at(pos)? == CellMark::Flagged {
            CellMark::Unknown
        } else {
            CellMark::Flagged
        };
        self.apply(pos, next)
    }

    fn apply(&mut self, pos: Coord2, mark: CellMark) -> Result<()> {
        let previous = self.board.set_mark(pos, mark)?;
        self.history.push((pos, previous));
        self.clear_highlights();
        Ok(())
    }

    /// Restores the most recent cell edit; false when the history is empty.
    pub fn undo(&mut self) -> bool {
        let Some((pos, previous)) = self.history.pop() else {
            return false;
        };
        self.board
            .set_mark(pos, previous)
            .expect("history positions stay in bounds");
        self.clear_highlights();
        true
    }

    /// Grows or shrinks the square working grid, resetting board contents.
    /// Returns false when the clamped size is unchanged.
    pub fn resize(&mut self, delta: i16) -> bool {
        let current = self.board.rows();
        let next = (i16::from(current) + delta)
            .clamp(i16::from(MIN_EDIT_SIZE), i16::from(MAX_EDIT_SIZE)) as Coord;
        if (next, next) == self.board.size() {
            return false;
        }

        let budget = self
            .board
            .mine_budget()
            .map(|budget| budget.min(mult(next, next)));
        self.board = Board::empty((next, next), self.board.variant(), budget)
            .expect("clamped size stays valid");
        self.history.clear();
        self.clear_highlights();
        true
    }

    /// Adjusts the mine budget, clamped to the cell count. Returns false when
    /// the clamped value is unchanged.
    pub fn adjust_budget(&mut self, delta: i32) -> bool {
        let max = i32::from(self.board.total_cells());
        let current = self.board.mine_budget().map_or(0, i32::from);
        let next = (current + delta).clamp(0, max) as CellCount;
        if Some(next) == self.board.mine_budget() {
            return false;
        }
        self.board.set_mine_budget(Some(next));
        true
    }

    /// Steps to the next adjacency rule. Prior deductions no longer apply, so
    /// the highlights are dropped; cell marks are kept.
    pub fn cycle_variant(&mut self) -> Variant {
        let all = Variant::ALL;
        let index = all
            .iter()
            .position(|&variant| variant == self.board.variant())
            .unwrap_or(0);
        let next = all[(index + 1) % all.len()];
        self.board.set_variant(next);
        self.clear_highlights();
        next
    }

    /// Clears all marks, the history, and the highlights.
    pub fn reset(&mut self) {
        self.board = Board::empty(
            self.board.size(),
            self.board.variant(),
            self.board.mine_budget(),
        )
        .expect("existing size stays valid");
        self.history.clear();
        self.clear_highlights();
    }

    pub fn apply_classification(&mut self, classification: Classification) {
        self.highlights = classification;
    }

    pub fn clear_highlights(&mut self) {
        self.highlights = Classification::default();
    }

    pub fn is_safe_highlight(&self, pos: Coord2) -> bool {
        self.highlights.proven_safe.contains(&pos)
    }

    pub fn is_mine_highlight(&self, pos: Coord2) -> bool {
        self.highlights.proven_mine.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> BoardEditor {
        BoardEditor::new((4, 4), Variant::Standard, Some(4)).unwrap()
    }

    #[test]
    fn cycle_walks_unknown_through_clues_and_back() {
        let mut editor = editor();
        let pos = (1, 1);

        editor.cycle_cell(pos).unwrap();
        assert_eq!(editor.board().mark_at(pos), Ok(CellMark::ClueUnread));

        editor.cycle_cell(pos).unwrap();
        assert_eq!(editor.board().mark_at(pos), Ok(CellMark::Clue(0)));

        for _ in 0..8 {
            editor.cycle_cell(pos).unwrap();
        }
        assert_eq!(editor.board().mark_at(pos), Ok(CellMark::Clue(8)));

        editor.cycle_cell(pos).unwrap();
        assert_eq!(editor.board().mark_at(pos), Ok(CellMark::ClueUnread));
    }

    #[test]
    fn flagged_cells_cycle_to_unread_clue() {
        let mut editor = editor();
        editor.toggle_flag((0, 0)).unwrap();
        editor.cycle_cell((0, 0)).unwrap();
        assert_eq!(editor.board().mark_at((0, 0)), Ok(CellMark::ClueUnread));
    }

    #[test]
    fn toggle_flag_flips_between_flag_and_unknown() {
        let mut editor = editor();
        editor.toggle_flag((2, 2)).unwrap();
        assert_eq!(editor.board().mark_at((2, 2)), Ok(CellMark::Flagged));
        editor.toggle_flag((2, 2)).unwrap();
        assert_eq!(editor.board().mark_at((2, 2)), Ok(CellMark::Unknown));
    }

    #[test]
    fn undo_restores_previous_marks_in_lifo_order() {
        let mut editor = editor();
        editor.cycle_cell((0, 0)).unwrap();
        editor.cycle_cell((0, 0)).unwrap();
        editor.toggle_flag((1, 0)).unwrap();

        assert!(editor.undo());
        assert_eq!(editor.board().mark_at((1, 0)), Ok(CellMark::Unknown));

        assert!(editor.undo());
        assert_eq!(editor.board().mark_at((0, 0)), Ok(CellMark::ClueUnread));

        assert!(editor.undo());
        assert_eq!(editor.board().mark_at((0, 0)), Ok(CellMark::Unknown));

        assert!(!editor.undo());
    }

    #[test]
    fn edits_clear_stale_highlights() {
        let mut editor = editor();
        let mut classification = Classification::default();
        classification.proven_safe.insert((0, 0));
        editor.apply_classification(classification);
        assert!(editor.is_safe_highlight((0, 0)));

        editor.cycle_cell((3, 3)).unwrap();
        assert!(!editor.is_safe_highlight((0, 0)));
    }

    #[test]
    fn resize_clamps_to_the_editing_limits() {
        let mut editor = editor();
        assert!(editor.resize(-10));
        assert_eq!(editor.board().size(), (MIN_EDIT_SIZE, MIN_EDIT_SIZE));
        assert!(!editor.resize(-1));

        assert!(editor.resize(100));
        assert_eq!(editor.board().size(), (MAX_EDIT_SIZE, MAX_EDIT_SIZE));
        assert!(!editor.resize(1));
    }

    #[test]
    fn resize_caps_the_budget_to_the_new_cell_count() {
        let mut editor = BoardEditor::new((5, 5), Variant::Standard, Some(20)).unwrap();
        assert!(editor.resize(-2));
        assert_eq!(editor.board().mine_budget(), Some(9));
    }

    #[test]
    fn adjust_budget_clamps_to_cell_count() {
        let mut editor = editor();
        assert!(editor.adjust_budget(1000));
        assert_eq!(editor.board().mine_budget(), Some(16));
        assert!(!editor.adjust_budget(1));
        assert!(editor.adjust_budget(-1000));
        assert_eq!(editor.board().mine_budget(), Some(0));
    }

    #[test]
    fn cycle_variant_walks_every_rule_set() {
        let mut editor = editor();
        let mut seen = vec![editor.board().variant()];
        for _ in 0..Variant::ALL.len() - 1 {
            seen.push(editor.cycle_variant());
        }
        seen.sort_by_key(|variant| variant.name());
        let mut all = Variant::ALL.to_vec();
        all.sort_by_key(|variant| variant.name());
        assert_eq!(seen, all);
    }

    #[test]
    fn out_of_bounds_edits_are_rejected() {
        let mut editor = editor();
        assert_eq!(
            editor.cycle_cell((9, 9)),
            Err(AnalysisError::InvalidCoords)
        );
        assert_eq!(
            editor.toggle_flag((4, 0)),
            Err(AnalysisError::InvalidCoords)
        );
    }
}
