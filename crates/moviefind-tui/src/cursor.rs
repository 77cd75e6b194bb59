//! Selection cursor over the results table.

use ratatui::widgets::TableState;

/// Tracks the selected row of the results table.
#[derive(Debug, Default)]
pub struct ResultCursor {
    /// Table state (handles selection and scroll).
    pub table_state: TableState,
}

impl ResultCursor {
    /// Returns the selected row index.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Clamps the selection to a list of `len` rows. An empty list has no
    /// selection; a non-empty list always has one.
    pub fn sync(&mut self, len: usize) {
        if len == 0 {
            self.table_state = TableState::default();
            return;
        }
        let max = len.saturating_sub(1);
        self.table_state.select(Some(self.selected().min(max)));
    }

    /// Resets the selection to the first row of a new list.
    pub fn reset(&mut self, len: usize) {
        self.table_state = TableState::default();
        self.sync(len);
    }

    /// Moves the cursor up one row.
    pub fn move_up(&mut self) {
        let current = self.selected();
        self.table_state.select(Some(current.saturating_sub(1)));
    }

    /// Moves the cursor down one row.
    pub fn move_down(&mut self, len: usize) {
        let current = self.selected();
        if current.saturating_add(1) < len {
            self.table_state.select(Some(current.saturating_add(1)));
        }
    }

    /// Scrolls up by a page.
    pub fn page_up(&mut self, page_size: usize) {
        let current = self.selected();
        self.table_state
            .select(Some(current.saturating_sub(page_size)));
    }

    /// Scrolls down by a page.
    pub fn page_down(&mut self, page_size: usize, len: usize) {
        let max = len.saturating_sub(1);
        let current = self.selected();
        self.table_state
            .select(Some(current.saturating_add(page_size).min(max)));
    }
}
