//! Grid edit session - staged mutations over a loaded table.
//!
//! `GridEditor` owns the working copy of a dataset plus everything the
//! grid UI needs: the last-saved snapshot, dirty tracking, selection
//! and edit-mode membership, two-phase delete/discard prompts, and the
//! filter/sort/page view. It has no UI binding; every operation is a
//! plain method so the session is testable headless.
//!
//! Row identity: the session assigns each working row a synthetic
//! `RowId` at load/add time. Selection and edit membership are id
//! sets, so structural mutations (prepend, delete) never require
//! renumbering. The public API still speaks positional indices -
//! conversion happens at the method boundary, against the current row
//! order only.

use rustc_hash::FxHashSet;

use crate::table::{CellValue, Row, Table};
use crate::view::{PageSize, SortDirection, ViewState};

/// Stable per-session row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

/// Outstanding confirmation prompt, if any. Destructive operations
/// are two-phase: request opens the prompt, confirm applies it,
/// decline leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPrompt {
    /// Delete the selected rows; holds the count shown to the user.
    Delete(usize),
    /// Discard all staged changes back to the last snapshot.
    Discard,
}

/// Errors from grid operations. All are caller mistakes against
/// current state; nothing here touches I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    RowOutOfBounds(usize),
    UnknownColumn(String),
    /// Cell writes are scoped to rows in edit mode.
    RowNotEditing(usize),
    EmptySelection,
    NoPendingPrompt,
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::RowOutOfBounds(i) => write!(f, "row index {} out of bounds", i),
            GridError::UnknownColumn(c) => write!(f, "unknown column '{}'", c),
            GridError::RowNotEditing(i) => write!(f, "row {} is not in edit mode", i),
            GridError::EmptySelection => write!(f, "no rows selected"),
            GridError::NoPendingPrompt => write!(f, "no confirmation pending"),
        }
    }
}

impl std::error::Error for GridError {}

/// The grid edit session.
#[derive(Debug, Default)]
pub struct GridEditor {
    headers: Vec<String>,
    visible_columns: Vec<String>,

    /// Working rows and their ids, kept in lockstep.
    rows: Vec<Row>,
    ids: Vec<RowId>,

    /// Snapshot taken at load and at each successful save. Never
    /// mutated by editing operations.
    original: Vec<Row>,

    dirty: bool,
    selected: FxHashSet<RowId>,
    editing: FxHashSet<RowId>,
    pending: Option<PendingPrompt>,

    view: ViewState,

    next_id: u64,
    /// Revision of the last load, for redundant-reload suppression.
    loaded_revision: Option<u64>,
}

impl GridEditor {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------------

    /// Replace the session wholesale with a new table. Resets all
    /// derived and session state.
    pub fn load(&mut self, table: &Table) {
        self.headers = table.headers.clone();
        self.visible_columns = table.headers.clone();
        self.rows = table.rows.clone();
        let ids: Vec<RowId> = (0..table.rows.len()).map(|_| self.fresh_id()).collect();
        self.ids = ids;
        self.original = table.rows.clone();
        self.dirty = false;
        self.selected.clear();
        self.editing.clear();
        self.pending = None;
        self.view.reset();
    }

    /// Load guarded by a caller-supplied revision: reloading the same
    /// revision is a no-op, so a redundant re-delivery of the same
    /// dataset cannot clobber staged edits. Returns whether a load
    /// happened.
    pub fn load_revision(&mut self, table: &Table, revision: u64) -> bool {
        if self.loaded_revision == Some(revision) {
            return false;
        }
        self.load(table);
        self.loaded_revision = Some(revision);
        true
    }

    fn fresh_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn visible_columns(&self) -> &[String] {
        &self.visible_columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pending_prompt(&self) -> Option<PendingPrompt> {
        self.pending
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.ids
            .get(index)
            .map_or(false, |id| self.selected.contains(id))
    }

    pub fn is_editing(&self, index: usize) -> bool {
        self.ids
            .get(index)
            .map_or(false, |id| self.editing.contains(id))
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn editing_count(&self) -> usize {
        self.editing.len()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    // -------------------------------------------------------------------------
    // Cell and row mutation
    // -------------------------------------------------------------------------

    /// Overwrite one cell of a row in edit mode. No client-side
    /// validation: values are accepted verbatim.
    pub fn set_cell_value(
        &mut self,
        index: usize,
        column: &str,
        value: CellValue,
    ) -> Result<(), GridError> {
        if !self.headers.iter().any(|h| h == column) {
            return Err(GridError::UnknownColumn(column.to_string()));
        }
        let id = *self
            .ids
            .get(index)
            .ok_or(GridError::RowOutOfBounds(index))?;
        if !self.editing.contains(&id) {
            return Err(GridError::RowNotEditing(index));
        }
        self.rows[index].insert(column.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Prepend a blank row, select it (replacing the previous
    /// selection), put it in edit mode, and jump to page 1 so it is
    /// visible.
    pub fn add_row(&mut self) {
        let id = self.fresh_id();
        self.rows.insert(0, Table::blank_row(&self.headers));
        self.ids.insert(0, id);
        self.selected.clear();
        self.selected.insert(id);
        self.editing.insert(id);
        self.dirty = true;
        self.view.current_page = 1;
    }

    // -------------------------------------------------------------------------
    // Two-phase delete
    // -------------------------------------------------------------------------

    /// Open the delete confirmation. Returns the number of rows that
    /// would be removed.
    pub fn request_delete(&mut self) -> Result<usize, GridError> {
        if self.selected.is_empty() {
            return Err(GridError::EmptySelection);
        }
        let count = self.selected.len();
        self.pending = Some(PendingPrompt::Delete(count));
        Ok(count)
    }

    /// Apply a pending delete: drop every selected row, clear the
    /// selection and edit sets, mark dirty, reset to page 1.
    pub fn confirm_delete(&mut self) -> Result<(), GridError> {
        match self.pending {
            Some(PendingPrompt::Delete(_)) => {}
            _ => return Err(GridError::NoPendingPrompt),
        }
        let selected = std::mem::take(&mut self.selected);
        let mut kept_rows = Vec::with_capacity(self.rows.len());
        let mut kept_ids = Vec::with_capacity(self.ids.len());
        for (id, row) in self.ids.drain(..).zip(self.rows.drain(..)) {
            if !selected.contains(&id) {
                kept_ids.push(id);
                kept_rows.push(row);
            }
        }
        self.rows = kept_rows;
        self.ids = kept_ids;
        self.editing.clear();
        self.dirty = true;
        self.view.current_page = 1;
        self.pending = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Save / discard
    // -------------------------------------------------------------------------

    /// Commit staged rows through the caller's persistence sink.
    ///
    /// On sink success the snapshot advances to the current working
    /// rows, dirty clears, and selection/edit sets clear; filters,
    /// sort, and pagination are untouched. On sink error nothing
    /// changes - the user's edits survive for a retry.
    pub fn save<E>(&mut self, sink: impl FnOnce(&[Row]) -> Result<(), E>) -> Result<(), E> {
        sink(&self.rows)?;
        self.original = self.rows.clone();
        self.dirty = false;
        self.selected.clear();
        self.editing.clear();
        Ok(())
    }

    /// Open the discard confirmation.
    pub fn request_discard(&mut self) {
        self.pending = Some(PendingPrompt::Discard);
    }

    /// Apply a pending discard: restore working rows from the
    /// snapshot, clear dirty/selection/editing, reset to page 1.
    pub fn confirm_discard(&mut self) -> Result<(), GridError> {
        match self.pending {
            Some(PendingPrompt::Discard) => {}
            _ => return Err(GridError::NoPendingPrompt),
        }
        self.rows = self.original.clone();
        let ids: Vec<RowId> = (0..self.rows.len()).map(|_| self.fresh_id()).collect();
        self.ids = ids;
        self.dirty = false;
        self.selected.clear();
        self.editing.clear();
        self.view.current_page = 1;
        self.pending = None;
        Ok(())
    }

    /// Close a pending prompt without applying it.
    pub fn decline_prompt(&mut self) {
        self.pending = None;
    }

    // -------------------------------------------------------------------------
    // Selection and edit mode
    // -------------------------------------------------------------------------

    pub fn toggle_row_selection(&mut self, index: usize) -> Result<(), GridError> {
        let id = *self
            .ids
            .get(index)
            .ok_or(GridError::RowOutOfBounds(index))?;
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        Ok(())
    }

    /// Global toggle over the given (filtered) indices: if every one
    /// is already selected, deselect them all; otherwise select them
    /// all.
    pub fn toggle_select_all(&mut self, indices: &[usize]) -> Result<(), GridError> {
        let mut ids = Vec::with_capacity(indices.len());
        for &index in indices {
            ids.push(
                *self
                    .ids
                    .get(index)
                    .ok_or(GridError::RowOutOfBounds(index))?,
            );
        }
        let all_selected = ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            for id in &ids {
                self.selected.remove(id);
            }
        } else {
            for id in &ids {
                self.selected.insert(*id);
            }
        }
        Ok(())
    }

    /// Put every selected row into edit mode. Selection is kept.
    pub fn enter_edit_mode(&mut self) {
        for id in &self.selected {
            self.editing.insert(*id);
        }
    }

    // -------------------------------------------------------------------------
    // View passthrough
    // -------------------------------------------------------------------------

    /// Filtered + sorted positional indices (full projection).
    pub fn filtered_indices(&self) -> Vec<usize> {
        self.view.project(&self.rows)
    }

    /// Positional indices of the current (clamped) page.
    pub fn page_indices(&self) -> Vec<usize> {
        let projected = self.filtered_indices();
        let (start, end) = self.view.page_bounds(projected.len());
        projected[start..end].to_vec()
    }

    pub fn unique_values(&self, column: &str) -> Vec<String> {
        ViewState::unique_values(&self.rows, column)
    }

    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        self.view.toggle_filter_value(&self.rows, column, value);
    }

    pub fn set_filter_all(&mut self, column: &str, select: bool) {
        self.view.set_filter_all(column, select);
    }

    pub fn toggle_sort(&mut self, column: &str, direction: SortDirection) {
        self.view.toggle_sort(column, direction);
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.current_page = page.max(1);
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.view.set_page_size(size);
    }

    pub fn total_pages(&self) -> usize {
        self.view.total_pages(self.filtered_indices().len())
    }

    pub fn current_page(&self) -> usize {
        self.view.clamped_page(self.filtered_indices().len())
    }

    /// Toggle one column in or out of the visible set, preserving
    /// header order.
    pub fn toggle_column_visibility(&mut self, column: &str) {
        if self.visible_columns.iter().any(|c| c == column) {
            self.visible_columns.retain(|c| c != column);
        } else {
            let visible: FxHashSet<&String> = self.visible_columns.iter().collect();
            self.visible_columns = self
                .headers
                .iter()
                .filter(|h| h.as_str() == column || visible.contains(*h))
                .cloned()
                .collect();
        }
    }
}
