//! Filter, sort, and pagination - the derived view over working rows.
//!
//! The view owns three knobs (active filters, sort config, page state)
//! and nothing else. Everything it shows is recomputed from the
//! session's working rows on demand; it never caches row indices
//! across mutations.
//!
//! Key invariants:
//! - A column absent from `filters` is unconstrained.
//! - A column whose allowed set equals the full unique-value set is
//!   removed from `filters` (minimal representation).
//! - An empty allowed set hides every row.
//! - Nulls sort last in both directions.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::table::Row;

// =============================================================================
// Sort
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Single-column sort. `None` at the session level means storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub column: String,
    pub direction: SortDirection,
}

/// Compare two cells for sorting.
///
/// Policy: nulls always land last, regardless of direction. Numeric
/// pairs compare numerically; any other pair compares as strings.
/// (The direction flip below never touches null placement.)
fn compare_cells(
    a: Option<&crate::table::CellValue>,
    b: Option<&crate::table::CellValue>,
    direction: SortDirection,
) -> Ordering {
    use crate::table::CellValue;

    let a_null = a.map_or(true, CellValue::is_null);
    let b_null = b.map_or(true, CellValue::is_null);
    match (a_null, b_null) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let a = a.unwrap();
    let b = b.unwrap();
    let ord = match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => OrderedFloat(x).cmp(&OrderedFloat(y)),
        _ => a.filter_key().cmp(&b.filter_key()),
    };
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// User-selectable rows-per-page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    #[serde(rename = "50")]
    Fifty,
    #[serde(rename = "100")]
    Hundred,
    #[serde(rename = "200")]
    TwoHundred,
}

impl PageSize {
    pub fn as_usize(&self) -> usize {
        match self {
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
            PageSize::TwoHundred => 200,
        }
    }

    pub fn from_rows(n: usize) -> Option<Self> {
        match n {
            50 => Some(PageSize::Fifty),
            100 => Some(PageSize::Hundred),
            200 => Some(PageSize::TwoHundred),
            _ => None,
        }
    }
}

// =============================================================================
// ViewState
// =============================================================================

/// The three view knobs plus their recompute logic.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// column -> allowed normalized values. Absent key = unconstrained.
    filters: FxHashMap<String, BTreeSet<String>>,
    /// Active sort, if any.
    pub sort: Option<SortConfig>,
    /// Rows per page.
    pub page_size: PageSize,
    /// 1-based requested page; clamped at read time, not stored clamped.
    pub current_page: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            filters: FxHashMap::default(),
            sort: None,
            page_size: PageSize::default(),
            current_page: 1,
        }
    }

    /// Drop all filters, sort, and page state (used on load).
    pub fn reset(&mut self) {
        self.filters.clear();
        self.sort = None;
        self.current_page = 1;
    }

    pub fn filters(&self) -> &FxHashMap<String, BTreeSet<String>> {
        &self.filters
    }

    pub fn has_filter(&self, column: &str) -> bool {
        self.filters.contains_key(column)
    }

    // -------------------------------------------------------------------------
    // Filter mutation
    // -------------------------------------------------------------------------

    /// Sorted unique normalized values of a column (drives filter menus).
    pub fn unique_values(rows: &[Row], column: &str) -> Vec<String> {
        let mut set: BTreeSet<String> = BTreeSet::new();
        for row in rows {
            set.insert(
                row.get(column)
                    .map(|v| v.filter_key())
                    .unwrap_or_else(|| crate::table::EMPTY_SENTINEL.to_string()),
            );
        }
        set.into_iter().collect()
    }

    /// Toggle one value in a column's allowed set.
    ///
    /// A column with no active filter starts from the full unique set.
    /// If the toggle brings the set back to the full unique set, the
    /// key is removed entirely (back to unconstrained).
    pub fn toggle_filter_value(&mut self, rows: &[Row], column: &str, value: &str) {
        let all: BTreeSet<String> = Self::unique_values(rows, column).into_iter().collect();
        let mut allowed = match self.filters.remove(column) {
            Some(set) => set,
            None => all.clone(),
        };
        if !allowed.remove(value) {
            allowed.insert(value.to_string());
        }
        if allowed != all {
            self.filters.insert(column.to_string(), allowed);
        }
    }

    /// Select-all / select-none for one column's filter menu.
    /// Select-all removes the key; select-none leaves an empty allowed
    /// set, which hides every row.
    pub fn set_filter_all(&mut self, column: &str, select: bool) {
        if select {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), BTreeSet::new());
        }
    }

    /// Row passes iff every filtered column's normalized value is in
    /// that column's allowed set.
    pub fn row_passes(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, allowed)| {
            let key = row
                .get(column)
                .map(|v| v.filter_key())
                .unwrap_or_else(|| crate::table::EMPTY_SENTINEL.to_string());
            allowed.contains(&key)
        })
    }

    // -------------------------------------------------------------------------
    // Sort mutation
    // -------------------------------------------------------------------------

    /// Apply a sort, or clear it when the same column+direction is
    /// requested twice (returns the view to storage order).
    pub fn toggle_sort(&mut self, column: &str, direction: SortDirection) {
        let same = self
            .sort
            .as_ref()
            .map_or(false, |s| s.column == column && s.direction == direction);
        self.sort = if same {
            None
        } else {
            Some(SortConfig {
                column: column.to_string(),
                direction,
            })
        };
    }

    // -------------------------------------------------------------------------
    // Projection
    // -------------------------------------------------------------------------

    /// Filtered + sorted positional indices into `rows`.
    /// Stable sort, so equal keys keep storage order.
    pub fn project(&self, rows: &[Row]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len())
            .filter(|&i| self.row_passes(&rows[i]))
            .collect();

        if let Some(sort) = &self.sort {
            indices.sort_by(|&a, &b| {
                compare_cells(
                    rows[a].get(&sort.column),
                    rows[b].get(&sort.column),
                    sort.direction,
                )
            });
        }

        indices
    }

    /// Total pages for a filtered count (min 1 so an empty result
    /// still has a valid page).
    pub fn total_pages(&self, filtered_count: usize) -> usize {
        let size = self.page_size.as_usize();
        filtered_count.div_ceil(size).max(1)
    }

    /// Requested page clamped into `[1, total_pages]`. Handles filters
    /// shrinking the result set below the current page.
    pub fn clamped_page(&self, filtered_count: usize) -> usize {
        self.current_page.clamp(1, self.total_pages(filtered_count))
    }

    /// Half-open index range of the current page within a projection.
    pub fn page_bounds(&self, filtered_count: usize) -> (usize, usize) {
        let size = self.page_size.as_usize();
        let start = (self.clamped_page(filtered_count) - 1) * size;
        (start, (start + size).min(filtered_count))
    }

    /// Change page size and reset to page 1.
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.current_page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row(&[("name", "B".into()), ("qty", 2.0.into())]),
            row(&[("name", "A".into()), ("qty", CellValue::Null)]),
            row(&[("name", "C".into()), ("qty", 1.0.into())]),
        ]
    }

    #[test]
    fn test_unconstrained_column_passes_everything() {
        let rows = sample_rows();
        let view = ViewState::new();
        assert_eq!(view.project(&rows), vec![0, 1, 2]);
    }

    #[test]
    fn test_toggle_value_constrains_then_reverts() {
        let rows = sample_rows();
        let mut view = ViewState::new();

        // Removing "A" from the full set leaves {B, C}.
        view.toggle_filter_value(&rows, "name", "A");
        assert!(view.has_filter("name"));
        assert_eq!(view.project(&rows), vec![0, 2]);

        // Adding it back restores the full set: key removed entirely.
        view.toggle_filter_value(&rows, "name", "A");
        assert!(!view.has_filter("name"));
        assert_eq!(view.project(&rows), vec![0, 1, 2]);
    }

    #[test]
    fn test_select_none_hides_all_rows() {
        let rows = sample_rows();
        let mut view = ViewState::new();
        view.set_filter_all("name", false);
        assert!(view.has_filter("name"));
        assert!(view.project(&rows).is_empty());

        view.set_filter_all("name", true);
        assert!(!view.has_filter("name"));
    }

    #[test]
    fn test_null_normalizes_to_sentinel() {
        let rows = sample_rows();
        let values = ViewState::unique_values(&rows, "qty");
        assert!(values.contains(&crate::table::EMPTY_SENTINEL.to_string()));

        // Filtering qty down to just the sentinel keeps only the null row.
        let mut view = ViewState::new();
        view.set_filter_all("qty", false);
        view.toggle_filter_value(&rows, "qty", crate::table::EMPTY_SENTINEL);
        assert_eq!(view.project(&rows), vec![1]);
    }

    #[test]
    fn test_sort_numeric_and_nulls_last() {
        let rows = sample_rows();
        let mut view = ViewState::new();
        view.toggle_sort("qty", SortDirection::Asc);
        // 1, 2, then null last
        assert_eq!(view.project(&rows), vec![2, 0, 1]);

        view.toggle_sort("qty", SortDirection::Desc);
        // 2, 1, null still last
        assert_eq!(view.project(&rows), vec![0, 2, 1]);
    }

    #[test]
    fn test_same_sort_twice_clears() {
        let rows = sample_rows();
        let mut view = ViewState::new();
        view.toggle_sort("name", SortDirection::Asc);
        assert_eq!(view.project(&rows), vec![1, 0, 2]);

        view.toggle_sort("name", SortDirection::Asc);
        assert!(view.sort.is_none());
        assert_eq!(view.project(&rows), vec![0, 1, 2]);
    }

    #[test]
    fn test_string_comparison_for_mixed_types() {
        let rows = vec![
            row(&[("v", "10".into())]),
            row(&[("v", 9.0.into())]),
        ];
        let mut view = ViewState::new();
        view.toggle_sort("v", SortDirection::Asc);
        // Mixed pair falls back to string compare: "10" < "9"
        assert_eq!(view.project(&rows), vec![0, 1]);
    }

    #[test]
    fn test_page_clamping() {
        let mut view = ViewState::new();
        // pageSize=50, 120 filtered rows -> 3 pages
        assert_eq!(view.total_pages(120), 3);
        view.current_page = 5;
        assert_eq!(view.clamped_page(120), 3);
        assert_eq!(view.page_bounds(120), (100, 120));
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let view = ViewState::new();
        assert_eq!(view.total_pages(0), 1);
        assert_eq!(view.clamped_page(0), 1);
        assert_eq!(view.page_bounds(0), (0, 0));
    }

    #[test]
    fn test_set_page_size_resets_page() {
        let mut view = ViewState::new();
        view.current_page = 4;
        view.set_page_size(PageSize::TwoHundred);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.page_size.as_usize(), 200);
    }
}
