pub mod grid;
pub mod table;
pub mod view;

pub use grid::{GridEditor, GridError, PendingPrompt, RowId};
pub use table::{CellValue, Row, Table, EMPTY_SENTINEL};
pub use view::{PageSize, SortConfig, SortDirection, ViewState};
