//! Wire shapes and collaborator seams for the ingestion wizard.
//!
//! Step payloads mirror what the analysis endpoint returns per step.
//! The backend itself is a trait so the state machine can be driven
//! headless in tests and by the real HTTP client alike.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The three analysis steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepNumber {
    One,
    Two,
    Three,
}

impl StepNumber {
    pub fn as_u8(&self) -> u8 {
        match self {
            StepNumber::One => 1,
            StepNumber::Two => 2,
            StepNumber::Three => 3,
        }
    }

    pub fn next(&self) -> Option<StepNumber> {
        match self {
            StepNumber::One => Some(StepNumber::Two),
            StepNumber::Two => Some(StepNumber::Three),
            StepNumber::Three => None,
        }
    }

    pub fn previous(&self) -> Option<StepNumber> {
        match self {
            StepNumber::One => None,
            StepNumber::Two => Some(StepNumber::One),
            StepNumber::Three => Some(StepNumber::Two),
        }
    }
}

/// Destination context carried through every analysis and upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestContext {
    pub env_id: String,
    pub bucket_name: String,
    pub product_name: String,
    pub table_name: String,
    pub file_path: PathBuf,
}

impl IngestContext {
    /// `product/table` path the backend expects as `destination`.
    pub fn destination(&self) -> String {
        format!("{}/{}", self.product_name, self.table_name)
    }
}

/// Step-1 payload: file metadata plus destination context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_name: String,
    /// Human-readable size, e.g. "12.4 MB".
    pub size: String,
    pub file_type: String,
    pub upload_date: String,
    pub upload_time: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Inferred column kind, as the analysis backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// Step-2 payload: structure and a short preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub column_count: usize,
    pub record_count: usize,
    pub columns: Vec<ColumnInfo>,
    /// First rows of the file, untyped.
    #[serde(default)]
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Step-3 payload: validation against the destination schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub validated_against: Option<String>,
    /// Blocking errors gate the final commit.
    #[serde(default)]
    pub blocking: Vec<String>,
    /// Advisory warnings, surfaced but never gating.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_blocking(&self) -> bool {
        !self.blocking.is_empty()
    }
}

/// One step's cached server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepData {
    Summary(FileSummary),
    Structure(StructureReport),
    Validation(ValidationReport),
}

/// User-entered descriptions for a table being created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_description: String,
    pub column_descriptions: BTreeMap<String, String>,
}

impl TableMetadata {
    pub fn is_empty(&self) -> bool {
        self.table_description.is_empty() && self.column_descriptions.is_empty()
    }
}

/// Everything the final commit needs when the destination table does
/// not exist yet: user-entered metadata plus the schema discovered in
/// step 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTablePlan {
    pub metadata: TableMetadata,
    pub schema: Vec<ColumnInfo>,
}

/// The analysis/upload collaborator. Implemented by the HTTP client;
/// mocked in tests.
pub trait IngestBackend {
    type Error: std::fmt::Display;

    /// Run one analysis step against the backend.
    fn analyze(
        &mut self,
        step: StepNumber,
        ctx: &IngestContext,
        is_new_table: bool,
    ) -> Result<StepData, Self::Error>;

    /// Perform the final commit. `new_table` is present only in
    /// new-table mode. Progress is a monotonic percentage.
    fn upload(
        &mut self,
        ctx: &IngestContext,
        new_table: Option<&NewTablePlan>,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(StepNumber::One.next(), Some(StepNumber::Two));
        assert_eq!(StepNumber::Three.next(), None);
        assert_eq!(StepNumber::One.previous(), None);
        assert_eq!(StepNumber::Three.previous(), Some(StepNumber::Two));
    }

    #[test]
    fn test_destination_path() {
        let ctx = IngestContext {
            env_id: "pd".into(),
            bucket_name: "raw-zone".into(),
            product_name: "sales".into(),
            table_name: "orders".into(),
            file_path: "orders.csv".into(),
        };
        assert_eq!(ctx.destination(), "sales/orders");
    }

    #[test]
    fn test_validation_report_defaults() {
        let report: ValidationReport = serde_json::from_str("{}").unwrap();
        assert!(!report.has_blocking());
        assert!(report.warnings.is_empty());
        assert!(report.validated_against.is_none());
    }
}
