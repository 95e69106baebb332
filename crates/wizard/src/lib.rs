pub mod machine;
pub mod types;

pub use machine::{Applied, IngestWizard, RequestToken, WizardError, WizardState};
pub use types::{
    ColumnInfo, ColumnKind, FileSummary, IngestBackend, IngestContext, NewTablePlan, StepData,
    StepNumber, StructureReport, TableMetadata, ValidationReport,
};
