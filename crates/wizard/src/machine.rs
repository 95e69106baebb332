//! The ingestion wizard state machine.
//!
//! A strictly ordered 3-step analysis flow with a divergent step 3
//! (existing table: validation report; new table: metadata entry),
//! followed by a final upload commit. The machine is explicit about
//! two things the original flow left implicit:
//!
//! - **Cached-vs-fetch is a guard on the transition.** `request_next`
//!   either transitions immediately (cache hit) or hands back a
//!   `RequestToken` the caller must resolve via `complete_analysis`.
//!   `request_previous` never fetches - backward navigation always
//!   reuses cached data. This asymmetry is deliberate.
//! - **Responses carry sequence numbers.** Only the completion
//!   matching the latest issued request is applied; anything else is
//!   discarded as stale, so an out-of-order network response can
//!   never clobber newer state.
//!
//! Analysis failures are inline: the machine stays on its step, keeps
//! the error message, and the same step can be retried. Upload failure
//! is terminal for the session - closing and reopening the wizard is
//! the only recovery path.

use crate::types::{
    ColumnInfo, IngestBackend, IngestContext, NewTablePlan, StepData, StepNumber, TableMetadata,
};
use std::collections::BTreeMap;

/// Where the wizard session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Closed,
    Step1,
    Step2,
    Step3Existing,
    Step3New,
    Uploading,
    /// Upload failed; holds the server message. Terminal.
    Failed(String),
    /// Upload completed; holds the server message. Terminal.
    Succeeded(String),
}

impl WizardState {
    fn step(&self) -> Option<StepNumber> {
        match self {
            WizardState::Step1 => Some(StepNumber::One),
            WizardState::Step2 => Some(StepNumber::Two),
            WizardState::Step3Existing | WizardState::Step3New => Some(StepNumber::Three),
            _ => None,
        }
    }
}

/// Handle for an issued analysis request. Resolving it with
/// `complete_analysis` applies the response iff it is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    seq: u64,
    step: StepNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Operation requires an open session.
    NotOpen,
    /// An analysis request is already in flight.
    RequestInFlight,
    /// No earlier step to go back to.
    AtFirstStep,
    /// No later step to advance to.
    AtLastStep,
    /// Confirm attempted with blocking validation errors present.
    BlockedByValidation,
    /// Cancel attempted mid-upload.
    UploadInFlight,
    /// Metadata entry outside new-table mode.
    NotNewTable,
    /// Operation invalid in the current state.
    InvalidState(&'static str),
    /// An analysis step failed; the step can be retried.
    AnalysisFailed(String),
    /// Upload failed; the session is terminal.
    UploadFailed(String),
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::NotOpen => write!(f, "wizard is not open"),
            WizardError::RequestInFlight => write!(f, "an analysis request is already in flight"),
            WizardError::AtFirstStep => write!(f, "already at the first step"),
            WizardError::AtLastStep => write!(f, "already at the last step"),
            WizardError::BlockedByValidation => {
                write!(f, "blocking validation errors prevent the upload")
            }
            WizardError::UploadInFlight => write!(f, "cannot cancel while uploading"),
            WizardError::NotNewTable => write!(f, "metadata entry requires new-table mode"),
            WizardError::InvalidState(what) => write!(f, "invalid in current state: {}", what),
            WizardError::AnalysisFailed(msg) => write!(f, "analysis failed: {}", msg),
            WizardError::UploadFailed(msg) => write!(f, "upload failed: {}", msg),
        }
    }
}

impl std::error::Error for WizardError {}

/// Outcome of resolving a request token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Response matched the latest issued request and was applied.
    Current,
    /// Response was superseded and discarded.
    Stale,
}

/// The wizard session.
#[derive(Debug, Default)]
pub struct IngestWizard {
    state: Option<WizardStateInner>,
}

#[derive(Debug)]
struct WizardStateInner {
    state: WizardState,
    ctx: IngestContext,
    new_table: bool,
    /// Per-step response cache. Accumulates monotonically; revisiting
    /// a step never re-fetches.
    steps: BTreeMap<StepNumber, StepData>,
    /// Column schema captured from step 2, kept outside the step cache
    /// so the step-3 metadata form can use it in new-table mode.
    schema: Option<Vec<ColumnInfo>>,
    metadata: TableMetadata,
    /// Latest issued request sequence; completions must match.
    seq: u64,
    pending: Option<RequestToken>,
    last_error: Option<String>,
}

impl IngestWizard {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> WizardState {
        self.state
            .as_ref()
            .map(|s| s.state.clone())
            .unwrap_or(WizardState::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.as_ref().map_or(false, |s| s.pending.is_some())
    }

    pub fn is_new_table(&self) -> bool {
        self.state.as_ref().map_or(false, |s| s.new_table)
    }

    pub fn step_data(&self, step: StepNumber) -> Option<&StepData> {
        self.state.as_ref()?.steps.get(&step)
    }

    pub fn schema(&self) -> Option<&[ColumnInfo]> {
        self.state.as_ref()?.schema.as_deref()
    }

    pub fn metadata(&self) -> Option<&TableMetadata> {
        self.state.as_ref().map(|s| &s.metadata)
    }

    /// Inline error from the most recent failed analysis, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.state.as_ref()?.last_error.as_deref()
    }

    pub fn context(&self) -> Option<&IngestContext> {
        self.state.as_ref().map(|s| &s.ctx)
    }

    // -------------------------------------------------------------------------
    // Opening and closing
    // -------------------------------------------------------------------------

    /// Open a session for a chosen file and destination. Transitions
    /// `Closed -> Step1` and issues the step-1 analysis request.
    pub fn open(&mut self, ctx: IngestContext, new_table: bool) -> RequestToken {
        let token = RequestToken {
            seq: 1,
            step: StepNumber::One,
        };
        self.state = Some(WizardStateInner {
            state: WizardState::Step1,
            ctx,
            new_table,
            steps: BTreeMap::new(),
            schema: None,
            metadata: TableMetadata::default(),
            seq: 1,
            pending: Some(token),
            last_error: None,
        });
        token
    }

    /// Cancel the session, discarding all accumulated data. Allowed
    /// in every state except `Uploading`.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        let inner = self.state.as_ref().ok_or(WizardError::NotOpen)?;
        if inner.state == WizardState::Uploading {
            return Err(WizardError::UploadInFlight);
        }
        self.state = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Step navigation
    // -------------------------------------------------------------------------

    /// Advance one step. Returns `None` when the target step's data is
    /// already cached (transition happened immediately), or a token
    /// for the analysis request that must be resolved first.
    pub fn request_next(&mut self) -> Result<Option<RequestToken>, WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        if inner.pending.is_some() {
            return Err(WizardError::RequestInFlight);
        }
        let current = inner
            .state
            .step()
            .ok_or(WizardError::InvalidState("next"))?;
        let target = current.next().ok_or(WizardError::AtLastStep)?;

        if inner.steps.contains_key(&target) {
            inner.state = Self::state_for(target, inner.new_table);
            inner.last_error = None;
            return Ok(None);
        }

        inner.seq += 1;
        let token = RequestToken {
            seq: inner.seq,
            step: target,
        };
        inner.pending = Some(token);
        Ok(Some(token))
    }

    /// Go back one step. Never issues a network request: the earlier
    /// step's data is guaranteed cached.
    pub fn request_previous(&mut self) -> Result<(), WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        if inner.pending.is_some() {
            return Err(WizardError::RequestInFlight);
        }
        let current = inner
            .state
            .step()
            .ok_or(WizardError::InvalidState("previous"))?;
        let target = current.previous().ok_or(WizardError::AtFirstStep)?;
        inner.state = Self::state_for(target, inner.new_table);
        inner.last_error = None;
        Ok(())
    }

    /// Re-issue the analysis request for the current step (after an
    /// inline failure). No-op token when the data is already cached.
    pub fn retry(&mut self) -> Result<Option<RequestToken>, WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        if inner.pending.is_some() {
            return Err(WizardError::RequestInFlight);
        }
        let current = inner
            .state
            .step()
            .ok_or(WizardError::InvalidState("retry"))?;
        if inner.steps.contains_key(&current) {
            return Ok(None);
        }
        inner.seq += 1;
        let token = RequestToken {
            seq: inner.seq,
            step: current,
        };
        inner.pending = Some(token);
        Ok(Some(token))
    }

    /// Resolve an issued analysis request.
    ///
    /// A success caches the payload and transitions to the token's
    /// step; a failure stays put and records the inline error. Either
    /// way, a token whose sequence is not the latest issued one is
    /// discarded without touching state.
    pub fn complete_analysis(
        &mut self,
        token: RequestToken,
        result: Result<StepData, String>,
    ) -> Result<Applied, WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        match inner.pending {
            Some(pending) if pending.seq == token.seq => {}
            _ => return Ok(Applied::Stale),
        }
        inner.pending = None;
        match result {
            Ok(data) => {
                if let StepData::Structure(report) = &data {
                    inner.schema = Some(report.columns.clone());
                }
                inner.steps.insert(token.step, data);
                inner.state = Self::state_for(token.step, inner.new_table);
                inner.last_error = None;
            }
            Err(message) => {
                inner.last_error = Some(message);
            }
        }
        Ok(Applied::Current)
    }

    fn state_for(step: StepNumber, new_table: bool) -> WizardState {
        match step {
            StepNumber::One => WizardState::Step1,
            StepNumber::Two => WizardState::Step2,
            StepNumber::Three if new_table => WizardState::Step3New,
            StepNumber::Three => WizardState::Step3Existing,
        }
    }

    // -------------------------------------------------------------------------
    // Metadata entry (new-table mode)
    // -------------------------------------------------------------------------

    pub fn set_table_description(&mut self, text: &str) -> Result<(), WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        if !inner.new_table {
            return Err(WizardError::NotNewTable);
        }
        inner.metadata.table_description = text.to_string();
        Ok(())
    }

    pub fn set_column_description(&mut self, column: &str, text: &str) -> Result<(), WizardError> {
        let inner = self.state.as_mut().ok_or(WizardError::NotOpen)?;
        if !inner.new_table {
            return Err(WizardError::NotNewTable);
        }
        inner
            .metadata
            .column_descriptions
            .insert(column.to_string(), text.to_string());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Final commit
    // -------------------------------------------------------------------------

    /// Structural precondition on the confirm transition: on step 3 in
    /// existing-table mode, a non-empty blocking list disables it.
    pub fn can_confirm(&self) -> bool {
        let Some(inner) = self.state.as_ref() else {
            return false;
        };
        if inner.pending.is_some() {
            return false;
        }
        match inner.state {
            WizardState::Step3New => true,
            WizardState::Step3Existing => match inner.steps.get(&StepNumber::Three) {
                Some(StepData::Validation(report)) => !report.has_blocking(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Perform the final upload through the backend. On success the
    /// session ends in `Succeeded`; on failure in `Failed` (terminal -
    /// close and restart to recover).
    pub fn confirm<B: IngestBackend>(
        &mut self,
        backend: &mut B,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, WizardError> {
        if !self.can_confirm() {
            let inner = self.state.as_ref().ok_or(WizardError::NotOpen)?;
            return Err(match inner.state {
                WizardState::Step3Existing => WizardError::BlockedByValidation,
                _ => WizardError::InvalidState("confirm"),
            });
        }
        let inner = self.state.as_mut().expect("checked by can_confirm");

        let plan = if inner.new_table {
            Some(NewTablePlan {
                metadata: inner.metadata.clone(),
                schema: inner.schema.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        inner.state = WizardState::Uploading;
        match backend.upload(&inner.ctx, plan.as_ref(), on_progress) {
            Ok(message) => {
                inner.state = WizardState::Succeeded(message.clone());
                Ok(message)
            }
            Err(e) => {
                let message = e.to_string();
                inner.state = WizardState::Failed(message.clone());
                Err(WizardError::UploadFailed(message))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Blocking driver
    // -------------------------------------------------------------------------

    /// Advance one step, driving any needed analysis call through the
    /// backend synchronously.
    pub fn advance<B: IngestBackend>(&mut self, backend: &mut B) -> Result<(), WizardError> {
        let Some(token) = self.request_next()? else {
            return Ok(());
        };
        self.resolve(backend, token)
    }

    /// Resolve an issued token against the blocking backend.
    pub fn resolve<B: IngestBackend>(
        &mut self,
        backend: &mut B,
        token: RequestToken,
    ) -> Result<(), WizardError> {
        let (ctx, new_table) = {
            let inner = self.state.as_ref().ok_or(WizardError::NotOpen)?;
            (inner.ctx.clone(), inner.new_table)
        };
        let result = backend
            .analyze(token.step, &ctx, new_table)
            .map_err(|e| e.to_string());
        let failed = result.as_ref().err().cloned();
        self.complete_analysis(token, result)?;
        match failed {
            Some(msg) => Err(WizardError::AnalysisFailed(msg)),
            None => Ok(()),
        }
    }
}
