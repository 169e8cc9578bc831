//! Submission orchestration
//!
//! One call to [`SubmissionOrchestrator::submit`] drives a submission
//! through its lifecycle:
//!
//! ```text
//! Validating ─┬─> Rejected                      (no write, no remote call)
//!             └─> PlaceholderWritten ─┬─> Aborted (placeholder write failed)
//!                                     └─> AwaitingRemote ─┬─> Finalized
//!                                                         ├─> Dropped
//!                                                         └─> RolledBack
//! ```
//!
//! The placeholder is the only record this submission ever touches. It is
//! rewritten in place on success and removed on any failure. There is no
//! retry transition.

use quotelink_client::{RemoteLink, SubmissionClient};
use quotelink_core::errors::{ExError, ExErrorKind};
use quotelink_core::model::{RandomTokenSource, TokenSource};
use quotelink_core::share::share_link;
use quotelink_core::{
    validate_selection, Clock, CompleteRecord, LedgerMutation, QuoteLinkRecord, Settings,
    SubmissionPolicy, SystemClock, ValidatedSelection,
};
use quotelink_core_types::RequestId;
use quotelink_store::LedgerStore;
use std::sync::Arc;
use std::time::Instant;

use crate::effects::PostCommitEffect;
use crate::messages;

/// Fresh tokens tried before a placeholder write is abandoned
pub const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// What the trigger surface hands over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPayload {
    pub selected_text: Option<String>,
    pub page_url: String,
}

impl TriggerPayload {
    pub fn new(selected_text: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            selected_text: Some(selected_text.into()),
            page_url: page_url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Validating,
    PlaceholderWritten,
    AwaitingRemote,
    Finalized,
    Dropped,
    RolledBack,
    Rejected,
    Aborted,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Validating => "validating",
            SubmissionState::PlaceholderWritten => "placeholder_written",
            SubmissionState::AwaitingRemote => "awaiting_remote",
            SubmissionState::Finalized => "finalized",
            SubmissionState::Dropped => "dropped",
            SubmissionState::RolledBack => "rolled_back",
            SubmissionState::Rejected => "rejected",
            SubmissionState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SubmissionState::Validating
                | SubmissionState::PlaceholderWritten
                | SubmissionState::AwaitingRemote
        )
    }
}

/// How a submission ended
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The placeholder became `record`
    Finalized {
        record: CompleteRecord,
        share_link: String,
    },
    /// The remote call succeeded but the placeholder was already gone;
    /// the record with remote id `id` was not stored
    Dropped { id: String },
    /// Validation failed; nothing was written
    Rejected { error: ExError },
    /// The placeholder could not be written; the remote was not called
    Aborted { error: ExError },
    /// The placeholder was removed after `error`. `rollback_error` is set if
    /// the removal itself failed and the placeholder may still be stored.
    RolledBack {
        error: ExError,
        rollback_error: Option<ExError>,
    },
}

impl SubmissionOutcome {
    pub fn is_finalized(&self) -> bool {
        matches!(self, SubmissionOutcome::Finalized { .. })
    }

    /// The error that ended the submission, if any
    pub fn error(&self) -> Option<&ExError> {
        match self {
            SubmissionOutcome::Rejected { error }
            | SubmissionOutcome::Aborted { error }
            | SubmissionOutcome::RolledBack { error, .. } => Some(error),
            SubmissionOutcome::Finalized { .. } | SubmissionOutcome::Dropped { .. } => None,
        }
    }
}

/// Everything a caller needs after a submission
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub request_id: RequestId,
    /// Temporary token, if a placeholder was written
    pub token: Option<String>,
    pub outcome: SubmissionOutcome,
    /// States visited, in order, ending in a terminal state
    pub states: Vec<SubmissionState>,
    /// Effects to perform, in order
    pub effects: Vec<PostCommitEffect>,
}

impl SubmissionReport {
    pub fn final_state(&self) -> Option<SubmissionState> {
        self.states.last().copied()
    }
}

/// Accumulates the state trace and logs each transition
struct Trace<'a> {
    request_id: &'a RequestId,
    states: Vec<SubmissionState>,
}

impl<'a> Trace<'a> {
    fn start(request_id: &'a RequestId) -> Self {
        let mut trace = Self {
            request_id,
            states: Vec::new(),
        };
        trace.enter(SubmissionState::Validating);
        trace
    }

    fn enter(&mut self, state: SubmissionState) {
        tracing::debug!(
            op = "submit",
            event = quotelink_core::schema::EVENT_TRANSITION,
            request_id = self.request_id.as_str(),
            state = state.as_str(),
        );
        self.states.push(state);
    }
}

/// Drives submissions against a shared ledger store and a remote client
pub struct SubmissionOrchestrator {
    store: Arc<dyn LedgerStore>,
    client: Arc<dyn SubmissionClient>,
    policy: SubmissionPolicy,
    share_base_url: String,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
}

impl SubmissionOrchestrator {
    /// Orchestrator with default policy, system clock and random tokens
    pub fn new(store: Arc<dyn LedgerStore>, client: Arc<dyn SubmissionClient>) -> Self {
        let defaults = Settings::default();
        Self {
            store,
            client,
            policy: defaults.submission_policy(),
            share_base_url: defaults.share_base_url,
            clock: Arc::new(SystemClock),
            tokens: Arc::new(RandomTokenSource),
        }
    }

    /// Orchestrator configured from `settings`
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn LedgerStore>,
        client: Arc<dyn SubmissionClient>,
    ) -> Self {
        Self::new(store, client)
            .with_policy(settings.submission_policy())
            .with_share_base_url(settings.share_base_url.clone())
    }

    pub fn with_policy(mut self, policy: SubmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_share_base_url(mut self, share_base_url: impl Into<String>) -> Self {
        self.share_base_url = share_base_url.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Run one submission to a terminal state
    ///
    /// Failures are not returned as `Err`; they are part of the report,
    /// together with the notification describing them.
    pub async fn submit(&self, trigger: TriggerPayload) -> SubmissionReport {
        let request_id = RequestId::new();
        let start = Instant::now();
        quotelink_core::log_op_start!(
            "submit",
            request_id = request_id.as_str(),
            page_url = trigger.page_url.as_str()
        );

        let (token, outcome, states, effects) = self.run(&request_id, &trigger).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let final_state = states.last().map(SubmissionState::as_str).unwrap_or("validating");
        match outcome.error() {
            Some(error) => {
                quotelink_core::log_op_error!(
                    "submit",
                    error.clone().with_request_id(request_id.clone()),
                    duration_ms = duration_ms,
                    request_id = request_id.as_str(),
                    state = final_state
                );
            }
            None => {
                quotelink_core::log_op_end!(
                    "submit",
                    duration_ms = duration_ms,
                    request_id = request_id.as_str(),
                    state = final_state
                );
            }
        }

        SubmissionReport {
            request_id,
            token,
            outcome,
            states,
            effects,
        }
    }

    async fn run(
        &self,
        request_id: &RequestId,
        trigger: &TriggerPayload,
    ) -> (
        Option<String>,
        SubmissionOutcome,
        Vec<SubmissionState>,
        Vec<PostCommitEffect>,
    ) {
        let mut trace = Trace::start(request_id);

        let selection = match validate_selection(
            trigger.selected_text.as_deref(),
            &trigger.page_url,
            &self.policy,
        ) {
            Ok(selection) => selection,
            Err(err) => {
                let message = messages::for_validation(&err, &self.policy.allowed_origin);
                trace.enter(SubmissionState::Rejected);
                let outcome = SubmissionOutcome::Rejected { error: err.into() };
                return (None, outcome, trace.states, vec![PostCommitEffect::notify(message)]);
            }
        };

        let token = match self.write_placeholder(&selection).await {
            Ok(token) => token,
            Err(error) => {
                let message = messages::for_storage_error(&error);
                trace.enter(SubmissionState::Aborted);
                let outcome = SubmissionOutcome::Aborted { error };
                return (None, outcome, trace.states, vec![PostCommitEffect::notify(message)]);
            }
        };
        trace.enter(SubmissionState::PlaceholderWritten);

        trace.enter(SubmissionState::AwaitingRemote);
        let remote = self
            .client
            .submit(&selection.quote, &selection.source_url)
            .await;

        let (outcome, effects) = match remote {
            Ok(link) => self.finalize(&token, &selection, link, &mut trace).await,
            Err(err) => {
                let message = messages::for_submit_error(&err);
                self.roll_back(&token, err.into(), message, &mut trace)
                    .await
            }
        };

        (Some(token), outcome, trace.states, effects)
    }

    /// Prepend a pending placeholder under a fresh token
    async fn write_placeholder(&self, selection: &ValidatedSelection) -> Result<String, ExError> {
        let mut attempt = 1;
        loop {
            let token = self.tokens.next_token(self.clock.now_ms());
            let placeholder = QuoteLinkRecord::pending(
                token.clone(),
                selection.quote.clone(),
                selection.source_url.clone(),
            );

            match self
                .store
                .update(&LedgerMutation::InsertPlaceholder(placeholder))
                .await
            {
                Ok(_) => return Ok(token),
                Err(err)
                    if err.kind() == ExErrorKind::DuplicateId && attempt < MAX_TOKEN_ATTEMPTS =>
                {
                    tracing::warn!(
                        op = "write_placeholder",
                        token = token.as_str(),
                        attempt,
                        "temporary token collision"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.with_op("write_placeholder")),
            }
        }
    }

    async fn finalize(
        &self,
        token: &str,
        selection: &ValidatedSelection,
        link: RemoteLink,
        trace: &mut Trace<'_>,
    ) -> (SubmissionOutcome, Vec<PostCommitEffect>) {
        let complete = CompleteRecord {
            id: link.id,
            quote: selection.quote.clone(),
            original_url: selection.source_url.clone(),
            preview_image_url: link.preview_image_url,
            created_at: self.clock.now_ms(),
        };
        let mutation = LedgerMutation::Finalize {
            token: token.to_string(),
            record: QuoteLinkRecord::Complete(complete.clone()),
        };

        match self.store.update(&mutation).await {
            Ok(update) if update.effect.is_absent() => {
                tracing::info!(
                    op = "finalize",
                    token = token,
                    record_id = complete.id.as_str(),
                    "placeholder gone before finalization, record dropped"
                );
                trace.enter(SubmissionState::Dropped);
                (
                    SubmissionOutcome::Dropped { id: complete.id },
                    vec![PostCommitEffect::notify(messages::DROPPED)],
                )
            }
            Ok(_) => {
                let share_link = share_link(&self.share_base_url, &complete.id);
                trace.enter(SubmissionState::Finalized);
                let effects = vec![
                    PostCommitEffect::copy(share_link.clone()),
                    PostCommitEffect::notify(messages::COPIED),
                ];
                (
                    SubmissionOutcome::Finalized {
                        record: complete,
                        share_link,
                    },
                    effects,
                )
            }
            Err(err) => {
                let message = messages::for_storage_error(&err);
                self.roll_back(token, err.with_op("finalize"), message, trace)
                    .await
            }
        }
    }

    /// Remove the placeholder; a missing placeholder is not an error
    async fn roll_back(
        &self,
        token: &str,
        error: ExError,
        message: String,
        trace: &mut Trace<'_>,
    ) -> (SubmissionOutcome, Vec<PostCommitEffect>) {
        let mut effects = vec![PostCommitEffect::notify(message)];

        let rollback_error = match self
            .store
            .update(&LedgerMutation::Remove {
                id: token.to_string(),
            })
            .await
        {
            Ok(_) => None,
            Err(err) => {
                let err = err.with_op("rollback").with_record_id(token);
                tracing::error!(
                    op = "rollback",
                    token = token,
                    err.code = err.code(),
                    "placeholder could not be removed"
                );
                effects.push(PostCommitEffect::notify(messages::for_storage_error(&err)));
                Some(err)
            }
        };

        trace.enter(SubmissionState::RolledBack);
        (
            SubmissionOutcome::RolledBack {
                error,
                rollback_error,
            },
            effects,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SubmissionState::AwaitingRemote.is_terminal());
        assert!(SubmissionState::Finalized.is_terminal());
        assert!(SubmissionState::Dropped.is_terminal());
        assert!(SubmissionState::Rejected.is_terminal());
    }

    #[test]
    fn test_trigger_payload_new_sets_selection() {
        let trigger = TriggerPayload::new("hello", "https://zenn.dev/a/articles/b");
        assert_eq!(trigger.selected_text.as_deref(), Some("hello"));
    }
}
