//! Bulk action submission.
//!
//! # Design
//! - `begin_submit` and `complete_submit` are pure transitions over
//!   [`BulkState`]; the async [`BulkSubmitter`] only moves bytes between them.
//! - Failures of any kind end as an inline message on the open dialog.
//! - Results are matched to the dialog by ticket; a closed or reopened dialog
//!   ignores them.

use async_trait::async_trait;
use shelf_api_models::{
    BulkActionKind, BulkActionParams, BulkActionRequest, BulkActionResponse, BulkOutcome,
    DEFAULT_ARRAY_FIELD, ItemListQuery, ItemListResponse,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::features::bulk::selection::reconcile;
use crate::features::bulk::state::{BulkState, SubmissionPhase, SubmitTicket};
use crate::models::ItemRow;
use crate::services::api::TransportError;

/// Why a submission was not started.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// The dialog is closed.
    #[error("dialog is not open")]
    NotOpen,
    /// A request for this dialog is already outstanding.
    #[error("submission already in flight")]
    InFlight,
    /// Nothing is selected.
    #[error("no assets selected")]
    EmptySelection,
}

/// Result of one request, before it is applied to state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResult {
    /// The server applied the action.
    Applied {
        /// Authoritative rows, when known.
        rows: Option<Vec<ItemRow>>,
        /// Total matching items, when known.
        total_items: Option<u64>,
    },
    /// The action failed with a message for the dialog.
    Failed {
        /// Inline message.
        message: String,
    },
}

impl From<BulkOutcome> for SubmitResult {
    fn from(outcome: BulkOutcome) -> Self {
        match outcome {
            BulkOutcome::Success { items, total_items } => Self::Applied {
                rows: items.map(|items| items.into_iter().map(ItemRow::from).collect()),
                total_items,
            },
            BulkOutcome::Failure { message } => Self::Failed { message },
        }
    }
}

/// What applying a result did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResolution {
    /// Selection reconciled and dialog closed.
    Applied {
        /// Dialog kind.
        kind: BulkActionKind,
        /// Whether the selection was emptied.
        selection_cleared: bool,
        /// Authoritative rows for the list, when known.
        rows: Option<Vec<ItemRow>>,
        /// Total matching items, when known.
        total_items: Option<u64>,
    },
    /// Dialog reopened for correction with the message shown inline.
    Failed {
        /// Dialog kind.
        kind: BulkActionKind,
        /// Inline message.
        message: String,
    },
    /// The dialog was closed or reopened meanwhile; nothing changed.
    Stale {
        /// Dialog kind.
        kind: BulkActionKind,
    },
}

/// Move an open dialog to submitting.
///
/// # Errors
///
/// Returns [`SubmitRejected`] when the dialog is closed, already submitting,
/// or the selection is empty.
pub fn begin_submit(
    state: &mut BulkState,
    kind: BulkActionKind,
) -> Result<SubmitTicket, SubmitRejected> {
    let session = state
        .sessions
        .get_mut(&kind)
        .ok_or(SubmitRejected::NotOpen)?;
    match session.phase {
        SubmissionPhase::Idle => Err(SubmitRejected::NotOpen),
        SubmissionPhase::Submitting { .. } => Err(SubmitRejected::InFlight),
        SubmissionPhase::Open { .. } => {
            if state.selection.is_empty() {
                return Err(SubmitRejected::EmptySelection);
            }
            let ticket = SubmitTicket {
                kind,
                generation: session.generation,
            };
            session.phase = SubmissionPhase::Submitting { ticket };
            Ok(ticket)
        }
    }
}

/// Apply the result of the request identified by `ticket`.
pub fn complete_submit(
    state: &mut BulkState,
    ticket: SubmitTicket,
    result: SubmitResult,
) -> SubmitResolution {
    let kind = ticket.kind;
    let Some(session) = state
        .sessions
        .get_mut(&kind)
        .filter(|session| session.phase == SubmissionPhase::Submitting { ticket })
    else {
        debug!(kind = kind.slug(), "ignoring stale bulk result");
        return SubmitResolution::Stale { kind };
    };

    match result {
        SubmitResult::Failed { message } => {
            session.phase = SubmissionPhase::Open {
                error: Some(message.clone()),
            };
            SubmitResolution::Failed { kind, message }
        }
        SubmitResult::Applied { rows, total_items } => {
            let selection_cleared = kind.clears_selection();
            if selection_cleared {
                state.selection.clear();
            } else if let Some(rows) = &rows {
                state.selection = reconcile(&state.selection, rows);
            }
            state.close_dialog(kind);
            SubmitResolution::Applied {
                kind,
                selection_cleared,
                rows,
                total_items,
            }
        }
    }
}

/// Network seam used by [`BulkSubmitter`].
#[async_trait]
pub trait BulkTransport: Send + Sync {
    /// POST `form` to `endpoint` and decode the body.
    async fn post_bulk(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<BulkActionResponse, TransportError>;

    /// Fetch one page of the list.
    async fn fetch_items(&self, query: &ItemListQuery) -> Result<ItemListResponse, TransportError>;
}

/// Per-dialog overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Endpoint replacing the `bulk-update-{kind}` convention.
    pub endpoint: Option<String>,
    /// Form field carrying the ids.
    pub array_field: String,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            array_field: DEFAULT_ARRAY_FIELD.to_string(),
        }
    }
}

/// A started submission ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSubmit {
    /// Ticket to complete with.
    pub ticket: SubmitTicket,
    /// Target endpoint.
    pub endpoint: String,
    /// Encoded form body.
    pub form: Vec<(String, String)>,
    /// List context used for an authoritative re-fetch.
    pub context: ItemListQuery,
}

/// Invoked after a submission applied.
pub type SuccessCallback = Box<dyn Fn(BulkActionKind) + Send + Sync>;

/// Drives one request per dialog through a [`BulkTransport`].
pub struct BulkSubmitter<T> {
    transport: T,
    on_success: Option<SuccessCallback>,
}

impl<T: BulkTransport> BulkSubmitter<T> {
    /// Submitter over `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            on_success: None,
        }
    }

    /// Register a callback run after every applied submission.
    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(BulkActionKind) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a submission and encode its request.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejected`] when [`begin_submit`] refuses.
    pub fn prepare(
        &self,
        state: &mut BulkState,
        kind: BulkActionKind,
        params: BulkActionParams,
        context: &ItemListQuery,
        options: &SubmitOptions,
    ) -> Result<PendingSubmit, SubmitRejected> {
        let ticket = begin_submit(state, kind)?;
        let request = BulkActionRequest {
            kind,
            ids: state.selection.ids(),
            params,
            current_search_params: context.to_search_params(),
        };
        Ok(PendingSubmit {
            ticket,
            endpoint: options
                .endpoint
                .clone()
                .unwrap_or_else(|| kind.endpoint()),
            form: request.to_form_pairs(&options.array_field),
            context: context.clone(),
        })
    }

    /// Send a prepared submission; never fails, failures become messages.
    pub async fn send(&self, pending: &PendingSubmit) -> SubmitResult {
        let kind = pending.ticket.kind.slug();
        let response = match self
            .transport
            .post_bulk(&pending.endpoint, &pending.form)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(kind, error = %err, "bulk request failed");
                return SubmitResult::Failed {
                    message: err.user_message(),
                };
            }
        };

        match SubmitResult::from(response.outcome()) {
            SubmitResult::Applied { rows: None, .. } => {
                match self.transport.fetch_items(&pending.context).await {
                    Ok(page) => SubmitResult::Applied {
                        rows: Some(page.items.into_iter().map(ItemRow::from).collect()),
                        total_items: Some(page.total_items),
                    },
                    Err(err) => {
                        warn!(kind, error = %err, "re-fetch after bulk action failed");
                        SubmitResult::Applied {
                            rows: None,
                            total_items: None,
                        }
                    }
                }
            }
            other => other,
        }
    }

    /// Apply a result and run the success callback when it applied.
    pub fn finish(
        &self,
        state: &mut BulkState,
        ticket: SubmitTicket,
        result: SubmitResult,
    ) -> SubmitResolution {
        let resolution = complete_submit(state, ticket, result);
        if let SubmitResolution::Applied { kind, .. } = &resolution {
            info!(kind = kind.slug(), "bulk action applied");
            if let Some(callback) = &self.on_success {
                callback(*kind);
            }
        }
        resolution
    }

    /// Prepare, send, and finish in one go.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejected`] when the submission could not start.
    pub async fn submit(
        &self,
        state: &mut BulkState,
        kind: BulkActionKind,
        params: BulkActionParams,
        context: &ItemListQuery,
        options: &SubmitOptions,
    ) -> Result<SubmitResolution, SubmitRejected> {
        let pending = self.prepare(state, kind, params, context, options)?;
        let result = self.send(&pending).await;
        Ok(self.finish(state, pending.ticket, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bulk::dialog::DialogTrigger;
    use shelf_api_models::{ErrorMessage, ItemSummary};
    use shelf_test_support::fixtures::{id, summaries};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Reply = fn() -> Result<BulkActionResponse, TransportError>;

    struct FakeTransport {
        reply: Reply,
        page: Vec<ItemSummary>,
        posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
        fetches: AtomicUsize,
    }

    impl FakeTransport {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                page: summaries(3),
                posts: Mutex::new(Vec::new()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn posts(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.posts.lock().map(|p| p.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl BulkTransport for FakeTransport {
        async fn post_bulk(
            &self,
            endpoint: &str,
            form: &[(String, String)],
        ) -> Result<BulkActionResponse, TransportError> {
            if let Ok(mut posts) = self.posts.lock() {
                posts.push((endpoint.to_string(), form.to_vec()));
            }
            (self.reply)()
        }

        async fn fetch_items(
            &self,
            _query: &ItemListQuery,
        ) -> Result<ItemListResponse, TransportError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(ItemListResponse::new(self.page.clone(), 3, 1, 20))
        }
    }

    fn selected_state(kind: BulkActionKind, count: u128) -> BulkState {
        let mut state = BulkState::new();
        state
            .selection
            .set_all(summaries(count).into_iter().map(ItemRow::from));
        assert!(state.open_dialog(&DialogTrigger::new(kind)));
        state
    }

    fn page_of(ids: &[u128]) -> Vec<ItemSummary> {
        let all = summaries(10);
        ids.iter()
            .filter_map(|n| all.iter().find(|row| row.id == id(*n)).cloned())
            .collect()
    }

    #[tokio::test]
    async fn trash_success_clears_selection_and_closes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Ok(BulkActionResponse::succeeded(Vec::new(), 0))
        }))
        .on_success(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let mut state = selected_state(BulkActionKind::Trash, 5);

        let resolution = submitter
            .submit(
                &mut state,
                BulkActionKind::Trash,
                BulkActionParams::default(),
                &ItemListQuery::default(),
                &SubmitOptions::default(),
            )
            .await;
        assert!(matches!(
            resolution,
            Ok(SubmitResolution::Applied {
                selection_cleared: true,
                ..
            })
        ));
        assert!(state.selection.is_empty());
        assert!(!state.dialogs.is_open(BulkActionKind::Trash));
        assert_eq!(state.phase(BulkActionKind::Trash), SubmissionPhase::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn location_success_intersects_with_authoritative_rows() {
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Ok(BulkActionResponse::succeeded(page_of(&[1, 3, 7]), 3))
        }));
        let mut state = selected_state(BulkActionKind::Location, 3);

        let resolution = submitter
            .submit(
                &mut state,
                BulkActionKind::Location,
                BulkActionParams {
                    location_id: Some(id(50)),
                    ..BulkActionParams::default()
                },
                &ItemListQuery::default(),
                &SubmitOptions::default(),
            )
            .await;
        assert!(matches!(
            resolution,
            Ok(SubmitResolution::Applied {
                selection_cleared: false,
                ..
            })
        ));
        assert_eq!(state.selection.ids(), vec![id(1), id(3)]);

        let posts = submitter.transport().posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "/api/assets/bulk-update-location");
        assert!(posts[0]
            .1
            .contains(&("locationId".to_string(), id(50).to_string())));
    }

    #[tokio::test]
    async fn error_member_wins_over_success_flag() {
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Ok(BulkActionResponse {
                success: true,
                error: Some(ErrorMessage {
                    message: "Location not found".into(),
                }),
                items: None,
                total_items: None,
            })
        }));
        let mut state = selected_state(BulkActionKind::Location, 2);

        let resolution = submitter
            .submit(
                &mut state,
                BulkActionKind::Location,
                BulkActionParams::default(),
                &ItemListQuery::default(),
                &SubmitOptions::default(),
            )
            .await;
        assert!(matches!(resolution, Ok(SubmitResolution::Failed { .. })));
        assert!(state.dialogs.is_open(BulkActionKind::Location));
        assert!(!state.is_disabled(BulkActionKind::Location));
        assert_eq!(state.error(BulkActionKind::Location), Some("Location not found"));
        assert_eq!(state.selection.count(), 2);
    }

    #[tokio::test]
    async fn transport_errors_become_inline_messages() {
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Err(TransportError::Status { status: 502 })
        }));
        let mut state = selected_state(BulkActionKind::Activate, 1);
        let resolution = submitter
            .submit(
                &mut state,
                BulkActionKind::Activate,
                BulkActionParams::default(),
                &ItemListQuery::default(),
                &SubmitOptions::default(),
            )
            .await;
        assert!(matches!(resolution, Ok(SubmitResolution::Failed { .. })));
        assert!(state.error(BulkActionKind::Activate).is_some());
    }

    #[tokio::test]
    async fn success_without_rows_refetches_the_page() {
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Ok(BulkActionResponse {
                success: true,
                ..BulkActionResponse::default()
            })
        }));
        let mut state = selected_state(BulkActionKind::Deactivate, 5);
        let resolution = submitter
            .submit(
                &mut state,
                BulkActionKind::Deactivate,
                BulkActionParams::default(),
                &ItemListQuery::default(),
                &SubmitOptions::default(),
            )
            .await;
        assert!(matches!(
            resolution,
            Ok(SubmitResolution::Applied {
                total_items: Some(3),
                ..
            })
        ));
        assert_eq!(submitter.transport().fetches.load(Ordering::SeqCst), 1);
        assert_eq!(state.selection.ids(), vec![id(1), id(2), id(3)]);
    }

    #[tokio::test]
    async fn overrides_change_endpoint_and_id_field() {
        let submitter = BulkSubmitter::new(FakeTransport::new(|| {
            Ok(BulkActionResponse::succeeded(Vec::new(), 0))
        }));
        let mut state = selected_state(BulkActionKind::Archive, 2);
        let options = SubmitOptions {
            endpoint: Some("/api/kits/bulk-archive".into()),
            array_field: "kitIds".into(),
        };
        let context = ItemListQuery {
            page: 3,
            ..ItemListQuery::default()
        };
        let pending = submitter.prepare(
            &mut state,
            BulkActionKind::Archive,
            BulkActionParams::default(),
            &context,
            &options,
        );
        let Ok(pending) = pending else {
            panic!("submission should start");
        };
        assert_eq!(pending.endpoint, "/api/kits/bulk-archive");
        assert_eq!(pending.form[0], ("kitIds[0]".to_string(), id(1).to_string()));
        assert!(pending.form.contains(&(
            "currentSearchParams".to_string(),
            "page=3&per_page=20".to_string()
        )));
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let mut state = selected_state(BulkActionKind::TagAdd, 2);
        let first = begin_submit(&mut state, BulkActionKind::TagAdd);
        assert!(first.is_ok());
        assert!(state.is_disabled(BulkActionKind::TagAdd));
        assert_eq!(
            begin_submit(&mut state, BulkActionKind::TagAdd),
            Err(SubmitRejected::InFlight)
        );
        assert_eq!(
            begin_submit(&mut state, BulkActionKind::TagRemove),
            Err(SubmitRejected::NotOpen)
        );
    }

    #[test]
    fn reopening_an_open_dialog_keeps_it_locked() -> Result<(), SubmitRejected> {
        let kind = BulkActionKind::Location;
        let mut state = selected_state(kind, 2);
        let ticket = begin_submit(&mut state, kind)?;

        assert!(state.open_dialog(&DialogTrigger::new(kind)));
        assert!(state.is_disabled(kind));
        assert_eq!(begin_submit(&mut state, kind), Err(SubmitRejected::InFlight));

        let resolution = complete_submit(
            &mut state,
            ticket,
            SubmitResult::Failed {
                message: "Location not found".into(),
            },
        );
        assert!(matches!(resolution, SubmitResolution::Failed { .. }));
        Ok(())
    }

    #[test]
    fn empty_selection_cannot_submit() {
        let mut state = selected_state(BulkActionKind::Category, 1);
        state.selection.clear();
        assert_eq!(
            begin_submit(&mut state, BulkActionKind::Category),
            Err(SubmitRejected::EmptySelection)
        );
    }

    #[test]
    fn results_for_closed_or_reopened_dialogs_are_ignored() -> Result<(), SubmitRejected> {
        let kind = BulkActionKind::ReleaseCustody;
        let mut state = selected_state(kind, 3);
        let ticket = begin_submit(&mut state, kind)?;
        state.close_dialog(kind);

        let applied = SubmitResult::Applied {
            rows: Some(Vec::new()),
            total_items: Some(0),
        };
        assert_eq!(
            complete_submit(&mut state, ticket, applied.clone()),
            SubmitResolution::Stale { kind }
        );
        assert_eq!(state.selection.count(), 3);

        assert!(state.open_dialog(&DialogTrigger::new(kind)));
        assert_eq!(
            complete_submit(&mut state, ticket, applied),
            SubmitResolution::Stale { kind }
        );
        assert_eq!(state.phase(kind), SubmissionPhase::Open { error: None });
        Ok(())
    }

    #[test]
    fn independent_kinds_submit_concurrently() -> Result<(), SubmitRejected> {
        let mut state = selected_state(BulkActionKind::Location, 2);
        assert!(state.open_dialog(&DialogTrigger::new(BulkActionKind::Category)));
        let location = begin_submit(&mut state, BulkActionKind::Location)?;
        let category = begin_submit(&mut state, BulkActionKind::Category)?;
        assert_ne!(location.kind, category.kind);
        Ok(())
    }
}
