//! Bulk flow state: selection, dialog flags, and per-kind submission phase.
//!
//! # Design
//! - One explicit value owned by the app store and passed by reference; no
//!   ambient singletons.
//! - Every opening of a dialog starts a new generation so results of a
//!   submission from an earlier opening are recognised as stale.

use std::collections::HashMap;

use shelf_api_models::BulkActionKind;

use crate::features::bulk::dialog::{DialogRegistry, DialogTrigger};
use crate::features::bulk::selection::SelectionStore;

/// Identifies one in-flight submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitTicket {
    /// Dialog the submission belongs to.
    pub kind: BulkActionKind,
    /// Dialog generation at submit time.
    pub generation: u64,
}

/// Submission phase of one dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Dialog closed.
    #[default]
    Idle,
    /// Awaiting confirmation; carries the last failure, if any.
    Open {
        /// Message from the last failed attempt.
        error: Option<String>,
    },
    /// Request in flight; the dialog is locked.
    Submitting {
        /// Ticket of the outstanding request.
        ticket: SubmitTicket,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DialogSession {
    pub(crate) phase: SubmissionPhase,
    pub(crate) generation: u64,
}

/// Selection, dialog flags, and submission sessions for the list view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkState {
    /// Selected rows.
    pub selection: SelectionStore,
    /// Dialog open flags.
    pub dialogs: DialogRegistry,
    pub(crate) sessions: HashMap<BulkActionKind, DialogSession>,
    next_generation: u64,
}

impl BulkState {
    /// Empty selection with every dialog closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the trigger's dialog unless the trigger is inert.
    ///
    /// Re-opening a dialog that is already open keeps its session, so an
    /// in-flight submission stays locked. The trigger's click hook runs for
    /// every enabled click. Returns whether the dialog is open.
    pub fn open_dialog(&mut self, trigger: &DialogTrigger) -> bool {
        if !trigger.is_enabled(self.selection.count()) {
            return false;
        }
        trigger.clicked();
        if self.dialogs.is_open(trigger.kind) {
            return true;
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.dialogs.open(trigger.kind);
        self.sessions.insert(
            trigger.kind,
            DialogSession {
                phase: SubmissionPhase::Open { error: None },
                generation,
            },
        );
        true
    }

    /// Close a dialog; any in-flight result for it becomes stale.
    pub fn close_dialog(&mut self, kind: BulkActionKind) {
        self.dialogs.close(kind);
        if let Some(session) = self.sessions.get_mut(&kind) {
            session.phase = SubmissionPhase::Idle;
        }
    }

    /// Current phase for `kind`.
    #[must_use]
    pub fn phase(&self, kind: BulkActionKind) -> SubmissionPhase {
        self.sessions
            .get(&kind)
            .map(|session| session.phase.clone())
            .unwrap_or_default()
    }

    /// Whether the dialog's fields and confirm button are locked.
    #[must_use]
    pub fn is_disabled(&self, kind: BulkActionKind) -> bool {
        matches!(
            self.sessions.get(&kind).map(|session| &session.phase),
            Some(SubmissionPhase::Submitting { .. })
        )
    }

    /// Inline error for an open dialog.
    #[must_use]
    pub fn error(&self, kind: BulkActionKind) -> Option<&str> {
        match self.sessions.get(&kind).map(|session| &session.phase) {
            Some(SubmissionPhase::Open { error }) => error.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemRow;
    use shelf_test_support::fixtures::summary;

    #[test]
    fn inert_triggers_do_not_open() {
        let mut state = BulkState::new();
        let trigger = DialogTrigger::new(BulkActionKind::Archive);
        assert!(!state.open_dialog(&trigger));
        assert!(!state.dialogs.is_open(BulkActionKind::Archive));

        state.selection.add(ItemRow::from(summary(1, "Saw")));
        assert!(!state.open_dialog(&trigger.clone().disabled(None)));
        assert!(state.open_dialog(&trigger));
        assert_eq!(
            state.phase(BulkActionKind::Archive),
            SubmissionPhase::Open { error: None }
        );
    }

    #[test]
    fn closing_returns_to_idle() {
        let mut state = BulkState::new();
        state.selection.add(ItemRow::from(summary(1, "Saw")));
        state.open_dialog(&DialogTrigger::new(BulkActionKind::Cancel));
        state.close_dialog(BulkActionKind::Cancel);
        assert_eq!(state.phase(BulkActionKind::Cancel), SubmissionPhase::Idle);
        assert!(!state.dialogs.is_open(BulkActionKind::Cancel));
    }
}
