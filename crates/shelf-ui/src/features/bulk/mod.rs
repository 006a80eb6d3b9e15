//! Bulk action flow: selection, header selector, dialogs, and submission.

pub mod dialog;
pub mod header;
pub mod selection;
pub mod state;
pub mod submit;

pub use dialog::{
    BulkDialog, DialogContent, DialogRegistry, DialogRenderParams, DialogTrigger, DialogView,
    EMPTY_SELECTION_REASON, TriggerAvailability,
};
pub use header::{HeaderState, header_click, header_state};
pub use selection::{SelectionStore, reconcile};
pub use state::{BulkState, SubmissionPhase, SubmitTicket};
pub use submit::{
    BulkSubmitter, BulkTransport, PendingSubmit, SubmitOptions, SubmitRejected, SubmitResolution,
    SubmitResult, begin_submit, complete_submit,
};
