//! Dialog registry, triggers, and the resolved dialog view.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use shelf_api_models::{BulkActionKind, CURRENT_SEARCH_PARAMS_FIELD, DEFAULT_ARRAY_FIELD};

use crate::features::bulk::state::BulkState;
use crate::features::bulk::submit::SubmitOptions;

/// Open flag per bulk action kind.
///
/// Flags are independent; rendering at most one dialog is the view's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DialogRegistry {
    open: HashSet<BulkActionKind>,
}

impl DialogRegistry {
    /// Registry with every dialog closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` open.
    pub fn open(&mut self, kind: BulkActionKind) {
        self.open.insert(kind);
    }

    /// Mark `kind` closed.
    pub fn close(&mut self, kind: BulkActionKind) {
        self.open.remove(&kind);
    }

    /// Whether `kind` is open.
    #[must_use]
    pub fn is_open(&self, kind: BulkActionKind) -> bool {
        self.open.contains(&kind)
    }

    /// Open kinds in menu order.
    #[must_use]
    pub fn open_kinds(&self) -> Vec<BulkActionKind> {
        BulkActionKind::ALL
            .into_iter()
            .filter(|kind| self.open.contains(kind))
            .collect()
    }
}

/// Reason shown on hover when the selection is empty.
pub const EMPTY_SELECTION_REASON: &str = "Select at least one asset";

/// Whether a trigger may open its dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TriggerAvailability {
    /// Clicking opens the dialog.
    #[default]
    Enabled,
    /// Clicking does nothing; `reason` is shown on hover.
    Disabled {
        /// Human-readable explanation.
        reason: Option<String>,
    },
}

/// Side effect run when an enabled trigger is clicked.
pub type ClickHook = Arc<dyn Fn(BulkActionKind) + Send + Sync>;

/// Menu entry that opens a bulk dialog.
#[derive(Clone)]
pub struct DialogTrigger {
    /// Dialog opened by this trigger.
    pub kind: BulkActionKind,
    /// Menu label.
    pub label: String,
    /// Caller-imposed availability.
    pub availability: TriggerAvailability,
    on_click: Option<ClickHook>,
}

impl fmt::Debug for DialogTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogTrigger")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("availability", &self.availability)
            .field("on_click", &self.on_click.as_ref().map(|_| ".."))
            .finish()
    }
}

impl DialogTrigger {
    /// Enabled trigger labelled `Update {kind}`.
    #[must_use]
    pub fn new(kind: BulkActionKind) -> Self {
        Self {
            kind,
            label: format!("Update {}", kind.slug()),
            availability: TriggerAvailability::Enabled,
            on_click: None,
        }
    }

    /// Run `hook` before the dialog opens.
    #[must_use]
    pub fn on_click(mut self, hook: impl Fn(BulkActionKind) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(hook));
        self
    }

    /// Invoke the click hook, if any.
    pub(crate) fn clicked(&self) {
        if let Some(hook) = &self.on_click {
            hook(self.kind);
        }
    }

    /// Replace the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Disable the trigger, optionally explaining why.
    #[must_use]
    pub fn disabled(mut self, reason: Option<String>) -> Self {
        self.availability = TriggerAvailability::Disabled { reason };
        self
    }

    /// Whether clicking would open the dialog for a selection of `selected`.
    #[must_use]
    pub fn is_enabled(&self, selected: usize) -> bool {
        selected > 0 && self.availability == TriggerAvailability::Enabled
    }

    /// Hover text for an inert trigger.
    #[must_use]
    pub fn hover_reason(&self, selected: usize) -> Option<&str> {
        match &self.availability {
            TriggerAvailability::Disabled { reason } => reason.as_deref(),
            TriggerAvailability::Enabled if selected == 0 => Some(EMPTY_SELECTION_REASON),
            TriggerAvailability::Enabled => None,
        }
    }
}

/// Fixed record handed to render callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogRenderParams {
    /// Dialog kind.
    pub kind: BulkActionKind,
    /// Number of selected rows.
    pub selected: usize,
    /// Fields and buttons must be locked.
    pub disabled: bool,
    /// Error from the last failed submission.
    pub error: Option<String>,
}

/// Dialog body: fixed text or a callback over [`DialogRenderParams`].
pub enum DialogContent {
    /// Body that does not depend on dialog state.
    Static(String),
    /// Body rendered from the current dialog state.
    Render(Box<dyn Fn(&DialogRenderParams) -> String + Send + Sync>),
}

impl DialogContent {
    /// Produce the body for `params`.
    #[must_use]
    pub fn render(&self, params: &DialogRenderParams) -> String {
        match self {
            Self::Static(body) => body.clone(),
            Self::Render(render) => render(params),
        }
    }
}

impl fmt::Debug for DialogContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(body) => f.debug_tuple("Static").field(body).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// Caller-supplied description of one bulk dialog.
#[derive(Debug)]
pub struct BulkDialog {
    /// Dialog kind.
    pub kind: BulkActionKind,
    /// Title override.
    pub title: Option<String>,
    /// Description override.
    pub description: Option<String>,
    /// Form field carrying the ids.
    pub array_field: String,
    /// Endpoint replacing the `bulk-update-{kind}` convention.
    pub action_url: Option<String>,
    /// Body content.
    pub content: DialogContent,
}

impl BulkDialog {
    /// Dialog for `kind` with default title, description, and id field.
    #[must_use]
    pub fn new(kind: BulkActionKind, content: DialogContent) -> Self {
        Self {
            kind,
            title: None,
            description: None,
            array_field: DEFAULT_ARRAY_FIELD.to_string(),
            action_url: None,
            content,
        }
    }

    /// Post ids under `field` instead of `assetIds`.
    #[must_use]
    pub fn with_array_field(mut self, field: impl Into<String>) -> Self {
        self.array_field = field.into();
        self
    }

    /// Post to `url` instead of the conventional endpoint.
    #[must_use]
    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Submission overrides carried by this dialog.
    #[must_use]
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            endpoint: self.action_url.clone(),
            array_field: self.array_field.clone(),
        }
    }

    /// Resolve against `state`; `None` while the dialog is closed.
    #[must_use]
    pub fn view(&self, state: &BulkState, search_params: &str) -> Option<DialogView> {
        if !state.dialogs.is_open(self.kind) {
            return None;
        }
        let slug = self.kind.slug();
        let selected = state.selection.count();
        let params = DialogRenderParams {
            kind: self.kind,
            selected,
            disabled: state.is_disabled(self.kind),
            error: state.error(self.kind).map(str::to_string),
        };

        let mut hidden_fields = vec![(
            CURRENT_SEARCH_PARAMS_FIELD.to_string(),
            search_params.to_string(),
        )];
        hidden_fields.extend(
            state
                .selection
                .ids()
                .into_iter()
                .enumerate()
                .map(|(index, id)| (format!("{}[{index}]", self.array_field), id.to_string())),
        );

        Some(DialogView {
            kind: self.kind,
            title: self
                .title
                .clone()
                .unwrap_or_else(|| format!("Update {slug}")),
            description: self.description.clone().unwrap_or_else(|| {
                format!("Adjust the {slug} of selected ({selected}) assets.")
            }),
            hidden_fields,
            body: self.content.render(&params),
            disabled: params.disabled,
            error: params.error,
        })
    }
}

/// Everything needed to draw an open dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogView {
    /// Dialog kind.
    pub kind: BulkActionKind,
    /// Heading.
    pub title: String,
    /// Sub-heading.
    pub description: String,
    /// Hidden form inputs in document order.
    pub hidden_fields: Vec<(String, String)>,
    /// Rendered body.
    pub body: String,
    /// Lock fields and the confirm button.
    pub disabled: bool,
    /// Inline error.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemRow;
    use shelf_test_support::fixtures::summaries;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn opening_one_kind_leaves_the_rest_closed() {
        for target in BulkActionKind::ALL {
            let mut registry = DialogRegistry::new();
            registry.open(target);
            for kind in BulkActionKind::ALL {
                assert_eq!(registry.is_open(kind), kind == target);
            }
            registry.close(target);
            assert!(registry.open_kinds().is_empty());
        }
    }

    #[test]
    fn flags_are_independent() {
        let mut registry = DialogRegistry::new();
        registry.open(BulkActionKind::Trash);
        registry.open(BulkActionKind::Location);
        registry.close(BulkActionKind::Trash);
        assert_eq!(registry.open_kinds(), vec![BulkActionKind::Location]);
    }

    #[test]
    fn triggers_explain_why_they_are_inert() {
        let trigger = DialogTrigger::new(BulkActionKind::AssignCustody);
        assert_eq!(trigger.label, "Update assign-custody");
        assert!(!trigger.is_enabled(0));
        assert_eq!(trigger.hover_reason(0), Some(EMPTY_SELECTION_REASON));
        assert!(trigger.is_enabled(2));
        assert_eq!(trigger.hover_reason(2), None);

        let blocked = trigger.disabled(Some("Some assets are already in custody".into()));
        assert!(!blocked.is_enabled(2));
        assert_eq!(
            blocked.hover_reason(2),
            Some("Some assets are already in custody")
        );
    }

    #[test]
    fn view_uses_defaults_and_lists_ids_in_order() {
        let mut state = BulkState::new();
        let rows: Vec<ItemRow> = summaries(3).into_iter().map(ItemRow::from).collect();
        state.selection.set_all(rows.iter().cloned());
        let dialog = BulkDialog::new(
            BulkActionKind::Location,
            DialogContent::Render(Box::new(|params| {
                format!("{} selected, locked={}", params.selected, params.disabled)
            })),
        );
        assert!(dialog.view(&state, "page=2").is_none());

        state.open_dialog(&DialogTrigger::new(BulkActionKind::Location));
        let view = dialog.view(&state, "page=2");
        let Some(view) = view else {
            panic!("dialog should be open");
        };
        assert_eq!(view.title, "Update location");
        assert_eq!(
            view.description,
            "Adjust the location of selected (3) assets."
        );
        assert_eq!(view.body, "3 selected, locked=false");
        assert_eq!(
            view.hidden_fields[0],
            ("currentSearchParams".to_string(), "page=2".to_string())
        );
        assert_eq!(
            view.hidden_fields[3],
            ("assetIds[2]".to_string(), rows[2].id.to_string())
        );
    }

    #[test]
    fn overrides_flow_into_submit_options() {
        let dialog = BulkDialog::new(BulkActionKind::Archive, DialogContent::Static(String::new()));
        assert_eq!(dialog.submit_options(), SubmitOptions::default());

        let dialog = dialog
            .with_array_field("kitIds")
            .with_action_url("/api/kits/bulk-archive");
        let options = dialog.submit_options();
        assert_eq!(options.endpoint.as_deref(), Some("/api/kits/bulk-archive"));
        assert_eq!(options.array_field, "kitIds");
    }

    #[test]
    fn click_hook_runs_only_for_enabled_triggers() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        let trigger = DialogTrigger::new(BulkActionKind::Category).on_click(move |kind| {
            assert_eq!(kind, BulkActionKind::Category);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut state = BulkState::new();
        assert!(!state.open_dialog(&trigger));
        assert_eq!(clicks.load(Ordering::SeqCst), 0);

        state.selection.set_all(summaries(1).into_iter().map(ItemRow::from));
        assert!(!state.open_dialog(&trigger.clone().disabled(None)));
        assert_eq!(clicks.load(Ordering::SeqCst), 0);

        assert!(state.open_dialog(&trigger));
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert!(state.dialogs.is_open(BulkActionKind::Category));
    }

    #[test]
    fn static_content_ignores_state() {
        let content = DialogContent::Static("Are you sure?".into());
        let params = DialogRenderParams {
            kind: BulkActionKind::Trash,
            selected: 4,
            disabled: true,
            error: None,
        };
        assert_eq!(content.render(&params), "Are you sure?");
    }
}
