//! App-wide store combining the item list and the bulk flow.
//!
//! # Design
//! - One owned value; views read it and dispatch through these methods.
//! - Bulk results update the list from the authoritative rows the server
//!   returned, never by patching rows locally.

use shelf_api_models::ItemListResponse;

use crate::features::bulk::header::{HeaderState, header_click, header_state};
use crate::features::bulk::state::BulkState;
use crate::features::bulk::submit::SubmitResolution;
use crate::features::items::state::{ItemsState, apply_page, set_rows};

/// Global client state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppStore {
    /// Item list page and filters.
    pub items: ItemsState,
    /// Selection, dialogs, and submissions.
    pub bulk: BulkState,
}

impl AppStore {
    /// Empty store on the first page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a freshly fetched page.
    pub fn apply_page(&mut self, response: ItemListResponse) {
        apply_page(&mut self.items, response);
    }

    /// Header checkbox state for the visible page.
    #[must_use]
    pub fn header(&self) -> HeaderState {
        header_state(self.bulk.selection.count(), self.items.rows.len())
    }

    /// Handle a click on the header checkbox.
    pub fn click_header(&mut self) -> HeaderState {
        header_click(&mut self.bulk.selection, &self.items.rows)
    }

    /// Reflect a finished submission in the list.
    pub fn apply_resolution(&mut self, resolution: &SubmitResolution) {
        if let SubmitResolution::Applied {
            rows: Some(rows),
            total_items,
            ..
        } = resolution
        {
            let total = total_items.unwrap_or_else(|| u64::try_from(rows.len()).unwrap_or(u64::MAX));
            set_rows(&mut self.items, rows.clone(), total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemRow;
    use shelf_api_models::BulkActionKind;
    use shelf_test_support::fixtures::{id, summaries};

    fn loaded(count: u128) -> AppStore {
        let mut store = AppStore::new();
        store.apply_page(ItemListResponse::new(summaries(count), 40, 1, 20));
        store
    }

    #[test]
    fn header_click_selects_the_visible_page() {
        let mut store = loaded(20);
        assert_eq!(store.header(), HeaderState::Unchecked);
        assert_eq!(store.click_header(), HeaderState::Checked);
        assert_eq!(store.bulk.selection.count(), 20);
        assert_eq!(store.click_header(), HeaderState::Unchecked);
    }

    #[test]
    fn applied_resolutions_replace_rows() {
        let mut store = loaded(5);
        let rows: Vec<ItemRow> = summaries(2).into_iter().map(ItemRow::from).collect();
        store.apply_resolution(&SubmitResolution::Applied {
            kind: BulkActionKind::Trash,
            selection_cleared: true,
            rows: Some(rows),
            total_items: Some(37),
        });
        assert_eq!(store.items.rows.len(), 2);
        assert_eq!(store.items.total_items, 37);
        assert_eq!(store.items.rows[1].id, id(2));
    }

    #[test]
    fn failures_and_stale_results_leave_rows_alone() {
        let mut store = loaded(5);
        store.apply_resolution(&SubmitResolution::Failed {
            kind: BulkActionKind::Location,
            message: "nope".into(),
        });
        store.apply_resolution(&SubmitResolution::Stale {
            kind: BulkActionKind::Location,
        });
        assert_eq!(store.items.rows.len(), 5);
        assert_eq!(store.items.total_items, 40);
    }
}
