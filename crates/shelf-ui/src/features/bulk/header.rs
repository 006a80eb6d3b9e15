//! Tri-state header selector for the current page.

use crate::features::bulk::selection::SelectionStore;
use crate::models::ItemRow;

/// Display state of the header checkbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderState {
    /// Nothing selected.
    Unchecked,
    /// Some, but fewer than a page, selected.
    Partial,
    /// At least a page worth selected.
    Checked,
}

/// Derive the header state from the selection size and the visible page size.
#[must_use]
pub const fn header_state(count: usize, page_size: usize) -> HeaderState {
    if count == 0 {
        HeaderState::Unchecked
    } else if count >= page_size {
        HeaderState::Checked
    } else {
        HeaderState::Partial
    }
}

/// Apply a header click and return the resulting state.
///
/// Unchecked selects the whole page; partial and checked both clear.
pub fn header_click(selection: &mut SelectionStore, page: &[ItemRow]) -> HeaderState {
    match header_state(selection.count(), page.len()) {
        HeaderState::Unchecked => selection.set_all(page.iter().cloned()),
        HeaderState::Partial | HeaderState::Checked => selection.clear(),
    }
    header_state(selection.count(), page.len())
}
