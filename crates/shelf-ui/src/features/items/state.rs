//! Item list state and pure transformations over it.

use shelf_api_models::{ItemListQuery, ItemListResponse, PerPage};
use uuid::Uuid;

use crate::models::ItemRow;

/// Search and category filters applied to the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemFilters {
    /// Title search string.
    pub search: Option<String>,
    /// Category identifiers.
    pub category: Vec<Uuid>,
}

impl ItemFilters {
    /// Query string for these filters on the first page at the default size.
    #[must_use]
    pub fn to_search_params(&self) -> String {
        ItemListQuery {
            s: self.search.clone(),
            category: self.category.clone(),
            ..ItemListQuery::default()
        }
        .to_search_params()
    }
}

/// Current page of the item list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemsState {
    /// Rows on the visible page.
    pub rows: Vec<ItemRow>,
    /// Total rows matching the filters.
    pub total_items: u64,
    /// Active filters.
    pub filters: ItemFilters,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: PerPage,
}

impl Default for ItemsState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total_items: 0,
            filters: ItemFilters::default(),
            page: 1,
            per_page: PerPage::default(),
        }
    }
}

impl ItemsState {
    /// Query describing the visible page; also the context sent with bulk actions.
    #[must_use]
    pub fn query(&self) -> ItemListQuery {
        ItemListQuery {
            page: self.page,
            per_page: self.per_page,
            s: self.filters.search.clone(),
            category: self.filters.category.clone(),
        }
    }

    /// Number of pages at the current size.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_items
            .div_ceil(u64::from(self.per_page.get()))
            .max(1)
    }
}

/// Replace the visible rows and total.
pub fn set_rows(state: &mut ItemsState, rows: Vec<ItemRow>, total_items: u64) {
    state.rows = rows;
    state.total_items = total_items;
}

/// Apply a fetched page, including the page/size the server actually served.
pub fn apply_page(state: &mut ItemsState, response: ItemListResponse) {
    state.page = response.page.max(1);
    state.per_page = PerPage::from_value(response.per_page);
    set_rows(
        state,
        response.items.into_iter().map(ItemRow::from).collect(),
        response.total_items,
    );
}

/// Adopt the list context from a URL query string.
pub fn apply_query(state: &mut ItemsState, raw: &str) {
    let query = ItemListQuery::from_search_params(raw);
    state.page = query.page;
    state.per_page = query.per_page;
    state.filters = ItemFilters {
        search: query.s,
        category: query.category,
    };
}

/// Change the search string; returns to the first page.
pub fn set_search(state: &mut ItemsState, search: &str) {
    let trimmed = search.trim();
    state.filters.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
    state.page = 1;
}

/// Change the category filter; returns to the first page.
pub fn set_category(state: &mut ItemsState, category: Vec<Uuid>) {
    state.filters.category = category;
    state.page = 1;
}

/// Move to `page`, never below the first.
pub fn set_page(state: &mut ItemsState, page: u32) {
    state.page = page.max(1);
}

/// Change the page size; returns to the first page.
pub fn set_per_page(state: &mut ItemsState, per_page: PerPage) {
    state.per_page = per_page;
    state.page = 1;
}

/// Identifiers of the visible rows in display order.
#[must_use]
pub fn visible_ids(state: &ItemsState) -> Vec<Uuid> {
    state.rows.iter().map(|row| row.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_test_support::fixtures::{id, summaries};

    #[test]
    fn fetched_pages_replace_rows_and_paging() {
        let mut state = ItemsState::default();
        apply_page(&mut state, ItemListResponse::new(summaries(3), 53, 2, 50));
        assert_eq!(state.page, 2);
        assert_eq!(state.per_page, PerPage::Fifty);
        assert_eq!(state.total_items, 53);
        assert_eq!(state.total_pages(), 2);
        assert_eq!(visible_ids(&state), vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn filter_changes_reset_the_page() {
        let mut state = ItemsState::default();
        set_page(&mut state, 4);
        set_search(&mut state, "  drill ");
        assert_eq!(state.page, 1);
        assert_eq!(state.filters.search.as_deref(), Some("drill"));

        set_page(&mut state, 0);
        assert_eq!(state.page, 1);

        set_page(&mut state, 3);
        set_category(&mut state, vec![id(9)]);
        assert_eq!(state.page, 1);
        set_search(&mut state, "   ");
        assert_eq!(state.filters.search, None);
    }

    #[test]
    fn query_round_trips_through_the_url() {
        let mut state = ItemsState::default();
        set_search(&mut state, "saw");
        set_per_page(&mut state, PerPage::Hundred);
        set_page(&mut state, 2);
        let raw = state.query().to_search_params();

        let mut restored = ItemsState::default();
        apply_query(&mut restored, &raw);
        assert_eq!(restored.query(), state.query());
    }

    #[test]
    fn filters_serialize_without_paging_state() {
        let filters = ItemFilters {
            search: Some("lamp".into()),
            category: vec![id(4)],
        };
        assert_eq!(
            filters.to_search_params(),
            format!("page=1&per_page=20&s=lamp&category={}", id(4))
        );
    }

    #[test]
    fn empty_lists_still_have_one_page() {
        assert_eq!(ItemsState::default().total_pages(), 1);
    }
}
