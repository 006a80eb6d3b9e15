//! Pure helpers shared by services and views.

use shelf_api_models::ItemListQuery;

/// API path for one page of the item list.
#[must_use]
pub fn build_items_path(query: &ItemListQuery) -> String {
    format!("/v1/items?{}", query.to_search_params())
}

/// Label on the list footer, e.g. `21-40 of 53`.
#[must_use]
pub fn range_label(page: u32, per_page: u32, total_items: u64) -> String {
    if total_items == 0 {
        return "0 of 0".to_string();
    }
    let per_page = u64::from(per_page.max(1));
    let start = u64::from(page.max(1) - 1) * per_page + 1;
    let end = (start + per_page - 1).min(total_items);
    format!("{start}-{end} of {total_items}")
}
