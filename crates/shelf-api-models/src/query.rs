//! List query parameters shared by the item list endpoint and the client.

use serde::{Deserialize, Serialize};
use shelf_core::ItemQuery;
use url::form_urlencoded;
use uuid::Uuid;

/// Allowed page sizes for the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerPage {
    /// Twenty rows.
    #[default]
    Twenty,
    /// Fifty rows.
    Fifty,
    /// One hundred rows.
    Hundred,
}

impl PerPage {
    /// Every option in ascending order.
    pub const ALL: [Self; 3] = [Self::Twenty, Self::Fifty, Self::Hundred];

    /// Numeric page size.
    #[must_use]
    pub const fn get(self) -> u32 {
        match self {
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    /// Map a requested size onto an allowed option, falling back to the default.
    #[must_use]
    pub fn from_value(value: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|option| option.get() == value)
            .unwrap_or_default()
    }
}

/// Page, size, search, and category filter for the item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListQuery {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: PerPage,
    /// Title search string.
    pub s: Option<String>,
    /// Category identifiers to filter by.
    pub category: Vec<Uuid>,
}

impl Default for ItemListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PerPage::default(),
            s: None,
            category: Vec::new(),
        }
    }
}

impl ItemListQuery {
    /// Serialize as a URL query string without the leading `?`.
    #[must_use]
    pub fn to_search_params(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("per_page", &self.per_page.get().to_string());
        if let Some(search) = self.s.as_deref().filter(|s| !s.is_empty()) {
            serializer.append_pair("s", search);
        }
        if !self.category.is_empty() {
            let joined = self
                .category
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            serializer.append_pair("category", &joined);
        }
        serializer.finish()
    }

    /// Parse a query string leniently.
    ///
    /// Unknown keys and unparsable category ids are ignored; invalid page
    /// numbers become `1` and unsupported page sizes fall back to the default.
    #[must_use]
    pub fn from_search_params(raw: &str) -> Self {
        let mut query = Self::default();
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "page" => {
                    query.page = value.parse::<u32>().ok().filter(|p| *p > 0).unwrap_or(1);
                }
                "per_page" => {
                    query.per_page = value
                        .parse::<u32>()
                        .map(PerPage::from_value)
                        .unwrap_or_default();
                }
                "s" => {
                    let trimmed = value.trim();
                    query.s = (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                "category" => {
                    query.category = value
                        .split(',')
                        .filter_map(|part| Uuid::parse_str(part.trim()).ok())
                        .collect();
                }
                _ => {}
            }
        }
        query
    }

    /// Convert into the repository query.
    #[must_use]
    pub fn to_core(&self) -> ItemQuery {
        ItemQuery {
            page: self.page.max(1),
            per_page: self.per_page.get(),
            search: self.s.clone(),
            category_ids: self.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_page_sizes_fall_back_to_default() {
        assert_eq!(PerPage::from_value(50), PerPage::Fifty);
        assert_eq!(PerPage::from_value(35), PerPage::Twenty);
        assert_eq!(PerPage::from_value(0).get(), 20);
    }

    #[test]
    fn search_params_survive_encoding() {
        let query = ItemListQuery {
            page: 3,
            per_page: PerPage::Hundred,
            s: Some("cordless drill".into()),
            category: vec![Uuid::from_u128(1), Uuid::from_u128(2)],
        };
        let encoded = query.to_search_params();
        assert!(encoded.contains("s=cordless+drill"));
        assert_eq!(ItemListQuery::from_search_params(&encoded), query);
    }

    #[test]
    fn lenient_parsing_applies_defaults() {
        let query =
            ItemListQuery::from_search_params("?page=0&per_page=999&s=%20&category=bogus&x=1");
        assert_eq!(query, ItemListQuery::default());
        let core = query.to_core();
        assert_eq!(core.per_page, 20);
        assert_eq!(core.skip(), 0);
    }
}
