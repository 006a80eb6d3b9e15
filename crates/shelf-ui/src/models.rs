//! Row snapshots rendered by the item list.

use shelf_api_models::{ItemStatus, ItemSummary, Lifecycle};
use uuid::Uuid;

/// UI-friendly item snapshot, immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRow {
    /// Stable item identifier, unique across pages.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Custody status.
    pub status: ItemStatus,
    /// Lifecycle stage.
    pub lifecycle: Lifecycle,
    /// Category name, if any.
    pub category: Option<String>,
    /// Location name, if any.
    pub location: Option<String>,
    /// Custodian name while in custody.
    pub custodian: Option<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Signed thumbnail URL.
    pub thumbnail: Option<String>,
}

impl ItemRow {
    /// Whether the item is currently held by a team member.
    #[must_use]
    pub fn in_custody(&self) -> bool {
        self.status == ItemStatus::InCustody
    }
}

impl From<ItemSummary> for ItemRow {
    fn from(value: ItemSummary) -> Self {
        Self {
            id: value.id,
            title: value.title,
            status: value.status,
            lifecycle: value.lifecycle,
            category: value.category.map(|label| label.name),
            location: value.location.map(|label| label.name),
            custodian: value.custodian.map(|label| label.name),
            tags: value.tags.into_iter().map(|label| label.name).collect(),
            thumbnail: value.main_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_api_models::{LabelKind, LabelView};
    use shelf_test_support::fixtures::summary;

    #[test]
    fn rows_flatten_label_names() {
        let mut item = summary(1, "Ladder");
        item.status = ItemStatus::InCustody;
        item.custodian = Some(LabelView {
            id: Uuid::from_u128(9),
            kind: LabelKind::TeamMember,
            name: "Ana".into(),
            color: None,
        });
        let row = ItemRow::from(item);
        assert_eq!(row.custodian.as_deref(), Some("Ana"));
        assert!(row.in_custody());
        assert!(row.tags.is_empty());
    }
}
