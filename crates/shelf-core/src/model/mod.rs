//! Core asset domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custody status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Nobody holds the item.
    #[default]
    Available,
    /// The item is assigned to a team member.
    InCustody,
}

/// Lifecycle stage of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Item is in active use.
    #[default]
    Active,
    /// Item is kept but not in use.
    Inactive,
    /// Item is archived and hidden from working lists.
    Archived,
    /// Item was cancelled and is hidden from working lists.
    Cancelled,
}

impl Lifecycle {
    /// Whether items in this stage appear in the working list.
    #[must_use]
    pub const fn in_working_set(self) -> bool {
        matches!(self, Self::Active | Self::Inactive)
    }
}

/// Kind discriminator for user-owned labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Item category; at most one per item.
    Category,
    /// Free-form tag; many per item.
    Tag,
    /// Physical location; at most one per item.
    Location,
    /// Team member that can take custody.
    TeamMember,
}

impl LabelKind {
    /// Stable identifier used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Location => "location",
            Self::TeamMember => "team_member",
        }
    }
}

/// A user-owned label (category, tag, location, or team member).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Kind of label.
    pub kind: LabelKind,
    /// Display name.
    pub name: String,
    /// Optional hex colour for categories and tags.
    pub color: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabel {
    /// Kind of label.
    pub kind: LabelKind,
    /// Display name.
    pub name: String,
    /// Optional colour.
    pub color: Option<String>,
}

/// Error-correction level recorded for QR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorCorrection {
    /// Low (~7%).
    #[default]
    L,
    /// Medium (~15%).
    M,
    /// Quartile (~25%).
    Q,
    /// High (~30%).
    H,
}

/// QR code record that may be linked to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCode {
    /// QR identifier encoded in the printed code.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Linked item, if any.
    pub item_id: Option<Uuid>,
    /// Symbol version; `0` lets renderers pick.
    pub version: u8,
    /// Error-correction level.
    pub error_correction: ErrorCorrection,
}

/// Persisted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category label.
    pub category_id: Option<Uuid>,
    /// Location label.
    pub location_id: Option<Uuid>,
    /// Tag labels.
    pub tag_ids: Vec<Uuid>,
    /// Team member holding custody.
    pub custodian_id: Option<Uuid>,
    /// Custody status.
    pub status: ItemStatus,
    /// Lifecycle stage.
    pub lifecycle: Lifecycle,
    /// Signed URL of the main image.
    pub main_image: Option<String>,
    /// Expiry of the signed main image URL.
    pub main_image_expiration: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Note attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note identifier.
    pub id: Uuid,
    /// Parent item.
    pub item_id: Uuid,
    /// Authoring user.
    pub user_id: Uuid,
    /// Markdown body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for attaching a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    /// Target item.
    pub item_id: Uuid,
    /// Markdown body.
    pub content: String,
}

/// Item joined with its resolved labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// The item row.
    pub item: Item,
    /// Resolved category.
    pub category: Option<Label>,
    /// Resolved location.
    pub location: Option<Label>,
    /// Resolved tags in item order.
    pub tags: Vec<Label>,
    /// Resolved custodian.
    pub custodian: Option<Label>,
}

/// Item record with notes and QR codes for the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetailRecord {
    /// Item with labels.
    pub record: ItemRecord,
    /// Notes, newest first.
    pub notes: Vec<Note>,
    /// QR codes linked to the item.
    pub qr_codes: Vec<QrCode>,
}

/// Paging, search, and filter parameters for listing items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Category filter; empty means no filter.
    pub category_ids: Vec<Uuid>,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
            category_ids: Vec::new(),
        }
    }
}

impl ItemQuery {
    /// Number of rows to skip before the requested page.
    #[must_use]
    pub fn skip(&self) -> usize {
        let page = self.page.max(1) - 1;
        (page as usize).saturating_mul(self.per_page as usize)
    }
}

/// One page of items plus the total matching count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPage {
    /// Rows on the requested page.
    pub items: Vec<ItemRecord>,
    /// Total rows matching the query across all pages.
    pub total_items: u64,
}

/// Payload for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewItem {
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category label.
    pub category_id: Option<Uuid>,
    /// Existing QR code to link; a fresh code is created otherwise.
    pub qr_id: Option<Uuid>,
}

/// Partial update for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement category.
    pub category_id: Option<Uuid>,
    /// Replacement main image URL.
    pub main_image: Option<String>,
    /// Replacement main image expiry.
    pub main_image_expiration: Option<DateTime<Utc>>,
}

impl ItemPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.main_image.is_none()
            && self.main_image_expiration.is_none()
    }
}

/// Mutation applied to every item in a bulk selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOperation {
    /// Move items to a location.
    SetLocation {
        /// Target location label.
        location_id: Uuid,
    },
    /// Set or clear the category.
    SetCategory {
        /// Target category label; `None` clears it.
        category_id: Option<Uuid>,
    },
    /// Hand items to a team member.
    AssignCustody {
        /// Custodian label.
        custodian_id: Uuid,
    },
    /// Release custody.
    ReleaseCustody,
    /// Delete items permanently.
    Trash,
    /// Mark items active.
    Activate,
    /// Mark items inactive.
    Deactivate,
    /// Archive items.
    Archive,
    /// Cancel items.
    Cancel,
    /// Attach tags.
    AddTags {
        /// Tags to attach.
        tag_ids: Vec<Uuid>,
    },
    /// Detach tags.
    RemoveTags {
        /// Tags to detach.
        tag_ids: Vec<Uuid>,
    },
}

impl BulkOperation {
    /// Stable identifier used in logs and metrics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetLocation { .. } => "set_location",
            Self::SetCategory { .. } => "set_category",
            Self::AssignCustody { .. } => "assign_custody",
            Self::ReleaseCustody => "release_custody",
            Self::Trash => "trash",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Archive => "archive",
            Self::Cancel => "cancel",
            Self::AddTags { .. } => "add_tags",
            Self::RemoveTags { .. } => "remove_tags",
        }
    }
}

/// Items held by one custodian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodianCount {
    /// Team member label.
    pub team_member: Label,
    /// Number of items they hold.
    pub count: u64,
}

/// Items created in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyCount {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, `1..=12`.
    pub month: u32,
    /// Items created during the month.
    pub count: u64,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardData {
    /// Most recently created items.
    pub newest_items: Vec<ItemRecord>,
    /// Custodians ordered by held item count, descending.
    pub custodians: Vec<CustodianCount>,
    /// Items created per month, oldest month first.
    pub created_per_month: Vec<MonthlyCount>,
    /// Total items owned by the user.
    pub total_items: u64,
}

/// Image bytes with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// MIME type reported by the uploader.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// A time-limited URL for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// Absolute URL.
    pub url: String,
    /// Instant the URL stops validating.
    pub expires_at: DateTime<Utc>,
}

/// Storage key for an item's main image uploaded at `at`.
#[must_use]
pub fn main_image_key(user_id: Uuid, item_id: Uuid, at: DateTime<Utc>) -> String {
    format!("{user_id}/{item_id}/main-image-{}", at.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_uses_one_based_pages() {
        let query = ItemQuery {
            page: 3,
            per_page: 50,
            ..ItemQuery::default()
        };
        assert_eq!(query.skip(), 100);

        let first = ItemQuery {
            page: 0,
            ..ItemQuery::default()
        };
        assert_eq!(first.skip(), 0);
    }

    #[test]
    fn only_active_and_inactive_are_in_the_working_set() {
        assert!(Lifecycle::Active.in_working_set());
        assert!(Lifecycle::Inactive.in_working_set());
        assert!(!Lifecycle::Archived.in_working_set());
        assert!(!Lifecycle::Cancelled.in_working_set());
    }

    #[test]
    fn main_image_key_is_scoped_by_owner_and_item() {
        let user = Uuid::nil();
        let item = Uuid::from_u128(7);
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        assert_eq!(
            main_image_key(user, item, at),
            format!("{user}/{item}/main-image-1700000000")
        );
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ItemPatch::default().is_empty());
        let patch = ItemPatch {
            title: Some("Drill".into()),
            ..ItemPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
