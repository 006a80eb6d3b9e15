#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the Shelf public API.
//!
//! These types are re-used by the client core for request/response encoding
//! so both sides agree on one contract. Conversions from domain records live
//! here so the mapping stays in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shelf_core::{
    CustodianCount, DashboardData, ItemDetailRecord, ItemPatch, ItemRecord, Label, NewItem,
    NewLabel, Note, QrCode,
};
pub use shelf_core::{ErrorCorrection, ItemStatus, LabelKind, Lifecycle};

mod bulk;
mod query;

pub use bulk::{
    BULK_ROUTE_PREFIX, BulkActionKind, BulkActionParams, BulkActionRequest, BulkActionResponse,
    BulkFormError, BulkOutcome, CURRENT_SEARCH_PARAMS_FIELD, DEFAULT_ARRAY_FIELD, ErrorEnvelope,
    ErrorMessage,
};
pub use query::{ItemListQuery, PerPage};

/// RFC9457-compatible problem document surfaced on validation/runtime errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    /// URI reference identifying the problem type.
    pub kind: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Parameters that failed validation, if applicable.
    pub invalid_params: Option<Vec<ProblemInvalidParam>>,
}

/// Invalid parameter pointer surfaced alongside a [`ProblemDetails`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemInvalidParam {
    /// JSON Pointer to the offending field.
    pub pointer: String,
    /// Human-readable description of the validation failure.
    pub message: String,
}

/// Label as rendered in lists and pickers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelView {
    /// Label identifier.
    pub id: Uuid,
    /// Label kind.
    pub kind: LabelKind,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional colour.
    pub color: Option<String>,
}

impl From<Label> for LabelView {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            kind: label.kind,
            name: label.name,
            color: label.color,
        }
    }
}

/// Row shown in the item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSummary {
    /// Item identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional description.
    pub description: Option<String>,
    /// Custody status.
    pub status: ItemStatus,
    /// Lifecycle stage.
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Category, if set.
    pub category: Option<LabelView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Location, if set.
    pub location: Option<LabelView>,
    #[serde(default)]
    /// Attached tags.
    pub tags: Vec<LabelView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Current custodian.
    pub custodian: Option<LabelView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Signed main image URL.
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Expiry of the signed main image URL.
    pub main_image_expiration: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRecord> for ItemSummary {
    fn from(record: ItemRecord) -> Self {
        let item = record.item;
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            status: item.status,
            lifecycle: item.lifecycle,
            category: record.category.map(LabelView::from),
            location: record.location.map(LabelView::from),
            tags: record.tags.into_iter().map(LabelView::from).collect(),
            custodian: record.custodian.map(LabelView::from),
            main_image: item.main_image,
            main_image_expiration: item.main_image_expiration,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Note attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteView {
    /// Note identifier.
    pub id: Uuid,
    /// Markdown body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Note> for NoteView {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            created_at: note.created_at,
        }
    }
}

/// QR code linked to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrView {
    /// QR identifier.
    pub id: Uuid,
    /// Symbol version.
    pub version: u8,
    /// Error-correction level.
    pub error_correction: ErrorCorrection,
}

impl From<QrCode> for QrView {
    fn from(qr: QrCode) -> Self {
        Self {
            id: qr.id,
            version: qr.version,
            error_correction: qr.error_correction,
        }
    }
}

/// Full item payload for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    #[serde(flatten)]
    /// Row-level fields.
    pub summary: ItemSummary,
    /// Notes, newest first.
    pub notes: Vec<NoteView>,
    /// Linked QR codes.
    pub qr_codes: Vec<QrView>,
}

impl From<ItemDetailRecord> for ItemDetail {
    fn from(detail: ItemDetailRecord) -> Self {
        Self {
            summary: ItemSummary::from(detail.record),
            notes: detail.notes.into_iter().map(NoteView::from).collect(),
            qr_codes: detail.qr_codes.into_iter().map(QrView::from).collect(),
        }
    }
}

/// One page of the item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ItemListResponse {
    /// Rows on the page.
    pub items: Vec<ItemSummary>,
    /// Total rows matching the query.
    pub total_items: u64,
    /// Page number served.
    pub page: u32,
    /// Page size served.
    pub per_page: u32,
    /// Number of pages at this size.
    pub total_pages: u64,
}

impl ItemListResponse {
    /// Assemble a response, deriving the page count.
    #[must_use]
    pub fn new(items: Vec<ItemSummary>, total_items: u64, page: u32, per_page: u32) -> Self {
        let size = u64::from(per_page.max(1));
        Self {
            items,
            total_items,
            page,
            per_page,
            total_pages: total_items.div_ceil(size),
        }
    }
}

/// Body for `POST /v1/items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreateItemRequest {
    /// Display title.
    pub title: String,
    #[serde(default)]
    /// Optional description.
    pub description: Option<String>,
    #[serde(default)]
    /// Optional category.
    pub category_id: Option<Uuid>,
    #[serde(default)]
    /// Existing QR code to link.
    pub qr_id: Option<Uuid>,
}

impl CreateItemRequest {
    /// Convert into the domain payload.
    #[must_use]
    pub fn to_new_item(&self) -> NewItem {
        NewItem {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            category_id: self.category_id,
            qr_id: self.qr_id,
        }
    }
}

/// Body for `PATCH /v1/items/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UpdateItemRequest {
    #[serde(default)]
    /// Replacement title.
    pub title: Option<String>,
    #[serde(default)]
    /// Replacement description.
    pub description: Option<String>,
    #[serde(default)]
    /// Replacement category.
    pub category_id: Option<Uuid>,
}

impl UpdateItemRequest {
    /// Convert into the domain patch.
    #[must_use]
    pub fn to_patch(&self) -> ItemPatch {
        ItemPatch {
            title: self.title.as_deref().map(str::trim).map(str::to_string),
            description: self.description.clone(),
            category_id: self.category_id,
            ..ItemPatch::default()
        }
    }
}

/// Body for `POST /v1/items/{id}/notes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateNoteRequest {
    /// Markdown body.
    pub content: String,
}

/// Body for creating a label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateLabelRequest {
    /// Display name.
    pub name: String,
    #[serde(default)]
    /// Optional colour.
    pub color: Option<String>,
}

impl CreateLabelRequest {
    /// Convert into the domain payload for `kind`.
    #[must_use]
    pub fn to_new_label(&self, kind: LabelKind) -> NewLabel {
        NewLabel {
            kind,
            name: self.name.trim().to_string(),
            color: self.color.clone(),
        }
    }
}

/// Successful main image upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUploadResponse {
    /// Signed URL of the stored image.
    pub url: String,
    /// Instant the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Custodian with the number of items they hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustodianView {
    /// Team member.
    pub team_member: LabelView,
    /// Items held.
    pub count: u64,
}

impl From<CustodianCount> for CustodianView {
    fn from(entry: CustodianCount) -> Self {
        Self {
            team_member: LabelView::from(entry.team_member),
            count: entry.count,
        }
    }
}

/// Items created in one month, keyed `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyCountView {
    /// Month key.
    pub month: String,
    /// Items created.
    pub count: u64,
}

/// Dashboard aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DashboardResponse {
    /// Newest items.
    pub newest_items: Vec<ItemSummary>,
    /// Custodians by held count, descending.
    pub custodians: Vec<CustodianView>,
    /// Items created per month, oldest first.
    pub created_per_month: Vec<MonthlyCountView>,
    /// Total items owned.
    pub total_items: u64,
}

impl From<DashboardData> for DashboardResponse {
    fn from(data: DashboardData) -> Self {
        Self {
            newest_items: data
                .newest_items
                .into_iter()
                .map(ItemSummary::from)
                .collect(),
            custodians: data
                .custodians
                .into_iter()
                .map(CustodianView::from)
                .collect(),
            created_per_month: data
                .created_per_month
                .into_iter()
                .map(|entry| MonthlyCountView {
                    month: format!("{:04}-{:02}", entry.year, entry.month),
                    count: entry.count,
                })
                .collect(),
            total_items: data.total_items,
        }
    }
}
