//! Repository and storage traits implemented by Shelf adapters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::model::{
    BulkOperation, DashboardData, ImageUpload, ItemDetailRecord, ItemPage, ItemPatch, ItemQuery,
    ItemRecord, Label, LabelKind, NewItem, NewLabel, NewNote, Note, SignedUrl,
};

/// Owner-scoped persistence for items, notes, and labels.
///
/// Every method takes the acting user; rows owned by someone else behave as
/// if they did not exist.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Fetch one item with labels, notes (newest first), and QR codes.
    async fn get_item(&self, user_id: Uuid, id: Uuid) -> CoreResult<ItemDetailRecord>;

    /// List working-set items, newest first, honouring paging and filters.
    async fn list_items(&self, user_id: Uuid, query: &ItemQuery) -> CoreResult<ItemPage>;

    /// Create an item and link or mint its QR code.
    async fn create_item(&self, user_id: Uuid, item: NewItem) -> CoreResult<ItemRecord>;

    /// Apply a partial update.
    async fn update_item(&self, user_id: Uuid, id: Uuid, patch: ItemPatch)
    -> CoreResult<ItemRecord>;

    /// Delete an item; returns the number of rows removed.
    async fn delete_item(&self, user_id: Uuid, id: Uuid) -> CoreResult<u64>;

    /// Attach a note to an owned item.
    async fn create_note(&self, user_id: Uuid, note: NewNote) -> CoreResult<Note>;

    /// Delete a note; returns the number of rows removed.
    async fn delete_note(&self, user_id: Uuid, id: Uuid) -> CoreResult<u64>;

    /// Apply `operation` to every owned item in `ids`; returns rows affected.
    async fn bulk_update(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        operation: BulkOperation,
    ) -> CoreResult<u64>;

    /// List labels of a kind, ordered by name.
    async fn list_labels(&self, user_id: Uuid, kind: LabelKind) -> CoreResult<Vec<Label>>;

    /// Create a label.
    async fn create_label(&self, user_id: Uuid, label: NewLabel) -> CoreResult<Label>;

    /// Delete a label and detach it from items; returns rows removed.
    async fn delete_label(&self, user_id: Uuid, kind: LabelKind, id: Uuid) -> CoreResult<u64>;

    /// Compute dashboard aggregates as of `now`.
    async fn dashboard(&self, user_id: Uuid, now: DateTime<Utc>) -> CoreResult<DashboardData>;
}

/// Object storage for uploaded images with signed read URLs.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an object under `key`, replacing any previous object.
    async fn put(&self, key: &str, image: ImageUpload) -> CoreResult<()>;

    /// Fetch an object.
    async fn get(&self, key: &str) -> CoreResult<ImageUpload>;

    /// Mint a URL for `key` that validates until `expires_at`.
    fn sign(&self, key: &str, expires_at: DateTime<Utc>) -> SignedUrl;

    /// Check a presented signature; default implementation rejects everything.
    fn verify(&self, key: &str, expires: i64, token: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let _ = (key, expires, token, now);
        Err(CoreError::UrlRejected {
            reason: "signature verification not supported",
        })
    }
}
