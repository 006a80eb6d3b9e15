use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use shelf_core::{
    BulkOperation, CoreError, CoreResult, CustodianCount, DashboardData, ErrorCorrection, Item,
    ItemDetailRecord, ItemPage, ItemPatch, ItemQuery, ItemRecord, ItemRepository, ItemStatus,
    Label, LabelKind, Lifecycle, MonthlyCount, NewItem, NewLabel, NewNote, Note, QrCode,
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

const DASHBOARD_NEWEST: usize = 5;
const DASHBOARD_MONTHS: i32 = 12;

/// Repository keeping every table in process memory.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    items: HashMap<Uuid, StoredItem>,
    notes: HashMap<Uuid, Note>,
    labels: HashMap<Uuid, Label>,
    qr_codes: HashMap<Uuid, QrCode>,
    next_seq: u64,
}

struct StoredItem {
    item: Item,
    seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn owned_label(&self, user_id: Uuid, kind: LabelKind, id: Uuid) -> Option<&Label> {
        self.labels
            .get(&id)
            .filter(|label| label.user_id == user_id && label.kind == kind)
    }

    fn require_label(
        &self,
        user_id: Uuid,
        kind: LabelKind,
        id: Uuid,
        field: &'static str,
    ) -> CoreResult<()> {
        self.owned_label(user_id, kind, id)
            .map(|_| ())
            .ok_or(CoreError::InvalidReference { field, id })
    }

    fn owned_item(&self, user_id: Uuid, id: Uuid) -> CoreResult<&StoredItem> {
        self.items
            .get(&id)
            .filter(|stored| stored.item.user_id == user_id)
            .ok_or(CoreError::not_found("item", id))
    }

    fn resolve(&self, item: &Item) -> ItemRecord {
        let lookup = |id: Option<Uuid>, kind| {
            id.and_then(|id| self.owned_label(item.user_id, kind, id))
                .cloned()
        };
        ItemRecord {
            item: item.clone(),
            category: lookup(item.category_id, LabelKind::Category),
            location: lookup(item.location_id, LabelKind::Location),
            tags: item
                .tag_ids
                .iter()
                .filter_map(|id| self.owned_label(item.user_id, LabelKind::Tag, *id))
                .cloned()
                .collect(),
            custodian: lookup(item.custodian_id, LabelKind::TeamMember),
        }
    }

    fn newest_first(&self, user_id: Uuid) -> Vec<&StoredItem> {
        let mut rows: Vec<&StoredItem> = self
            .items
            .values()
            .filter(|stored| stored.item.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        rows
    }

    fn validate_operation(&self, user_id: Uuid, operation: &BulkOperation) -> CoreResult<()> {
        match operation {
            BulkOperation::SetLocation { location_id } => {
                self.require_label(user_id, LabelKind::Location, *location_id, "locationId")
            }
            BulkOperation::SetCategory {
                category_id: Some(category_id),
            } => self.require_label(user_id, LabelKind::Category, *category_id, "categoryId"),
            BulkOperation::AssignCustody { custodian_id } => {
                self.require_label(user_id, LabelKind::TeamMember, *custodian_id, "custodianId")
            }
            BulkOperation::AddTags { tag_ids } | BulkOperation::RemoveTags { tag_ids } => tag_ids
                .iter()
                .try_for_each(|id| self.require_label(user_id, LabelKind::Tag, *id, "tags")),
            _ => Ok(()),
        }
    }

    fn remove_item(&mut self, id: Uuid) {
        self.items.remove(&id);
        self.notes.retain(|_, note| note.item_id != id);
        for qr in self.qr_codes.values_mut() {
            if qr.item_id == Some(id) {
                qr.item_id = None;
            }
        }
    }
}

fn apply(item: &mut Item, operation: &BulkOperation, now: DateTime<Utc>) {
    match operation {
        BulkOperation::SetLocation { location_id } => item.location_id = Some(*location_id),
        BulkOperation::SetCategory { category_id } => item.category_id = *category_id,
        BulkOperation::AssignCustody { custodian_id } => {
            item.custodian_id = Some(*custodian_id);
            item.status = ItemStatus::InCustody;
        }
        BulkOperation::ReleaseCustody => {
            item.custodian_id = None;
            item.status = ItemStatus::Available;
        }
        BulkOperation::Activate => item.lifecycle = Lifecycle::Active,
        BulkOperation::Deactivate => item.lifecycle = Lifecycle::Inactive,
        BulkOperation::Archive => item.lifecycle = Lifecycle::Archived,
        BulkOperation::Cancel => item.lifecycle = Lifecycle::Cancelled,
        BulkOperation::AddTags { tag_ids } => {
            for id in tag_ids {
                if !item.tag_ids.contains(id) {
                    item.tag_ids.push(*id);
                }
            }
        }
        BulkOperation::RemoveTags { tag_ids } => item.tag_ids.retain(|id| !tag_ids.contains(id)),
        BulkOperation::Trash => {}
    }
    item.updated_at = now;
}

fn month_index(at: DateTime<Utc>) -> i32 {
    at.year() * 12 + i32::try_from(at.month0()).unwrap_or_default()
}

fn require_text(value: &str, field: &'static str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput {
            field,
            reason: "must not be empty",
        });
    }
    Ok(())
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed item, keeping its timestamps.
    ///
    /// Used to seed fixtures and imports where `created_at` is historical.
    pub async fn import_item(&self, item: Item) {
        let mut tables = self.tables.write().await;
        let seq = tables.next_seq();
        tables.items.insert(item.id, StoredItem { item, seq });
    }

    /// Register an unlinked QR code owned by `user_id`.
    pub async fn register_qr(&self, user_id: Uuid) -> QrCode {
        let qr = QrCode {
            id: Uuid::new_v4(),
            user_id,
            item_id: None,
            version: 0,
            error_correction: ErrorCorrection::L,
        };
        self.tables
            .write()
            .await
            .qr_codes
            .insert(qr.id, qr.clone());
        qr
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    async fn get_item(&self, user_id: Uuid, id: Uuid) -> CoreResult<ItemDetailRecord> {
        let tables = self.tables.read().await;
        let stored = tables.owned_item(user_id, id)?;
        let mut notes: Vec<Note> = tables
            .notes
            .values()
            .filter(|note| note.item_id == id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let qr_codes = tables
            .qr_codes
            .values()
            .filter(|qr| qr.item_id == Some(id))
            .cloned()
            .collect();
        Ok(ItemDetailRecord {
            record: tables.resolve(&stored.item),
            notes,
            qr_codes,
        })
    }

    async fn list_items(&self, user_id: Uuid, query: &ItemQuery) -> CoreResult<ItemPage> {
        let tables = self.tables.read().await;
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matching: Vec<&StoredItem> = tables
            .newest_first(user_id)
            .into_iter()
            .filter(|stored| stored.item.lifecycle.in_working_set())
            .filter(|stored| {
                needle
                    .as_deref()
                    .is_none_or(|needle| stored.item.title.to_lowercase().contains(needle))
            })
            .filter(|stored| {
                query.category_ids.is_empty()
                    || stored
                        .item
                        .category_id
                        .is_some_and(|id| query.category_ids.contains(&id))
            })
            .collect();
        let total_items = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.skip())
            .take(query.per_page as usize)
            .map(|stored| tables.resolve(&stored.item))
            .collect();
        Ok(ItemPage { items, total_items })
    }

    async fn create_item(&self, user_id: Uuid, new_item: NewItem) -> CoreResult<ItemRecord> {
        require_text(&new_item.title, "title")?;
        let mut tables = self.tables.write().await;
        if let Some(category_id) = new_item.category_id {
            tables.require_label(user_id, LabelKind::Category, category_id, "categoryId")?;
        }

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            user_id,
            title: new_item.title,
            description: new_item.description,
            category_id: new_item.category_id,
            location_id: None,
            tag_ids: Vec::new(),
            custodian_id: None,
            status: ItemStatus::Available,
            lifecycle: Lifecycle::Active,
            main_image: None,
            main_image_expiration: None,
            created_at: now,
            updated_at: now,
        };

        let linkable = new_item.qr_id.and_then(|qr_id| {
            tables
                .qr_codes
                .get(&qr_id)
                .filter(|qr| qr.user_id == user_id && qr.item_id.is_none())
                .map(|qr| qr.id)
        });
        match linkable {
            Some(qr_id) => {
                if let Some(qr) = tables.qr_codes.get_mut(&qr_id) {
                    qr.item_id = Some(item.id);
                }
            }
            None => {
                let qr = QrCode {
                    id: Uuid::new_v4(),
                    user_id,
                    item_id: Some(item.id),
                    version: 0,
                    error_correction: ErrorCorrection::L,
                };
                tables.qr_codes.insert(qr.id, qr);
            }
        }

        let seq = tables.next_seq();
        let record = tables.resolve(&item);
        tables.items.insert(item.id, StoredItem { item, seq });
        Ok(record)
    }

    async fn update_item(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ItemPatch,
    ) -> CoreResult<ItemRecord> {
        if let Some(title) = patch.title.as_deref() {
            require_text(title, "title")?;
        }
        let mut tables = self.tables.write().await;
        tables.owned_item(user_id, id)?;
        if let Some(category_id) = patch.category_id {
            tables.require_label(user_id, LabelKind::Category, category_id, "categoryId")?;
        }
        let stored = tables
            .items
            .get_mut(&id)
            .ok_or(CoreError::not_found("item", id))?;
        let item = &mut stored.item;
        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(description) = patch.description {
            item.description = Some(description);
        }
        if let Some(category_id) = patch.category_id {
            item.category_id = Some(category_id);
        }
        if let Some(url) = patch.main_image {
            item.main_image = Some(url);
        }
        if let Some(expiration) = patch.main_image_expiration {
            item.main_image_expiration = Some(expiration);
        }
        item.updated_at = Utc::now();
        let item = item.clone();
        Ok(tables.resolve(&item))
    }

    async fn delete_item(&self, user_id: Uuid, id: Uuid) -> CoreResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.owned_item(user_id, id).is_err() {
            return Ok(0);
        }
        tables.remove_item(id);
        Ok(1)
    }

    async fn create_note(&self, user_id: Uuid, new_note: NewNote) -> CoreResult<Note> {
        require_text(&new_note.content, "content")?;
        let mut tables = self.tables.write().await;
        tables.owned_item(user_id, new_note.item_id)?;
        let note = Note {
            id: Uuid::new_v4(),
            item_id: new_note.item_id,
            user_id,
            content: new_note.content,
            created_at: Utc::now(),
        };
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn delete_note(&self, user_id: Uuid, id: Uuid) -> CoreResult<u64> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .notes
            .get(&id)
            .is_some_and(|note| note.user_id == user_id);
        if owned {
            tables.notes.remove(&id);
            return Ok(1);
        }
        Ok(0)
    }

    async fn bulk_update(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
        operation: BulkOperation,
    ) -> CoreResult<u64> {
        let mut tables = self.tables.write().await;
        tables.validate_operation(user_id, &operation)?;

        let mut targets: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| tables.owned_item(user_id, *id).is_ok())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        let now = Utc::now();
        for id in &targets {
            if operation == BulkOperation::Trash {
                tables.remove_item(*id);
            } else if let Some(stored) = tables.items.get_mut(id) {
                apply(&mut stored.item, &operation, now);
            }
        }
        debug!(
            operation = operation.name(),
            requested = ids.len(),
            affected = targets.len(),
            "bulk update applied"
        );
        Ok(targets.len() as u64)
    }

    async fn list_labels(&self, user_id: Uuid, kind: LabelKind) -> CoreResult<Vec<Label>> {
        let tables = self.tables.read().await;
        let mut labels: Vec<Label> = tables
            .labels
            .values()
            .filter(|label| label.user_id == user_id && label.kind == kind)
            .cloned()
            .collect();
        labels.sort_by_key(|label| label.name.to_lowercase());
        Ok(labels)
    }

    async fn create_label(&self, user_id: Uuid, new_label: NewLabel) -> CoreResult<Label> {
        require_text(&new_label.name, "name")?;
        let label = Label {
            id: Uuid::new_v4(),
            user_id,
            kind: new_label.kind,
            name: new_label.name,
            color: new_label.color,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .labels
            .insert(label.id, label.clone());
        Ok(label)
    }

    async fn delete_label(&self, user_id: Uuid, kind: LabelKind, id: Uuid) -> CoreResult<u64> {
        let mut tables = self.tables.write().await;
        if tables.owned_label(user_id, kind, id).is_none() {
            return Ok(0);
        }
        tables.labels.remove(&id);
        for stored in tables.items.values_mut() {
            let item = &mut stored.item;
            match kind {
                LabelKind::Category if item.category_id == Some(id) => item.category_id = None,
                LabelKind::Location if item.location_id == Some(id) => item.location_id = None,
                LabelKind::TeamMember if item.custodian_id == Some(id) => {
                    item.custodian_id = None;
                    item.status = ItemStatus::Available;
                }
                LabelKind::Tag => item.tag_ids.retain(|tag| *tag != id),
                _ => {}
            }
        }
        Ok(1)
    }

    async fn dashboard(&self, user_id: Uuid, now: DateTime<Utc>) -> CoreResult<DashboardData> {
        let tables = self.tables.read().await;
        let rows = tables.newest_first(user_id);

        let newest_items = rows
            .iter()
            .take(DASHBOARD_NEWEST)
            .map(|stored| tables.resolve(&stored.item))
            .collect();

        let mut held: HashMap<Uuid, u64> = HashMap::new();
        for stored in &rows {
            if let Some(custodian) = stored.item.custodian_id {
                *held.entry(custodian).or_default() += 1;
            }
        }
        let mut custodians: Vec<CustodianCount> = held
            .into_iter()
            .filter_map(|(id, count)| {
                tables
                    .owned_label(user_id, LabelKind::TeamMember, id)
                    .map(|label| CustodianCount {
                        team_member: label.clone(),
                        count,
                    })
            })
            .collect();
        custodians.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.team_member.name.cmp(&b.team_member.name))
        });

        let current = month_index(now);
        let first = current - (DASHBOARD_MONTHS - 1);
        let created_per_month = (first..=current)
            .map(|index| {
                let count = rows
                    .iter()
                    .filter(|stored| month_index(stored.item.created_at) == index)
                    .count() as u64;
                MonthlyCount {
                    year: index.div_euclid(12),
                    month: u32::try_from(index.rem_euclid(12) + 1).unwrap_or(1),
                    count,
                }
            })
            .collect();

        Ok(DashboardData {
            newest_items,
            custodians,
            created_per_month,
            total_items: rows.len() as u64,
        })
    }
}
