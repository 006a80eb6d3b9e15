//! Deterministic fixtures for repository, API, and client tests.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use shelf_api_models::{ItemStatus, ItemSummary, Lifecycle};
use shelf_core::{ItemRecord, ItemRepository, Label, LabelKind, NewItem, NewLabel};
use shelf_store::MemoryRepository;
use uuid::Uuid;

/// Signing secret accepted by the configuration validator.
pub const TEST_SECRET: &str = "shelf-test-secret-0123456789";

/// Public base URL used by test image stores.
pub const TEST_PUBLIC_URL: &str = "http://shelf.test";

/// Stable identifier derived from `n`.
#[must_use]
pub const fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Fixed instant used where tests need a reproducible clock.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Row snapshot as the list endpoint would return it.
#[must_use]
pub fn summary(n: u128, title: &str) -> ItemSummary {
    let at = fixed_now();
    ItemSummary {
        id: id(n),
        title: title.to_string(),
        description: None,
        status: ItemStatus::Available,
        lifecycle: Lifecycle::Active,
        category: None,
        location: None,
        tags: Vec::new(),
        custodian: None,
        main_image: None,
        main_image_expiration: None,
        created_at: at,
        updated_at: at,
    }
}

/// `count` row snapshots with ids `1..=count` titled `Asset NN`.
#[must_use]
pub fn summaries(count: u128) -> Vec<ItemSummary> {
    (1..=count)
        .map(|n| summary(n, &format!("Asset {n:02}")))
        .collect()
}

/// Create `count` items titled `Asset NN` for `user_id`, oldest first.
///
/// # Errors
///
/// Returns an error if the repository rejects an insert.
pub async fn seed_items(
    repo: &MemoryRepository,
    user_id: Uuid,
    count: usize,
) -> Result<Vec<ItemRecord>> {
    let mut created = Vec::with_capacity(count);
    for n in 1..=count {
        let record = repo
            .create_item(
                user_id,
                NewItem {
                    title: format!("Asset {n:02}"),
                    ..NewItem::default()
                },
            )
            .await?;
        created.push(record);
    }
    Ok(created)
}

/// Create a label of `kind` named `name` for `user_id`.
///
/// # Errors
///
/// Returns an error if the repository rejects the label.
pub async fn seed_label(
    repo: &MemoryRepository,
    user_id: Uuid,
    kind: LabelKind,
    name: &str,
) -> Result<Label> {
    Ok(repo
        .create_label(
            user_id,
            NewLabel {
                kind,
                name: name.to_string(),
                color: None,
            },
        )
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_use_sequential_ids() {
        let rows = summaries(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, id(1));
        assert_eq!(rows[2].title, "Asset 03");
    }

    #[tokio::test]
    async fn seeded_items_are_owned_by_the_user() -> Result<()> {
        let repo = MemoryRepository::new();
        let owner = id(42);
        let items = seed_items(&repo, owner, 2).await?;
        assert!(items.iter().all(|record| record.item.user_id == owner));
        let label = seed_label(&repo, owner, LabelKind::Location, "Depot").await?;
        assert_eq!(label.kind, LabelKind::Location);
        Ok(())
    }
}
