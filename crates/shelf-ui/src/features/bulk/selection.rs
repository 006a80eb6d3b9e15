//! Selection store shared by the header selector, row checkboxes, and the submitter.
//!
//! # Design
//! - Snapshots are kept in selection order; a parallel id set answers
//!   membership queries in constant time.
//! - Membership survives paging and filtering; only explicit mutations or
//!   reconciliation after a bulk action change it.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::ItemRow;

/// Ordered set of selected row snapshots keyed by item id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionStore {
    items: Vec<ItemRow>,
    ids: HashSet<Uuid>,
}

impl SelectionStore {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row; returns `false` when its id was already selected.
    pub fn add(&mut self, item: ItemRow) -> bool {
        if !self.ids.insert(item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove a row by id; returns `false` when it was not selected.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        self.items.retain(|item| item.id != id);
        true
    }

    /// Flip membership of `item`; returns the new membership.
    pub fn toggle(&mut self, item: &ItemRow) -> bool {
        if self.remove(item.id) {
            false
        } else {
            self.add(item.clone())
        }
    }

    /// Replace the whole selection. Later duplicates of an id are dropped.
    pub fn set_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ItemRow>,
    {
        self.clear();
        for item in items {
            self.add(item);
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Selected snapshots in selection order.
    #[must_use]
    pub fn items(&self) -> &[ItemRow] {
        &self.items
    }
}

/// Keep only selected ids still present in `authoritative`, adopting the
/// fresh snapshots while preserving selection order.
#[must_use]
pub fn reconcile(old: &SelectionStore, authoritative: &[ItemRow]) -> SelectionStore {
    let mut next = SelectionStore::new();
    for selected in old.items() {
        if let Some(fresh) = authoritative.iter().find(|row| row.id == selected.id) {
            next.add(fresh.clone());
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_test_support::fixtures::{id, summaries, summary};

    fn rows(count: u128) -> Vec<ItemRow> {
        summaries(count).into_iter().map(ItemRow::from).collect()
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let rows = rows(3);
        let mut store = SelectionStore::new();
        assert!(store.add(rows[0].clone()));
        assert!(!store.add(rows[0].clone()));
        assert!(store.add(rows[1].clone()));
        assert_eq!(store.count(), 2);

        assert!(!store.remove(rows[2].id));
        assert!(store.remove(rows[0].id));
        assert!(!store.remove(rows[0].id));
        assert_eq!(store.ids(), vec![rows[1].id]);
    }

    #[test]
    fn count_tracks_distinct_live_ids_for_any_sequence() {
        let rows = rows(6);
        let mut store = SelectionStore::new();
        let mut model: HashSet<Uuid> = HashSet::new();
        // Deterministic pseudo-random walk over add/remove calls.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let row = &rows[usize::try_from(seed % 6).unwrap_or(0)];
            if seed & 0x100 == 0 {
                store.add(row.clone());
                model.insert(row.id);
            } else {
                store.remove(row.id);
                model.remove(&row.id);
            }
            assert_eq!(store.count(), model.len());
            assert_eq!(store.items().len(), model.len());
        }
    }

    #[test]
    fn set_all_replaces_rather_than_unions() {
        let rows = rows(5);
        let mut store = SelectionStore::new();
        store.set_all(rows[..3].iter().cloned());
        store.set_all(rows[3..].iter().cloned());
        assert_eq!(store.count(), 2);
        assert!(!store.contains(&rows[0].id));

        store.set_all(vec![rows[0].clone(), rows[0].clone()]);
        assert_eq!(store.count(), 1);
        store.set_all(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_flips_membership() {
        let row = ItemRow::from(summary(1, "Drill"));
        let mut store = SelectionStore::new();
        assert!(store.toggle(&row));
        assert!(store.contains(&row.id));
        assert!(!store.toggle(&row));
        assert!(store.is_empty());
    }

    #[test]
    fn reconcile_drops_missing_and_refreshes_snapshots() {
        let rows = rows(3);
        let mut store = SelectionStore::new();
        store.set_all(rows.iter().cloned());

        let mut renamed = rows[2].clone();
        renamed.title = "Moved".into();
        let authoritative = vec![renamed, rows[0].clone(), ItemRow::from(summary(9, "New"))];

        let next = reconcile(&store, &authoritative);
        assert_eq!(next.ids(), vec![id(1), id(3)]);
        assert_eq!(next.items()[1].title, "Moved");
        assert!(!next.contains(&id(9)));
    }
}
