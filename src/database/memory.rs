//! In-process `ListStore`.
//!
//! All state sits behind one mutex so the duplicate check and the insert
//! happen atomically, mirroring the unique constraint in PostgreSQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::repository::{ListStore, StoreError};
use crate::models::{Item, List, ListId};

#[derive(Default)]
struct State {
    next_list_id: i64,
    next_item_id: i64,
    lists: BTreeMap<i64, List>,
    /// Keyed by item id, so iteration is creation order
    items: BTreeMap<i64, Item>,
}

#[derive(Default)]
pub struct MemoryListStore {
    state: Mutex<State>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of items across all lists
    pub async fn total_items(&self) -> usize {
        self.state.lock().await.items.len()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn create_list(&self) -> Result<List, StoreError> {
        let mut state = self.state.lock().await;
        state.next_list_id += 1;
        let list = List {
            id: state.next_list_id,
            created_at: Utc::now(),
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn find_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
        Ok(self.state.lock().await.lists.get(&id.0).cloned())
    }

    async fn items_for_list(&self, id: ListId) -> Result<Vec<Item>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.list_id == id.0)
            .cloned()
            .collect())
    }

    async fn insert_item(&self, id: ListId, text: &str) -> Result<Item, StoreError> {
        let mut state = self.state.lock().await;
        if !state.lists.contains_key(&id.0) {
            return Err(StoreError::ListNotFound(id));
        }
        if state
            .items
            .values()
            .any(|item| item.list_id == id.0 && item.text == text)
        {
            return Err(StoreError::DuplicateItem);
        }

        state.next_item_id += 1;
        let item = Item {
            id: state.next_item_id,
            list_id: id.0,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn count_items(&self, id: ListId) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.items.values().filter(|item| item.list_id == id.0).count() as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
