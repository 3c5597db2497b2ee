//! List service
//!
//! Validates item submissions and drives the `ListStore`. Handlers stay
//! thin: they extract, call in here, and shape the response.

use std::sync::Arc;

use metrics::counter;
use tracing::info;

use crate::database::{ListStore, StoreError};
use crate::error::{ApiError, Result};
use crate::models::{Item, List, ListId, NewItem};

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn ListStore>,
}

impl ListService {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    pub async fn create_list(&self) -> Result<List> {
        let list = self.store.create_list().await?;
        info!(list_id = list.id, "Created list");
        Ok(list)
    }

    /// Items of an existing list, oldest first
    pub async fn get_items(&self, list_id: ListId) -> Result<Vec<Item>> {
        self.require_list(list_id).await?;
        Ok(self.store.items_for_list(list_id).await?)
    }

    /// Validate and persist a new item.
    ///
    /// Empty text is rejected before touching the store; duplicates are
    /// rejected by the store itself.
    pub async fn add_item(&self, list_id: ListId, new_item: NewItem) -> Result<Item> {
        self.require_list(list_id).await?;

        let text = new_item.cleaned_text().map_err(|message| {
            counter!("item_validation_failures_total", "reason" => "empty").increment(1);
            ApiError::Validation(message)
        })?;

        match self.store.insert_item(list_id, &text).await {
            Ok(item) => {
                counter!("items_created_total").increment(1);
                info!(list_id = %list_id, item_id = item.id, "Added item");
                Ok(item)
            }
            Err(StoreError::DuplicateItem) => {
                counter!("item_validation_failures_total", "reason" => "duplicate").increment(1);
                Err(ApiError::duplicate_item())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_items(&self, list_id: ListId) -> Result<i64> {
        Ok(self.store.count_items(list_id).await?)
    }

    async fn require_list(&self, list_id: ListId) -> Result<List> {
        self.store
            .find_list(list_id)
            .await?
            .ok_or_else(ApiError::list_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::messages::{DUPLICATE_ITEM_ERROR, EMPTY_ITEM_ERROR};
    use crate::database::MemoryListStore;

    fn service() -> ListService {
        ListService::new(Arc::new(MemoryListStore::new()))
    }

    #[tokio::test]
    async fn test_add_item_persists_trimmed_text() {
        let service = service();
        let list = service.create_list().await.unwrap().list_id();

        let item = service.add_item(list, NewItem::new("  new item ")).await.unwrap();
        assert_eq!(item.text, "new item");
        assert_eq!(service.count_items(list).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_item_is_not_saved() {
        let service = service();
        let list = service.create_list().await.unwrap().list_id();

        let err = service.add_item(list, NewItem::new("")).await.unwrap_err();
        assert_eq!(err.client_message(), EMPTY_ITEM_ERROR);
        assert_eq!(service.count_items(list).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_detection_ignores_surrounding_whitespace() {
        let service = service();
        let list = service.create_list().await.unwrap().list_id();

        service.add_item(list, NewItem::new("thing")).await.unwrap();
        let err = service.add_item(list, NewItem::new(" thing ")).await.unwrap_err();
        assert_eq!(err.client_message(), DUPLICATE_ITEM_ERROR);
        assert_eq!(service.count_items(list).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_list_is_not_found() {
        let service = service();
        let err = service.get_items(ListId(404)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = service
            .add_item(ListId(404), NewItem::new("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
