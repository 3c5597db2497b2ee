//! Database repository for lists and their items.
//!
//! `ListStore` is the seam between the service layer and persistence.
//! `PgListStore` is the production implementation; tests and the
//! `STORAGE=memory` mode use `MemoryListStore` instead.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::constants::database::{FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use crate::models::{Item, List, ListId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an item with this text already exists in the list")]
    DuplicateItem,

    #[error("list {0} does not exist")]
    ListNotFound(ListId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for lists and items
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Create an empty list
    async fn create_list(&self) -> Result<List, StoreError>;

    async fn find_list(&self, id: ListId) -> Result<Option<List>, StoreError>;

    /// Items of one list in creation order
    async fn items_for_list(&self, id: ListId) -> Result<Vec<Item>, StoreError>;

    /// Insert an item. Fails with `DuplicateItem` when the list already
    /// holds an item with identical text.
    async fn insert_item(&self, id: ListId, text: &str) -> Result<Item, StoreError>;

    async fn count_items(&self, id: ListId) -> Result<i64, StoreError>;

    /// Cheap liveness probe used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

/// `ListStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgListStore {
    db: PgPool,
}

impl PgListStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListStore for PgListStore {
    async fn create_list(&self) -> Result<List, StoreError> {
        let list = sqlx::query_as::<_, List>(
            "INSERT INTO lists DEFAULT VALUES RETURNING id, created_at",
        )
        .fetch_one(&self.db)
        .await?;

        debug!(list_id = list.id, "List created");
        Ok(list)
    }

    async fn find_list(&self, id: ListId) -> Result<Option<List>, StoreError> {
        let list = sqlx::query_as::<_, List>("SELECT id, created_at FROM lists WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.db)
            .await?;
        Ok(list)
    }

    async fn items_for_list(&self, id: ListId) -> Result<Vec<Item>, StoreError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, list_id, text, created_at
            FROM items
            WHERE list_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.0)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    async fn insert_item(&self, id: ListId, text: &str) -> Result<Item, StoreError> {
        let result = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (list_id, text)
            VALUES ($1, $2)
            RETURNING id, list_id, text, created_at
            "#,
        )
        .bind(id.0)
        .bind(text)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(item) => {
                debug!(list_id = %id, item_id = item.id, "Item inserted");
                Ok(item)
            }
            Err(sqlx::Error::Database(db_err)) => {
                let code = db_err.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some(UNIQUE_VIOLATION) => Err(StoreError::DuplicateItem),
                    Some(FOREIGN_KEY_VIOLATION) => Err(StoreError::ListNotFound(id)),
                    _ => Err(StoreError::Database(sqlx::Error::Database(db_err))),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count_items(&self, id: ListId) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE list_id = $1")
            .bind(id.0)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
