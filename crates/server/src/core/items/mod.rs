//! Item Module
//!
//! CRUD over list items. Every query is scoped by the owner id taken from the
//! verified token; updates and deletes carry the ownership check in the same
//! statement, so "missing" and "someone else's" are indistinguishable.

pub mod handlers;

use crate::core::error::{Error, Result};
use crate::core::models::Item;
use sqlx::SqlitePool;
use tracing::{debug, info};

pub struct ItemManager {
    pool: SqlitePool,
}

fn require_text(text: &str) -> Result<&str> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("Invalid text".to_string()));
    }
    Ok(text)
}

impl ItemManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All items owned by `user_id`, oldest first
    pub async fn list(&self, user_id: i64) -> Result<Vec<Item>> {
        let items: Vec<Item> =
            sqlx::query_as("SELECT id, text, owner_id FROM items WHERE owner_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        debug!("[Items] {} item(s) for user {}", items.len(), user_id);
        Ok(items)
    }

    /// Create an item and return its id
    pub async fn add(&self, user_id: i64, text: &str) -> Result<i64> {
        let text = require_text(text)?;

        let id = sqlx::query("INSERT INTO items (text, owner_id) VALUES (?, ?)")
            .bind(text)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("[Items] User {} added item {}", user_id, id);
        Ok(id)
    }

    pub async fn edit(&self, user_id: i64, item_id: i64, text: &str) -> Result<()> {
        let text = require_text(text)?;

        let result = sqlx::query("UPDATE items SET text = ? WHERE id = ? AND owner_id = ?")
            .bind(text)
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFoundOrForbidden);
        }

        info!("[Items] User {} edited item {}", user_id, item_id);
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, item_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ? AND owner_id = ?")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFoundOrForbidden);
        }

        info!("[Items] User {} deleted item {}", user_id, item_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store;
    use tempfile::tempdir;

    async fn setup(dir: &std::path::Path) -> (ItemManager, i64, i64) {
        let url = format!("sqlite://{}", dir.join("items.sqlite").display());
        let pool = store::connect(&url).await.unwrap();

        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let id = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, 'x')")
                .bind(name)
                .execute(&pool)
                .await
                .unwrap()
                .last_insert_rowid();
            ids.push(id);
        }

        (ItemManager::new(pool), ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_scoped() {
        let dir = tempdir().unwrap();
        let (items, alice, bob) = setup(dir.path()).await;

        items.add(alice, "first").await.unwrap();
        items.add(bob, "bob's").await.unwrap();
        items.add(alice, "second").await.unwrap();

        let listed = items.list(alice).await.unwrap();
        let texts: Vec<_> = listed.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
        assert!(listed.iter().all(|i| i.owner_id == alice));

        assert_eq!(items.list(alice).await.unwrap(), listed);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let dir = tempdir().unwrap();
        let (items, alice, _) = setup(dir.path()).await;
        assert!(items.list(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let dir = tempdir().unwrap();
        let (items, alice, _) = setup(dir.path()).await;

        assert!(matches!(
            items.add(alice, "   ").await,
            Err(Error::InvalidInput(_))
        ));
        let id = items.add(alice, "real").await.unwrap();
        assert!(matches!(
            items.edit(alice, id, "").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_other_users_items_are_untouchable() {
        let dir = tempdir().unwrap();
        let (items, alice, bob) = setup(dir.path()).await;

        let bobs = items.add(bob, "bob's secret").await.unwrap();

        assert!(matches!(
            items.edit(alice, bobs, "hijacked").await,
            Err(Error::NotFoundOrForbidden)
        ));
        assert!(matches!(
            items.delete(alice, bobs).await,
            Err(Error::NotFoundOrForbidden)
        ));

        let still = items.list(bob).await.unwrap();
        assert_eq!(still.len(), 1);
        assert_eq!(still[0].text, "bob's secret");
    }

    #[tokio::test]
    async fn test_missing_item_reads_like_foreign_item() {
        let dir = tempdir().unwrap();
        let (items, alice, _) = setup(dir.path()).await;

        assert!(matches!(
            items.edit(alice, 9999, "x").await,
            Err(Error::NotFoundOrForbidden)
        ));
        assert!(matches!(
            items.delete(alice, 9999).await,
            Err(Error::NotFoundOrForbidden)
        ));
    }
}
