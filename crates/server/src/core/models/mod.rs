use serde::Serialize;
use todo_common::ItemView;

/// User row. Created by registration and never mutated afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// A single entry of a user's list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub text: String,
    pub owner_id: i64,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            text: item.text,
        }
    }
}
