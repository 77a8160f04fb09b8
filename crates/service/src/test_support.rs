#![cfg(test)]
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::products::domain::Owner;

/// Fresh migrated SQLite database private to the calling test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}

pub fn owner(name: &str) -> Owner {
    Owner {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_string(),
    }
}
