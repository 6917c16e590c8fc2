//! Account Service Library
//!
//! Persistence for library accounts behind the [`AccountStore`] trait, with an
//! in-memory adapter and a Postgres adapter built on SeaORM.

pub mod infra;
pub mod repository;

use std::sync::Arc;

use tracing::info;

use common::{AppResult, DatabaseConfig, StoreBackend};

use crate::infra::Database;
pub use crate::repository::{
    AccountFilter, AccountStore, AccountUpdate, MemoryAccountStore, SeaAccountStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use crate::repository::MockAccountStore;

/// Build the account store selected by configuration.
///
/// The Postgres adapter applies pending migrations before returning.
pub async fn connect_store(config: &DatabaseConfig) -> AppResult<Arc<dyn AccountStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory account store");
            Ok(Arc::new(MemoryAccountStore::new()))
        }
        StoreBackend::Postgres => {
            let db = Database::connect(config).await?;
            Ok(Arc::new(SeaAccountStore::new(db)))
        }
    }
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run a schema migration command against the configured database.
pub async fn run_migrations(action: MigrateAction, config: &DatabaseConfig) -> AppResult<()> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Account;

    #[tokio::test]
    async fn test_connect_store_memory_backend() {
        let config = DatabaseConfig::default();
        assert_eq!(config.backend, StoreBackend::Memory);

        let store = connect_store(&config).await.unwrap();
        store.ping().await.unwrap();

        let created = store
            .insert(Account::register(
                "a@x.com".to_string(),
                "Ann".to_string(),
                "digest".to_string(),
                true,
            ))
            .await
            .unwrap();
        let found = store
            .find_one(&AccountFilter::by_email("a@x.com"))
            .await
            .unwrap();
        assert_eq!(found, Some(created));
    }
}
