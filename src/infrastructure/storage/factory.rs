//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::member::MemberStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryMemberStore;
use super::postgres::{PostgresConfig, PostgresMemberStore};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL storage configuration
    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Creates a PostgreSQL configuration from a URL
    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating member stores
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a member store based on the configuration.
    ///
    /// PostgreSQL stores are migrated before they are returned.
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn MemberStore>, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory member store");
                Ok(Self::create_in_memory())
            }
            StorageConfig::Postgres(pg_config) => {
                info!("Using PostgreSQL member store");
                Ok(Self::create_postgres(pg_config).await?)
            }
        }
    }

    /// Creates an in-memory store
    pub fn create_in_memory() -> Arc<InMemoryMemberStore> {
        Arc::new(InMemoryMemberStore::new())
    }

    /// Creates a migrated PostgreSQL store
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> Result<Arc<PostgresMemberStore>, DomainError> {
        let store = PostgresMemberStore::connect(config).await?;
        store.migrate().await?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{Member, MemberRepository, TransactionMode, UnitOfWork};

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(
            StorageType::from_str("memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("InMemory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("in-memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("in_memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("postgres"),
            Some(StorageType::Postgres)
        );
        assert_eq!(
            StorageType::from_str("postgresql"),
            Some(StorageType::Postgres)
        );
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("unknown"), None);
    }

    #[test]
    fn test_storage_config_types() {
        let in_memory = StorageConfig::in_memory();
        assert_eq!(in_memory.storage_type(), StorageType::InMemory);

        let postgres = StorageConfig::postgres_url("postgres://localhost/test");
        assert_eq!(postgres.storage_type(), StorageType::Postgres);
    }

    #[test]
    fn test_storage_config_postgres() {
        let config = PostgresConfig::new("postgres://localhost/test").with_max_connections(20);
        let storage_config = StorageConfig::postgres(config.clone());

        if let StorageConfig::Postgres(pg_config) = storage_config {
            assert_eq!(pg_config.url, config.url);
            assert_eq!(pg_config.max_connections, 20);
        } else {
            panic!("Expected Postgres config");
        }
    }

    #[tokio::test]
    async fn test_create_in_memory_store() {
        let store = StorageFactory::create(&StorageConfig::in_memory())
            .await
            .unwrap();

        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        uow.save(Member::new("kim")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();
        assert_eq!(uow.find_all().await.unwrap().len(), 1);
    }
}
