//! Member Registry
//!
//! A member-registration service with:
//! - Duplicate-name rejection at join time
//! - Explicit units of work (read-only by default, read-write for mutations)
//! - In-memory and PostgreSQL storage backends

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, Member, MemberId, TransactionMode};
pub use infrastructure::member::MemberService;

use tracing::info;

use infrastructure::storage::StorageFactory;

/// Build a member service from configuration.
///
/// Resolves the storage backend, connects and migrates it when it is
/// PostgreSQL, and wires the service on top.
pub async fn create_member_service(config: &AppConfig) -> anyhow::Result<MemberService> {
    let storage_config = config.storage.to_storage_config()?;

    info!("Storage backend: {:?}", storage_config.storage_type());

    let store = StorageFactory::create(&storage_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create member store: {}", e))?;

    Ok(MemberService::new(store))
}
