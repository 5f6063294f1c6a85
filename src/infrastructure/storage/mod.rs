//! Storage infrastructure - Member store implementations

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::{InMemoryMemberStore, InMemoryUnitOfWork};
pub use migrations::{run_member_migrations, Migration, PostgresMigrator};
pub use postgres::{PostgresConfig, PostgresMemberStore, PostgresUnitOfWork};
