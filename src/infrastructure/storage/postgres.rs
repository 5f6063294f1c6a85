//! PostgreSQL member store with connection pooling

use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::debug;

use crate::domain::member::{
    Member, MemberId, MemberRepository, MemberStore, TransactionMode, UnitOfWork,
};
use crate::domain::DomainError;

use super::migrations::run_member_migrations;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/member_registry".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// Member store backed by a PostgreSQL `members` table.
///
/// Every unit of work is a database transaction; read-only units are opened
/// with `SET TRANSACTION READ ONLY` so the server rejects writes as well.
#[derive(Clone)]
pub struct PostgresMemberStore {
    pool: PgPool,
}

impl Debug for PostgresMemberStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresMemberStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PostgresMemberStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new store with its own connection pool
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending schema migrations
    pub async fn migrate(&self) -> Result<(), DomainError> {
        run_member_migrations(&self.pool).await
    }
}

#[async_trait]
impl MemberStore for PostgresMemberStore {
    async fn begin(&self, mode: TransactionMode) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        if mode.is_read_only() {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to set transaction read only: {}", e))
                })?;
        }

        debug!(%mode, "Began PostgreSQL transaction");
        Ok(Box::new(PostgresUnitOfWork { tx, mode }))
    }
}

/// Unit of work wrapping one PostgreSQL transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
    mode: TransactionMode,
}

impl Debug for PostgresUnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresUnitOfWork")
            .field("mode", &self.mode)
            .finish()
    }
}

#[async_trait]
impl MemberRepository for PostgresUnitOfWork {
    async fn save(&mut self, member: Member) -> Result<MemberId, DomainError> {
        if self.mode.is_read_only() {
            return Err(DomainError::read_only(format!(
                "Cannot save member '{}' in a read-only unit of work",
                member.name()
            )));
        }

        match member.id() {
            None => {
                let id: i64 =
                    sqlx::query_scalar("INSERT INTO members (name) VALUES ($1) RETURNING id")
                        .bind(member.name())
                        .fetch_one(&mut *self.tx)
                        .await
                        .map_err(|e| {
                            DomainError::storage(format!("Failed to insert member: {}", e))
                        })?;

                Ok(MemberId::new(id))
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE members
                    SET name = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(id.value())
                .bind(member.name())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to update member: {}", e)))?;

                if result.rows_affected() == 0 {
                    return Err(DomainError::not_found(format!("Member '{}' not found", id)));
                }

                Ok(id)
            }
        }
    }

    async fn find_by_id(&mut self, id: MemberId) -> Result<Member, DomainError> {
        let row = sqlx::query("SELECT id, name FROM members WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get member: {}", e)))?;

        match row {
            Some(row) => row_to_member(&row),
            None => Err(DomainError::not_found(format!("Member '{}' not found", id))),
        }
    }

    async fn find_all(&mut self) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query("SELECT id, name FROM members ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list members: {}", e)))?;

        rows.iter().map(row_to_member).collect()
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Vec<Member>, DomainError> {
        let rows = sqlx::query("SELECT id, name FROM members WHERE name = $1 ORDER BY id")
            .bind(name)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to find members by name: {}", e))
            })?;

        rows.iter().map(row_to_member).collect()
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn mode(&self) -> TransactionMode {
        self.mode
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx, mode } = *self;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))?;

        debug!(%mode, "Committed PostgreSQL transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx, mode } = *self;

        tx.rollback()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to roll back transaction: {}", e)))?;

        debug!(%mode, "Rolled back PostgreSQL transaction");
        Ok(())
    }
}

fn row_to_member(row: &PgRow) -> Result<Member, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Failed to read member id: {}", e)))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| DomainError::storage(format!("Failed to read member name: {}", e)))?;

    Ok(Member::with_id(MemberId::new(id), name))
}
