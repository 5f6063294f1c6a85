//! Unit of work and transaction boundaries

use async_trait::async_trait;

use super::repository::MemberRepository;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Access mode of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// Reads only; any attempt to save is rejected
    #[default]
    ReadOnly,
    /// Reads and writes, committed atomically
    ReadWrite,
}

impl TransactionMode {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
        }
    }
}

impl std::fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A demarcated scope of repository access.
///
/// Writes made through the repository are only visible to other units of
/// work after `commit`. Dropping a unit of work without committing discards
/// them, exactly like `rollback`.
#[async_trait]
pub trait UnitOfWork: MemberRepository {
    fn mode(&self) -> TransactionMode;

    /// Make every pending write visible at once
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every pending write
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Storage backend that opens units of work
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn begin(&self, mode: TransactionMode) -> Result<Box<dyn UnitOfWork>, DomainError>;
}
