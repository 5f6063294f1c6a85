//! In-memory member store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::member::{
    Member, MemberId, MemberRepository, MemberStore, TransactionMode, UnitOfWork,
};
use crate::domain::DomainError;

type MemberTable = BTreeMap<MemberId, Member>;

/// Thread-safe in-memory member store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Names carry no uniqueness constraint here; duplicate detection is the
/// service's job.
#[derive(Debug)]
pub struct InMemoryMemberStore {
    members: Arc<RwLock<MemberTable>>,
    sequence: Arc<AtomicI64>,
}

impl Default for InMemoryMemberStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMemberStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Creates a store pre-populated with members.
    ///
    /// Members that already carry an id keep it; the others are given the
    /// next free one.
    pub fn with_members(members: Vec<Member>) -> Self {
        let mut table = BTreeMap::new();
        let mut last_id = members
            .iter()
            .filter_map(|m| m.id())
            .map(|id| id.value())
            .max()
            .unwrap_or(0);

        for member in members {
            let member = match member.id() {
                Some(_) => member,
                None => {
                    last_id += 1;
                    member.into_persisted(MemberId::new(last_id))
                }
            };

            if let Some(id) = member.id() {
                table.insert(id, member);
            }
        }

        Self {
            members: Arc::new(RwLock::new(table)),
            sequence: Arc::new(AtomicI64::new(last_id)),
        }
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn begin(&self, mode: TransactionMode) -> Result<Box<dyn UnitOfWork>, DomainError> {
        debug!(%mode, "Beginning in-memory unit of work");

        Ok(Box::new(InMemoryUnitOfWork {
            mode,
            committed: Arc::clone(&self.members),
            sequence: Arc::clone(&self.sequence),
            pending: BTreeMap::new(),
        }))
    }
}

/// Unit of work over an [`InMemoryMemberStore`].
///
/// Writes are staged in `pending` and applied to the shared table under a
/// single write lock on commit. Reads see committed state overlaid with this
/// unit's own pending writes.
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    mode: TransactionMode,
    committed: Arc<RwLock<MemberTable>>,
    sequence: Arc<AtomicI64>,
    pending: MemberTable,
}

impl InMemoryUnitOfWork {
    fn read_committed(&self) -> Result<RwLockReadGuard<'_, MemberTable>, DomainError> {
        self.committed
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Committed members with this unit's pending writes applied on top
    fn visible_members(&self) -> Result<MemberTable, DomainError> {
        let mut members = self.read_committed()?.clone();
        members.extend(self.pending.iter().map(|(id, m)| (*id, m.clone())));
        Ok(members)
    }

    fn contains(&self, id: MemberId) -> Result<bool, DomainError> {
        if self.pending.contains_key(&id) {
            return Ok(true);
        }

        Ok(self.read_committed()?.contains_key(&id))
    }

    fn next_id(&self) -> MemberId {
        MemberId::new(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl MemberRepository for InMemoryUnitOfWork {
    async fn save(&mut self, member: Member) -> Result<MemberId, DomainError> {
        if self.mode.is_read_only() {
            return Err(DomainError::read_only(format!(
                "Cannot save member '{}' in a read-only unit of work",
                member.name()
            )));
        }

        let id = match member.id() {
            Some(id) => {
                if !self.contains(id)? {
                    return Err(DomainError::not_found(format!("Member '{}' not found", id)));
                }
                self.pending.insert(id, member);
                id
            }
            None => {
                let id = self.next_id();
                self.pending.insert(id, member.into_persisted(id));
                id
            }
        };

        Ok(id)
    }

    async fn find_by_id(&mut self, id: MemberId) -> Result<Member, DomainError> {
        if let Some(member) = self.pending.get(&id) {
            return Ok(member.clone());
        }

        self.read_committed()?
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Member '{}' not found", id)))
    }

    async fn find_all(&mut self) -> Result<Vec<Member>, DomainError> {
        Ok(self.visible_members()?.into_values().collect())
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Vec<Member>, DomainError> {
        Ok(self
            .visible_members()?
            .into_values()
            .filter(|m| m.name() == name)
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn mode(&self) -> TransactionMode {
        self.mode
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self {
            mode,
            committed,
            pending,
            ..
        } = *self;
        let applied = pending.len();

        if applied > 0 {
            let mut members = committed.write().map_err(|e| {
                DomainError::storage(format!("Failed to acquire write lock: {}", e))
            })?;
            members.extend(pending);
        }

        debug!(%mode, applied, "Committed in-memory unit of work");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        debug!(
            mode = %self.mode,
            discarded = self.pending.len(),
            "Rolled back in-memory unit of work"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn committed_members(store: &InMemoryMemberStore) -> Vec<Member> {
        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();
        let members = uow.find_all().await.unwrap();
        uow.commit().await.unwrap();
        members
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();

        let first = uow.save(Member::new("kim")).await.unwrap();
        let second = uow.save(Member::new("park")).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(first, MemberId::new(1));
        assert_eq!(second, MemberId::new(2));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        let id = uow.save(Member::new("kim")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();
        let member = uow.find_by_id(id).await.unwrap();

        assert_eq!(member, Member::with_id(id, "kim"));
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();

        let result = uow.find_by_id(MemberId::new(99)).await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_by_name_exact_match() {
        let store = InMemoryMemberStore::with_members(vec![
            Member::new("kim"),
            Member::new("Kim"),
            Member::new("kim "),
        ]);
        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();

        let found = uow.find_by_name("kim").await.unwrap();
        assert_eq!(found, vec![Member::with_id(MemberId::new(1), "kim")]);

        let none = uow.find_by_name("lee").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_read_only_rejects_save() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadOnly).await.unwrap();

        let result = uow.save(Member::new("kim")).await;

        assert!(matches!(
            result.unwrap_err(),
            DomainError::ReadOnlyTransaction { .. }
        ));
        uow.commit().await.unwrap();
        assert!(committed_members(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_pending_writes_visible_only_to_own_unit() {
        let store = InMemoryMemberStore::new();
        let mut writer = store.begin(TransactionMode::ReadWrite).await.unwrap();
        let id = writer.save(Member::new("kim")).await.unwrap();

        assert_eq!(writer.find_by_name("kim").await.unwrap().len(), 1);

        let mut reader = store.begin(TransactionMode::ReadOnly).await.unwrap();
        assert!(reader.find_by_name("kim").await.unwrap().is_empty());
        assert!(reader.find_by_id(id).await.is_err());

        writer.commit().await.unwrap();

        assert_eq!(reader.find_by_id(id).await.unwrap().name(), "kim");
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        uow.save(Member::new("kim")).await.unwrap();
        uow.rollback().await.unwrap();

        assert!(committed_members(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let store = InMemoryMemberStore::new();
        {
            let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
            uow.save(Member::new("kim")).await.unwrap();
        }

        assert!(committed_members(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_rollback() {
        let store = InMemoryMemberStore::new();

        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        uow.save(Member::new("kim")).await.unwrap();
        uow.rollback().await.unwrap();

        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        let id = uow.save(Member::new("park")).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(id, MemberId::new(2));
    }

    #[tokio::test]
    async fn test_save_existing_overwrites() {
        let store = InMemoryMemberStore::with_members(vec![Member::new("kim")]);
        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();

        let mut member = uow.find_by_id(MemberId::new(1)).await.unwrap();
        member.rename("park");
        let id = uow.save(member).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(id, MemberId::new(1));
        assert_eq!(
            committed_members(&store).await,
            vec![Member::with_id(MemberId::new(1), "park")]
        );
    }

    #[tokio::test]
    async fn test_save_unknown_id_not_found() {
        let store = InMemoryMemberStore::new();
        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();

        let result = uow.save(Member::with_id(MemberId::new(7), "ghost")).await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_interleaved_units_can_both_register_same_name() {
        let store = InMemoryMemberStore::new();
        let mut first = store.begin(TransactionMode::ReadWrite).await.unwrap();
        let mut second = store.begin(TransactionMode::ReadWrite).await.unwrap();

        assert!(first.find_by_name("kim").await.unwrap().is_empty());
        assert!(second.find_by_name("kim").await.unwrap().is_empty());

        first.save(Member::new("kim")).await.unwrap();
        second.save(Member::new("kim")).await.unwrap();
        first.commit().await.unwrap();
        second.commit().await.unwrap();

        let members = committed_members(&store).await;
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.name() == "kim"));
    }

    #[tokio::test]
    async fn test_with_members_keeps_existing_ids() {
        let store = InMemoryMemberStore::with_members(vec![
            Member::with_id(MemberId::new(10), "kim"),
            Member::new("park"),
        ]);

        let members = committed_members(&store).await;
        assert_eq!(
            members,
            vec![
                Member::with_id(MemberId::new(10), "kim"),
                Member::with_id(MemberId::new(11), "park"),
            ]
        );

        let mut uow = store.begin(TransactionMode::ReadWrite).await.unwrap();
        assert_eq!(uow.save(Member::new("lee")).await.unwrap(), MemberId::new(12));
    }
}
