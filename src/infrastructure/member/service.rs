//! Member service: registration, lookup and rename

use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};

use crate::domain::member::{
    Member, MemberId, MemberRepository, MemberStore, TransactionMode, UnitOfWork,
};
use crate::domain::DomainError;

/// Member service.
///
/// Every public operation runs inside exactly one unit of work opened on
/// the store. Reads use the default read-only mode; `join` and `update`
/// open read-write units. A unit of work is committed when the operation
/// succeeds and rolled back when it fails.
#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn MemberStore>,
}

impl Debug for MemberService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberService").finish_non_exhaustive()
    }
}

impl MemberService {
    /// Create a new member service
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store }
    }

    /// Register a new member and return its assigned id.
    ///
    /// Fails with `DuplicateMember` if a member with exactly the same name
    /// is already stored. The name check and the insert are not atomic
    /// across concurrent joins.
    #[instrument(skip(self, candidate), fields(name = %candidate.name()))]
    pub async fn join(&self, candidate: Member) -> Result<MemberId, DomainError> {
        if let Some(id) = candidate.id() {
            return Err(DomainError::validation(format!(
                "Member '{}' is already persisted",
                id
            )));
        }

        let id = self
            .transactional(TransactionMode::ReadWrite, move |uow| {
                Box::pin(async move {
                    validate_duplicate_member(uow, candidate.name()).await?;
                    uow.save(candidate).await
                })
            })
            .await?;

        info!(member_id = %id, "Member joined");
        Ok(id)
    }

    /// All members
    #[instrument(skip(self))]
    pub async fn find_members(&self) -> Result<Vec<Member>, DomainError> {
        self.transactional(TransactionMode::default(), |uow| {
            Box::pin(async move { uow.find_all().await })
        })
        .await
    }

    /// Get a member by id
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: MemberId) -> Result<Member, DomainError> {
        self.transactional(TransactionMode::default(), move |uow| {
            Box::pin(async move { uow.find_by_id(id).await })
        })
        .await
    }

    /// Rename a member.
    ///
    /// The new name is not checked against other members.
    #[instrument(skip(self, new_name))]
    pub async fn update(&self, id: MemberId, new_name: &str) -> Result<(), DomainError> {
        let new_name = new_name.to_owned();

        self.transactional(TransactionMode::ReadWrite, move |uow| {
            Box::pin(async move {
                let mut member = uow.find_by_id(id).await?;
                member.rename(new_name);
                uow.save(member).await?;
                Ok(())
            })
        })
        .await?;

        info!(member_id = %id, "Member renamed");
        Ok(())
    }

    /// Run `work` inside a unit of work opened in `mode`.
    ///
    /// Commits on `Ok`. On `Err` rolls back and returns the original error;
    /// a rollback failure is only logged.
    async fn transactional<T, F>(&self, mode: TransactionMode, work: F) -> Result<T, DomainError>
    where
        T: Send,
        F: for<'tx> FnOnce(&'tx mut dyn UnitOfWork) -> BoxFuture<'tx, Result<T, DomainError>>
            + Send,
    {
        let mut uow = self.store.begin(mode).await?;
        debug!(mode = %uow.mode(), "Opened unit of work");

        match work(&mut *uow).await {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(error) => {
                debug!(%mode, %error, "Rolling back unit of work");

                if let Err(rollback_error) = uow.rollback().await {
                    warn!(%mode, error = %rollback_error, "Failed to roll back unit of work");
                }

                Err(error)
            }
        }
    }
}

async fn validate_duplicate_member(
    uow: &mut dyn UnitOfWork,
    name: &str,
) -> Result<(), DomainError> {
    let existing = uow.find_by_name(name).await?;

    if !existing.is_empty() {
        warn!(name, existing = existing.len(), "Rejected duplicate member");
        return Err(DomainError::duplicate_member(name));
    }

    Ok(())
}
