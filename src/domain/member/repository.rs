//! Member repository trait

use async_trait::async_trait;

use super::entity::{Member, MemberId};
use crate::domain::DomainError;

/// Persistence operations over members.
///
/// Implementations are scoped to a single unit of work, which is why every
/// method takes `&mut self`: reads and writes go through the same
/// transaction handle.
#[async_trait]
pub trait MemberRepository: Send {
    /// Persist a member and return its identifier.
    ///
    /// A member without an id is inserted under a freshly allocated one. A
    /// member that already has an id overwrites the stored record and fails
    /// with `NotFound` if there is none.
    async fn save(&mut self, member: Member) -> Result<MemberId, DomainError>;

    /// Load a member, failing with `NotFound` if the id is unknown
    async fn find_by_id(&mut self, id: MemberId) -> Result<Member, DomainError>;

    /// All members
    async fn find_all(&mut self) -> Result<Vec<Member>, DomainError>;

    /// Members whose name equals `name` exactly; empty when there are none
    async fn find_by_name(&mut self, name: &str) -> Result<Vec<Member>, DomainError>;
}
