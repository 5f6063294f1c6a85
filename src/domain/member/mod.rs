//! Member domain
//!
//! Member entity, the repository contract and the unit-of-work abstraction
//! that scopes every repository call to a transaction.

mod entity;
mod repository;
mod unit_of_work;

pub use entity::{Member, MemberId};
pub use repository::MemberRepository;
pub use unit_of_work::{MemberStore, TransactionMode, UnitOfWork};

#[cfg(test)]
pub use unit_of_work::MockMemberStore;
