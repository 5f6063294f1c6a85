//! Domain layer - Core business types and contracts

pub mod error;
pub mod member;

pub use error::DomainError;
pub use member::{Member, MemberId, MemberRepository, MemberStore, TransactionMode, UnitOfWork};
