//! Member infrastructure module
//!
//! The member service that enforces the duplicate-name rule and opens a
//! unit of work around every operation.

mod service;

pub use service::MemberService;
