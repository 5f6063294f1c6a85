//! Infrastructure layer - Storage backends, services and logging

pub mod logging;
pub mod member;
pub mod storage;
