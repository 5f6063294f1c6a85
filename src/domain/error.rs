use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Member '{name}' already exists")]
    DuplicateMember { name: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Read-only transaction: {message}")]
    ReadOnlyTransaction { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn duplicate_member(name: impl Into<String>) -> Self {
        Self::DuplicateMember { name: name.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn read_only(message: impl Into<String>) -> Self {
        Self::ReadOnlyTransaction {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for the lookup failure a repository reports for a missing id
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when `join` rejected the candidate because its name is taken
    pub fn is_duplicate_member(&self) -> bool {
        matches!(self, Self::DuplicateMember { .. })
    }
}
