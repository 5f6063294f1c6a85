//! Member entity and identifier

use serde::{Deserialize, Serialize};

/// Member identifier, assigned by the repository on first save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(i64);

impl MemberId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner numeric value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MemberId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered (or about to be registered) member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Absent until the member has been persisted
    #[serde(skip_serializing_if = "Option::is_none", default)]
    id: Option<MemberId>,
    name: String,
}

impl Member {
    /// Create a transient candidate with no identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Rebuild a persisted member, as repositories do when loading rows
    pub fn with_id(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn id(&self) -> Option<MemberId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Replace the name. The identifier never changes.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Consume a candidate and attach the identifier it was stored under
    pub(crate) fn into_persisted(self, id: MemberId) -> Self {
        Self {
            id: Some(id),
            name: self.name,
        }
    }
}
