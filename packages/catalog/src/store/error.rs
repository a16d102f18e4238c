use std::fmt;

/// Which uniqueness constraint an insert collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniqueKey {
    Name,
    FlavorId,
}

/// Errors that can occur during flavor record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Another non-deleted flavor already holds the key.
    UniqueViolation(UniqueKey),
    /// The referenced flavor row does not exist.
    NotFound(String),
    /// The backend failed.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UniqueViolation(UniqueKey::Name) => write!(f, "duplicate flavor name"),
            Self::UniqueViolation(UniqueKey::FlavorId) => write!(f, "duplicate flavor id"),
            Self::NotFound(what) => write!(f, "flavor record not found: {what}"),
            Self::Backend(msg) => write!(f, "flavor store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
