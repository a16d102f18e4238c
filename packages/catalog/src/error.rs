use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid input for field/attribute {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Flavor {0} could not be found")]
    FlavorNotFound(String),

    #[error("Flavor with name {0} could not be found")]
    FlavorNotFoundByName(String),

    #[error("Flavor with name {0} already exists")]
    FlavorExists(String),

    #[error("Flavor with ID {0} already exists")]
    FlavorIdExists(String),

    #[error("Marker {0} could not be found")]
    MarkerNotFound(String),

    #[error("Flavor {flavorid} has no extra specs with key {key}")]
    ExtraSpecNotFound { flavorid: String, key: String },

    #[error("Flavor access already exists for flavor {flavorid} and project {project_id}")]
    FlavorAccessExists {
        flavorid: String,
        project_id: String,
    },

    #[error("Flavor access not found for flavor {flavorid} and project {project_id}")]
    FlavorAccessNotFound {
        flavorid: String,
        project_id: String,
    },

    #[error("Invalid flavor snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for every "no such flavor" outcome, whichever key was used.
    pub fn is_flavor_not_found(&self) -> bool {
        matches!(
            self,
            Self::FlavorNotFound(_) | Self::FlavorNotFoundByName(_)
        )
    }
}
