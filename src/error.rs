/// Error types for DashTab
use std::fmt;

use serde::Serialize;

/// Form field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Url,
    Category,
    SitesPerRow,
    DefaultSearchEngine,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Url => "url",
            Field::Category => "category",
            Field::SitesPerRow => "sitesPerRow",
            Field::DefaultSearchEngine => "defaultSearchEngine",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reason {
    Missing,
    TooLong { max: usize },
    Malformed,
    Unknown,
    Reserved,
    OutOfRange { min: usize, max: usize },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Missing => write!(f, "is required"),
            Reason::TooLong { max } => write!(f, "must be at most {} characters", max),
            Reason::Malformed => write!(f, "is not well formed"),
            Reason::Unknown => write!(f, "does not exist"),
            Reason::Reserved => write!(f, "is reserved"),
            Reason::OutOfRange { min, max } => write!(f, "must be between {} and {}", min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: Field, reason: Reason) -> Self {
        ValidationError { field, reason }
    }
}

/// A rejected round trip through the persistence gateway
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    Read(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("storage clear failed: {0}")]
    Clear(String),

    #[error("failed to encode stored value: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DashTabError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("category \"{0}\" already exists")]
    DuplicateName(String),

    #[error("category \"{0}\" cannot be removed")]
    NotRemovable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored data could not be read: {0}")]
    Migration(#[from] serde_json::Error),
}

impl DashTabError {
    pub fn validation(field: Field, reason: Reason) -> Self {
        DashTabError::Validation(ValidationError::new(field, reason))
    }

    /// Stable identifier the UI layer switches on
    pub fn kind(&self) -> &'static str {
        match self {
            DashTabError::Validation(_) => "validation",
            DashTabError::DuplicateName(_) => "duplicateName",
            DashTabError::NotRemovable(_) => "notRemovable",
            DashTabError::NotFound(_) => "notFound",
            DashTabError::Storage(_) => "storageFailure",
            DashTabError::Migration(_) => "migration",
        }
    }
}

pub type Result<T, E = DashTabError> = std::result::Result<T, E>;
