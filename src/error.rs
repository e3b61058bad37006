//! Error types for the provisioning resolution engine
//!
//! Every stage of the pipeline returns [`Result`]; nothing in the library
//! terminates the process. The binary decides how to present a failure.

use crate::catalog::CatalogApiError;
use std::fmt;
use thiserror::Error;

/// A catalog entry offered back to the caller when a name lookup is ambiguous
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.name)
    }
}

fn list_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(Candidate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A name or id lookup matched nothing in the catalog
    #[error("{kind} not found by {token}")]
    NotFound { kind: &'static str, token: String },

    /// A name lookup matched several entries; retry with an id
    #[error("{kind} '{token}' is ambiguous, try using an id instead ({})", list_candidates(.candidates))]
    Ambiguous {
        kind: &'static str,
        token: String,
        candidates: Vec<Candidate>,
    },

    /// A catalog fetch failed at the transport layer
    #[error("Unable to load {category} from the catalog: {source}")]
    RemoteUnavailable {
        category: String,
        #[source]
        source: CatalogApiError,
    },

    /// A required field has no value and prompting is disabled
    #[error("Missing required value for '{field}'")]
    ValidationRequired { field: String },

    /// A supplied value cannot be used for the field it was given to
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    /// The operator aborted an interactive prompt
    #[error("Provisioning cancelled")]
    Cancelled,

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProvisionError {
    pub fn not_found(kind: &'static str, token: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            token: token.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::ValidationRequired {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Whether this error came from the catalog transport
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Invalid option '{0}', expected key=value")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
