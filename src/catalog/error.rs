//! Catalog transport failures
//!
//! One CatalogProvider call either returns entries or one of these. The
//! cache wraps every variant in `RemoteUnavailable` for the pipeline, so the
//! split here only matters for messages and for `NotFound`, which the
//! instance type lookup treats as "no such type".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogApiError {
    /// Connection, TLS or timeout failure before any status arrived
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the catalog document we asked for
    #[error("unreadable catalog response: {0}")]
    Decode(String),

    /// 401 or 403
    #[error("catalog refused access ({status}); check the token named by remote.token_env")]
    Unauthorized { status: u16 },

    #[error("catalog entry not found: {0}")]
    NotFound(String),

    /// 429 and 5xx: the catalog may answer later
    #[error("catalog unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Any other rejected query, usually a bad scope parameter
    #[error("catalog rejected the query ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl CatalogApiError {
    /// Classify a non-success status and the message parsed from its body
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            404 => Self::NotFound(message),
            429 | 500..=599 => Self::Unavailable { status, message },
            _ => Self::Rejected { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            CatalogApiError::from_status(403, "no".into()),
            CatalogApiError::Unauthorized { status: 403 }
        ));
        assert!(matches!(
            CatalogApiError::from_status(404, "gone".into()),
            CatalogApiError::NotFound(m) if m == "gone"
        ));
        assert!(matches!(
            CatalogApiError::from_status(429, "slow down".into()),
            CatalogApiError::Unavailable { status: 429, .. }
        ));
        assert!(matches!(
            CatalogApiError::from_status(503, "down".into()),
            CatalogApiError::Unavailable { status: 503, .. }
        ));
        let rejected = CatalogApiError::from_status(422, "zoneId is required".into());
        assert_eq!(
            rejected.to_string(),
            "catalog rejected the query (422): zoneId is required"
        );
    }
}
