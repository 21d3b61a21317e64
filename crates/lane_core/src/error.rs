//! Error types shared by the pairing engine.

use thiserror::Error;

/// Error surfaced by a [`CityDirectory`](crate::directory::CityDirectory) implementation.
///
/// The engine never inspects or rewraps it; whatever the gateway returns reaches the
/// caller unchanged through [`LaneError::Directory`].
pub type DirectoryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a distance computation, selection or crawl.
#[derive(Debug, Error)]
pub enum LaneError {
    /// Malformed input such as a non-finite coordinate. Always a caller bug.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The base origin or destination city is not present in the directory.
    #[error("city not found: {city}, {state}")]
    CityNotFound { city: String, state: String },
    /// I/O failure reported by the city directory gateway.
    #[error(transparent)]
    Directory(DirectoryError),
}

impl LaneError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LaneError::InvalidInput(message.into())
    }

    pub fn city_not_found(city: impl Into<String>, state: impl Into<String>) -> Self {
        LaneError::CityNotFound {
            city: city.into(),
            state: state.into(),
        }
    }
}

impl From<DirectoryError> for LaneError {
    fn from(err: DirectoryError) -> Self {
        LaneError::Directory(err)
    }
}

/// Errors raised while loading or validating a [`CrawlConfig`](crate::config::CrawlConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid crawl config: {0}")]
    Invalid(String),
    #[error("failed to read crawl config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse crawl config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = LaneError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("connection reset")]
    struct GatewayIo;

    #[test]
    fn directory_errors_pass_through_unchanged() {
        let err: LaneError = (Box::new(GatewayIo) as DirectoryError).into();
        assert_eq!(err.to_string(), "connection reset");
        match err {
            LaneError::Directory(inner) => assert!(inner.downcast_ref::<GatewayIo>().is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn city_not_found_names_the_city() {
        let err = LaneError::city_not_found("Nowhere", "ZZ");
        assert_eq!(err.to_string(), "city not found: Nowhere, ZZ");
    }
}
