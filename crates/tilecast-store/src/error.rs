//! Error types for the store adapter.

use reqwest::StatusCode;

/// Failures raised by a [`RoomStore`](crate::RoomStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required environment variable is missing.
    #[error("missing store environment variable `{var}`")]
    MissingEnvVar { var: &'static str },

    /// Building the HTTP client failed.
    #[error("failed to build store client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },

    /// A request to the store could not be sent or completed.
    #[error("store request for `{key}` failed")]
    Request {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with an unexpected status code.
    #[error("unexpected store response status {status} for `{key}`")]
    Status { key: String, status: StatusCode },

    /// The stored value exists but is not a valid room document.
    ///
    /// Fatal for the operation: corrupt state is surfaced, not
    /// defaulted over.
    #[error("stored state for `{key}` failed to decode")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
