use http::StatusCode;
use thiserror::Error;

/// Failed to obtain a session token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to call the authentication endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("credentials rejected with {0}")]
    Rejected(StatusCode),

    #[error("malformed authentication response: {0}")]
    Malformed(String),

    #[error("the account has no addresses")]
    NoAddress,
}

/// Failed to fetch data from the authenticated endpoints.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to call `{path}`: {source}")]
    Transport {
        path: String,

        #[source]
        source: reqwest::Error,
    },

    #[error("`{path}` failed with {status}")]
    Status { path: String, status: StatusCode },

    #[error("malformed `{path}` response: {source}")]
    Malformed {
        path: String,

        #[source]
        source: serde_json::Error,
    },
}

/// Reason to abandon the rest of a poll cycle.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("failed to publish: {0:#}")]
    Publish(anyhow::Error),
}
