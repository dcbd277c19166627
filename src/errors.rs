//! Error types shared across the crate.
//!
//! Only [`AuthError`] stops a command. Catalog and transfer errors are
//! contained at the track or playlist they belong to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authorization code received within {0} seconds")]
    Timeout(u64),
    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },
    #[error("stored credentials were rejected: {0}")]
    InvalidCredential(String),
    #[error("callback listener failed: {0}")]
    Listener(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("missing configuration: {0}")]
    MissingConfig(String),
}

impl AuthError {
    /// Human readable status naming the cause of the failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Timeout(secs) => format!(
                "Timed out after {}s waiting for the browser authorization. Try again.",
                secs
            ),
            AuthError::TokenExchange { status, .. } => format!(
                "The service refused the authorization (HTTP {}). Check the client id and secret.",
                status
            ),
            AuthError::InvalidCredential(_) => {
                "Stored credentials are no longer valid. Run the authorization again.".to_string()
            }
            AuthError::Listener(e) => format!(
                "Could not listen for the authorization callback: {}. Is the port in use?",
                e
            ),
            AuthError::Http(e) => format!("Connection problem during authorization: {}", e),
            AuthError::Store(e) => format!("Cannot access the credential file: {}", e),
            AuthError::MissingConfig(name) => format!("{} is not configured.", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("access token rejected")]
    Unauthorized,
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maps a failed token refresh during catalog access.
///
/// Only a rejected grant means the credentials are bad. Connection problems
/// and token endpoint failures keep their own cause.
impl From<AuthError> for CatalogError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Http(e) => CatalogError::Http(e),
            AuthError::TokenExchange { status, body } => CatalogError::Status { status, body },
            AuthError::InvalidCredential(_) => CatalogError::Unauthorized,
            other => CatalogError::Status {
                status: 0,
                body: other.to_string(),
            },
        }
    }
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Http(e) => format!("connection problem: {}", e),
            CatalogError::Status { status, .. } => format!("service answered HTTP {}", status),
            CatalogError::Unauthorized => "credentials rejected".to_string(),
            CatalogError::Decode(_) => "service sent an unexpected response".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("creating playlist failed: {0}")]
    PlaylistCreate(CatalogError),
    #[error("adding tracks to playlist failed: {0}")]
    BatchAttach(CatalogError),
    #[error("search failed: {0}")]
    Search(CatalogError),
    #[error("reading source playlist failed: {0}")]
    SourceRead(CatalogError),
}

impl TransferError {
    pub fn user_message(&self) -> String {
        match self {
            TransferError::PlaylistCreate(e) => format!("could not create playlist, {}", e.user_message()),
            TransferError::BatchAttach(e) => format!("could not add tracks, {}", e.user_message()),
            TransferError::Search(e) => format!("search failed, {}", e.user_message()),
            TransferError::SourceRead(e) => format!("could not read tracks, {}", e.user_message()),
        }
    }
}
