use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};

use crate::{
    config,
    errors::AuthError,
    info,
    management::{CredentialStore, CredentialValidator},
    oauth::{self, EXPIRY_MARGIN_SECS, OAuthFlow, OAuthProvider, apply_refresh, credential_record},
    success,
    types::CredentialRecord,
    warning,
    youtube::YouTubeClient,
};

/// Google OAuth settings. Offline access and forced consent make Google hand
/// out a refresh token on every authorization.
pub fn provider() -> OAuthProvider {
    OAuthProvider {
        name: "YouTube Music".to_string(),
        auth_url: config::youtube_auth_url(),
        token_url: config::youtube_token_url(),
        scope: config::youtube_scope(),
        redirect_uri: config::youtube_redirect_uri(),
        extra_params: vec![
            ("access_type".to_string(), "offline".to_string()),
            ("prompt".to_string(), "consent".to_string()),
        ],
    }
}

/// Returns a YouTube client, reusing stored credentials when they still work.
///
/// With `force` the stored record is discarded first, so the browser flow
/// always runs.
pub async fn connect(
    store: CredentialStore,
    client_id: &str,
    client_secret: &str,
    force: bool,
) -> Result<YouTubeClient, AuthError> {
    if force {
        store.delete().await?;
    }

    let validator = YouTubeValidator::from_config(Some(client_id.to_string()));
    let record = match store.load_validated(&validator).await? {
        Some(record) => {
            info!("Using stored YouTube Music credentials.");
            record
        }
        None => authenticate(&OAuthFlow::new(provider()), &store, client_id, client_secret).await?,
    };

    Ok(YouTubeClient::new(
        record,
        config::youtube_api_url(),
        config::youtube_token_url(),
    )
    .with_store(store))
}

/// Runs `flow` and persists the resulting credential record.
pub async fn authenticate(
    flow: &OAuthFlow,
    store: &CredentialStore,
    client_id: &str,
    client_secret: &str,
) -> Result<CredentialRecord, AuthError> {
    let token = flow.authenticate(client_id, client_secret).await?;
    let record = credential_record(token, client_id, client_secret, Utc::now().timestamp());

    store.save(&record).await?;
    success!("Connected to YouTube Music.");

    Ok(record)
}

/// Checks a stored record by refreshing it when due and probing the API.
pub struct YouTubeValidator {
    http: Client,
    api_url: String,
    token_url: String,
    expected_client_id: Option<String>,
}

impl YouTubeValidator {
    pub fn new(api_url: String, token_url: String, expected_client_id: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            expected_client_id,
        }
    }

    pub fn from_config(expected_client_id: Option<String>) -> Self {
        Self::new(
            config::youtube_api_url(),
            config::youtube_token_url(),
            expected_client_id,
        )
    }
}

#[async_trait]
impl CredentialValidator for YouTubeValidator {
    async fn validate(&self, record: &CredentialRecord) -> Result<CredentialRecord, AuthError> {
        if let Some(expected) = &self.expected_client_id {
            if *expected != record.client_id {
                return Err(AuthError::InvalidCredential(
                    "issued for a different client id".to_string(),
                ));
            }
        }

        let mut record = record.clone();
        let now = Utc::now().timestamp();

        if record.expires_within(now, EXPIRY_MARGIN_SECS) {
            if record.refresh_token.is_empty() {
                return Err(AuthError::InvalidCredential(
                    "expired and no refresh token stored".to_string(),
                ));
            }
            let token = oauth::refresh_access_token(
                &self.http,
                &self.token_url,
                &record.refresh_token,
                &record.client_id,
                &record.client_secret,
            )
            .await?;
            apply_refresh(&mut record, token, now);
        }

        let probe = format!("{}/channels?part=id&mine=true", self.api_url);
        let response = self
            .http
            .get(&probe)
            .bearer_auth(&record.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredential(
                "access token rejected".to_string(),
            )),
            status if status.is_success() => Ok(record),
            status => {
                warning!(
                    "Could not verify YouTube Music credentials (HTTP {}), using them anyway.",
                    status.as_u16()
                );
                Ok(record)
            }
        }
    }
}
