//! Browser based authorization code flow.
//!
//! [`OAuthFlow::authenticate`] starts a loopback [`CallbackServer`], sends the
//! user to the provider's consent page, waits for the redirect carrying the
//! authorization code and trades the code for tokens. The listener is torn
//! down on every exit path before the result is returned.

use std::{io, sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, StatusCode, Url};

use crate::{
    api::{CallbackState, CodeSlot},
    config,
    errors::AuthError,
    info,
    server::CallbackServer,
    types::{CredentialRecord, TokenResponse},
    utils, warning,
};

/// Seconds before expiry at which an access token is refreshed.
pub const EXPIRY_MARGIN_SECS: i64 = 240;

/// Endpoints and fixed parameters of one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    pub name: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub redirect_uri: String,
    pub extra_params: Vec<(String, String)>,
}

pub type BrowserLauncher = Arc<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

pub struct OAuthFlow {
    provider: OAuthProvider,
    timeout: Duration,
    launcher: BrowserLauncher,
    http: Client,
}

impl OAuthFlow {
    pub fn new(provider: OAuthProvider) -> Self {
        Self {
            provider,
            timeout: config::oauth_timeout(),
            launcher: Arc::new(|url: &str| webbrowser::open(url)),
            http: Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the default browser launcher.
    pub fn with_browser<F>(mut self, launcher: F) -> Self
    where
        F: Fn(&str) -> io::Result<()> + Send + Sync + 'static,
    {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn provider(&self) -> &OAuthProvider {
        &self.provider
    }

    pub fn authorize_url(
        &self,
        client_id: &str,
        state: &str,
        code_challenge: &str,
    ) -> Result<Url, AuthError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", &self.provider.redirect_uri),
            ("scope", &self.provider.scope),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
        ];
        params.extend(
            self.provider
                .extra_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );

        Url::parse_with_params(&self.provider.auth_url, &params).map_err(|e| {
            AuthError::MissingConfig(format!(
                "a valid {} authorization url ({})",
                self.provider.name, e
            ))
        })
    }

    /// Runs the full authorization and returns the provider's token response.
    pub async fn authenticate(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, AuthError> {
        let (addr, path) = utils::parse_redirect_uri(&self.provider.redirect_uri)?;

        let verifier = utils::generate_code_verifier();
        let state = utils::generate_state();
        let slot = CodeSlot::new();

        let server = CallbackServer::start(
            addr,
            &path,
            CallbackState {
                slot: slot.clone(),
                expected_state: Some(state.clone()),
            },
        )
        .await?;

        let result = self
            .await_authorization(&slot, client_id, client_secret, &state, &verifier)
            .await;

        server.shutdown().await;
        result
    }

    async fn await_authorization(
        &self,
        slot: &CodeSlot,
        client_id: &str,
        client_secret: &str,
        state: &str,
        verifier: &str,
    ) -> Result<TokenResponse, AuthError> {
        let challenge = utils::generate_code_challenge(verifier);
        let auth_url = self.authorize_url(client_id, state, &challenge)?;

        if (self.launcher)(auth_url.as_str()).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        } else {
            info!(
                "Waiting for {} authorization in your browser...",
                self.provider.name
            );
        }

        let code = match tokio::time::timeout(self.timeout, slot.wait()).await {
            Ok(code) => code,
            Err(_) => return Err(AuthError::Timeout(self.timeout.as_secs())),
        };

        self.exchange_code(&code, client_id, client_secret, verifier)
            .await
    }

    /// Trades an authorization code for tokens at the provider's token endpoint.
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        verifier: &str,
    ) -> Result<TokenResponse, AuthError> {
        let res = self
            .http
            .post(&self.provider.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", &self.provider.redirect_uri),
                ("code_verifier", verifier),
            ])
            .send()
            .await?;

        read_token_response(res).await
    }
}

/// Obtains a fresh access token with a refresh token.
///
/// A `400` or `401` from the token endpoint means the grant was revoked or
/// the client credentials changed, and maps to [`AuthError::InvalidCredential`].
pub async fn refresh_access_token(
    http: &Client,
    token_url: &str,
    refresh_token: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse, AuthError> {
    let res = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await?;

    match res.status() {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            let body = res.text().await.unwrap_or_default();
            Err(AuthError::InvalidCredential(body))
        }
        _ => read_token_response(res).await,
    }
}

/// Refreshes `record` in place when its access token expires within
/// [`EXPIRY_MARGIN_SECS`]. Returns whether a refresh happened.
///
/// A record without a refresh token is left alone.
pub async fn refresh_if_expiring(
    http: &Client,
    token_url: &str,
    record: &mut CredentialRecord,
) -> Result<bool, AuthError> {
    let now = Utc::now().timestamp();
    if !record.expires_within(now, EXPIRY_MARGIN_SECS) || record.refresh_token.is_empty() {
        return Ok(false);
    }

    let token = refresh_access_token(
        http,
        token_url,
        &record.refresh_token,
        &record.client_id,
        &record.client_secret,
    )
    .await?;
    apply_refresh(record, token, now);
    Ok(true)
}

pub fn credential_record(
    token: TokenResponse,
    client_id: &str,
    client_secret: &str,
    now: i64,
) -> CredentialRecord {
    CredentialRecord {
        access_token: token.access_token,
        refresh_token: token.refresh_token.unwrap_or_default(),
        expires_at: now + token.expires_in,
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
    }
}

/// Applies a refresh response to `record`. Providers may omit the refresh
/// token, in which case the old one stays.
pub fn apply_refresh(record: &mut CredentialRecord, token: TokenResponse, now: i64) {
    record.access_token = token.access_token;
    if let Some(refresh_token) = token.refresh_token {
        record.refresh_token = refresh_token;
    }
    record.expires_at = now + token.expires_in;
}

async fn read_token_response(res: reqwest::Response) -> Result<TokenResponse, AuthError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(AuthError::TokenExchange {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str::<TokenResponse>(&body).map_err(|e| AuthError::TokenExchange {
        status: status.as_u16(),
        body: format!("unreadable token response ({}): {}", e, body),
    })
}
