use chrono::Utc;

use crate::{
    config,
    errors::AuthError,
    oauth::{self, OAuthFlow, OAuthProvider},
    success,
    types::CredentialRecord,
};

/// Spotify accounts service settings for the authorization code flow.
pub fn provider() -> OAuthProvider {
    OAuthProvider {
        name: "Spotify".to_string(),
        auth_url: config::spotify_auth_url(),
        token_url: config::spotify_token_url(),
        scope: config::spotify_scope(),
        redirect_uri: config::spotify_redirect_uri(),
        extra_params: Vec::new(),
    }
}

/// Authorizes read access to the user's playlists.
///
/// The Spotify session is not persisted; each run asks the browser again,
/// which normally completes without a prompt once the app was approved. The
/// returned record carries the refresh token so the session can outlive a
/// single access token.
pub async fn authenticate(
    client_id: &str,
    client_secret: &str,
) -> Result<CredentialRecord, AuthError> {
    let token = OAuthFlow::new(provider())
        .authenticate(client_id, client_secret)
        .await?;

    success!("Connected to Spotify.");
    Ok(oauth::credential_record(
        token,
        client_id,
        client_secret,
        Utc::now().timestamp(),
    ))
}
