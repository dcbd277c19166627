use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    config,
    errors::{AuthError, CatalogError},
    oauth,
    spotify::auth,
    transfer::SourceReader,
    types::{
        CredentialRecord, PlaylistRef, SpotifyPage, SpotifyPlaylist, SpotifyPlaylistItem, Track,
    },
    utils,
};

/// Authenticated read access to a user's Spotify playlists.
///
/// The session lives in memory and is refreshed before a page request when
/// its access token is about to run out.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token_url: String,
    session: Mutex<CredentialRecord>,
}

impl SpotifyClient {
    pub fn new(session: CredentialRecord, api_url: String, token_url: String) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            session: Mutex::new(session),
        }
    }

    /// Runs the browser authorization and returns a ready client.
    pub async fn connect(client_id: &str, client_secret: &str) -> Result<Self, AuthError> {
        let session = auth::authenticate(client_id, client_secret).await?;
        Ok(Self::new(
            session,
            config::spotify_api_url(),
            config::spotify_token_url(),
        ))
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut session = self.session.lock().await;
        oauth::refresh_if_expiring(&self.http, &self.token_url, &mut session).await?;
        Ok(session.access_token.clone())
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<SpotifyPage<T>, CatalogError> {
        let token = self.access_token().await?;
        let request = self.http.get(url).bearer_auth(token);
        let response = utils::check_status(utils::send_with_retry(request).await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Walks a paginated collection, starting at `first_url`.
    async fn collect_pages<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, CatalogError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page = self.get_page::<T>(&url).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}

#[async_trait]
impl SourceReader for SpotifyClient {
    fn service_name(&self) -> &str {
        "Spotify"
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError> {
        let url = format!("{}/me/playlists?limit=50", self.api_url);
        let playlists = self.collect_pages::<SpotifyPlaylist>(url).await?;

        Ok(playlists
            .into_iter()
            .map(|p| PlaylistRef {
                id: p.id,
                name: p.name,
                track_count: p.tracks.map(|t| t.total).unwrap_or(0),
            })
            .collect())
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError> {
        let url = format!(
            "{}/playlists/{}/tracks?limit=100&additional_types=track",
            self.api_url, playlist_id
        );
        let items = self.collect_pages::<SpotifyPlaylistItem>(url).await?;

        Ok(items.into_iter().filter_map(resolve_item).collect())
    }
}

// local files and removed tracks come back without a catalog id
fn resolve_item(item: SpotifyPlaylistItem) -> Option<Track> {
    let track = item.track?;
    if track.id.is_none() {
        return None;
    }

    Some(Track {
        title: track.name,
        artist: track
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default(),
        album: track.album.map(|a| a.name).unwrap_or_default(),
    })
}
