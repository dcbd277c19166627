use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    errors::CatalogError,
    management::CredentialStore,
    oauth,
    transfer::DestinationCatalog,
    types::{
        CreateYouTubePlaylistRequest, CredentialRecord, InsertPlaylistItemRequest,
        PlaylistItemResource, PlaylistItemSnippet, SearchKind, YouTubePlaylistResponse,
        YouTubePlaylistSnippet, YouTubePlaylistStatus, YouTubeSearchResponse,
    },
    utils, warning,
};

const MUSIC_CATEGORY_ID: &str = "10";

/// YouTube Data API client acting as the transfer destination.
///
/// Holds the credential record and refreshes the access token shortly
/// before it expires, so long transfers outlive a single token.
pub struct YouTubeClient {
    http: Client,
    api_url: String,
    token_url: String,
    session: Mutex<CredentialRecord>,
    store: Option<CredentialStore>,
}

impl YouTubeClient {
    pub fn new(record: CredentialRecord, api_url: String, token_url: String) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            session: Mutex::new(record),
            store: None,
        }
    }

    /// Persist refreshed tokens to `store`.
    pub fn with_store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut session = self.session.lock().await;

        if oauth::refresh_if_expiring(&self.http, &self.token_url, &mut session).await? {
            if let Some(store) = &self.store {
                if let Err(e) = store.save(&session).await {
                    warning!("Failed to save refreshed credentials: {}", e);
                }
            }
        }

        Ok(session.access_token.clone())
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CatalogError> {
        let response = utils::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DestinationCatalog for YouTubeClient {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<Vec<String>, CatalogError> {
        let token = self.access_token().await?;
        let limit = limit.to_string();

        let mut request = self
            .http
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", limit.as_str()),
                ("q", query),
            ]);
        if kind == SearchKind::Song {
            request = request.query(&[("videoCategoryId", MUSIC_CATEGORY_ID)]);
        }

        let response = utils::send_with_retry(request).await?;
        let results: YouTubeSearchResponse = Self::read_json(response).await?;

        Ok(results
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Result<String, CatalogError> {
        let token = self.access_token().await?;
        let body = CreateYouTubePlaylistRequest {
            snippet: YouTubePlaylistSnippet {
                title: name.to_string(),
                description: description.to_string(),
            },
            status: YouTubePlaylistStatus {
                privacy_status: "private".to_string(),
            },
        };

        let request = self
            .http
            .post(format!("{}/playlists", self.api_url))
            .bearer_auth(token)
            .query(&[("part", "snippet,status")])
            .json(&body);

        let response = utils::send_with_retry(request).await?;
        let playlist: YouTubePlaylistResponse = Self::read_json(response).await?;
        Ok(playlist.id)
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        // the Data API inserts one item per request
        for video_id in item_ids {
            let token = self.access_token().await?;
            let body = InsertPlaylistItemRequest {
                snippet: PlaylistItemSnippet {
                    playlist_id: playlist_id.to_string(),
                    resource_id: PlaylistItemResource {
                        kind: "youtube#video".to_string(),
                        video_id: video_id.clone(),
                    },
                },
            };

            let request = self
                .http
                .post(format!("{}/playlistItems", self.api_url))
                .bearer_auth(token)
                .query(&[("part", "snippet")])
                .json(&body);

            let response = utils::send_with_retry(request).await?;
            utils::check_status(response).await?;
        }

        Ok(())
    }
}
