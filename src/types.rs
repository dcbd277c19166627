use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A track as read from the source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl Track {
    /// Query sent to the destination catalog for this track.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    pub track_count: u32,
}

/// Result of looking up one source track in the destination catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub track: Track,
    pub destination_id: Option<String>,
    pub found: bool,
}

impl MatchResult {
    pub fn found(track: Track, destination_id: String) -> Self {
        Self {
            track,
            destination_id: Some(destination_id),
            found: true,
        }
    }

    pub fn not_found(track: Track) -> Self {
        Self {
            track,
            destination_id: None,
            found: false,
        }
    }
}

/// What kind of destination item a track is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchKind {
    /// Music-category uploads only
    #[default]
    Song,
    /// Any video
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub playlist_name: String,
    pub success: bool,
    pub matched_count: usize,
    pub total_count: usize,
    /// Why the playlist was not transferred, when it was not.
    pub failure: Option<String>,
}

impl TransferOutcome {
    pub fn failed(playlist_name: &str, total_count: usize, reason: String) -> Self {
        Self {
            playlist_name: playlist_name.to_string(),
            success: false,
            matched_count: 0,
            total_count,
            failure: Some(reason),
        }
    }
}

/// Per-track progress, emitted once for every processed track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Events streamed from the transfer task to the interactive surface.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    PlaylistStarted {
        name: String,
        index: usize,
        total_tracks: usize,
    },
    Track {
        progress: TrackProgress,
        global: f64,
    },
    PlaylistFinished(TransferOutcome),
}

/// The destination session persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub client_id: String,
    pub client_secret: String,
}

impl CredentialRecord {
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        now >= self.expires_at - margin_secs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub tracks: u32,
}

#[derive(Tabled)]
pub struct OutcomeTableRow {
    pub playlist: String,
    pub status: String,
    pub matched: String,
}

// Spotify Web API payloads

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPage<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub tracks: Option<SpotifyTracksRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTracksRef {
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
}

// YouTube Data API payloads

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YouTubeSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeSearchItem {
    pub id: YouTubeResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateYouTubePlaylistRequest {
    pub snippet: YouTubePlaylistSnippet,
    pub status: YouTubePlaylistStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct YouTubePlaylistSnippet {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubePlaylistStatus {
    pub privacy_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertPlaylistItemRequest {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: PlaylistItemResource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub kind: String,
    pub video_id: String,
}
