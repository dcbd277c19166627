//! Matching and transfer of playlists between two catalogs.
//!
//! [`transfer_playlist`] handles one playlist: create it on the destination,
//! look up every source track in order, then attach all hits in one call.
//! [`transfer_all`] runs it for a selection of playlists and folds the
//! per-track progress into one overall percentage.
//!
//! Misses are never fatal. A failing search only turns its track into a
//! [`MatchResult`] with `found == false`, and a failing playlist only turns
//! into an unsuccessful [`TransferOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::{
    config,
    errors::{CatalogError, TransferError},
    types::{
        MatchResult, PlaylistRef, SearchKind, Track, TrackProgress, TransferEvent,
        TransferOutcome,
    },
    utils,
};

/// Read side: where playlists come from.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Display name used in playlist descriptions, e.g. "Spotify".
    fn service_name(&self) -> &str;

    async fn list_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError>;

    /// All resolvable tracks of a playlist, pagination already followed.
    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError>;
}

/// Write side: where playlists are recreated.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    /// Item ids of the best matches for `query`, best first.
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<Vec<String>, CatalogError>;

    async fn create_playlist(&self, name: &str, description: &str) -> Result<String, CatalogError>;

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError>;
}

#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub source_name: String,
    pub search_kind: SearchKind,
    /// Pause after every search, whatever its result.
    pub search_delay: Duration,
}

impl TransferSettings {
    pub fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            search_kind: SearchKind::default(),
            search_delay: config::search_delay(),
        }
    }

    pub fn description(&self) -> String {
        format!("Imported from {}", self.source_name)
    }
}

/// Recreates one playlist on the destination.
///
/// Calls `on_progress` exactly once per track, in input order. Returns an
/// unsuccessful outcome when nothing matched or when creating the playlist or
/// attaching the tracks failed. An empty playlist that was already created is
/// left in place.
pub async fn transfer_playlist<C, F>(
    catalog: &C,
    settings: &TransferSettings,
    name: &str,
    tracks: &[Track],
    on_progress: F,
) -> TransferOutcome
where
    C: DestinationCatalog + ?Sized,
    F: FnMut(TrackProgress),
{
    match try_transfer_playlist(catalog, settings, name, tracks, on_progress).await {
        Ok(outcome) => outcome,
        Err(e) => TransferOutcome::failed(name, tracks.len(), e.user_message()),
    }
}

async fn try_transfer_playlist<C, F>(
    catalog: &C,
    settings: &TransferSettings,
    name: &str,
    tracks: &[Track],
    mut on_progress: F,
) -> Result<TransferOutcome, TransferError>
where
    C: DestinationCatalog + ?Sized,
    F: FnMut(TrackProgress),
{
    let playlist_id = catalog
        .create_playlist(name, &settings.description())
        .await
        .map_err(TransferError::PlaylistCreate)?;

    let total = tracks.len();
    let mut results: Vec<MatchResult> = Vec::with_capacity(total);

    for (idx, track) in tracks.iter().enumerate() {
        let current = idx + 1;
        let (result, search_error) = match_track(catalog, settings.search_kind, track).await;

        let message = match (result.found, &search_error) {
            (true, _) => format!("Added {} ({}/{})", track.title, current, total),
            (false, None) => format!("Not found: {} - {}", track.title, track.artist),
            (false, Some(e)) => format!(
                "Not found: {} - {} ({})",
                track.title,
                track.artist,
                e.user_message()
            ),
        };

        on_progress(TrackProgress {
            current,
            total,
            message,
        });
        results.push(result);

        sleep(settings.search_delay).await;
    }

    let matched: Vec<String> = results
        .into_iter()
        .filter_map(|r| r.destination_id)
        .collect();

    if matched.is_empty() {
        return Ok(TransferOutcome {
            playlist_name: name.to_string(),
            success: false,
            matched_count: 0,
            total_count: total,
            failure: Some("no track could be matched".to_string()),
        });
    }

    catalog
        .add_items(&playlist_id, &matched)
        .await
        .map_err(TransferError::BatchAttach)?;

    Ok(TransferOutcome {
        playlist_name: name.to_string(),
        success: true,
        matched_count: matched.len(),
        total_count: total,
        failure: None,
    })
}

/// Looks up a single track. A search error is reported next to the miss.
pub async fn match_track<C>(
    catalog: &C,
    kind: SearchKind,
    track: &Track,
) -> (MatchResult, Option<TransferError>)
where
    C: DestinationCatalog + ?Sized,
{
    match catalog.search(&track.search_query(), kind, 1).await {
        Ok(ids) => match ids.into_iter().next() {
            Some(id) => (MatchResult::found(track.clone(), id), None),
            None => (MatchResult::not_found(track.clone()), None),
        },
        Err(e) => (
            MatchResult::not_found(track.clone()),
            Some(TransferError::Search(e)),
        ),
    }
}

/// Transfers `playlists` one after another.
///
/// One playlist failing, whether reading its tracks or writing it, never
/// stops the ones after it. Returns one outcome per playlist, in order.
pub async fn transfer_all<S, C, F>(
    source: &S,
    catalog: &C,
    settings: &TransferSettings,
    playlists: &[PlaylistRef],
    mut on_event: F,
) -> Vec<TransferOutcome>
where
    S: SourceReader + ?Sized,
    C: DestinationCatalog + ?Sized,
    F: FnMut(TransferEvent),
{
    let selected = playlists.len();
    let mut outcomes = Vec::with_capacity(selected);

    for (index, playlist) in playlists.iter().enumerate() {
        let tracks = match source.list_tracks(&playlist.id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                let reason = TransferError::SourceRead(e).user_message();
                let outcome =
                    TransferOutcome::failed(&playlist.name, playlist.track_count as usize, reason);
                on_event(TransferEvent::PlaylistFinished(outcome.clone()));
                outcomes.push(outcome);
                continue;
            }
        };

        on_event(TransferEvent::PlaylistStarted {
            name: playlist.name.clone(),
            index,
            total_tracks: tracks.len(),
        });

        let outcome = transfer_playlist(catalog, settings, &playlist.name, &tracks, |progress| {
            let global = utils::global_progress(index, selected, progress.current, progress.total);
            on_event(TransferEvent::Track { progress, global });
        })
        .await;

        on_event(TransferEvent::PlaylistFinished(outcome.clone()));
        outcomes.push(outcome);
    }

    outcomes
}
