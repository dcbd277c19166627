use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use playferry::{
    errors::CatalogError,
    transfer::{DestinationCatalog, SourceReader, TransferSettings, transfer_all, transfer_playlist},
    types::{PlaylistRef, SearchKind, Track, TrackProgress, TransferEvent, TransferOutcome},
};

#[derive(Debug, Default)]
struct Calls {
    created: Vec<(String, String)>,
    searches: Vec<(String, SearchKind, u32)>,
    attached: Vec<(String, Vec<String>)>,
}

/// In-memory destination. Searches hit when the query is known.
#[derive(Default)]
struct FakeCatalog {
    hits: HashMap<String, String>,
    failing_queries: HashSet<String>,
    failing_playlists: HashSet<String>,
    fail_attach: bool,
    calls: Mutex<Calls>,
}

impl FakeCatalog {
    fn with_hits(hits: &[(&str, &str)]) -> Self {
        Self {
            hits: hits
                .iter()
                .map(|(q, id)| (q.to_string(), id.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DestinationCatalog for FakeCatalog {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> Result<Vec<String>, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .searches
            .push((query.to_string(), kind, limit));

        if self.failing_queries.contains(query) {
            return Err(CatalogError::Status {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        Ok(self.hits.get(query).cloned().into_iter().collect())
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Result<String, CatalogError> {
        if self.failing_playlists.contains(name) {
            return Err(CatalogError::Status {
                status: 403,
                body: "quota exceeded".to_string(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .created
            .push((name.to_string(), description.to_string()));
        Ok(format!("pl-{}", name))
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        if self.fail_attach {
            return Err(CatalogError::Unauthorized);
        }
        self.calls
            .lock()
            .unwrap()
            .attached
            .push((playlist_id.to_string(), item_ids.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeSource {
    tracks: HashMap<String, Vec<Track>>,
    unreadable: HashSet<String>,
}

#[async_trait]
impl SourceReader for FakeSource {
    fn service_name(&self) -> &str {
        "Spotify"
    }

    async fn list_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError> {
        Ok(Vec::new())
    }

    async fn list_tracks(&self, playlist_id: &str) -> Result<Vec<Track>, CatalogError> {
        if self.unreadable.contains(playlist_id) {
            return Err(CatalogError::Status {
                status: 404,
                body: "not found".to_string(),
            });
        }
        Ok(self.tracks.get(playlist_id).cloned().unwrap_or_default())
    }
}

fn track(title: &str, artist: &str) -> Track {
    Track {
        title: title.to_string(),
        artist: artist.to_string(),
        album: format!("{} album", artist),
    }
}

fn numbered_tracks(prefix: &str, count: usize) -> Vec<Track> {
    (1..=count)
        .map(|i| track(&format!("{} {}", prefix, i), "Artist"))
        .collect()
}

fn settings() -> TransferSettings {
    TransferSettings {
        source_name: "Spotify".to_string(),
        search_kind: SearchKind::Song,
        search_delay: Duration::ZERO,
    }
}

fn playlist_ref(id: &str, name: &str, count: u32) -> PlaylistRef {
    PlaylistRef {
        id: id.to_string(),
        name: name.to_string(),
        track_count: count,
    }
}

#[tokio::test]
async fn test_one_progress_event_per_track_in_order() {
    let catalog = FakeCatalog::with_hits(&[("Song 2 Artist", "v2")]);
    let tracks = numbered_tracks("Song", 4);
    let mut events: Vec<TrackProgress> = Vec::new();

    transfer_playlist(&catalog, &settings(), "Mix", &tracks, |p| events.push(p)).await;

    let currents: Vec<usize> = events.iter().map(|e| e.current).collect();
    assert_eq!(currents, vec![1, 2, 3, 4]);
    assert!(events.iter().all(|e| e.total == 4));

    assert_eq!(events[0].message, "Not found: Song 1 - Artist");
    assert_eq!(events[1].message, "Added Song 2 (2/4)");

    // searches follow input order
    let calls = catalog.calls.lock().unwrap();
    let queries: Vec<&str> = calls.searches.iter().map(|s| s.0.as_str()).collect();
    assert_eq!(
        queries,
        vec!["Song 1 Artist", "Song 2 Artist", "Song 3 Artist", "Song 4 Artist"]
    );
}

#[tokio::test]
async fn test_search_requests_single_song_result() {
    let catalog = FakeCatalog::default();
    let tracks = vec![track("Halo", "Beyonce")];

    transfer_playlist(&catalog, &settings(), "Mix", &tracks, |_| {}).await;

    let calls = catalog.calls.lock().unwrap();
    assert_eq!(
        calls.searches,
        vec![("Halo Beyonce".to_string(), SearchKind::Song, 1)]
    );
    assert_eq!(
        calls.created,
        vec![("Mix".to_string(), "Imported from Spotify".to_string())]
    );
}

#[tokio::test]
async fn test_no_match_keeps_empty_playlist() {
    let mut catalog = FakeCatalog::default();
    catalog.failing_queries.insert("Song 2 Artist".to_string());
    let tracks = numbered_tracks("Song", 3);
    let mut count = 0;

    let outcome = transfer_playlist(&catalog, &settings(), "Empty", &tracks, |_| count += 1).await;

    assert!(!outcome.success);
    assert_eq!(outcome.matched_count, 0);
    assert_eq!(outcome.total_count, 3);
    assert_eq!(count, 3);

    let calls = catalog.calls.lock().unwrap();
    assert_eq!(calls.created.len(), 1);
    assert!(calls.attached.is_empty());
}

#[tokio::test]
async fn test_matches_attached_once_in_discovery_order() {
    let catalog = FakeCatalog::with_hits(&[
        ("Song 4 Artist", "v4"),
        ("Song 1 Artist", "v1"),
        ("Song 3 Artist", "v3"),
    ]);
    let tracks = numbered_tracks("Song", 5);

    let outcome = transfer_playlist(&catalog, &settings(), "Mix", &tracks, |_| {}).await;

    assert_eq!(
        outcome,
        TransferOutcome {
            playlist_name: "Mix".to_string(),
            success: true,
            matched_count: 3,
            total_count: 5,
            failure: None,
        }
    );

    let calls = catalog.calls.lock().unwrap();
    assert_eq!(
        calls.attached,
        vec![(
            "pl-Mix".to_string(),
            vec!["v1".to_string(), "v3".to_string(), "v4".to_string()]
        )]
    );
}

#[tokio::test]
async fn test_search_error_is_a_miss_not_an_abort() {
    let mut catalog = FakeCatalog::with_hits(&[("Song 2 Artist", "v2")]);
    catalog.failing_queries.insert("Song 1 Artist".to_string());
    let tracks = numbered_tracks("Song", 2);
    let mut messages = Vec::new();

    let outcome =
        transfer_playlist(&catalog, &settings(), "Mix", &tracks, |p| messages.push(p.message)).await;

    assert!(outcome.success);
    assert_eq!(outcome.matched_count, 1);
    assert!(messages[0].starts_with("Not found: Song 1 - Artist"));
    assert_eq!(messages[1], "Added Song 2 (2/2)");
}

#[tokio::test]
async fn test_create_failure_fails_playlist_without_searching() {
    let mut catalog = FakeCatalog::with_hits(&[("Song 1 Artist", "v1")]);
    catalog.failing_playlists.insert("Broken".to_string());
    let tracks = numbered_tracks("Song", 2);
    let mut count = 0;

    let outcome = transfer_playlist(&catalog, &settings(), "Broken", &tracks, |_| count += 1).await;

    assert!(!outcome.success);
    assert_eq!(outcome.matched_count, 0);
    assert!(outcome.failure.unwrap().contains("could not create playlist"));
    assert_eq!(count, 0);
    assert!(catalog.calls.lock().unwrap().searches.is_empty());
}

#[tokio::test]
async fn test_attach_failure_reports_zero_matches() {
    let mut catalog = FakeCatalog::with_hits(&[("Song 1 Artist", "v1")]);
    catalog.fail_attach = true;
    let tracks = numbered_tracks("Song", 2);

    let outcome = transfer_playlist(&catalog, &settings(), "Mix", &tracks, |_| {}).await;

    assert!(!outcome.success);
    assert_eq!(outcome.matched_count, 0);
    assert_eq!(outcome.total_count, 2);
    assert!(outcome.failure.unwrap().contains("could not add tracks"));
}

#[tokio::test]
async fn test_duplicate_tracks_pass_through() {
    let catalog = FakeCatalog::with_hits(&[("Song 1 Artist", "v1")]);
    let tracks = vec![track("Song 1", "Artist"), track("Song 1", "Artist")];

    let outcome = transfer_playlist(&catalog, &settings(), "Mix", &tracks, |_| {}).await;

    assert_eq!(outcome.matched_count, 2);
    assert_eq!(catalog.calls.lock().unwrap().searches.len(), 2);
}

#[tokio::test]
async fn test_repeated_runs_emit_identical_event_sequences() {
    let catalog = FakeCatalog::with_hits(&[("Song 2 Artist", "v2")]);
    let tracks = numbered_tracks("Song", 3);

    let mut first = Vec::new();
    let mut second = Vec::new();
    transfer_playlist(&catalog, &settings(), "Mix", &tracks, |p| first.push(p)).await;
    transfer_playlist(&catalog, &settings(), "Mix", &tracks, |p| second.push(p)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_search_delay_applies_after_every_track() {
    let catalog = FakeCatalog::default();
    let tracks = numbered_tracks("Song", 3);
    let mut settings = settings();
    settings.search_delay = Duration::from_millis(40);

    let started = std::time::Instant::now();
    transfer_playlist(&catalog, &settings, "Mix", &tracks, |_| {}).await;

    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_failing_playlist_does_not_stop_the_batch() {
    let mut catalog = FakeCatalog::with_hits(&[("A 1 Artist", "a1"), ("C 2 Artist", "c2")]);
    catalog.failing_playlists.insert("Second".to_string());

    let mut source = FakeSource::default();
    source.tracks.insert("p1".to_string(), numbered_tracks("A", 2));
    source.tracks.insert("p2".to_string(), numbered_tracks("B", 2));
    source.tracks.insert("p3".to_string(), numbered_tracks("C", 3));

    let playlists = vec![
        playlist_ref("p1", "First", 2),
        playlist_ref("p2", "Second", 2),
        playlist_ref("p3", "Third", 3),
    ];

    let mut finished = Vec::new();
    let outcomes = transfer_all(&source, &catalog, &settings(), &playlists, |event| {
        if let TransferEvent::PlaylistFinished(outcome) = event {
            finished.push(outcome);
        }
    })
    .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(finished, outcomes);

    assert!(outcomes[0].success);
    assert_eq!(outcomes[0].matched_count, 1);
    assert_eq!(outcomes[0].total_count, 2);

    assert!(!outcomes[1].success);
    assert_eq!(outcomes[1].matched_count, 0);

    assert!(outcomes[2].success);
    assert_eq!(outcomes[2].matched_count, 1);
    assert_eq!(outcomes[2].total_count, 3);
}

#[tokio::test]
async fn test_unreadable_source_playlist_is_skipped() {
    let catalog = FakeCatalog::with_hits(&[("B 1 Artist", "b1")]);

    let mut source = FakeSource::default();
    source.unreadable.insert("p1".to_string());
    source.tracks.insert("p2".to_string(), numbered_tracks("B", 1));

    let playlists = vec![playlist_ref("p1", "Gone", 7), playlist_ref("p2", "Here", 1)];

    let mut started = Vec::new();
    let outcomes = transfer_all(&source, &catalog, &settings(), &playlists, |event| {
        if let TransferEvent::PlaylistStarted { name, .. } = event {
            started.push(name);
        }
    })
    .await;

    // tracks are read before the start event, so a failed read never starts
    assert_eq!(started, vec!["Here".to_string()]);
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].total_count, 7);
    assert!(outcomes[0].failure.as_ref().unwrap().contains("could not read tracks"));
    assert!(outcomes[1].success);

    // nothing was created for the unreadable playlist
    let calls = catalog.calls.lock().unwrap();
    let created: Vec<&str> = calls.created.iter().map(|c| c.0.as_str()).collect();
    assert_eq!(created, vec!["Here"]);
}

#[tokio::test]
async fn test_global_progress_across_playlists() {
    let catalog = FakeCatalog::default();

    let mut source = FakeSource::default();
    source.tracks.insert("p1".to_string(), numbered_tracks("A", 10));
    source.tracks.insert("p2".to_string(), numbered_tracks("B", 10));

    let playlists = vec![playlist_ref("p1", "One", 10), playlist_ref("p2", "Two", 10)];

    let mut track_events: Vec<(usize, f64)> = Vec::new();
    let mut started = Vec::new();
    transfer_all(&source, &catalog, &settings(), &playlists, |event| match event {
        TransferEvent::Track { progress, global } => track_events.push((progress.current, global)),
        TransferEvent::PlaylistStarted {
            name,
            index,
            total_tracks,
        } => started.push((name, index, total_tracks)),
        TransferEvent::PlaylistFinished(_) => {}
    })
    .await;

    assert_eq!(track_events.len(), 20);
    assert_eq!(track_events[4], (5, 25.0));
    assert_eq!(track_events[14], (5, 75.0));
    assert_eq!(track_events[19], (10, 100.0));

    // progress never goes backwards
    assert!(track_events.windows(2).all(|w| w[0].1 <= w[1].1));

    assert_eq!(
        started,
        vec![("One".to_string(), 0, 10), ("Two".to_string(), 1, 10)]
    );
}
