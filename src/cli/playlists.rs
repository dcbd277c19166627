use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    Res, cli,
    spotify::SpotifyClient,
    transfer::SourceReader,
    types::{PlaylistRef, PlaylistTableRow},
};

pub async fn list_playlists() -> Res<()> {
    let spotify = connect_spotify().await?;
    let playlists = fetch_playlists(&spotify).await?;

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .enumerate()
        .map(|(i, p)| PlaylistTableRow {
            index: i + 1,
            name: p.name,
            tracks: p.track_count,
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

pub(crate) async fn connect_spotify() -> Res<SpotifyClient> {
    let (client_id, client_secret) = cli::spotify_credentials()?;
    let client = SpotifyClient::connect(&client_id, &client_secret)
        .await
        .map_err(|e| e.user_message())?;
    Ok(client)
}

pub(crate) async fn fetch_playlists(spotify: &SpotifyClient) -> Res<Vec<PlaylistRef>> {
    let pb = spinner("Fetching Spotify playlists...");
    let result = spotify.list_playlists().await;
    pb.finish_and_clear();

    let playlists =
        result.map_err(|e| format!("Failed to list Spotify playlists: {}", e.user_message()))?;
    Ok(playlists)
}

pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
