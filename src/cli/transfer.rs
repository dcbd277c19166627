use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::sync::mpsc;

use crate::{
    Res, cli,
    cli::playlists::{connect_spotify, fetch_playlists},
    management::CredentialStore,
    success,
    transfer::{SourceReader, TransferSettings, transfer_all},
    types::{OutcomeTableRow, SearchKind, TransferEvent, TransferOutcome},
    utils, warning, youtube,
};

pub async fn transfer(selectors: Vec<String>, all: bool, kind: SearchKind) -> Res<()> {
    if selectors.is_empty() && !all {
        return Err(
            "Select playlists by index or name, or pass --all. Run `playferry playlists` to list them."
                .into(),
        );
    }

    let spotify = connect_spotify().await?;
    let playlists = fetch_playlists(&spotify).await?;
    let selected = if all {
        playlists
    } else {
        utils::select_playlists(&playlists, &selectors)?
    };

    if selected.is_empty() {
        warning!("No playlists to transfer.");
        return Ok(());
    }

    let (client_id, client_secret) = cli::youtube_credentials()?;
    let youtube = youtube::auth::connect(
        CredentialStore::from_config(),
        &client_id,
        &client_secret,
        false,
    )
    .await
    .map_err(|e| e.user_message())?;

    let mut settings = TransferSettings::new(spotify.service_name());
    settings.search_kind = kind;

    let (tx, mut rx) = mpsc::unbounded_channel::<TransferEvent>();
    let task = tokio::spawn(async move {
        transfer_all(&spotify, &youtube, &settings, &selected, |event| {
            let _ = tx.send(event);
        })
        .await
    });

    let pb = progress_bar();
    while let Some(event) = rx.recv().await {
        render(&pb, event);
    }
    pb.finish_and_clear();

    let outcomes = task.await?;
    println!("{}", Table::new(outcomes.iter().map(table_row)));
    success!("Transfer complete!");
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {wide_msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

fn render(pb: &ProgressBar, event: TransferEvent) {
    match event {
        TransferEvent::PlaylistStarted {
            name, total_tracks, ..
        } => {
            pb.println(format!(
                "[{}] Transferring '{}' ({} tracks)",
                "o".blue().bold(),
                name,
                total_tracks
            ));
        }
        TransferEvent::Track { progress, global } => {
            pb.set_position(global.round() as u64);
            if progress.message.starts_with("Not found") {
                pb.println(format!("[{}] {}", "!".yellow().bold(), progress.message));
            }
            pb.set_message(progress.message);
        }
        TransferEvent::PlaylistFinished(outcome) => {
            pb.println(outcome_line(&outcome));
        }
    }
}

fn outcome_line(outcome: &TransferOutcome) -> String {
    if outcome.success {
        format!(
            "[{}] Transferred '{}' ({}/{} tracks)",
            "✓".green().bold(),
            outcome.playlist_name,
            outcome.matched_count,
            outcome.total_count
        )
    } else {
        format!(
            "[{}] Failed to transfer '{}': {}",
            "!".red().bold(),
            outcome.playlist_name,
            outcome.failure.as_deref().unwrap_or("unknown error")
        )
    }
}

fn table_row(outcome: &TransferOutcome) -> OutcomeTableRow {
    OutcomeTableRow {
        playlist: outcome.playlist_name.clone(),
        status: if outcome.success {
            "transferred".to_string()
        } else {
            format!(
                "failed: {}",
                outcome.failure.as_deref().unwrap_or("unknown error")
            )
        },
        matched: format!("{}/{}", outcome.matched_count, outcome.total_count),
    }
}
