//! # CLI Module
//!
//! Command implementations behind the `playferry` binary. This is the
//! interactive surface: it collects credentials from the configuration,
//! drives the service connections and renders progress, while the transfer
//! itself runs on its own task and reports back through events.
//!
//! ## Commands
//!
//! - [`auth`] - Store YouTube Music credentials (browser flow when needed)
//! - [`list_playlists`] - Show the Spotify playlists available for transfer
//! - [`transfer`] - Carry selected playlists over to YouTube Music
//!
//! ## Usage Patterns
//!
//! ```bash
//! playferry auth                    # Authorize YouTube Music once
//! playferry playlists               # Numbered list of Spotify playlists
//! playferry transfer 1 3 "Road Trip"
//! playferry transfer --all --kind video
//! ```

mod auth;
mod playlists;
mod transfer;

pub use auth::auth;
pub use playlists::list_playlists;
pub use transfer::transfer;

use crate::{config, errors::AuthError};

pub(crate) fn spotify_credentials() -> Result<(String, String), AuthError> {
    let id = config::spotify_client_id()
        .ok_or_else(|| AuthError::MissingConfig("SPOTIFY_CLIENT_ID".to_string()))?;
    let secret = config::spotify_client_secret()
        .ok_or_else(|| AuthError::MissingConfig("SPOTIFY_CLIENT_SECRET".to_string()))?;
    Ok((id, secret))
}

pub(crate) fn youtube_credentials() -> Result<(String, String), AuthError> {
    let id = config::youtube_client_id()
        .ok_or_else(|| AuthError::MissingConfig("YOUTUBE_CLIENT_ID".to_string()))?;
    let secret = config::youtube_client_secret()
        .ok_or_else(|| AuthError::MissingConfig("YOUTUBE_CLIENT_SECRET".to_string()))?;
    Ok((id, secret))
}
