//! Configuration management for playferry.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Everything except the client
//! credentials has a default that matches the public Spotify and YouTube
//! endpoints.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use dotenv;
use std::{env, path::PathBuf, time::Duration};

const APP_DIR: &str = "playferry";

/// Loads environment variables from `playferry/.env` in the local data directory.
///
/// A missing `.env` file is not an error; the process environment and the
/// defaults below still apply. Only a failure to create the data directory
/// or a malformed file is reported.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/playferry/.env`
/// - macOS: `~/Library/Application Support/playferry/.env`
/// - Windows: `%LOCALAPPDATA%/playferry/.env`
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Base directory for everything playferry writes.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Spotify client id (`SPOTIFY_CLIENT_ID`).
pub fn spotify_client_id() -> Option<String> {
    optional_var("SPOTIFY_CLIENT_ID")
}

/// Spotify client secret (`SPOTIFY_CLIENT_SECRET`).
pub fn spotify_client_secret() -> Option<String> {
    optional_var("SPOTIFY_CLIENT_SECRET")
}

/// Must match a redirect URI registered for the Spotify application.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:8888/callback")
}

pub fn spotify_scope() -> String {
    var_or(
        "SPOTIFY_SCOPE",
        "playlist-read-private playlist-read-collaborative",
    )
}

pub fn spotify_auth_url() -> String {
    var_or("SPOTIFY_AUTH_URL", "https://accounts.spotify.com/authorize")
}

pub fn spotify_token_url() -> String {
    var_or("SPOTIFY_TOKEN_URL", "https://accounts.spotify.com/api/token")
}

pub fn spotify_api_url() -> String {
    var_or("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Google OAuth client id (`YOUTUBE_CLIENT_ID`).
pub fn youtube_client_id() -> Option<String> {
    optional_var("YOUTUBE_CLIENT_ID")
}

/// Google OAuth client secret (`YOUTUBE_CLIENT_SECRET`).
pub fn youtube_client_secret() -> Option<String> {
    optional_var("YOUTUBE_CLIENT_SECRET")
}

pub fn youtube_redirect_uri() -> String {
    var_or("YOUTUBE_REDIRECT_URI", "http://localhost:8080/callback")
}

pub fn youtube_scope() -> String {
    var_or("YOUTUBE_SCOPE", "https://www.googleapis.com/auth/youtube")
}

pub fn youtube_auth_url() -> String {
    var_or(
        "YOUTUBE_AUTH_URL",
        "https://accounts.google.com/o/oauth2/v2/auth",
    )
}

pub fn youtube_token_url() -> String {
    var_or("YOUTUBE_TOKEN_URL", "https://oauth2.googleapis.com/token")
}

pub fn youtube_api_url() -> String {
    var_or("YOUTUBE_API_URL", "https://www.googleapis.com/youtube/v3")
}

/// Location of the persisted YouTube credential record.
pub fn credentials_path() -> PathBuf {
    match optional_var("PLAYFERRY_CREDENTIALS_PATH") {
        Some(path) => PathBuf::from(path),
        None => data_dir().join("oauth.json"),
    }
}

/// How long the browser authorization may take (`PLAYFERRY_OAUTH_TIMEOUT_SECS`, default 300).
pub fn oauth_timeout() -> Duration {
    let secs = var_or("PLAYFERRY_OAUTH_TIMEOUT_SECS", "300")
        .parse::<u64>()
        .unwrap_or(300);
    Duration::from_secs(secs)
}

/// Pause after every destination search (`PLAYFERRY_SEARCH_DELAY_MS`, default 1200).
pub fn search_delay() -> Duration {
    let millis = var_or("PLAYFERRY_SEARCH_DELAY_MS", "1200")
        .parse::<u64>()
        .unwrap_or(1200);
    Duration::from_millis(millis)
}
