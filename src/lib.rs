//! Playlist Ferry Library
//!
//! Carries playlists from Spotify over to YouTube Music. Tracks are read from
//! the Spotify Web API, looked up one by one on YouTube and collected into a
//! newly created playlist there.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `errors` - Error types for authorization, catalogs and transfers
//! - `management` - Persistence of the destination credentials
//! - `oauth` - Browser based authorization code flow
//! - `server` - Loopback HTTP listener used during authorization
//! - `spotify` - Spotify Web API client (source)
//! - `transfer` - Track matching and the multi-playlist transfer loop
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `youtube` - YouTube Data API client (destination)
//!
//! # Example
//!
//! ```
//! use playferry::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> playferry::Res<()> {
//!     config::load_env().await?;
//!     cli::list_playlists().await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod management;
pub mod oauth;
pub mod server;
pub mod spotify;
pub mod transfer;
pub mod types;
pub mod utils;
pub mod youtube;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the command layer, where any error ends up as a message for the
/// user. Library code below it returns the typed errors from [`errors`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for the command layer. Code that can recover, or whose caller can,
/// returns an error instead.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
