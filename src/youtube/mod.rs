//! # YouTube Module
//!
//! Destination side of a transfer, backed by the YouTube Data API v3.
//!
//! ## API Coverage
//!
//! - `GET /search` - one video per track, music category for songs
//! - `POST /playlists` - private playlist creation
//! - `POST /playlistItems` - one request per attached item
//! - `GET /channels?mine=true` - cheap probe used to validate stored credentials
//!
//! The credential record is the only state playferry keeps between runs. It
//! lives in a [`crate::management::CredentialStore`] and is refreshed in
//! place when its access token runs out.

pub mod auth;
mod catalog;

pub use catalog::YouTubeClient;
