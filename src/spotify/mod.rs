//! # Spotify Module
//!
//! Source side of a transfer. Authorizes against the Spotify accounts
//! service with the shared browser flow from [`crate::oauth`] and reads the
//! user's playlists through the Web API.
//!
//! ## API Coverage
//!
//! - `GET /me/playlists` - the user's playlists, paginated via `next`
//! - `GET /playlists/{id}/tracks` - playlist entries, paginated via `next`
//!
//! Entries without a track or without a catalog id (local files, tracks
//! removed from the catalog) are skipped.

pub mod auth;
mod playlists;

pub use playlists::SpotifyClient;
