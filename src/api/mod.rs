//! # API Module
//!
//! HTTP endpoints served by the short-lived loopback listener that runs while
//! a browser authorization is in progress.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the provider redirect. Answers `200` when the
//!   query carries an authorization `code` (and the expected `state`), `400`
//!   otherwise. The first accepted code lands in a [`CodeSlot`]; later
//!   requests never replace it.
//! - [`health`] - Reports status and version, handy to check that the
//!   listener is up while debugging a redirect URI.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use playferry::api::{CallbackState, CodeSlot, callback, health};
//!
//! let state = CallbackState { slot: CodeSlot::new(), expected_state: None };
//! let app = Router::new()
//!     .route("/callback", get(callback).layer(Extension(state)))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::CodeSlot;
pub use callback::callback;
pub use health::health;
