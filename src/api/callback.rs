use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use tokio::sync::Notify;

/// Single-assignment slot for the authorization code.
///
/// Written at most once by the callback handler and awaited by the flow that
/// started the listener. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CodeSlot {
    code: Arc<OnceLock<String>>,
    filled: Arc<Notify>,
}

impl CodeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `code` unless a code was stored before. Returns whether it was stored.
    pub fn fill(&self, code: &str) -> bool {
        let stored = self.code.set(code.to_string()).is_ok();
        if stored {
            // notify_one keeps a permit when nobody is waiting yet
            self.filled.notify_one();
        }
        stored
    }

    pub fn get(&self) -> Option<String> {
        self.code.get().cloned()
    }

    /// Resolves once a code has been stored.
    pub async fn wait(&self) -> String {
        loop {
            if let Some(code) = self.code.get() {
                return code.clone();
            }
            self.filled.notified().await;
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackState {
    pub slot: CodeSlot,
    pub expected_state: Option<String>,
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<CallbackState>,
) -> (StatusCode, Html<String>) {
    if let Some(error) = params.get("error") {
        return (
            StatusCode::BAD_REQUEST,
            Html(format!(
                "<h4>Authorization failed: {}</h4><p>Return to the terminal and try again.</p>",
                escape(error)
            )),
        );
    }

    let Some(code) = params.get("code") else {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Missing authorization code.</h4>".to_string()),
        );
    };

    if let Some(expected) = &state.expected_state {
        if params.get("state") != Some(expected) {
            return (
                StatusCode::BAD_REQUEST,
                Html("<h4>Authorization state does not match.</h4>".to_string()),
            );
        }
    }

    state.slot.fill(code);

    (
        StatusCode::OK,
        Html(
            "<h2>Authentication successful.</h2><p>You can close this window and return to the terminal.</p>"
                .to_string(),
        ),
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
