use axum::{Extension, Router, routing::get};
use std::{io, net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{api, api::CallbackState, warning};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Loopback listener receiving the OAuth redirect.
///
/// Lives only for the duration of one authorization. [`CallbackServer::shutdown`]
/// returns once the listening socket is closed.
pub struct CallbackServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    pub async fn start(addr: SocketAddr, path: &str, state: CallbackState) -> io::Result<Self> {
        let mut app = Router::new().route(path, get(api::callback).layer(Extension(state)));
        if path != "/health" {
            app = app.route("/health", get(api::health));
        }

        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                warning!("Callback server stopped unexpectedly: {}", e);
            }
        });

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(mut handle) = self.handle.take() {
            // an idle browser keep-alive connection can hold a graceful shutdown open
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
                handle.abort();
                let _ = handle.await;
            }
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
