//! Loopback listener for the OAuth provider redirect
//!
//! A short-lived HTTP server on `127.0.0.1:<port>` serving the single
//! callback route. It accepts exactly one redirect for one authorization
//! attempt, answers it with a static HTML page, and shuts down. The waiting
//! flow blocks until one of {valid callback, denial callback, timeout}
//! occurs; a bind failure surfaces before the browser is ever opened.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, warn};

use crate::constants::CALLBACK_PATH;
use crate::error::{Error, Result};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Authorization Successful</title></head>
  <body style="font-family: sans-serif; text-align: center; margin-top: 4rem;">
    <h1>&#10003; Authorization successful</h1>
    <p>You can close this window and return to the terminal.</p>
  </body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Authorization Failed</title></head>
  <body style="font-family: sans-serif; text-align: center; margin-top: 4rem;">
    <h1>&#10007; Authorization failed</h1>
    <p>No authorization code was received. Close this window and retry from the terminal.</p>
  </body>
</html>"#;

/// Query parameters Google appends to the redirect. A missing `code`
/// signals denial (user declined consent, or a provider error).
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Hands the single accepted redirect from the axum handler to the waiting
/// flow. `take()` ensures later requests cannot re-trigger the channel.
type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

/// One-shot loopback callback server.
///
/// `bind` is separated from `wait_for_code` so the caller can fail fast on
/// an occupied port before opening a browser window.
#[derive(Debug)]
pub struct CallbackServer {
    port: u16,
    rx: oneshot::Receiver<CallbackParams>,
    shutdown: oneshot::Sender<()>,
}

impl CallbackServer {
    /// Bind the listener on the loopback interface.
    ///
    /// Port 0 binds an ephemeral port; `port()` reports the actual one.
    /// Any bind failure is reported as `PortUnavailable`.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .map_err(|_| Error::PortUnavailable(port))?;
        let port = listener
            .local_addr()
            .map_err(|e| Error::Listener(format!("reading listener address: {e}")))?
            .port();

        let (tx, rx) = oneshot::channel();
        let slot: CallbackSlot = Arc::new(Mutex::new(Some(tx)));
        let app = Router::new()
            .route(CALLBACK_PATH, get(handle_callback))
            .with_state(slot);

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = serve.await {
                warn!(%err, "callback listener terminated with error");
            }
        });

        debug!(port, "callback listener bound");
        Ok(Self { port, rx, shutdown })
    }

    /// The port the listener is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The redirect URI the provider must be pointed at.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.port, CALLBACK_PATH)
    }

    /// Block until the provider redirects, then shut the listener down.
    ///
    /// Returns the authorization code, or fails with `AuthorizationDenied`
    /// (redirect without a code), `StateMismatch` (CSRF check), or
    /// `AuthorizationTimedOut` (no redirect within `timeout`).
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> Result<String> {
        let CallbackServer { rx, shutdown, .. } = self;

        let received = tokio::time::timeout(timeout, rx).await;
        // The handler has already queued its response; graceful shutdown
        // lets the in-flight reply complete before the listener closes.
        let _ = shutdown.send(());

        let params = match received {
            Err(_) => return Err(Error::AuthorizationTimedOut),
            Ok(Err(_)) => {
                return Err(Error::Listener(
                    "callback channel closed before a redirect arrived".into(),
                ));
            }
            Ok(Ok(params)) => params,
        };

        let code = match params.code {
            Some(code) if !code.is_empty() => code,
            _ => {
                return Err(Error::AuthorizationDenied(
                    params
                        .error
                        .unwrap_or_else(|| "no authorization code in callback".into()),
                ));
            }
        };

        if params.state.as_deref() != Some(expected_state) {
            return Err(Error::StateMismatch);
        }

        Ok(code)
    }
}

async fn handle_callback(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let page = if params.code.as_deref().is_some_and(|c| !c.is_empty()) {
        SUCCESS_PAGE
    } else {
        FAILURE_PAGE
    };
    if let Some(tx) = slot.lock().await.take() {
        let _ = tx.send(params);
    }
    Html(page)
}
