//! Authorization-code flow driver
//!
//! `Authorizer` carries one profile's OAuth client credentials plus the
//! endpoint configuration, and drives the two interactions the CLI needs:
//! the full browser consent flow (`authorize`) and the non-interactive
//! refresh (`refresh`). Endpoints are injectable so tests can point the
//! token calls at a local mock server.

use common::Secret;
use tracing::warn;

use crate::callback::CallbackServer;
use crate::constants::{
    ADWORDS_SCOPE, AUTHORIZATION_ENDPOINT, CALLBACK_TIMEOUT, DEFAULT_CALLBACK_PORT,
    TOKEN_ENDPOINT,
};
use crate::error::Result;
use crate::pkce;
use crate::token::{self, TokenResponse};

/// Result of a completed authorization or refresh.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    /// Absent when the provider omits a rotated refresh token — the caller
    /// must retain the one it already holds.
    pub refresh_token: Option<String>,
    /// Absolute expiry as unix milliseconds, computed from `expires_in`.
    pub expiry: Option<u64>,
}

impl Tokens {
    fn from_response(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expiry: response.expires_in.map(token::expiry_millis_from_now),
        }
    }
}

/// A pending consent request: the URL to open in the browser plus the
/// transient PKCE verifier and CSRF state for this single attempt.
#[derive(Debug)]
pub struct AuthRequest {
    pub url: String,
    pub state: String,
    pub verifier: String,
}

pub struct Authorizer {
    client_id: String,
    client_secret: Secret<String>,
    port: u16,
    open_browser: bool,
    authorization_endpoint: String,
    token_endpoint: String,
    http: reqwest::Client,
}

impl Authorizer {
    pub fn new(client_id: impl Into<String>, client_secret: Secret<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            port: DEFAULT_CALLBACK_PORT,
            open_browser: true,
            authorization_endpoint: AUTHORIZATION_ENDPOINT.into(),
            token_endpoint: TOKEN_ENDPOINT.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Override the loopback listener port (default 3000).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Disable the automatic browser launch; the consent URL is still
    /// printed for manual use.
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Point the flow at non-default endpoints (tests).
    pub fn with_endpoints(
        mut self,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        self.authorization_endpoint = authorization_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self
    }

    /// Reuse an existing HTTP client instead of building a fresh one.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}{}", self.port, crate::constants::CALLBACK_PATH)
    }

    /// Build the consent URL for a fresh authorization attempt.
    ///
    /// `access_type=offline` plus `prompt=consent` forces Google to issue a
    /// refresh token on every run, not just the first consent.
    pub fn begin(&self) -> AuthRequest {
        let verifier = pkce::generate_verifier();
        let challenge = pkce::compute_challenge(&verifier);
        let state = pkce::generate_state();
        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&code_challenge={}&code_challenge_method=S256&state={}",
            self.authorization_endpoint,
            self.client_id,
            pkce::urlencoded(&self.redirect_uri()),
            pkce::urlencoded(ADWORDS_SCOPE),
            challenge,
            state,
        );
        AuthRequest {
            url,
            state,
            verifier,
        }
    }

    /// Run the full authorization-code flow.
    ///
    /// Binds the loopback listener first — an occupied port fails with
    /// `PortUnavailable` before any browser window is opened. The browser
    /// launch itself is best-effort; a failure is logged and the printed
    /// URL serves as the manual fallback.
    pub async fn authorize(&self) -> Result<Tokens> {
        let request = self.begin();
        let server = CallbackServer::bind(self.port).await?;

        println!("Opening browser for authorization...");
        println!("If the browser does not open, visit:\n{}", request.url);
        if self.open_browser {
            if let Err(err) = open::that(&request.url) {
                warn!(%err, "could not open browser automatically");
            }
        }

        let code = server.wait_for_code(&request.state, CALLBACK_TIMEOUT).await?;
        self.exchange(&code, &request.verifier).await
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange(&self, code: &str, verifier: &str) -> Result<Tokens> {
        let response = token::exchange_code(
            &self.http,
            &self.token_endpoint,
            &self.client_id,
            self.client_secret.expose(),
            &self.redirect_uri(),
            code,
            verifier,
        )
        .await?;
        Ok(Tokens::from_response(response))
    }

    /// Mint a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        let response = token::refresh_access_token(
            &self.http,
            &self.token_endpoint,
            &self.client_id,
            self.client_secret.expose(),
            refresh_token,
        )
        .await?;
        Ok(Tokens::from_response(response))
    }
}
