//! Credential orchestration façade
//!
//! Sits between the CLI commands and the two lower layers: decides whether
//! a cached access token is still valid, drives the authorize or refresh
//! flow through `gads-auth`, and persists results through the store. The
//! store is only written on full success — a failed authorize or refresh
//! leaves the previously persisted profile untouched.

use std::sync::Arc;

use common::Secret;
use gads_auth::{Authorizer, Tokens, is_token_expired};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::profile::{Credentials, Profile, ProfileUpdate};
use crate::store::ProfileStore;

/// Per-invocation knobs for the interactive authorize flow.
#[derive(Debug, Clone)]
pub struct AuthorizeOptions {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for AuthorizeOptions {
    fn default() -> Self {
        Self {
            port: gads_auth::DEFAULT_CALLBACK_PORT,
            open_browser: true,
        }
    }
}

pub struct CredentialService {
    store: Arc<ProfileStore>,
    http: reqwest::Client,
    authorization_endpoint: String,
    token_endpoint: String,
}

impl CredentialService {
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            authorization_endpoint: gads_auth::AUTHORIZATION_ENDPOINT.into(),
            token_endpoint: gads_auth::TOKEN_ENDPOINT.into(),
        }
    }

    /// Point the underlying OAuth flows at non-default endpoints (tests).
    pub fn with_endpoints(
        mut self,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        self.authorization_endpoint = authorization_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self
    }

    fn authorizer_for(&self, profile: &Profile) -> Authorizer {
        Authorizer::new(profile.client_id.clone(), profile.client_secret.clone())
            .with_http_client(self.http.clone())
            .with_endpoints(
                self.authorization_endpoint.clone(),
                self.token_endpoint.clone(),
            )
    }

    /// Return a valid access token for the profile, refreshing if needed.
    ///
    /// The refresh result is persisted under the resolved profile name —
    /// the explicit name when one was given, else the profile that was
    /// active at resolution time — so an explicit-name call can never write
    /// to a different profile than it read. A refresh failure surfaces as
    /// `ReAuthenticationRequired` and is never retried.
    pub async fn get_valid_token(&self, name: Option<&str>) -> Result<String> {
        let resolved = self.store.resolve(name).await;
        let profile = self
            .store
            .get(Some(&resolved))
            .await
            .ok_or_else(|| Error::ProfileNotFound(resolved.clone()))?;

        let (access_token, refresh_token) = match (&profile.access_token, &profile.refresh_token)
        {
            (Some(access), Some(refresh)) => (access, refresh),
            _ => return Err(Error::NotAuthenticated(resolved)),
        };

        if !is_token_expired(profile.token_expiry) {
            return Ok(access_token.expose().clone());
        }

        debug!(profile = %resolved, "access token expired, refreshing");
        let mut tokens = self
            .authorizer_for(&profile)
            .refresh(refresh_token.expose())
            .await
            .map_err(|e| Error::ReAuthenticationRequired(e.to_string()))?;

        // Google may omit a rotated refresh token; retain the original.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.expose().clone());
        }
        self.save_tokens(&resolved, &tokens).await?;
        info!(profile = %resolved, "access token refreshed");
        Ok(tokens.access_token)
    }

    /// Run the full browser consent flow for a profile and persist the
    /// resulting tokens.
    pub async fn authorize(&self, name: Option<&str>, options: AuthorizeOptions) -> Result<()> {
        let resolved = self.store.resolve(name).await;
        let profile = self
            .store
            .get(Some(&resolved))
            .await
            .ok_or_else(|| Error::ProfileNotFound(resolved.clone()))?;
        if !profile.has_credentials() {
            return Err(Error::Unconfigured(resolved));
        }

        let tokens = self
            .authorizer_for(&profile)
            .with_port(options.port)
            .with_browser(options.open_browser)
            .authorize()
            .await?;

        self.save_tokens(&resolved, &tokens).await?;
        info!(profile = %resolved, "profile authorized");
        Ok(())
    }

    /// Persist token fields onto an existing profile.
    pub async fn save_tokens(&self, name: &str, tokens: &Tokens) -> Result<()> {
        self.store
            .update(
                name,
                ProfileUpdate {
                    access_token: Some(Secret::new(tokens.access_token.clone())),
                    refresh_token: tokens.refresh_token.clone().map(Secret::new),
                    token_expiry: Some(tokens.expiry),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Persist credential fields for a new or re-configured profile. Any
    /// previous token state is discarded — new credentials require a fresh
    /// consent.
    pub async fn save_credentials(&self, name: &str, credentials: Credentials) -> Result<()> {
        self.store.set(name, Profile::from(credentials)).await
    }

    /// Whether the profile exists and carries all credential fields.
    pub async fn has_credentials(&self, name: Option<&str>) -> bool {
        match self.store.get(name).await {
            Some(profile) => profile.has_credentials(),
            None => false,
        }
    }

    /// Whether the profile exists and holds both token fields.
    pub async fn is_authenticated(&self, name: Option<&str>) -> bool {
        match self.store.get(name).await {
            Some(profile) => profile.is_authenticated(),
            None => false,
        }
    }

    /// Delete a profile. Resolves to the active profile when no name is
    /// given; fails with `ProfileNotFound` if the target does not exist.
    /// Returns the resolved name for reporting.
    pub async fn clear_credentials(&self, name: Option<&str>) -> Result<String> {
        let resolved = self.store.resolve(name).await;
        self.store.delete(&resolved).await?;
        info!(profile = %resolved, "credentials cleared");
        Ok(resolved)
    }
}
