//! Google OAuth constants
//!
//! Endpoint and scope configuration for the Google Ads authorization flow.
//! These values are not secrets — the per-profile client ID, client secret,
//! and tokens are managed by the profile store.

use std::time::Duration;

/// Consent endpoint for the authorization-code grant
pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// The single Google Ads management scope
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// Route the loopback listener serves for the provider redirect
pub const CALLBACK_PATH: &str = "/oauth2callback";

/// Default loopback listener port
pub const DEFAULT_CALLBACK_PORT: u16 = 3000;

/// How long to wait for the user to finish in their browser before the
/// listener is cancelled and the flow fails with `AuthorizationTimedOut`.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Safety margin for proactive refresh: a token within this window of its
/// recorded expiry is treated as already expired.
pub const EXPIRY_MARGIN_MILLIS: u64 = 5 * 60 * 1000;
