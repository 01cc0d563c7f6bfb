//! Google OAuth authorization library for the Ads CLI
//!
//! Drives the authorization-code grant against Google's OAuth endpoints and
//! refreshes access tokens. This crate is a standalone library with no
//! dependency on the CLI binary — it can be tested and used independently.
//!
//! Authorization flow:
//! 1. `Authorizer::begin()` builds the consent URL (PKCE challenge + CSRF state)
//! 2. `CallbackServer::bind()` opens the loopback listener, then the browser opens
//! 3. `CallbackServer::wait_for_code()` receives exactly one provider redirect
//! 4. `Authorizer::exchange()` trades the code for an access/refresh token pair
//! 5. `Authorizer::refresh()` mints new access tokens without user interaction
//!
//! `Authorizer::authorize()` composes steps 1-4 into the single blocking
//! operation the CLI invokes.

pub mod authorizer;
pub mod callback;
pub mod constants;
pub mod error;
pub mod pkce;
pub mod token;

pub use authorizer::{AuthRequest, Authorizer, Tokens};
pub use callback::CallbackServer;
pub use constants::*;
pub use error::{Error, Result};
pub use token::{TokenResponse, exchange_code, is_token_expired, refresh_access_token};
