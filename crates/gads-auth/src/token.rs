//! OAuth token exchange, refresh, and expiry tracking
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial OAuth flow completion)
//! 2. Token refresh (minting a new access token from the refresh token)
//!
//! Both operations POST to the token endpoint with different grant types.
//! Google may omit `refresh_token` from a refresh response — the caller
//! must retain the original in that case, never drop it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::constants::EXPIRY_MARGIN_MILLIS;
use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. The caller
/// converts this to an absolute unix millisecond timestamp when storing
/// the credential.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange an authorization code for tokens (initial OAuth flow).
///
/// Second step of the consent flow: the user has authorized in their
/// browser and the loopback listener received the code. The PKCE verifier
/// proves this process initiated the flow.
#[allow(clippy::too_many_arguments)]
pub async fn exchange_code(
    client: &reqwest::Client,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| Error::TokenExchangeFailed(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchangeFailed(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchangeFailed(format!("invalid token response: {e}")))
}

/// Refresh an access token using a refresh token.
///
/// Single round trip; any transport or provider error surfaces as
/// `RefreshFailed` and the caller must re-run the full authorize flow.
pub async fn refresh_access_token(
    client: &reqwest::Client,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_endpoint)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await
        .map_err(|e| Error::RefreshFailed(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::RefreshFailed(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::RefreshFailed(format!("invalid refresh response: {e}")))
}

/// Whether an access token should be considered expired.
///
/// An absent expiry is treated as already expired. Otherwise the token is
/// expired once the current time is within the safety margin of the
/// recorded expiry (proactive refresh, not reactive-on-401).
pub fn is_token_expired(expiry_millis: Option<u64>) -> bool {
    expired_at(expiry_millis, now_millis())
}

fn expired_at(expiry_millis: Option<u64>, now_millis: u64) -> bool {
    match expiry_millis {
        None => true,
        Some(expiry) => now_millis >= expiry.saturating_sub(EXPIRY_MARGIN_MILLIS),
    }
}

/// Convert a token endpoint `expires_in` delta (seconds) to an absolute
/// unix millisecond expiry.
pub fn expiry_millis_from_now(expires_in_secs: u64) -> u64 {
    now_millis() + expires_in_secs * 1000
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_deserializes_full() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def","expires_in":3600}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.refresh_token.as_deref(), Some("rt_def"));
        assert_eq!(token.expires_in, Some(3600));
    }

    #[test]
    fn token_response_tolerates_omitted_refresh_and_expiry() {
        // Google omits refresh_token on refresh-grant responses
        let json = r#"{"access_token":"at_abc"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert!(token.refresh_token.is_none());
        assert!(token.expires_in.is_none());
    }

    #[test]
    fn absent_expiry_is_expired() {
        assert!(expired_at(None, 0));
        assert!(expired_at(None, u64::MAX));
    }

    #[test]
    fn expiry_margin_boundary() {
        let expiry = 10_000_000;
        // Exactly at the margin boundary counts as expired
        assert!(expired_at(Some(expiry), expiry - EXPIRY_MARGIN_MILLIS));
        assert!(expired_at(Some(expiry), expiry - EXPIRY_MARGIN_MILLIS + 1));
        // One millisecond before the margin is still valid
        assert!(!expired_at(Some(expiry), expiry - EXPIRY_MARGIN_MILLIS - 1));
    }

    #[test]
    fn past_expiry_is_expired() {
        assert!(expired_at(Some(1_000), 2_000));
        // Small expiry values saturate instead of underflowing
        assert!(expired_at(Some(10), 0));
    }

    #[test]
    fn is_token_expired_uses_wall_clock() {
        let now = now_millis();
        assert!(is_token_expired(Some(now.saturating_sub(1_000))));
        assert!(!is_token_expired(Some(
            now + EXPIRY_MARGIN_MILLIS + 60 * 1000
        )));
    }

    #[test]
    fn expiry_millis_from_now_is_in_the_future() {
        let before = now_millis();
        let expiry = expiry_millis_from_now(3600);
        assert!(expiry >= before + 3600 * 1000);
    }

    #[tokio::test]
    async fn exchange_code_posts_authorization_code_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                mockito::Matcher::UrlEncoded("code".into(), "code-123".into()),
                mockito::Matcher::UrlEncoded("client_id".into(), "cid".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at_new","refresh_token":"rt_new","expires_in":3599}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/token", server.url());
        let token = exchange_code(
            &client,
            &url,
            "cid",
            "csecret",
            "http://localhost:3000/oauth2callback",
            "code-123",
            "verifier",
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "at_new");
        assert_eq!(token.refresh_token.as_deref(), Some("rt_new"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_code_surfaces_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/token", server.url());
        let err = exchange_code(
            &client,
            &url,
            "cid",
            "csecret",
            "http://localhost:3000/oauth2callback",
            "bad-code",
            "verifier",
        )
        .await
        .unwrap_err();

        match err {
            Error::TokenExchangeFailed(msg) => assert!(msg.contains("invalid_grant")),
            other => panic!("expected TokenExchangeFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_posts_refresh_token_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "rt_old".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at_new","expires_in":3599}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/token", server.url());
        let token = refresh_access_token(&client, &url, "cid", "csecret", "rt_old")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at_new");
        // Provider omitted a rotated refresh token — caller must retain rt_old
        assert!(token.refresh_token.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_rejected_token_surfaces_refresh_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_grant","error_description":"Token has been revoked"}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/token", server.url());
        let err = refresh_access_token(&client, &url, "cid", "csecret", "rt_revoked")
            .await
            .unwrap_err();

        match err {
            Error::RefreshFailed(msg) => assert!(msg.contains("revoked")),
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
    }
}
