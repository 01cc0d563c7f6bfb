//! Error types for OAuth authorization operations

/// Errors from OAuth authorization operations.
///
/// Every failure is terminal for the current operation — nothing here is
/// retried automatically. The user-facing remedy is to re-run the flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("port {0} is already in use — close the conflicting process or pass --port")]
    PortUnavailable(u16),

    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("authorization timed out waiting for the browser callback")]
    AuthorizationTimedOut,

    #[error("callback state did not match this authorization attempt")]
    StateMismatch,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("callback listener error: {0}")]
    Listener(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert!(
            Error::PortUnavailable(3000)
                .to_string()
                .contains("port 3000")
        );
        assert!(
            Error::AuthorizationDenied("access_denied".into())
                .to_string()
                .contains("access_denied")
        );
        assert!(
            Error::TokenExchangeFailed("bad code".into())
                .to_string()
                .contains("bad code")
        );
    }

    #[test]
    fn error_debug_includes_variant_name() {
        let err = Error::RefreshFailed("revoked".into());
        let debug = format!("{err:?}");
        assert!(
            debug.contains("RefreshFailed"),
            "Debug output must include variant name, got: {debug}"
        );
    }
}
