//! Error types for profile storage and credential orchestration

/// Errors from profile store and credential service operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("profile \"{0}\" not found — run `gads setup` to create it")]
    ProfileNotFound(String),

    #[error("profile \"{0}\" is missing API credentials — run `gads setup` first")]
    Unconfigured(String),

    #[error("profile \"{0}\" is not authenticated — run `gads auth` first")]
    NotAuthenticated(String),

    #[error("token refresh failed ({0}) — run `gads auth` to re-authenticate")]
    ReAuthenticationRequired(String),

    #[error(transparent)]
    Auth(#[from] gads_auth::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("profile file parse error: {0}")]
    Parse(String),
}

/// Result alias for profile operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_remedy() {
        assert!(
            Error::ProfileNotFound("acme".into())
                .to_string()
                .contains("gads setup")
        );
        assert!(
            Error::NotAuthenticated("acme".into())
                .to_string()
                .contains("gads auth")
        );
        assert!(
            Error::ReAuthenticationRequired("revoked".into())
                .to_string()
                .contains("re-authenticate")
        );
    }

    #[test]
    fn auth_errors_pass_through_display() {
        let err = Error::from(gads_auth::Error::PortUnavailable(3000));
        assert!(err.to_string().contains("port 3000"));
    }
}
