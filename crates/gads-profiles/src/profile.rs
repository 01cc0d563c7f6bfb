//! The per-profile credential bundle

use common::Secret;
use serde::{Deserialize, Serialize};

/// A named credential bundle for one Google Ads account context.
///
/// The identifier fields are assigned at setup time and immutable
/// thereafter unless explicitly updated. The token fields are set only by
/// a successful authorize or refresh. `token_expiry` is an absolute unix
/// millisecond timestamp and advisory only — absence means "already
/// expired".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub developer_token: Secret<String>,
    pub customer_id: String,
    /// Manager (MCC) account to act through, for delegated access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Secret<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Secret<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<u64>,
}

impl Profile {
    /// Whether the profile carries every field required to authorize.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.expose().is_empty()
            && !self.developer_token.expose().is_empty()
            && !self.customer_id.is_empty()
    }

    /// A profile is authenticated iff both token fields are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// The credential fields collected by the setup flow — a `Profile` minus
/// any token state.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub developer_token: Secret<String>,
    pub customer_id: String,
    pub login_customer_id: Option<String>,
}

impl From<Credentials> for Profile {
    fn from(credentials: Credentials) -> Self {
        Profile {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            developer_token: credentials.developer_token,
            customer_id: credentials.customer_id,
            login_customer_id: credentials.login_customer_id,
            access_token: None,
            refresh_token: None,
            token_expiry: None,
        }
    }
}

/// A shallow merge-patch for an existing profile: `Some` fields overwrite,
/// `None` fields are retained.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    pub developer_token: Option<Secret<String>>,
    pub customer_id: Option<String>,
    pub login_customer_id: Option<String>,
    pub access_token: Option<Secret<String>>,
    pub refresh_token: Option<Secret<String>>,
    /// `Some(None)` clears a stored expiry; `None` leaves it unchanged.
    pub token_expiry: Option<Option<u64>>,
}

impl ProfileUpdate {
    pub(crate) fn apply(self, profile: &mut Profile) {
        if let Some(client_id) = self.client_id {
            profile.client_id = client_id;
        }
        if let Some(client_secret) = self.client_secret {
            profile.client_secret = client_secret;
        }
        if let Some(developer_token) = self.developer_token {
            profile.developer_token = developer_token;
        }
        if let Some(customer_id) = self.customer_id {
            profile.customer_id = customer_id;
        }
        if let Some(login_customer_id) = self.login_customer_id {
            profile.login_customer_id = Some(login_customer_id);
        }
        if let Some(access_token) = self.access_token {
            profile.access_token = Some(access_token);
        }
        if let Some(refresh_token) = self.refresh_token {
            profile.refresh_token = Some(refresh_token);
        }
        if let Some(token_expiry) = self.token_expiry {
            profile.token_expiry = token_expiry;
        }
    }
}

#[cfg(test)]
pub(crate) fn test_profile(suffix: &str) -> Profile {
    Profile {
        client_id: format!("client-{suffix}.apps.googleusercontent.com"),
        client_secret: Secret::new(format!("secret-{suffix}")),
        developer_token: Secret::new(format!("devtoken-{suffix}")),
        customer_id: "1234567890".into(),
        login_customer_id: None,
        access_token: None,
        refresh_token: None,
        token_expiry: None,
    }
}
