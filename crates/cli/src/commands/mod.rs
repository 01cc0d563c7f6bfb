//! CLI command implementations

pub mod accounts;
pub mod auth;
pub mod campaigns;
pub mod keywords;
pub mod reports;

use anyhow::{Result, bail};
use gads_profiles::CredentialService;

/// Query commands require an authenticated profile before any API call.
pub(crate) async fn ensure_authenticated(
    service: &CredentialService,
    profile: Option<&str>,
) -> Result<()> {
    if !service.is_authenticated(profile).await {
        bail!("not authenticated — run `gads auth` first");
    }
    Ok(())
}
