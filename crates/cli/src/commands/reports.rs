//! `gads query` — raw GAQL passthrough

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use gads_profiles::{CredentialService, ProfileStore};
use serde_json::Value;

use crate::api::AdsClient;
use crate::commands::ensure_authenticated;
use crate::format::format_json;

pub async fn run(
    store: &ProfileStore,
    service: &CredentialService,
    gaql: Option<String>,
    file: Option<PathBuf>,
    profile: Option<String>,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;

    let query = match (gaql, file) {
        (_, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading query file {}", path.display()))?,
        (Some(query), None) => query,
        (None, None) => bail!("provide a GAQL query or --file <path>"),
    };

    let api = AdsClient::connect(store, service, profile.as_deref()).await?;
    let results = api.search(query.trim()).await?;
    println!("Query returned {} result(s)", results.len());

    if results.is_empty() {
        println!("No results returned.");
        return Ok(());
    }
    println!("{}", format_json(&Value::Array(results)));
    Ok(())
}
