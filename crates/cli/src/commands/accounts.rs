//! `gads accounts` — list accessible customer accounts

use anyhow::Result;
use gads_profiles::{CredentialService, ProfileStore};
use serde_json::Value;

use crate::api::AdsClient;
use crate::commands::ensure_authenticated;
use crate::format::{cell, format_json, format_table};

pub async fn run(
    store: &ProfileStore,
    service: &CredentialService,
    profile: Option<String>,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;
    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let accounts = api.list_accessible_customers().await?;
    println!("Found {} account(s)", accounts.len());

    if json {
        println!("{}", format_json(&Value::Array(accounts)));
        return Ok(());
    }
    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = accounts
        .iter()
        .map(|account| {
            vec![
                cell(account, "/customerClient/id"),
                cell(account, "/customerClient/descriptiveName"),
                cell(account, "/customerClient/currencyCode"),
                cell(account, "/customerClient/timeZone"),
            ]
        })
        .collect();
    println!(
        "\n{}",
        format_table(&["Customer ID", "Name", "Currency", "Time zone"], &rows)
    );
    Ok(())
}
