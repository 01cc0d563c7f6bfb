//! `gads campaigns` / `gads campaign` / `gads ad-groups`

use anyhow::{Result, bail};
use gads_profiles::{CredentialService, ProfileStore};
use serde_json::Value;

use crate::api::AdsClient;
use crate::commands::ensure_authenticated;
use crate::format::{cell, format_json, format_table, money_cell};

pub async fn list(
    store: &ProfileStore,
    service: &CredentialService,
    profile: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;
    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let campaigns = api.list_campaigns(limit).await?;
    println!("Found {} campaign(s)", campaigns.len());

    if json {
        println!("{}", format_json(&Value::Array(campaigns)));
        return Ok(());
    }
    if campaigns.is_empty() {
        println!("No campaigns found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = campaigns.iter().map(summary_row).collect();
    println!(
        "\n{}",
        format_table(
            &["ID", "Name", "Status", "Type", "Impressions", "Clicks", "Cost"],
            &rows
        )
    );
    Ok(())
}

pub async fn show(
    store: &ProfileStore,
    service: &CredentialService,
    id: String,
    profile: Option<String>,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;
    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let Some(campaign) = api.get_campaign(&id).await? else {
        bail!("campaign {id} not found");
    };

    if json {
        println!("{}", format_json(&campaign));
        return Ok(());
    }

    println!("\nCampaign: {}\n", cell(&campaign, "/campaign/name"));
    println!("ID:         {}", cell(&campaign, "/campaign/id"));
    println!("Status:     {}", cell(&campaign, "/campaign/status"));
    println!(
        "Type:       {}",
        cell(&campaign, "/campaign/advertisingChannelType")
    );
    println!(
        "Bidding:    {}",
        cell(&campaign, "/campaign/biddingStrategyType")
    );
    println!("Start date: {}", cell(&campaign, "/campaign/startDate"));
    let end_date = cell(&campaign, "/campaign/endDate");
    if end_date != "-" {
        println!("End date:   {end_date}");
    }
    println!("\nPerformance:");
    println!("Impressions: {}", cell(&campaign, "/metrics/impressions"));
    println!("Clicks:      {}", cell(&campaign, "/metrics/clicks"));
    println!("Cost:        {}", money_cell(&campaign, "/metrics/costMicros"));
    println!("Conversions: {}\n", cell(&campaign, "/metrics/conversions"));
    Ok(())
}

pub async fn ad_groups(
    store: &ProfileStore,
    service: &CredentialService,
    campaign_id: String,
    profile: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;
    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let ad_groups = api.list_ad_groups(&campaign_id, limit).await?;
    println!("Found {} ad group(s)", ad_groups.len());

    if json {
        println!("{}", format_json(&Value::Array(ad_groups)));
        return Ok(());
    }
    if ad_groups.is_empty() {
        println!("No ad groups found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ad_groups
        .iter()
        .map(|group| {
            vec![
                cell(group, "/adGroup/id"),
                cell(group, "/adGroup/name"),
                cell(group, "/adGroup/status"),
                cell(group, "/adGroup/type"),
                cell(group, "/metrics/impressions"),
                cell(group, "/metrics/clicks"),
                money_cell(group, "/metrics/costMicros"),
            ]
        })
        .collect();
    println!(
        "\n{}",
        format_table(
            &["ID", "Name", "Status", "Type", "Impressions", "Clicks", "Cost"],
            &rows
        )
    );
    Ok(())
}

fn summary_row(campaign: &Value) -> Vec<String> {
    vec![
        cell(campaign, "/campaign/id"),
        cell(campaign, "/campaign/name"),
        cell(campaign, "/campaign/status"),
        cell(campaign, "/campaign/advertisingChannelType"),
        cell(campaign, "/metrics/impressions"),
        cell(campaign, "/metrics/clicks"),
        money_cell(campaign, "/metrics/costMicros"),
    ]
}
