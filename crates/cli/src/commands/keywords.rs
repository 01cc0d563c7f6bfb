//! `gads keyword-ideas` / `gads locations` — Keyword Planner queries

use anyhow::{Result, bail};
use gads_profiles::{CredentialService, ProfileStore};
use serde_json::Value;

use crate::api::{AdsClient, KeywordIdeasRequest, KeywordSeed, UrlSeed};
use crate::commands::ensure_authenticated;
use crate::format::{cell, format_json, format_table, money_cell};

pub struct KeywordIdeasArgs {
    pub keywords: Vec<String>,
    pub url: Option<String>,
    pub language: String,
    pub locations: Vec<String>,
    pub limit: usize,
}

pub async fn ideas(
    store: &ProfileStore,
    service: &CredentialService,
    args: KeywordIdeasArgs,
    profile: Option<String>,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;

    if args.keywords.is_empty() && args.url.is_none() {
        bail!("provide seed keywords or a --url to generate ideas from");
    }

    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let request = KeywordIdeasRequest {
        language: Some(format!("languageConstants/{}", args.language)),
        geo_target_constants: args
            .locations
            .iter()
            .map(|code| format!("geoTargetConstants/{code}"))
            .collect(),
        page_size: Some(args.limit as u32),
        keyword_seed: if args.keywords.is_empty() {
            None
        } else {
            Some(KeywordSeed {
                keywords: args.keywords,
            })
        },
        url_seed: args.url.map(|url| UrlSeed { url }),
    };

    let ideas = api.generate_keyword_ideas(&request).await?;
    println!("Generated {} keyword idea(s)", ideas.len());

    if json {
        println!("{}", format_json(&Value::Array(ideas)));
        return Ok(());
    }
    if ideas.is_empty() {
        println!("No keyword ideas found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ideas
        .iter()
        .map(|idea| {
            vec![
                cell(idea, "/text"),
                cell(idea, "/keywordIdeaMetrics/avgMonthlySearches"),
                cell(idea, "/keywordIdeaMetrics/competition"),
                money_cell(idea, "/keywordIdeaMetrics/lowTopOfPageBidMicros"),
                money_cell(idea, "/keywordIdeaMetrics/highTopOfPageBidMicros"),
            ]
        })
        .collect();
    println!(
        "\n{}",
        format_table(
            &[
                "Keyword",
                "Avg monthly searches",
                "Competition",
                "Low bid",
                "High bid"
            ],
            &rows
        )
    );
    Ok(())
}

pub async fn locations(
    store: &ProfileStore,
    service: &CredentialService,
    search: String,
    profile: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    ensure_authenticated(service, profile.as_deref()).await?;
    let api = AdsClient::connect(store, service, profile.as_deref()).await?;

    let results = api.search_geo_targets(&search, limit).await?;
    println!("Found {} location(s)", results.len());

    if json {
        println!("{}", format_json(&Value::Array(results)));
        return Ok(());
    }
    if results.is_empty() {
        println!("No locations found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|location| {
            vec![
                cell(location, "/geoTargetConstant/id"),
                cell(location, "/geoTargetConstant/name"),
                cell(location, "/geoTargetConstant/countryCode"),
                cell(location, "/geoTargetConstant/targetType"),
            ]
        })
        .collect();
    println!(
        "\n{}",
        format_table(&["ID", "Name", "Country", "Type"], &rows)
    );
    Ok(())
}
