//! `gads` — CLI for the Google Ads API
//!
//! Command surface over three layers: the profile store (named credential
//! bundles in a permission-restricted JSON file), the credential service
//! (token validity, refresh, authorize), and a thin GAQL client.

mod api;
mod commands;
mod format;
mod validation;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gads_profiles::{CredentialService, ProfileStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "gads",
    version,
    about = "CLI for the Google Ads API — campaigns, keywords, and the Keyword Planner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter (overridden by LOG_LEVEL / RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Google Ads API credentials for a profile
    Setup,
    /// Authenticate a profile via the browser consent flow
    Auth {
        /// Profile name (defaults to an interactive selection)
        #[arg(short, long)]
        profile: Option<String>,
        /// Loopback callback port
        #[arg(long, default_value_t = gads_auth::DEFAULT_CALLBACK_PORT)]
        port: u16,
        /// Do not try to open a browser automatically
        #[arg(long)]
        no_browser: bool,
    },
    /// Clear stored credentials for a profile
    Logout {
        /// Profile name (defaults to the active profile)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Manage named profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show the stored configuration for a profile
    Config {
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// List accessible Google Ads accounts
    Accounts {
        #[arg(short, long)]
        profile: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List campaigns
    Campaigns {
        #[arg(short, long)]
        profile: Option<String>,
        /// Maximum number of campaigns to return
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show details for one campaign
    Campaign {
        id: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List ad groups in a campaign
    AdGroups {
        #[arg(short = 'c', long)]
        campaign_id: String,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Generate keyword ideas from seed keywords or a URL
    KeywordIdeas {
        /// Seed keywords
        keywords: Vec<String>,
        /// Seed URL to extract ideas from
        #[arg(short, long)]
        url: Option<String>,
        /// Language constant ID (e.g. 1000 for English)
        #[arg(long, default_value = "1000")]
        language: String,
        /// Geo target constant IDs (e.g. 2840 for the US)
        #[arg(long = "location")]
        locations: Vec<String>,
        /// Maximum number of ideas to return
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Search geo target constants
    Locations {
        search: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(short, long)]
        profile: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Execute a raw GAQL query
    Query {
        /// The query text (omit when using --file)
        gaql: Option<String>,
        /// Read the query from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List all profiles
    List,
    /// Switch the active profile
    Use { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(ProfileStore::open().await?);
    let service = CredentialService::new(store.clone());

    match cli.command {
        Commands::Setup => commands::auth::setup(&store, &service).await,
        Commands::Auth {
            profile,
            port,
            no_browser,
        } => commands::auth::auth(&store, &service, profile, port, no_browser).await,
        Commands::Logout { profile } => commands::auth::logout(&service, profile).await,
        Commands::Profiles { action } => match action {
            ProfileAction::List => commands::auth::profiles_list(&store).await,
            ProfileAction::Use { name } => commands::auth::profiles_use(&store, &name).await,
        },
        Commands::Config { profile } => commands::auth::config(&store, profile).await,
        Commands::Accounts { profile, json } => {
            commands::accounts::run(&store, &service, profile, json).await
        }
        Commands::Campaigns {
            profile,
            limit,
            json,
        } => commands::campaigns::list(&store, &service, profile, limit, json).await,
        Commands::Campaign { id, profile, json } => {
            commands::campaigns::show(&store, &service, id, profile, json).await
        }
        Commands::AdGroups {
            campaign_id,
            profile,
            limit,
            json,
        } => commands::campaigns::ad_groups(&store, &service, campaign_id, profile, limit, json)
            .await,
        Commands::KeywordIdeas {
            keywords,
            url,
            language,
            locations,
            limit,
            profile,
            json,
        } => {
            commands::keywords::ideas(
                &store,
                &service,
                commands::keywords::KeywordIdeasArgs {
                    keywords,
                    url,
                    language,
                    locations,
                    limit,
                },
                profile,
                json,
            )
            .await
        }
        Commands::Locations {
            search,
            limit,
            profile,
            json,
        } => commands::keywords::locations(&store, &service, search, profile, limit, json).await,
        Commands::Query {
            gaql,
            file,
            profile,
        } => commands::reports::run(&store, &service, gaql, file, profile).await,
    }
}
