//! Project Feed - command line client
//!
//! Lists the project feed and toggles likes against the projects API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use project_feed::feed::{FeedCard, FeedState, LikeToggleError};
use project_feed::{AppState, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "project-feed")]
#[command(about = "Browse and like hackathon projects")]
struct Cli {
    /// Path to the YAML config (defaults to ./config.yaml)
    #[arg(short, long, env = "FEED_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the feed
    List {
        /// Feed page query, e.g. "tech_tag=rust&sort=oldest"
        #[arg(short, long, default_value = "")]
        query: String,

        /// Print cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Like a project as the configured viewer, or unlike it if already liked
    Like {
        /// Project id
        project_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,project_feed=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let state = AppState::new(config)?;

    match cli.command {
        Commands::List { query, json } => run_list(&state, &query, json).await,
        Commands::Like { project_id } => run_like(&state, &project_id).await,
    }
}

async fn run_list(state: &AppState, query: &str, json: bool) -> Result<()> {
    let mut controller = state.feed_controller(query);
    controller.load().await;

    if let Some(err) = controller.store().last_load_error() {
        bail!("Could not load the feed: {}", err);
    }

    let cards: Vec<FeedCard> = controller.render().collect();
    if json {
        let out = serde_json::to_string_pretty(&cards).context("Failed to serialize feed")?;
        println!("{}", out);
        return Ok(());
    }

    if matches!(controller.state(), FeedState::Empty) {
        println!("No projects match this feed.");
        return Ok(());
    }
    for card in &cards {
        print_card(card);
    }
    Ok(())
}

fn print_card(card: &FeedCard) {
    let heart = if card.liked_by_viewer { "♥" } else { "♡" };
    let tags: Vec<&str> = card.tech_tags.iter().map(|t| t.name.as_str()).collect();
    let overflow = match card.hidden_tag_count {
        0 => String::new(),
        n => format!(" +{}", n),
    };
    println!(
        "{} {} {:<40} {} [{}{}] {}",
        card.created_on.as_deref().unwrap_or("----------"),
        heart,
        card.title,
        card.like_count,
        tags.join(", "),
        overflow,
        card.href
    );
}

async fn run_like(state: &AppState, project_id: &str) -> Result<()> {
    let mut controller = state.feed_controller("");
    controller.load().await;
    if let Some(err) = controller.store().last_load_error() {
        bail!("Could not load the feed: {}", err);
    }

    let ticket = match controller.on_like_toggle(project_id) {
        Ok(ticket) => ticket,
        Err(LikeToggleError::Unauthenticated) => {
            bail!("No viewer configured; set FEED_VIEWER_ID or viewer.id in config.yaml")
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(Err(e)) = controller.next_like_settlement().await {
        return Err(e.into());
    }

    let verb = if ticket.add { "Liked" } else { "Unliked" };
    tracing::info!(project_id = %project_id, "{} project", verb);
    Ok(())
}
