use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use farefinder_client::{render, AppContext};
use farefinder_core::FlightQuery;
use farefinder_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "farefinder", about = "Search, cache and save flight offers")]
struct Cli {
    /// Directory holding default.toml and its overrides
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search one-way flights for a date (YYYY-MM-DD)
    Search {
        from: String,
        to: String,
        date: String,
        /// Print normalized itineraries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest airports matching a query
    Airports { query: String },
    /// Toggle the favorite flag of the n-th result of a search
    Favorite {
        from: String,
        to: String,
        date: String,
        #[arg(long, default_value_t = 1)]
        index: usize,
    },
    /// List saved flights
    Saved {
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved flight by id
    Unsave { id: String },
    /// Show the account's recent searches
    Recent,
    /// Log in and keep the bearer token for later commands
    Login { email: String, password: String },
    /// Forget the stored bearer token
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farefinder=info,farefinder_client=info,farefinder_core=info,farefinder_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir)
        .with_context(|| format!("Failed to load config from {}", cli.config_dir.display()))?;
    tracing::debug!("Using API at {}", config.api.base_url);
    let ctx = AppContext::from_config(&config)?;

    match cli.command {
        Command::Search { from, to, date, json } => {
            let query = FlightQuery::parse(&from, &to, &date)?;
            let snapshot = ctx.search.search_snapshot(&query).await;
            if let Some(error) = snapshot.error {
                bail!(error);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.itineraries)?);
                return Ok(());
            }
            if snapshot.itineraries.is_empty() {
                println!("No flights found.");
            }
            if ctx.session.is_authenticated().await {
                // Marks already-saved itineraries; a failure only hides the stars.
                if let Err(e) = ctx.favorites.saved_flights().await {
                    tracing::warn!("{}", e);
                }
            }
            for (i, itinerary) in snapshot.itineraries.iter().enumerate() {
                println!("{}", render::itinerary_line(i + 1, itinerary, ctx.favorites.is_favorited(itinerary)));
                for line in render::segment_lines(itinerary) {
                    println!("{}", line);
                }
            }
            if snapshot.from_cache {
                println!("(cached results)");
            }
        }
        Command::Airports { query } => {
            for airport in ctx.airports.search(&query).await {
                println!("{}", render::airport_line(&airport));
            }
        }
        Command::Favorite { from, to, date, index } => {
            let query = FlightQuery::parse(&from, &to, &date)?;
            let outcome = ctx.search.search(&query).await?;
            let Some(itinerary) = index.checked_sub(1).and_then(|i| outcome.itineraries.get(i)) else {
                bail!("No result #{} among {} flights", index, outcome.itineraries.len());
            };
            if ctx.session.is_authenticated().await {
                ctx.favorites.saved_flights().await?;
            }
            let favorited = ctx.favorites.toggle_favorite(itinerary).await?;
            println!(
                "{} {}",
                if favorited { "Saved" } else { "Removed" },
                render::itinerary_line(index, itinerary, favorited).trim_start()
            );
        }
        Command::Saved { json } => {
            let saved = ctx.favorites.saved_flights().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else if saved.is_empty() {
                println!("No saved flights.");
            } else {
                for flight in &saved {
                    println!("{}", render::saved_line(flight));
                }
            }
        }
        Command::Unsave { id } => {
            ctx.favorites.remove_saved(&id).await?;
            println!("Removed {}", id);
        }
        Command::Recent => {
            for search in ctx.account.recent_searches().await? {
                println!("{}", render::recent_line(&search));
            }
        }
        Command::Login { email, password } => {
            ctx.account.login(&email, &password).await?;
            println!("Logged in as {}", email);
        }
        Command::Logout => {
            ctx.account.logout().await?;
            println!("Logged out");
        }
    }

    Ok(())
}
