mod format;
mod letterboxd;
mod loader;
mod model;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loader::Source;
use render::FilmCardRenderer;

/// Film club cards: render the club's picks as HTML and keep ratings in sync with Letterboxd
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_DATA: &str = "films.json";
const DEFAULT_REVIEWERS: [&str; 2] = ["derschaki", "zebrastuhl"];

#[derive(Subcommand)]
enum Commands {
    /// Render the current and past film cards
    Render {
        /// Film data: a local path or an http(s) URL
        #[arg(short, long, default_value = DEFAULT_DATA)]
        source: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit only the two container divs, no page shell
        #[arg(long)]
        fragments: bool,
        /// Reviewer to show on every card, in order (repeatable; defaults to everyone in the data)
        #[arg(short, long = "reviewer")]
        reviewers: Vec<String>,
        /// Page title
        #[arg(long, default_value = "Filmclub")]
        title: String,
    },
    /// Pull the latest ratings from the reviewers' Letterboxd feeds into the data file
    SyncRatings {
        /// Film data file to update
        #[arg(short, long, default_value = DEFAULT_DATA)]
        data: PathBuf,
        /// Letterboxd username to sync (repeatable)
        #[arg(short, long = "reviewer")]
        reviewers: Vec<String>,
        /// Report changes without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "film_club=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            output,
            fragments,
            reviewers,
            title,
        } => {
            let source = Source::parse(&source);
            let doc = match loader::load_document(&source).await {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::error!(%source, error = %e, "failed to load film data");
                    std::process::exit(1);
                }
            };

            let renderer = if reviewers.is_empty() {
                FilmCardRenderer::for_document(&doc)
            } else {
                FilmCardRenderer::new(reviewers)
            };
            tracing::info!(
                past_films = doc.past_films.len(),
                reviewers = ?renderer.reviewers(),
                "rendering film cards"
            );

            let rendered = renderer.render(&doc);
            let html = if fragments {
                rendered.fragments()
            } else {
                rendered.page(&title)
            };

            match output {
                Some(path) => {
                    tokio::fs::write(&path, html).await?;
                    tracing::info!(path = %path.display(), "wrote film cards");
                }
                None => print!("{html}"),
            }
        }
        Commands::SyncRatings {
            data,
            reviewers,
            dry_run,
        } => {
            let reviewers = if reviewers.is_empty() {
                DEFAULT_REVIEWERS.iter().map(|r| r.to_string()).collect()
            } else {
                reviewers
            };
            let changes = letterboxd::sync::sync_ratings(&data, &reviewers, dry_run).await?;
            tracing::info!(changes = changes.len(), "sync finished");
        }
    }

    Ok(())
}
