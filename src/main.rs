mod cli;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use vodfeed::prelude::*;

#[derive(Serialize)]
struct CardSummary<'a> {
    title: &'a str,
    duration: String,
    thumbnail: bool,
    schools: Vec<&'a str>,
    sports: Vec<&'a str>,
}

impl<'a> From<&'a DisplayRecord> for CardSummary<'a> {
    fn from(r: &'a DisplayRecord) -> Self {
        Self {
            title: r.title(),
            duration: r.duration_label(),
            thumbnail: !r.thumbnail().is_placeholder(),
            schools: r.school_names(),
            sports: r.sport_names(),
        }
    }
}

/// Prints each page as it lands, the way the list view would render it.
struct Printer;

impl FeedObserver for Printer {
    fn on_page_loaded(&mut self, records: &[DisplayRecord], has_more: bool) {
        for r in records {
            print_card(r);
        }
        if !has_more {
            println!("-- end of catalog --");
        }
    }

    fn on_page_failed(&mut self, error: &FetchError) {
        eprintln!("Unable to load videos: {error}");
    }
}

fn print_card(r: &DisplayRecord) {
    println!("{} [{}]", r.title(), r.duration_label());
    println!("    schools: {}", r.school_names().join(", "));
    println!("    sports:  {}", r.sport_names().join(", "));
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vodfeed=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let client = VodClient::connect(config)?;

    match cli.command {
        Commands::Page { url, json } => {
            let page = client.fetch_page(url.as_deref(), false).await?;
            if json {
                let cards: Vec<CardSummary> = page.records.iter().map(CardSummary::from).collect();
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                for r in &page.records {
                    print_card(r);
                }
            }
            println!("next page: {}", page.next_page);
        }
        Commands::Browse { pages } => {
            let mut feed = client.feed();
            let mut printer = Printer;
            let mut failed = false;
            for _ in 0..pages {
                if !feed.has_more() {
                    break;
                }
                // The printer has already reported the failure.
                if feed.request_next_page(&mut printer).await.is_err() {
                    failed = true;
                    break;
                }
            }
            println!("{} videos loaded", feed.len());
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Entity { kind, id } => {
            let entity = client.resolve_entity(kind, id).await?;
            println!("{}", serde_json::to_string_pretty(&entity)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}
