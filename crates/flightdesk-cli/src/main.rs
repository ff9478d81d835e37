// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flightdesk_core::{
    format_query, format_records, AmadeusProvider, ApiEnvironment, FlightSearch, ProviderConfig,
};
use log::debug;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a flight request without looking anything up
    Parse {
        /// Request text, e.g. "18NOV BRU JFK 10:00 14:00"
        #[arg(required = true)]
        text: Vec<String>,
        /// Year for dates that omit one
        #[arg(long)]
        year: Option<i32>,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Parse a flight request and look up matching flights
    Search {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long)]
        year: Option<i32>,
        /// Skip the flight-data provider and use the request as-is
        #[arg(long)]
        offline: bool,
        /// Use the production API instead of the test environment
        #[arg(long, conflicts_with = "offline")]
        production: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    match cli.command {
        Commands::Parse { text, year, json } => {
            let input = text.join(" ");
            let Some(query) = flightdesk_parser::parse(&input, year) else {
                eprintln!("Input not recognized as a flight request: '{}'", input);
                std::process::exit(1);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&query)?);
            } else {
                println!("{}", format_query(&query));
            }
        }
        Commands::Search {
            text,
            year,
            offline,
            production,
            json,
        } => {
            let search = if offline {
                FlightSearch::offline()
            } else {
                let mut config = ProviderConfig::load().context("Failed to load provider config")?;
                if production {
                    config.environment = ApiEnvironment::Production;
                }
                debug!("Provider config — {:?}", config);
                FlightSearch::new(
                    AmadeusProvider::new(config).context("Flight-data provider not configured")?,
                )
            };

            let outcome = search.search(&text.join(" "), year);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            if let Some(query) = &outcome.parsed_query {
                println!("{}", format_query(query));
            }
            if let Some(strategy) = outcome.strategy {
                println!("Strategy: {}", strategy);
            }
            if let Some(records) = &outcome.records {
                println!("{}", format_records(records));
            }
            println!("{}", outcome.message());
        }
    }

    Ok(())
}
