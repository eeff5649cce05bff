#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for NYC building record lookups.

use clap::{Parser, Subcommand};
use nyc_housing_gateway::all_datasets;
use nyc_housing_lookup::{BuildingLookup, LookupConfig, LookupRequest};
use nyc_housing_server::ServerConfig;
use nyc_housing_server_models::ApiLookupResponse;

#[derive(Parser)]
#[command(name = "nyc_housing", about = "NYC building record lookup tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one address and print the correlated records as JSON
    Lookup {
        /// Street address (e.g. "393 Hewes St")
        #[arg(long)]
        address: String,
        /// Five-digit ZIP code
        #[arg(long)]
        zip: String,
        /// Entries per category: a positive integer or "all" (default 5)
        #[arg(long)]
        count: Option<String>,
        /// Restrict output to one category (e.g. "`housing_violations`")
        #[arg(long)]
        category: Option<String>,
    },
    /// List the embedded dataset registry
    Datasets,
    /// Start the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            address,
            zip,
            count,
            category,
        } => {
            let request = LookupRequest::from_params(
                Some(&address),
                Some(&zip),
                count.as_deref(),
                category.as_deref(),
            )?;
            let lookup = BuildingLookup::from_config(&LookupConfig::from_env()?)?;
            let result = lookup.lookup(&request).await?;
            log::info!(
                "{} {}: identifier {:?}/{:?} from {}",
                result.metadata.address,
                result.metadata.zip,
                result.metadata.building_identifier.bin,
                result.metadata.building_identifier.bbl,
                result.metadata.building_identifier.source_tier
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&ApiLookupResponse::from(result))?
            );
        }
        Commands::Datasets => {
            let datasets = all_datasets();
            println!("{:<20} {:<20} {:<8} NAME", "ID", "CATEGORY", "ENABLED");
            println!("{}", "-".repeat(80));
            for dataset in &datasets {
                println!(
                    "{:<20} {:<20} {:<8} {}",
                    dataset.id,
                    dataset.category.to_string(),
                    if dataset.enabled { "yes" } else { "no" },
                    dataset.name
                );
            }
        }
        Commands::Serve => {
            let lookup = BuildingLookup::from_config(&LookupConfig::from_env()?)?;
            let server = ServerConfig::from_env();
            // actix-web runs its own runtime; keep it off the tokio worker.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(nyc_housing_server::serve(lookup, server))
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_arguments() {
        let cli = Cli::try_parse_from([
            "nyc_housing",
            "lookup",
            "--address",
            "393 Hewes St",
            "--zip",
            "11211",
            "--count",
            "all",
        ])
        .unwrap();
        match cli.command {
            Commands::Lookup {
                address,
                zip,
                count,
                category,
            } => {
                assert_eq!(address, "393 Hewes St");
                assert_eq!(zip, "11211");
                assert_eq!(count.as_deref(), Some("all"));
                assert!(category.is_none());
            }
            _ => panic!("expected lookup"),
        }
    }

    #[test]
    fn lookup_requires_zip() {
        assert!(Cli::try_parse_from(["nyc_housing", "lookup", "--address", "393 Hewes St"]).is_err());
    }
}
