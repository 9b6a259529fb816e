use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use restomap::api::HttpUpstream;
use restomap::config::{API_KEY_ENV, ApiKey, FileConfig};
use restomap::gateway::{self, ProxyGateway};
use restomap::orchestrator::{
    BOUNCE_DURATION, CityInput, HttpGateway, MapOptions, Orchestrator, PlacesGateway,
    SearchOutcome,
};
use restomap::terminal::TerminalSurface;

/// Search best rated restaurants in a city
///
/// Examples:
///   # Run the proxy (needs MAPS_API_KEY in the environment)
///   restomap serve --port 8888
///
///   # One-shot search through a running proxy
///   restomap search "Vilnius" --proxy http://127.0.0.1:8888/proxy
///
///   # Interactive session, calling the provider in-process
///   restomap browse
#[derive(Parser, Debug)]
#[command(name = "restomap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches restomap.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the credential-hiding proxy on GET /proxy
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },

    /// Search one city and print the ranked list
    Search {
        city: String,

        /// Proxy endpoint to use instead of calling the provider in-process
        #[arg(long)]
        proxy: Option<String>,
    },

    /// Interactive session: type a city to search, `:N` to zoom to row N
    Browse {
        /// Proxy endpoint to use instead of calling the provider in-process
        #[arg(long)]
        proxy: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, matches!(args.command, Command::Serve { .. }));

    let mut config = match args.config {
        Some(ref path) => FileConfig::from_path(path)?,
        None => FileConfig::load().unwrap_or_default(),
    };

    match args.command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(&config).await
        }
        Command::Search { city, proxy } => {
            let city = city.trim().to_string();
            if city.is_empty() {
                bail!("Please enter a city name.");
            }
            match proxy.or_else(|| config.proxy_url.clone()) {
                Some(url) => search_once(&remote_gateway(&config, url)?, &config, &city).await,
                None => search_once(&local_gateway(&config)?, &config, &city).await,
            }
        }
        Command::Browse { proxy } => match proxy.or_else(|| config.proxy_url.clone()) {
            Some(url) => browse(&remote_gateway(&config, url)?, &config).await,
            None => browse(&local_gateway(&config)?, &config).await,
        },
    }
}

fn init_logging(verbose: bool, serving: bool) {
    let default = match (verbose, serving) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn local_gateway(config: &FileConfig) -> Result<ProxyGateway<HttpUpstream>> {
    let api_key = ApiKey::from_env();
    if api_key.is_none() {
        warn!("{} is not set; provider calls will be refused", API_KEY_ENV);
    }
    let upstream =
        HttpUpstream::new(config.upstream.timeout()).context("Failed to create HTTP client")?;
    Ok(ProxyGateway::new(upstream, api_key, config.upstream.clone()))
}

fn remote_gateway(config: &FileConfig, url: String) -> Result<HttpGateway> {
    HttpGateway::new(url, config.upstream.timeout()).context("Failed to create HTTP client")
}

async fn serve(config: &FileConfig) -> Result<()> {
    let gateway = Arc::new(local_gateway(config)?);
    gateway::serve(gateway, &config.server.address())
        .await
        .context("Proxy server failed")
}

async fn search_once<G: PlacesGateway>(
    gateway: &G,
    config: &FileConfig,
    city: &str,
) -> Result<()> {
    let surface = TerminalSurface::stdout(MapOptions::from_config(&config.map));
    let mut orchestrator = Orchestrator::new(surface, city);

    match orchestrator.search(gateway, city).await {
        SearchOutcome::Failed(_) => bail!("Search for {} failed", city),
        outcome => {
            debug!(?outcome, "Search finished");
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand<'a> {
    Quit,
    Help,
    Select(usize),
    Website(usize),
    City(&'a str),
}

fn parse_command(line: &str) -> BrowseCommand<'_> {
    let line = line.trim();
    match line {
        ":q" | ":quit" => BrowseCommand::Quit,
        ":h" | ":help" => BrowseCommand::Help,
        _ => {
            if let Some(row) = line.strip_prefix(":w") {
                row.trim()
                    .parse()
                    .map_or(BrowseCommand::Help, BrowseCommand::Website)
            } else if let Some(row) = line.strip_prefix(':') {
                row.trim()
                    .parse()
                    .map_or(BrowseCommand::Help, BrowseCommand::Select)
            } else {
                BrowseCommand::City(line)
            }
        }
    }
}

fn print_help() {
    println!();
    println!("Type a city name to search it.");
    println!("  :N    zoom to row N and bounce its marker");
    println!("  :w N  show the website of row N");
    println!("  :q    quit");
    println!();
}

async fn browse<G: PlacesGateway>(gateway: &G, config: &FileConfig) -> Result<()> {
    let surface = TerminalSurface::stdout(MapOptions::from_config(&config.map));
    let mut orchestrator = Orchestrator::new(surface, config.default_city.clone());

    orchestrator.search(gateway, &config.default_city).await;
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parse_command(&line) {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => print_help(),
            BrowseCommand::Select(row) => {
                let Some(place_id) = orchestrator.row(row).map(|p| p.place_id.clone()) else {
                    println!("No row {}", row);
                    continue;
                };
                if let Some(bounce) = orchestrator.select(&place_id) {
                    tokio::time::sleep(BOUNCE_DURATION).await;
                    orchestrator.finish_bounce(bounce);
                }
            }
            BrowseCommand::Website(row) => {
                let website = orchestrator
                    .row(row)
                    .map(|p| p.place_id.clone())
                    .and_then(|place_id| orchestrator.website(&place_id).map(str::to_string));
                match website {
                    Some(url) => println!("{}", url),
                    None => println!("No website for row {}", row),
                }
            }
            BrowseCommand::City(input) => match orchestrator.classify_input(input) {
                CityInput::Blank => println!("Please enter a city name."),
                CityInput::Unchanged => debug!("City unchanged, not searching again"),
                CityInput::Search(city) => {
                    orchestrator.search(gateway, &city).await;
                }
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_commands() {
        assert_eq!(parse_command(":3"), BrowseCommand::Select(3));
        assert_eq!(parse_command(" : 12 "), BrowseCommand::Select(12));
        assert_eq!(parse_command(":w 2"), BrowseCommand::Website(2));
        assert_eq!(parse_command(":w2"), BrowseCommand::Website(2));
    }

    #[test]
    fn test_parse_control_commands() {
        assert_eq!(parse_command(":q"), BrowseCommand::Quit);
        assert_eq!(parse_command(":quit"), BrowseCommand::Quit);
        assert_eq!(parse_command(":h"), BrowseCommand::Help);
        assert_eq!(parse_command(":x"), BrowseCommand::Help);
        assert_eq!(parse_command(":w abc"), BrowseCommand::Help);
    }

    #[test]
    fn test_parse_city_text() {
        assert_eq!(parse_command("  Kaunas "), BrowseCommand::City("Kaunas"));
        assert_eq!(
            parse_command("San Sebastián"),
            BrowseCommand::City("San Sebastián")
        );
        assert_eq!(parse_command(""), BrowseCommand::City(""));
    }
}
