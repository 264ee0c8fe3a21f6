//! Command Handlers

use crate::client::TanodClient;
use crate::commands::{Cli, Commands, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output::{self, TableRenderer};
use std::path::PathBuf;
use tanod_api::{run_server, ApiConfig};
use tanod_core::{GeoPoint, TrackingMessage};
use tanod_map::MarkerLayer;
use tracing::debug;

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let format = cli.format;
    match cli.command {
        Commands::Start {
            host,
            port,
            data_dir,
        } => handle_start(host, port, data_dir).await,
        Commands::Report { officer, lat, lon } => {
            let client = TanodClient::new(&cli.api_url)?;
            handle_report(&client, &officer, lat, lon, format).await
        }
        Commands::Active => handle_active(&TanodClient::new(&cli.api_url)?, format).await,
        Commands::Login { officer } => {
            let session = TanodClient::new(&cli.api_url)?.login(&officer).await?;
            output::print_json(&session);
            Ok(())
        }
        Commands::Logout { officer } => {
            let session = TanodClient::new(&cli.api_url)?.logout(&officer).await?;
            output::print_json(&session);
            Ok(())
        }
        Commands::Officer {
            officer,
            name,
            picture,
        } => {
            let created = TanodClient::new(&cli.api_url)?
                .upsert_officer(&officer, &name, picture.as_deref())
                .await?;
            let verb = if created { "registered" } else { "updated" };
            println!("Officer {} {}", officer, verb);
            Ok(())
        }
        Commands::Health => {
            let health = TanodClient::new(&cli.api_url)?.health().await?;
            output::print_health(&health, format);
            Ok(())
        }
    }
}

/// Start the API server; flags override the environment
async fn handle_start(
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> CliResult<()> {
    let mut config = ApiConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if data_dir.is_some() {
        config.data_dir = data_dir;
    }

    println!("Starting Tanod tracking server...");
    println!("  Address: {}:{}", config.host, config.port);
    match &config.data_dir {
        Some(dir) => println!("  Store:   sled at {}", dir.display()),
        None => println!("  Store:   in-memory"),
    }
    println!("  Stale after: {}s", config.stale_after_secs);

    run_server(config)
        .await
        .map_err(|e| CliError::server(e.to_string()))
}

async fn handle_report(
    client: &TanodClient,
    officer: &str,
    lat: f64,
    lon: f64,
    format: OutputFormat,
) -> CliResult<()> {
    if !GeoPoint::new(lat, lon).is_valid() {
        return Err(CliError::invalid_arg(format!(
            "coordinates out of range: {}, {}",
            lat, lon
        )));
    }

    let record = client.report_location(officer, lat, lon).await?;
    output::print_location(&record, format);
    Ok(())
}

async fn handle_active(client: &TanodClient, format: OutputFormat) -> CliResult<()> {
    let locations = client.active().await?;
    debug!(count = locations.len(), "Snapshot fetched");

    let mut layer = MarkerLayer::new(TableRenderer::default());
    layer.apply(TrackingMessage::InitializeLocations { locations });

    match format {
        // Records as the layer holds them after the snapshot
        OutputFormat::Json => output::print_json(&layer.known().collect::<Vec<_>>()),
        OutputFormat::Table => output::print_markers(layer.renderer()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tanod_api::start_background_server;

    async fn spawn_server() -> String {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ApiConfig::default()
        };
        let addr = start_background_server(config).await.unwrap();
        format!("http://{}", addr)
    }

    fn parse(api_url: &str, args: &[&str]) -> Cli {
        let mut argv = vec!["tanod", "--api-url", api_url];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_report_rejects_out_of_range_before_connecting() {
        // Nothing listens here; validation must fail first
        let cli = parse("http://127.0.0.1:9", &["report", "--officer", "A", "--lat", "95", "--lon", "121"]);
        let err = run(cli).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_commands_against_running_server() {
        let url = spawn_server().await;

        run(parse(&url, &["officer", "--officer", "A", "--name", "Andres"])).await.unwrap();
        run(parse(&url, &["report", "--officer", "A", "--lat", "14.70", "--lon", "121.05"]))
            .await
            .unwrap();
        run(parse(&url, &["active"])).await.unwrap();
        run(parse(&url, &["--format", "json", "active"])).await.unwrap();
        run(parse(&url, &["health"])).await.unwrap();

        let err = run(parse(&url, &["report", "--officer", "ghost", "--lat", "14.70", "--lon", "121.05"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::ApiError { status: 404, .. }));
    }
}
