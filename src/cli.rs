//! Command-line interface and exporter wiring

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::{GmailLabelClient, MailClient};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{normalize_label_name, LabelMetrics, DEFAULT_NAMESPACE};
use crate::poller::Poller;
use crate::resolver::LabelResolver;
use crate::{auth, server};

#[derive(Parser, Debug)]
#[command(name = "gmail-label-exporter")]
#[command(version)]
#[command(about = "Export Gmail label thread counts as Prometheus metrics", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = ".gmail-exporter/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll label counters and serve them over HTTP
    Serve {
        /// Override the listen address from the config file
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Authenticate with Gmail API and cache the token
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Print every label of the account with its metric name
    ListLabels,

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Load the config, authenticate and run until Ctrl+C
pub async fn run_exporter(cli: &Cli, listen: Option<SocketAddr>) -> Result<()> {
    let mut config = Config::load(&cli.config).await?;
    if let Some(addr) = listen {
        config.server.listen = addr;
    }

    info!("Authenticating with Gmail API...");
    let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;
    let client: Arc<dyn MailClient> =
        Arc::new(GmailLabelClient::new(hub, config.request_timeout()));

    let listener = TcpListener::bind(config.server.listen).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            // Keep the sender alive; without a signal handler we run until killed
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    serve_with_client(&config, client, listener, shutdown_rx).await
}

/// Resolve labels, start the poller and serve metrics on `listener`.
///
/// Returns once `shutdown` turns true and both the server and the poller
/// have stopped.
pub async fn serve_with_client(
    config: &Config,
    client: Arc<dyn MailClient>,
    listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let resolver = LabelResolver::new(Arc::clone(&client));
    let mut bindings = resolver.resolve(&config.labels).await?;

    let metrics = Arc::new(LabelMetrics::from_bindings(DEFAULT_NAMESPACE, &bindings)?);
    bindings.retain(|binding| metrics.tracks(binding));

    let poller = Poller::new(
        client,
        bindings,
        Arc::clone(&metrics),
        config.poll_interval(),
    );
    let poller_task = tokio::spawn(poller.run(shutdown.clone()));

    let app = server::router(metrics, &config.server.path);
    server::serve(listener, app, shutdown).await?;

    if let Err(e) = poller_task.await {
        warn!("Poller task ended abnormally: {}", e);
    }
    Ok(())
}

/// Label listing row printed by `list-labels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub id: String,
    pub name: String,
    pub metric: String,
}

/// List every label of the account, sorted by name
pub async fn list_label_rows(client: &dyn MailClient) -> Result<Vec<LabelRow>> {
    let mut rows: Vec<LabelRow> = client
        .list_labels()
        .await?
        .into_iter()
        .map(|label| LabelRow {
            metric: normalize_label_name(&label.name),
            id: label.id,
            name: label.name,
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["gmail-label-exporter"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert_eq!(cli.token_cache, PathBuf::from(".gmail-exporter/token.json"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_serve_listen_override() {
        let cli = Cli::parse_from([
            "gmail-label-exporter",
            "--config",
            "exporter.toml",
            "serve",
            "--listen",
            "127.0.0.1:9100",
        ]);

        assert_eq!(cli.config, PathBuf::from("exporter.toml"));
        match cli.command {
            Some(Commands::Serve { listen }) => {
                assert_eq!(listen, Some("127.0.0.1:9100".parse().unwrap()));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_config_defaults() {
        let cli = Cli::parse_from(["gmail-label-exporter", "init-config"]);
        match cli.command {
            Some(Commands::InitConfig { output, force }) => {
                assert_eq!(output, PathBuf::from("config.toml"));
                assert!(!force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        let result = Cli::try_parse_from(["gmail-label-exporter", "serve", "--listen", "nope"]);
        assert!(result.is_err());
    }
}
