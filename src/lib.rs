//! Gmail Label Exporter
//!
//! Polls the thread counters of selected Gmail labels and exposes them as
//! Prometheus gauges over HTTP.
//!
//! # Overview
//!
//! - **Configuration**: poll interval and label names from a TOML file
//! - **Authentication**: OAuth2 installed flow with token caching
//! - **Resolution**: configured label names bound to Gmail label ids once at startup
//! - **Polling**: one background task refreshing every label's gauges per tick
//! - **Exposition**: a single `/metrics` route in the Prometheus text format
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_label_exporter::{auth, cli, client::GmailLabelClient, config::Config};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         ".gmail-exporter/token.json".as_ref(),
//!     ).await?;
//!     let client = Arc::new(GmailLabelClient::new(hub, config.request_timeout()));
//!
//!     let listener = tokio::net::TcpListener::bind(config.server.listen).await?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     cli::serve_with_client(&config, client, listener, shutdown_rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`client`] - Label listing and counter fetching
//! - [`cli`] - Command-line interface and exporter wiring
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`metrics`] - Prometheus registry and label gauges
//! - [`models`] - Core data structures
//! - [`poller`] - Fixed-interval polling loop
//! - [`resolver`] - Label name to id resolution
//! - [`server`] - HTTP exposition

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod poller;
pub mod resolver;
pub mod server;

// Re-export commonly used types for convenience
pub use error::{ExporterError, Result};

pub use models::{LabelBinding, LabelCounts, PollReport};

pub use config::{ClientConfig, Config, ServerConfig};

pub use client::{GmailLabelClient, LabelInfo, MailClient};

pub use metrics::{normalize_label_name, GaugePair, LabelMetrics};
pub use poller::Poller;
pub use resolver::{match_labels, LabelResolver};

pub use cli::{Cli, Commands};
