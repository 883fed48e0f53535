use anyhow::Result;
use clap::Parser;
use gmail_label_exporter::auth::{self, READONLY_SCOPE};
use gmail_label_exporter::cli::{self, Cli, Commands};
use gmail_label_exporter::client::GmailLabelClient;
use gmail_label_exporter::config::Config;
use gmail_label_exporter::error::ExporterError;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        display_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // This is necessary because multiple dependencies use different crypto providers
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        None => cli::run_exporter(&cli, None).await?,

        Some(Commands::Serve { listen }) => cli::run_exporter(&cli, *listen).await?,

        Some(Commands::Auth { force }) => {
            tracing::info!("Authenticating with Gmail API...");

            if *force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            if cli.credentials.exists() {
                let credentials = auth::load_credentials(&cli.credentials).await?;
                println!("Using OAuth client of project: {}", credentials.installed.project_id);
            }

            let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;

            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            // Must specify scope to avoid triggering an additional OAuth flow
            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope(READONLY_SCOPE)
                .doit()
                .await
                .map_err(ExporterError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );
        }

        Some(Commands::ListLabels) => {
            let config = Config::load_or_default(&cli.config).await?;
            let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;
            let client = GmailLabelClient::new(hub, config.request_timeout());

            let rows = cli::list_label_rows(&client).await?;
            println!("{:<30} {:<40} METRIC", "ID", "NAME");
            for row in &rows {
                println!("{:<30} {:<40} {}", row.id, row.name, row.metric);
            }
            println!("\n{} labels", rows.len());
        }

        Some(Commands::InitConfig { output, force }) => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !*force {
                return Err(ExporterError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nEdit `labels` to list the Gmail labels to export.");
            println!("Run `gmail-label-exporter list-labels` to see the available names.");
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_label_exporter=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_label_exporter=info,warn"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Display error with context
fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  Caused by: {}", e);
        cause = e.source();
    }

    if let Some(exporter_err) = error.downcast_ref::<ExporterError>() {
        match exporter_err {
            ExporterError::AuthError(_) => {
                eprintln!("\nHint: Make sure your credentials.json file is valid.");
                eprintln!("      You can download it from Google Cloud Console.");
                eprintln!("      Try running: gmail-label-exporter auth --force");
            }
            ExporterError::ConfigError(_) => {
                eprintln!("\nHint: Check your configuration file for errors.");
                eprintln!("      Run: gmail-label-exporter init-config --force");
            }
            _ => {}
        }
    }
}
