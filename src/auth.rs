//! OAuth2 authentication management for Gmail API

use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use yup_oauth2::ApplicationSecret;

use crate::error::{ExporterError, Result};

/// Read-only scope; enough to list labels and read their counters
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Scopes requested when the token is first obtained
pub const REQUIRED_SCOPES: &[&str] = &[READONLY_SCOPE];

pub type GmailHub = Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// Authenticate and build the Gmail hub used for label reads.
///
/// The installed-app flow runs once when no cached token exists; after that
/// the token at `token_cache_path` is refreshed silently. Credentials come
/// from `credentials_path`, or from `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET`
/// when that file is absent.
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    token_cache_path: &Path,
) -> Result<GmailHub> {
    let secret = read_application_secret(credentials_path).await?;

    if let Some(parent) = token_cache_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // HTTPRedirect opens a browser for user authorization
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path)
    .build()
    .await
    .map_err(|e| ExporterError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Obtain the token up front so the browser flow happens at startup,
    // not in the middle of the first poll
    let _token = auth
        .token(REQUIRED_SCOPES)
        .await
        .map_err(|e| ExporterError::AuthError(format!("Failed to obtain token: {}", e)))?;

    if token_cache_path.exists() {
        secure_token_file(token_cache_path).await?;
    }

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| {
                    ExporterError::AuthError(format!("Failed to load TLS roots: {}", e))
                })?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Resolve the OAuth2 application secret from file or environment
async fn read_application_secret(credentials_path: &Path) -> Result<ApplicationSecret> {
    if credentials_path.exists() {
        return yup_oauth2::read_application_secret(credentials_path)
            .await
            .map_err(|e| ExporterError::AuthError(format!("Failed to read credentials: {}", e)));
    }

    tracing::info!(
        "Credentials file {:?} not found, falling back to environment",
        credentials_path
    );
    load_credentials_from_env().map_err(|e| {
        ExporterError::AuthError(format!(
            "No credentials file at {:?} and environment is incomplete: {}",
            credentials_path, e
        ))
    })
}

/// Credential structure matching Google's OAuth2 credentials JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub installed: InstalledApp,
}

/// Installed application credentials (desktop/CLI app)
#[derive(Debug, Serialize, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub project_id: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

/// Load OAuth2 credentials from a JSON file
pub async fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = tokio::fs::read_to_string(path).await?;
    let creds = serde_json::from_str(&content)?;
    Ok(creds)
}

/// Load OAuth2 credentials from environment variables
///
/// # Environment Variables
/// - `GMAIL_CLIENT_ID`: OAuth2 client ID
/// - `GMAIL_CLIENT_SECRET`: OAuth2 client secret
/// - `GMAIL_REDIRECT_URI`: Redirect URI (optional, defaults to http://localhost:8080)
pub fn load_credentials_from_env() -> Result<ApplicationSecret> {
    let client_id = env::var("GMAIL_CLIENT_ID")
        .map_err(|_| ExporterError::ConfigError("GMAIL_CLIENT_ID not set".to_string()))?;
    let client_secret = env::var("GMAIL_CLIENT_SECRET")
        .map_err(|_| ExporterError::ConfigError("GMAIL_CLIENT_SECRET not set".to_string()))?;
    let redirect_uri = env::var("GMAIL_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    Ok(ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        redirect_uris: vec![redirect_uri],
        ..Default::default()
    })
}

/// Restrict the token cache to its owner (mode 0600)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    // Windows uses ACLs, file permissions are different
    Ok(())
}
