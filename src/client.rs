//! Gmail API client for label listings and label counters

use async_trait::async_trait;
use google_gmail1::api::Label;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{GmailHub, READONLY_SCOPE};
use crate::error::{ExporterError, Result};
use crate::models::LabelCounts;

/// Label info returned from Gmail API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub id: String,
    pub name: String,
}

/// Label operations the exporter needs, behind a trait for easier testing
#[async_trait]
pub trait MailClient: Send + Sync {
    /// List all labels in the account
    async fn list_labels(&self) -> Result<Vec<LabelInfo>>;

    /// Fetch the thread counters of a single label
    async fn get_label(&self, label_id: &str) -> Result<LabelCounts>;
}

/// Production client backed by the Gmail API hub
///
/// Every call is bounded by `request_timeout`; a timed out call surfaces
/// as [`ExporterError::NetworkError`].
pub struct GmailLabelClient {
    hub: GmailHub,
    request_timeout: Duration,
}

impl GmailLabelClient {
    pub fn new(hub: GmailHub, request_timeout: Duration) -> Self {
        Self {
            hub,
            request_timeout,
        }
    }
}

/// Run an API call with a timeout, mapping expiry to a network error
async fn with_timeout<T, Fut>(operation_name: &str, timeout: Duration, call: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Gmail API {} call timed out after {:?}", operation_name, timeout);
            Err(ExporterError::NetworkError(format!(
                "API call timed out after {:?}",
                timeout
            )))
        }
    }
}

/// Extract thread counters from a Gmail label resource
///
/// Gmail omits counters it has not computed; those read as zero.
pub fn label_counts(label: &Label) -> LabelCounts {
    LabelCounts {
        threads_total: label.threads_total.map(i64::from).unwrap_or(0),
        threads_unread: label.threads_unread.map(i64::from).unwrap_or(0),
    }
}

#[async_trait]
impl MailClient for GmailLabelClient {
    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        let api_call = async {
            debug!("Calling Gmail API to list labels...");
            let (_, response) = self
                .hub
                .users()
                .labels_list("me")
                .add_scope(READONLY_SCOPE)
                .doit()
                .await?;
            Ok::<_, ExporterError>(response)
        };

        let response = with_timeout("list_labels", self.request_timeout, api_call).await?;

        let labels: Vec<LabelInfo> = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| match (label.id, label.name) {
                (Some(id), Some(name)) => Some(LabelInfo { id, name }),
                _ => None,
            })
            .collect();

        debug!("Successfully parsed {} labels", labels.len());
        Ok(labels)
    }

    async fn get_label(&self, label_id: &str) -> Result<LabelCounts> {
        let api_call = async {
            let (_, label) = self
                .hub
                .users()
                .labels_get("me", label_id)
                .add_scope(READONLY_SCOPE)
                .doit()
                .await?;
            Ok::<_, ExporterError>(label)
        };

        let label = with_timeout("get_label", self.request_timeout, api_call).await?;

        if label.id.as_deref().is_some_and(|id| id != label_id) {
            return Err(ExporterError::LabelError(format!(
                "Requested label {} but received {:?}",
                label_id, label.id
            )));
        }

        Ok(label_counts(&label))
    }
}

// Implement MailClient for Arc<T> to allow shared ownership
#[async_trait]
impl<T: MailClient + ?Sized> MailClient for Arc<T> {
    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        self.as_ref().list_labels().await
    }

    async fn get_label(&self, label_id: &str) -> Result<LabelCounts> {
        self.as_ref().get_label(label_id).await
    }
}
