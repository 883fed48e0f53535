//! Common test utilities and fixtures

#![allow(dead_code)]

use gmail_label_exporter::client::{LabelInfo, MailClient};
use gmail_label_exporter::config::Config;
use gmail_label_exporter::error::{ExporterError, Result};
use gmail_label_exporter::models::LabelCounts;
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Mock implementation of MailClient for testing
mock! {
    pub MailClient {}

    #[async_trait::async_trait]
    impl MailClient for MailClient {
        async fn list_labels(&self) -> Result<Vec<LabelInfo>>;
        async fn get_label(&self, label_id: &str) -> Result<LabelCounts>;
    }
}

/// Create a test LabelInfo
pub fn create_test_label_info(id: &str, name: &str) -> LabelInfo {
    LabelInfo {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn counts(threads_total: i64, threads_unread: i64) -> LabelCounts {
    LabelCounts {
        threads_total,
        threads_unread,
    }
}

/// Create a config tracking `labels`
pub fn create_test_config(interval: u64, labels: &[&str]) -> Config {
    let mut config = Config::default();
    config.interval = interval;
    config.labels = labels.iter().map(|l| l.to_string()).collect();
    config
}

/// Label counters of a fake account, keyed by label id.
///
/// Tests mutate it between polls to simulate mailbox activity. Ids missing
/// from the map make `get_label` fail.
pub type AccountState = Arc<Mutex<HashMap<String, LabelCounts>>>;

/// Build a mock client backed by a fake account.
///
/// `labels` holds `(id, name, threads_total, threads_unread)` tuples.
pub fn mock_account(labels: &[(&str, &str, i64, i64)]) -> (MockMailClient, AccountState) {
    let infos: Vec<LabelInfo> = labels
        .iter()
        .map(|(id, name, _, _)| create_test_label_info(id, name))
        .collect();
    let state: AccountState = Arc::new(Mutex::new(
        labels
            .iter()
            .map(|(id, _, total, unread)| (id.to_string(), counts(*total, *unread)))
            .collect(),
    ));

    let mut mock = MockMailClient::new();
    mock.expect_list_labels()
        .returning(move || Ok(infos.clone()));

    let lookup = Arc::clone(&state);
    mock.expect_get_label().returning(move |id| {
        lookup
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .ok_or_else(|| ExporterError::LabelNotFound(id.to_string()))
    });

    (mock, state)
}

/// Share a mock as the trait object the exporter components expect
pub fn shared(mock: MockMailClient) -> Arc<dyn MailClient> {
    Arc::new(mock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_config() {
        let config = create_test_config(5, &["Work"]);
        assert_eq!(config.interval, 5);
        assert_eq!(config.labels, vec!["Work".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_mock_account_serves_state() {
        let (mock, state) = mock_account(&[("L1", "Work", 10, 3)]);

        assert_eq!(mock.list_labels().await.unwrap().len(), 1);
        assert_eq!(mock.get_label("L1").await.unwrap(), counts(10, 3));

        state.lock().unwrap().insert("L1".to_string(), counts(11, 4));
        assert_eq!(mock.get_label("L1").await.unwrap(), counts(11, 4));

        assert!(mock.get_label("missing").await.is_err());
    }
}
