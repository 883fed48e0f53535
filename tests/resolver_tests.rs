//! Tests for resolving configured label names against the account

mod common;

use common::*;
use gmail_label_exporter::cli::list_label_rows;
use gmail_label_exporter::error::ExporterError;
use gmail_label_exporter::models::LabelBinding;
use gmail_label_exporter::resolver::{match_labels, LabelResolver};
use proptest::prelude::*;

fn names(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

#[tokio::test]
async fn test_resolve_binds_configured_labels() {
    let (mock, _) = mock_account(&[
        ("Label_1", "Work", 10, 3),
        ("Label_2", "Personal", 4, 0),
        ("INBOX", "INBOX", 120, 7),
    ]);
    let resolver = LabelResolver::new(shared(mock));

    let bindings = resolver
        .resolve(&names(&["Work", "INBOX"]))
        .await
        .unwrap();

    assert_eq!(
        bindings,
        vec![
            LabelBinding::new("INBOX", "INBOX"),
            LabelBinding::new("Work", "Label_1"),
        ]
    );
}

#[tokio::test]
async fn test_resolve_skips_unknown_labels() {
    let (mock, _) = mock_account(&[("Label_1", "Work", 10, 3)]);
    let resolver = LabelResolver::new(shared(mock));

    let bindings = resolver.resolve(&names(&["Ghost"])).await.unwrap();

    assert!(bindings.is_empty());
}

#[tokio::test]
async fn test_resolve_is_case_sensitive() {
    let (mock, _) = mock_account(&[("Label_1", "Work", 10, 3)]);
    let resolver = LabelResolver::new(shared(mock));

    let bindings = resolver.resolve(&names(&["work"])).await.unwrap();

    assert!(bindings.is_empty());
}

#[tokio::test]
async fn test_resolve_propagates_listing_failure() {
    let mut mock = MockMailClient::new();
    mock.expect_list_labels()
        .times(1)
        .returning(|| Err(ExporterError::AuthError("token revoked".to_string())));
    mock.expect_get_label().never();

    let resolver = LabelResolver::new(shared(mock));
    let result = resolver.resolve(&names(&["Work"])).await;

    assert!(matches!(result, Err(ExporterError::AuthError(_))));
}

#[test]
fn test_match_labels_collapses_duplicates() {
    let live = vec![create_test_label_info("Label_1", "Work")];

    let bindings = match_labels(&names(&["Work", "Work", "Work"]), &live);

    assert_eq!(bindings, vec![LabelBinding::new("Work", "Label_1")]);
}

#[tokio::test]
async fn test_list_label_rows_sorted_with_metric_names() {
    let (mock, _) = mock_account(&[
        ("Label_2", "Work/Projects", 1, 0),
        ("INBOX", "INBOX", 120, 7),
        ("Label_1", "My Label", 10, 3),
    ]);

    let rows = list_label_rows(&mock).await.unwrap();

    let summary: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|row| (row.id.as_str(), row.name.as_str(), row.metric.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("INBOX", "INBOX", "inbox"),
            ("Label_1", "My Label", "my_label"),
            ("Label_2", "Work/Projects", "work_projects"),
        ]
    );
}

proptest! {
    #[test]
    fn prop_bindings_are_configured_and_live(
        desired in prop::collection::vec("[A-Za-z]{1,6}", 0..8),
        live_names in prop::collection::hash_set("[A-Za-z]{1,6}", 0..8),
    ) {
        let live: Vec<_> = live_names
            .iter()
            .enumerate()
            .map(|(i, name)| create_test_label_info(&format!("Label_{}", i), name))
            .collect();

        let bindings = match_labels(&desired, &live);

        let unique: std::collections::HashSet<&String> = desired.iter().collect();
        prop_assert!(bindings.len() <= unique.len());
        for binding in &bindings {
            prop_assert!(desired.contains(&binding.name));
            prop_assert!(live
                .iter()
                .any(|l| l.name == binding.name && l.id == binding.id));
        }
    }
}
