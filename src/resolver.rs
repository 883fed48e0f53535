//! Resolution of configured label names to Gmail label ids

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{LabelInfo, MailClient};
use crate::error::Result;
use crate::models::LabelBinding;

/// Match configured names against the live label listing.
///
/// Matching is exact and case-sensitive. Repeated names collapse into a
/// single binding, and names without a live label are dropped. Bindings
/// come back sorted by name.
pub fn match_labels(desired: &[String], live: &[LabelInfo]) -> Vec<LabelBinding> {
    let name_to_id: HashMap<&str, &str> = live
        .iter()
        .map(|label| (label.name.as_str(), label.id.as_str()))
        .collect();

    let mut bindings: BTreeMap<&str, &str> = BTreeMap::new();
    for name in desired {
        match name_to_id.get(name.as_str()) {
            Some(id) => {
                if bindings.insert(name.as_str(), *id).is_some() {
                    debug!("Label '{}' is configured more than once", name);
                }
            }
            None => warn!("Label '{}' not found in account, skipping", name),
        }
    }

    bindings
        .into_iter()
        .map(|(name, id)| LabelBinding::new(name, id))
        .collect()
}

/// Resolves configured label names using a [`MailClient`]
pub struct LabelResolver {
    client: Arc<dyn MailClient>,
}

impl LabelResolver {
    pub fn new(client: Arc<dyn MailClient>) -> Self {
        Self { client }
    }

    /// List the account's labels once and bind the configured names
    pub async fn resolve(&self, desired: &[String]) -> Result<Vec<LabelBinding>> {
        let live = self.client.list_labels().await?;
        debug!("Account has {} labels", live.len());

        let bindings = match_labels(desired, &live);
        info!(
            "Resolved {} of {} configured labels",
            bindings.len(),
            desired.len()
        );
        Ok(bindings)
    }
}
