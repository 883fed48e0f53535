use serde::{Deserialize, Serialize};

/// Thread counters of one label at the time it was fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub threads_total: i64,
    pub threads_unread: i64,
}

/// A configured label name bound to the Gmail label id it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelBinding {
    pub name: String,
    pub id: String,
}

impl LabelBinding {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Outcome of a single poll tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub updated: usize,
    pub failed: usize,
}
