//! Prometheus gauges for label thread counters
//!
//! Every tracked label gets its own pair of gauges:
//!
//! ```text
//! gmail_threads_my_label_total{label="My Label"} 10
//! gmail_threads_my_label_unread{label="My Label"} 3
//! ```
//!
//! The metric name embeds the snake_case form of the label name, the
//! `label` constant label keeps the display name. Gauges are atomic, so
//! the poller can write while the HTTP handler gathers.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{ExporterError, Result};
use crate::models::{LabelBinding, LabelCounts};

/// Default metric namespace
pub const DEFAULT_NAMESPACE: &str = "gmail";

static NON_METRIC_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Turn a label display name into a metric name fragment.
///
/// Word boundaries (spaces, punctuation, `/` of nested labels, case
/// transitions and letter/digit transitions) become single underscores:
/// `"My Label"` and `"MyLabel"` both give `my_label`, `"Receipts2024"`
/// gives `receipts_2024`.
pub fn normalize_label_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) => true,
            // End of an acronym: "HTMLParser" -> "html_parser"
            Some(p) if c.is_uppercase() && p.is_uppercase() => {
                next.is_some_and(|n| n.is_lowercase())
            }
            Some(p) if c.is_ascii_digit() => p.is_alphabetic(),
            Some(p) if c.is_lowercase() => p.is_ascii_digit(),
            _ => false,
        };
        if boundary {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }

    let cleaned = NON_METRIC_CHARS.replace_all(&snake, "_");
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Total and unread thread gauges of one label
#[derive(Debug, Clone)]
pub struct GaugePair {
    label: String,
    pub total: IntGauge,
    pub unread: IntGauge,
}

impl GaugePair {
    /// Display name of the label these gauges belong to
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set(&self, counts: LabelCounts) {
        self.total.set(counts.threads_total);
        self.unread.set(counts.threads_unread);
    }

    pub fn get(&self) -> LabelCounts {
        LabelCounts {
            threads_total: self.total.get(),
            threads_unread: self.unread.get(),
        }
    }
}

/// Registry holding every exported metric
pub struct LabelMetrics {
    namespace: String,
    registry: Registry,
    gauges: HashMap<String, GaugePair>,
    polls_total: IntCounter,
    fetch_errors_total: IntCounterVec,
    last_poll_timestamp: IntGauge,
}

impl LabelMetrics {
    /// Create a registry containing only the exporter's own metrics
    pub fn new(namespace: &str) -> Result<Self> {
        let registry = Registry::new();

        let polls_total = IntCounter::with_opts(Opts::new(
            format!("{}_exporter_polls_total", namespace),
            "Number of completed poll ticks",
        ))?;
        let fetch_errors_total = IntCounterVec::new(
            Opts::new(
                format!("{}_exporter_fetch_errors_total", namespace),
                "Number of failed label fetches",
            ),
            &["label"],
        )?;
        let last_poll_timestamp = IntGauge::with_opts(Opts::new(
            format!("{}_exporter_last_poll_timestamp_seconds", namespace),
            "Unix time of the last completed poll tick",
        ))?;

        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(fetch_errors_total.clone()))?;
        registry.register(Box::new(last_poll_timestamp.clone()))?;

        Ok(Self {
            namespace: namespace.to_string(),
            registry,
            gauges: HashMap::new(),
            polls_total,
            fetch_errors_total,
            last_poll_timestamp,
        })
    }

    /// Create the registry with a gauge pair for every binding
    pub fn from_bindings(namespace: &str, bindings: &[LabelBinding]) -> Result<Self> {
        let mut metrics = Self::new(namespace)?;
        for binding in bindings {
            metrics.register_binding(binding)?;
        }
        Ok(metrics)
    }

    /// Register the gauge pair of a binding.
    ///
    /// Returns `false` without registering anything when another label
    /// already claimed the same normalized name.
    pub fn register_binding(&mut self, binding: &LabelBinding) -> Result<bool> {
        let key = normalize_label_name(&binding.name);

        if let Some(existing) = self.gauges.get(&key) {
            if existing.label != binding.name {
                warn!(
                    "Label '{}' maps to metric name '{}' already used by '{}', skipping",
                    binding.name, key, existing.label
                );
            }
            return Ok(false);
        }

        let total = IntGauge::with_opts(
            Opts::new(
                format!("{}_threads_{}_total", self.namespace, key),
                format!("Total number of threads in label {}", binding.name),
            )
            .const_label("label", binding.name.clone()),
        )?;
        let unread = IntGauge::with_opts(
            Opts::new(
                format!("{}_threads_{}_unread", self.namespace, key),
                format!("Number of unread threads in label {}", binding.name),
            )
            .const_label("label", binding.name.clone()),
        )?;

        self.registry.register(Box::new(total.clone()))?;
        self.registry.register(Box::new(unread.clone()))?;

        debug!("Registered gauges for label '{}' as '{}'", binding.name, key);
        self.gauges.insert(
            key,
            GaugePair {
                label: binding.name.clone(),
                total,
                unread,
            },
        );
        Ok(true)
    }

    /// Whether gauges were registered for this binding's label
    pub fn tracks(&self, binding: &LabelBinding) -> bool {
        self.pair_for(&binding.name).is_some()
    }

    /// Gauges of a label, looked up by display name
    pub fn pair_for(&self, label_name: &str) -> Option<&GaugePair> {
        self.gauges
            .get(&normalize_label_name(label_name))
            .filter(|pair| pair.label == label_name)
    }

    /// Gauges of a label, looked up by normalized name
    pub fn gauge_pair(&self, normalized: &str) -> Option<&GaugePair> {
        self.gauges.get(normalized)
    }

    /// Store fresh counters for a label. Returns `false` for untracked labels.
    pub fn set_counts(&self, label_name: &str, counts: LabelCounts) -> bool {
        match self.pair_for(label_name) {
            Some(pair) => {
                pair.set(counts);
                true
            }
            None => false,
        }
    }

    pub fn record_fetch_error(&self, label_name: &str) {
        self.fetch_errors_total
            .with_label_values(&[label_name])
            .inc();
    }

    pub fn record_poll(&self, unix_time: i64) {
        self.polls_total.inc();
        self.last_poll_timestamp.set(unix_time);
    }

    pub fn polls(&self) -> u64 {
        self.polls_total.get()
    }

    pub fn fetch_errors(&self, label_name: &str) -> u64 {
        self.fetch_errors_total
            .with_label_values(&[label_name])
            .get()
    }

    /// Number of tracked labels
    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    /// Encode all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            ExporterError::MetricsError(prometheus::Error::Msg(format!(
                "Exposition output is not UTF-8: {}",
                e
            )))
        })
    }
}
