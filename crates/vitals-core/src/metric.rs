//! Metric model for first-input timing
//!
//! This module defines the [`Metric`] record that the reporter finalizes and
//! delivers, along with the raw timing types it is built from:
//! [`FirstInputEntry`] for modern performance-entry records and
//! [`InputEventSummary`] for the legacy polyfill's event data.
//!
//! Field names serialize in camelCase so records parse directly from
//! browser-produced JSON.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Name under which the first-input-delay metric reports
pub const FIRST_INPUT_DELAY: &str = "FID";

/// A first-input performance timing record
///
/// Mirrors the browser's event-timing entry for the first qualifying user
/// interaction on a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FirstInputEntry {
    /// Input event name, e.g. "pointerdown" or "keydown"
    pub name: String,
    /// Entry type, always "first-input"
    #[serde(default = "default_entry_type")]
    pub entry_type: String,
    /// When the input occurred, in milliseconds relative to time origin
    pub start_time: f64,
    /// When the browser was able to begin processing the input
    pub processing_start: f64,
    /// When event processing finished
    #[serde(default)]
    pub processing_end: f64,
    /// Total duration of the entry in milliseconds
    #[serde(default)]
    pub duration: f64,
    /// Whether the input event was cancelable
    #[serde(default)]
    pub cancelable: bool,
}

fn default_entry_type() -> String {
    "first-input".to_string()
}

impl FirstInputEntry {
    /// The input delay this entry describes: `processing_start - start_time`
    pub fn delay(&self) -> f64 {
        self.processing_start - self.start_time
    }
}

/// Summary of a raw input event, as supplied by the legacy polyfill path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputEventSummary {
    /// Event type, e.g. "mousedown"
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event timestamp in milliseconds relative to time origin
    pub time_stamp: f64,
}

/// A first-input-delay metric measurement
///
/// Starts out empty and finalizes exactly once: `value` and `is_final` are
/// set together by whichever source (modern observer or legacy polyfill)
/// fires first. `entries` is append-only and may hold more than one record
/// if a buffered replay occurs before disconnect, but only the first entry
/// determines `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// The metric name ("FID")
    pub name: String,
    /// Delay in milliseconds; `None` until the metric finalizes
    pub value: Option<f64>,
    /// Change in value since the previous delivery
    pub delta: f64,
    /// Raw performance entries contributing to this metric
    pub entries: Vec<FirstInputEntry>,
    /// Process-unique identifier for this metric instance
    pub id: String,
    /// Whether a definitive value has been computed
    pub is_final: bool,
    /// Originating input event; only populated via the legacy polyfill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<InputEventSummary>,
}

impl Metric {
    /// Create an empty, not-yet-final metric record with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Metric {
            name: name.into(),
            value: None,
            delta: 0.0,
            entries: Vec::new(),
            id: generate_unique_id(),
            is_final: false,
            event: None,
        }
    }
}

/// Generate a process-unique metric id of the form `v1-<unix-millis>-<n>`
fn generate_unique_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "v1-{}-{}",
        Utc::now().timestamp_millis(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}
