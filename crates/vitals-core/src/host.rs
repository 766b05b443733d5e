//! Capability contracts for the page environment
//!
//! The reporter never touches a global environment: everything it needs from
//! the page (performance-entry observation, visibility-change notification,
//! and the optional legacy first-input polyfill) is injected through the
//! [`PageHost`] trait. A production host bridges these calls to a real
//! browser; tests drive them directly.

use crate::metric::{FirstInputEntry, InputEventSummary};
use std::fmt;
use std::sync::Arc;

/// Performance-entry types a host can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// The first qualifying user input on a page; fires at most once
    FirstInput,
}

impl EntryType {
    /// The wire name of this entry type
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::FirstInput => "first-input",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler invoked for each observed performance entry
pub type EntryHandler = Arc<dyn Fn(&FirstInputEntry) + Send + Sync>;

/// Handler invoked when the page transitions to hidden
pub type HiddenHandler = Box<dyn FnMut() + Send>;

/// Handler invoked by the legacy polyfill with a precomputed delay
pub type PolyfillHandler = Box<dyn FnOnce(f64, InputEventSummary) + Send>;

/// A live observer subscription
///
/// Supports an explicit two-step release: drain any records that were
/// observed but not yet delivered, then disconnect.
pub trait ObserverHandle: Send + Sync {
    /// Drain records observed but not yet delivered to the handler
    fn take_records(&self) -> Vec<FirstInputEntry>;

    /// Release the subscription; a second call is a no-op
    fn disconnect(&self);
}

/// Legacy callback-based first-input-delay capability
///
/// Only consulted when modern observation is unavailable.
pub trait FirstInputPolyfill: Send + Sync {
    /// Register a one-shot callback receiving `(delay_ms, event)`
    fn on_first_input_delay(&self, handler: PolyfillHandler);
}

/// The page environment the reporter runs against
pub trait PageHost: Send + Sync {
    /// Subscribe to an entry type, delivering matching entries to `handler`
    ///
    /// Returns `None` if the host cannot observe this entry type. Entries
    /// recorded before registration are replayed through the handler
    /// (buffered observation).
    fn observe(
        &self,
        entry_type: EntryType,
        handler: EntryHandler,
    ) -> Option<Arc<dyn ObserverHandle>>;

    /// Invoke `handler` when the page becomes hidden
    ///
    /// With `once` set, the registration is dropped after the first call.
    fn on_hidden(&self, handler: HiddenHandler, once: bool);

    /// The legacy first-input polyfill, if this host carries one
    fn first_input_polyfill(&self) -> Option<Arc<dyn FirstInputPolyfill>> {
        None
    }
}
