//! Host-agnostic First Input Delay (FID) measurement
//!
//! This crate implements the FID reporter: a thin adapter over a
//! host-provided performance-observation capability that computes the delay
//! of the first user input and delivers it to a caller callback exactly
//! once, no later than when the page becomes hidden.
//!
//! The page environment is injected through the [`host::PageHost`] trait
//! rather than looked up globally, so the reporter runs unchanged against a
//! real browser bridge or an in-process test double.
//!
//! # Example
//!
//! ```no_run
//! use vitals_core::observe_first_input_delay;
//! # use vitals_core::host::PageHost;
//!
//! # fn example(host: &dyn PageHost) {
//! observe_first_input_delay(host, Box::new(|metric| {
//!     if let Some(value) = metric.value {
//!         println!("FID: {:.1}ms (id: {})", value, metric.id);
//!     }
//! }));
//! # }
//! ```

pub mod fid;
pub mod host;
pub mod metric;
pub mod reporter;

// Re-export main types for convenience
pub use fid::observe_first_input_delay;
pub use host::{EntryType, FirstInputPolyfill, ObserverHandle, PageHost};
pub use metric::{FirstInputEntry, InputEventSummary, Metric, FIRST_INPUT_DELAY};
pub use reporter::{bind_reporter, ReportHandler, Reporter};
