//! Chromium-backed First Input Delay collection
//!
//! This crate hosts the `vitals-core` reporter against a real Chromium page
//! driven via chromiumoxide:
//!
//! - **Console bridge**: an injected script observes `first-input` in-page
//!   and forwards raw entries through prefixed `console.log` payloads
//! - **Page host**: [`page_host::ChromiumPageHost`] implements the core's
//!   capability contracts on top of that bridge
//! - **Collector**: [`collector::FidCollector`] attaches the reporter and
//!   exposes timeout-based async waiting
//! - **Configuration**: TOML-based settings and an optional pass/fail
//!   threshold
//!
//! # Example
//!
//! ```no_run
//! use vitals_harness::{collector::FidCollector, Config};
//! # use chromiumoxide::Page;
//!
//! # async fn example(page: &Page) -> anyhow::Result<()> {
//! let config = Config::from_file("vitals.toml")?;
//! let collector = FidCollector::with_config(config.collector.clone());
//!
//! let fid = collector.attach(page).await?;
//! page.goto("https://example.com").await?;
//!
//! let metric = fid.wait().await?;
//! for failure in config.check(&metric) {
//!     eprintln!("{}", failure);
//! }
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod page_host;

// Re-export main types for convenience
pub use collector::{FidCollector, FidHandle};
pub use config::{CollectorConfig, Config, ConfigError, ThresholdsConfig};
pub use page_host::ChromiumPageHost;
