//! FID collection against a live page
//!
//! [`FidCollector`] wires the core reporter to a [`ChromiumPageHost`] and
//! exposes the delivered report through an async, timeout-based API.
//!
//! # Example
//!
//! ```no_run
//! use vitals_harness::collector::FidCollector;
//! use chromiumoxide::Page;
//! use std::time::Duration;
//!
//! async fn example(page: &Page) -> anyhow::Result<()> {
//!     let collector = FidCollector::new();
//!     // Attach BEFORE navigating so load-time entries are captured.
//!     let fid = collector.attach(page).await?;
//!
//!     page.goto("https://example.com").await?;
//!     // ...interact with the page...
//!
//!     let metric = fid.wait_for_fid(Duration::from_secs(30)).await?;
//!     println!("FID: {:.1}ms (id: {})", metric.value.unwrap_or_default(), metric.id);
//!     Ok(())
//! }
//! ```

use crate::config::CollectorConfig;
use crate::page_host::ChromiumPageHost;
use anyhow::Result;
use chromiumoxide::Page;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, instrument};
use vitals_core::{observe_first_input_delay, Metric};

/// First Input Delay collector
#[derive(Debug, Clone, Default)]
pub struct FidCollector {
    config: CollectorConfig,
}

impl FidCollector {
    /// Create a collector with default settings
    pub fn new() -> Self {
        Self {
            config: CollectorConfig::default(),
        }
    }

    /// Create a collector with explicit settings
    pub fn with_config(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// Attach to a page and start observing for the first input
    ///
    /// Must be called before navigating so the bridge script is installed in
    /// time.
    ///
    /// # Errors
    ///
    /// Returns an error if the page host cannot be attached.
    #[instrument(skip(self, page))]
    pub async fn attach(&self, page: &Page) -> Result<FidHandle> {
        let host = ChromiumPageHost::attach(page).await?;

        let report: Arc<Mutex<Option<Metric>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&report);
        observe_first_input_delay(
            host.as_ref(),
            Box::new(move |metric| {
                *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(metric.clone());
            }),
        );

        Ok(FidHandle {
            report,
            host,
            wait_timeout: self.config.wait_timeout(),
        })
    }
}

/// Handle to a running FID collection
pub struct FidHandle {
    report: Arc<Mutex<Option<Metric>>>,
    host: Arc<ChromiumPageHost>,
    wait_timeout: Duration,
}

impl FidHandle {
    /// The delivered report, if the metric has finalized
    pub fn latest(&self) -> Option<Metric> {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the FID report using the configured timeout
    pub async fn wait(&self) -> Result<Metric> {
        self.wait_for_fid(self.wait_timeout).await
    }

    /// Wait for the FID report
    ///
    /// # Errors
    ///
    /// Returns an error if no first input is reported within
    /// `timeout_duration`.
    #[instrument(skip(self))]
    pub async fn wait_for_fid(&self, timeout_duration: Duration) -> Result<Metric> {
        debug!("Waiting for FID report (timeout: {:?})", timeout_duration);

        let waited = timeout(timeout_duration, async {
            loop {
                if let Some(metric) = self.latest() {
                    return metric;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        match waited {
            Ok(metric) => {
                debug!(
                    "Captured FID: {:.1}ms",
                    metric.value.unwrap_or_default()
                );
                Ok(metric)
            }
            Err(_) => {
                error!("Timeout waiting for FID after {:?}", timeout_duration);
                anyhow::bail!(
                    "Timeout waiting for FID metric after {:?}",
                    timeout_duration
                )
            }
        }
    }

    /// Stop the console bridge listener
    pub fn detach(&self) {
        self.host.detach();
    }
}
