//! First Input Delay (FID) reporting
//!
//! FID is the time between a user's first interaction with a page and the
//! moment the browser is able to begin processing it. The reporter
//! subscribes to first-input observation on the injected [`PageHost`],
//! computes `processing_start - start_time` for the first qualifying entry,
//! and delivers the finalized metric to the caller exactly once, no later
//! than when the page becomes hidden.
//!
//! Capability selection is a runtime branch: when modern observation is
//! unavailable the reporter falls back to the host's legacy polyfill, and
//! when neither source exists the metric simply never reports.

use crate::host::{EntryHandler, EntryType, PageHost};
use crate::metric::{FirstInputEntry, Metric, FIRST_INPUT_DELAY};
use crate::reporter::{bind_reporter, ReportHandler};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// Arrange for `on_report` to be invoked once with the finalized FID metric
///
/// The callback fires as soon as the first qualifying input is observed, or
/// on the hidden transition if a record was still buffered at that point.
/// If the host supports neither modern observation nor the legacy polyfill,
/// the callback is never invoked.
pub fn observe_first_input_delay(host: &dyn PageHost, on_report: ReportHandler) {
    let metric = Arc::new(Mutex::new(Metric::new(FIRST_INPUT_DELAY)));
    let reporter = bind_reporter(on_report, Arc::clone(&metric), false);

    let entry_handler: EntryHandler = {
        let metric = Arc::clone(&metric);
        let reporter = reporter.clone();
        Arc::new(move |entry: &FirstInputEntry| {
            {
                let mut metric = metric.lock().unwrap_or_else(PoisonError::into_inner);
                if !metric.is_final {
                    metric.value = Some(entry.delay());
                    metric.is_final = true;
                    debug!(
                        "first input delay finalized: {:.1}ms ({})",
                        entry.delay(),
                        entry.name
                    );
                } else {
                    // Replayed records are kept but never recompute the value.
                    trace!("appending non-first {} entry ({})", entry.entry_type, entry.name);
                }
                metric.entries.push(entry.clone());
            }
            reporter.trigger();
        })
    };

    let subscription = host.observe(EntryType::FirstInput, Arc::clone(&entry_handler));

    {
        let subscription = subscription.clone();
        let entry_handler = Arc::clone(&entry_handler);
        host.on_hidden(
            Box::new(move || {
                if let Some(handle) = &subscription {
                    // Drain, then release: records observed before the hidden
                    // transition must not be lost.
                    for record in handle.take_records() {
                        (*entry_handler)(&record);
                    }
                    handle.disconnect();
                }
            }),
            true,
        );
    }

    if subscription.is_none() {
        match host.first_input_polyfill() {
            Some(polyfill) => {
                debug!("first-input observation unsupported, using legacy polyfill");
                let metric = Arc::clone(&metric);
                let reporter = reporter.clone();
                polyfill.on_first_input_delay(Box::new(move |value, event| {
                    {
                        let mut metric = metric.lock().unwrap_or_else(PoisonError::into_inner);
                        if !metric.is_final {
                            metric.value = Some(value);
                            metric.event = Some(event);
                            metric.is_final = true;
                            debug!("first input delay finalized via polyfill: {:.1}ms", value);
                        }
                    }
                    reporter.trigger();
                }));
            }
            None => {
                debug!("no first-input source available, metric will not report");
            }
        }
    }
}
