//! Delivery of finalized metrics to the caller
//!
//! [`bind_reporter`] wraps the user callback so that triggering it is always
//! safe: nothing is delivered before the metric has a value, non-final
//! values are held back unless all changes were requested, and an unchanged
//! value is never delivered twice. Each delivery carries the delta since the
//! previous one.

use crate::metric::Metric;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// Caller-supplied callback receiving finalized metric snapshots
pub type ReportHandler = Box<dyn FnMut(&Metric) + Send>;

/// Metric record shared between the reporter and its entry handlers
pub type SharedMetric = Arc<Mutex<Metric>>;

/// Bound reporter; cloneable, clones share delivery state
#[derive(Clone)]
pub struct Reporter {
    state: Arc<Mutex<State>>,
}

struct State {
    on_report: ReportHandler,
    metric: SharedMetric,
    prev_value: Option<f64>,
    report_all_changes: bool,
}

/// Bind a user callback to a metric record
///
/// The returned [`Reporter`] is triggered by entry handlers whenever the
/// metric may have changed. With `report_all_changes` set, values are
/// delivered before finalization as well; first-input delay finalizes on
/// its first trigger, so the flag only matters for incremental sources.
pub fn bind_reporter(
    on_report: ReportHandler,
    metric: SharedMetric,
    report_all_changes: bool,
) -> Reporter {
    Reporter {
        state: Arc::new(Mutex::new(State {
            on_report,
            metric,
            prev_value: None,
            report_all_changes,
        })),
    }
}

impl Reporter {
    /// Deliver the current metric value if delivery conditions are met
    pub fn trigger(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let State {
            on_report,
            metric,
            prev_value,
            report_all_changes,
        } = &mut *state;

        let snapshot = {
            let mut metric = metric.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(value) = metric.value else {
                trace!("report triggered without a value, skipping");
                return;
            };
            if !metric.is_final && !*report_all_changes {
                trace!("metric not final, holding back report");
                return;
            }
            let delta = value - prev_value.unwrap_or(0.0);
            if delta == 0.0 && prev_value.is_some() {
                trace!("value unchanged, suppressing duplicate report");
                return;
            }
            metric.delta = delta;
            *prev_value = Some(value);
            metric.clone()
        };

        debug!(
            "delivering {} report: value={:.1}ms delta={:.1}ms final={}",
            snapshot.name,
            snapshot.value.unwrap_or_default(),
            snapshot.delta,
            snapshot.is_final
        );
        (on_report)(&snapshot);
    }
}
