//! Chromium-backed page host
//!
//! This module implements the [`PageHost`] capability contract over a live
//! Chromium page driven through the DevTools protocol.
//!
//! # How it works
//!
//! 1. A bridge script is injected with `Page.addScriptToEvaluateOnNewDocument`
//!    so it runs before any page script
//! 2. In-page, a `PerformanceObserver` watches `first-input` (buffered) and
//!    forwards each raw entry via `console.log()` with the prefix
//!    `__VITALS_EVENT__:`; a `visibilitychange` listener forwards the hidden
//!    transition the same way
//! 3. The host listens for `Runtime.consoleAPICalled` events, parses the
//!    prefixed JSON payloads, and routes them to the handlers the core
//!    reporter registered
//!
//! Entries arriving before a handler is registered are buffered and replayed
//! on registration; anything still buffered is returned by `take_records`.
//! A DevTools-driven Chromium always supports event timing, so `observe`
//! always returns a handle and no polyfill capability is exposed.

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};
use vitals_core::host::{EntryHandler, EntryType, HiddenHandler, ObserverHandle, PageHost};
use vitals_core::metric::FirstInputEntry;

/// Prefix marking console lines that carry bridge payloads
const EVENT_PREFIX: &str = "__VITALS_EVENT__:";

/// Events forwarded from the page through the console bridge
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum PageEvent {
    #[serde(rename_all = "camelCase")]
    Entry {
        entry_type: String,
        entry: FirstInputEntry,
    },
    Hidden,
}

#[derive(Default)]
struct HostState {
    handler: Option<EntryHandler>,
    buffered: Vec<FirstInputEntry>,
    hidden: Vec<(HiddenHandler, bool)>,
}

/// [`PageHost`] implementation bridging a Chromium page
pub struct ChromiumPageHost {
    state: Arc<Mutex<HostState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumPageHost {
    /// Attach to a page: inject the bridge script and start routing console
    /// events
    ///
    /// Must be called before navigating so that entries logged during page
    /// load are captured.
    ///
    /// # Errors
    ///
    /// Returns an error if script injection or the console-event
    /// subscription fails.
    #[instrument(skip(page))]
    pub async fn attach(page: &Page) -> Result<Arc<Self>> {
        debug!("Injecting first-input bridge script into page");
        let params = AddScriptToEvaluateOnNewDocumentParams::new(first_input_script());
        page.execute(params)
            .await
            .context("Failed to inject first-input bridge script")?;

        let mut events = page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .context("Failed to subscribe to console events")?;

        let state = Arc::new(Mutex::new(HostState::default()));
        let routed = Arc::clone(&state);
        let listener = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Some(payload) = console_payload(&event) {
                    route_console_payload(payload, &routed);
                }
            }
        });

        Ok(Arc::new(Self {
            state,
            listener: Mutex::new(Some(listener)),
        }))
    }

    /// Stop routing console events
    pub fn detach(&self) {
        let task = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
            debug!("Console bridge listener stopped");
        }
    }
}

impl Drop for ChromiumPageHost {
    fn drop(&mut self) {
        self.detach();
    }
}

impl PageHost for ChromiumPageHost {
    fn observe(
        &self,
        entry_type: EntryType,
        handler: EntryHandler,
    ) -> Option<Arc<dyn ObserverHandle>> {
        let replay = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.handler = Some(Arc::clone(&handler));
            std::mem::take(&mut state.buffered)
        };
        for entry in &replay {
            trace!("replaying buffered {} entry ({})", entry_type, entry.name);
            (*handler)(entry);
        }
        debug!("observing {} entries", entry_type);
        Some(Arc::new(ChromiumObserverHandle {
            state: Arc::clone(&self.state),
            connected: AtomicBool::new(true),
        }))
    }

    fn on_hidden(&self, handler: HiddenHandler, once: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .hidden
            .push((handler, once));
    }
}

struct ChromiumObserverHandle {
    state: Arc<Mutex<HostState>>,
    connected: AtomicBool,
}

impl ObserverHandle for ChromiumObserverHandle {
    fn take_records(&self) -> Vec<FirstInputEntry> {
        std::mem::take(
            &mut self
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .buffered,
        )
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handler = None;
            debug!("first-input observer disconnected");
        }
    }
}

/// Extract a bridge payload from a console event, if present
fn console_payload(event: &EventConsoleApiCalled) -> Option<&str> {
    let first_arg = event.args.first()?;
    let value = first_arg.value.as_ref()?;
    let message = value.as_str()?;
    message.strip_prefix(EVENT_PREFIX)
}

/// Route a bridge payload to the registered handlers
fn route_console_payload(payload: &str, state: &Mutex<HostState>) {
    match serde_json::from_str::<PageEvent>(payload) {
        Ok(PageEvent::Entry { entry_type, entry }) => {
            if entry_type != EntryType::FirstInput.as_str() {
                trace!("ignoring {} entry", entry_type);
                return;
            }
            let handler = {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                match &state.handler {
                    Some(handler) => Some(Arc::clone(handler)),
                    None => {
                        trace!("buffering first-input entry observed before registration");
                        state.buffered.push(entry.clone());
                        None
                    }
                }
            };
            if let Some(handler) = handler {
                trace!("dispatching first-input entry ({})", entry.name);
                (*handler)(&entry);
            }
        }
        Ok(PageEvent::Hidden) => {
            debug!("page became hidden");
            // Handlers are invoked outside the lock: the drain-then-release
            // path re-enters this state through the observer handle.
            let handlers = {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut state.hidden)
            };
            let mut kept = Vec::new();
            for (mut handler, once) in handlers {
                handler();
                if !once {
                    kept.push((handler, once));
                }
            }
            state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .hidden
                .extend(kept);
        }
        Err(error) => {
            warn!("Dropping malformed page event payload: {} ({})", payload, error);
        }
    }
}

/// The bridge JavaScript injected into every new document
fn first_input_script() -> String {
    r#"
(function() {
    'use strict';

    const EVENT_PREFIX = '__VITALS_EVENT__:';

    function send(payload) {
        console.log(EVENT_PREFIX + JSON.stringify(payload));
    }

    try {
        const po = new PerformanceObserver((list) => {
            for (const entry of list.getEntries()) {
                send({
                    kind: 'entry',
                    entryType: 'first-input',
                    entry: {
                        name: entry.name,
                        entryType: entry.entryType,
                        startTime: entry.startTime,
                        processingStart: entry.processingStart,
                        processingEnd: entry.processingEnd,
                        duration: entry.duration,
                        cancelable: !!entry.cancelable
                    }
                });
            }
        });
        po.observe({ type: 'first-input', buffered: true });
    } catch (e) {
        console.warn('first-input observer not supported:', e);
    }

    addEventListener('visibilitychange', () => {
        if (document.visibilityState === 'hidden') {
            send({ kind: 'hidden' });
        }
    }, true);
})();
"#
    .to_string()
}
