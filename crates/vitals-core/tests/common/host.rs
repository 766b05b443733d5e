//! Simulated page environment for driving the reporter without a browser

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vitals_core::host::{
    EntryHandler, EntryType, FirstInputPolyfill, HiddenHandler, ObserverHandle, PageHost,
    PolyfillHandler,
};
use vitals_core::metric::{FirstInputEntry, InputEventSummary};

#[derive(Default)]
struct SimState {
    handler: Option<EntryHandler>,
    buffered: Vec<FirstInputEntry>,
    hidden: Vec<(HiddenHandler, bool)>,
}

/// Scriptable [`PageHost`]: tests emit entries, buffer records, and drive
/// the hidden transition explicitly.
pub struct SimulatedPage {
    supports_first_input: bool,
    state: Arc<Mutex<SimState>>,
    disconnects: Arc<AtomicUsize>,
    polyfill: Option<Arc<SimulatedPolyfill>>,
}

impl SimulatedPage {
    pub fn new(supports_first_input: bool) -> Self {
        SimulatedPage {
            supports_first_input,
            state: Arc::new(Mutex::new(SimState::default())),
            disconnects: Arc::new(AtomicUsize::new(0)),
            polyfill: None,
        }
    }

    pub fn with_polyfill(mut self, polyfill: Arc<SimulatedPolyfill>) -> Self {
        self.polyfill = Some(polyfill);
        self
    }

    /// Deliver an entry through the registered observer handler
    pub fn emit_first_input(&self, entry: FirstInputEntry) {
        let handler = self.state.lock().unwrap().handler.clone();
        if let Some(handler) = handler {
            (*handler)(&entry);
        }
    }

    /// Record an entry as observed but not yet delivered to the handler
    pub fn buffer_first_input(&self, entry: FirstInputEntry) {
        self.state.lock().unwrap().buffered.push(entry);
    }

    /// Transition the page to hidden, firing registered handlers
    pub fn set_hidden(&self) {
        let handlers = std::mem::take(&mut self.state.lock().unwrap().hidden);
        let mut kept = Vec::new();
        for (mut handler, once) in handlers {
            handler();
            if !once {
                kept.push((handler, once));
            }
        }
        self.state.lock().unwrap().hidden.extend(kept);
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl PageHost for SimulatedPage {
    fn observe(
        &self,
        _entry_type: EntryType,
        handler: EntryHandler,
    ) -> Option<Arc<dyn ObserverHandle>> {
        if !self.supports_first_input {
            return None;
        }
        self.state.lock().unwrap().handler = Some(handler);
        Some(Arc::new(SimObserverHandle {
            state: Arc::clone(&self.state),
            connected: AtomicBool::new(true),
            disconnects: Arc::clone(&self.disconnects),
        }))
    }

    fn on_hidden(&self, handler: HiddenHandler, once: bool) {
        self.state.lock().unwrap().hidden.push((handler, once));
    }

    fn first_input_polyfill(&self) -> Option<Arc<dyn FirstInputPolyfill>> {
        self.polyfill
            .clone()
            .map(|polyfill| polyfill as Arc<dyn FirstInputPolyfill>)
    }
}

struct SimObserverHandle {
    state: Arc<Mutex<SimState>>,
    connected: AtomicBool,
    disconnects: Arc<AtomicUsize>,
}

impl ObserverHandle for SimObserverHandle {
    fn take_records(&self) -> Vec<FirstInputEntry> {
        std::mem::take(&mut self.state.lock().unwrap().buffered)
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.state.lock().unwrap().handler = None;
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Scriptable legacy polyfill capability
#[derive(Default)]
pub struct SimulatedPolyfill {
    callback: Mutex<Option<PolyfillHandler>>,
}

impl SimulatedPolyfill {
    pub fn new() -> Arc<Self> {
        Arc::new(SimulatedPolyfill::default())
    }

    /// Fire the registered callback with a precomputed delay
    pub fn fire(&self, value: f64, event: InputEventSummary) {
        if let Some(callback) = self.callback.lock().unwrap().take() {
            callback(value, event);
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }
}

impl FirstInputPolyfill for SimulatedPolyfill {
    fn on_first_input_delay(&self, handler: PolyfillHandler) {
        *self.callback.lock().unwrap() = Some(handler);
    }
}
