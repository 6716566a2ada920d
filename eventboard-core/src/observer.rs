//! Active-section tracking for scroll-synced calendars.
//!
//! The observer does not know how visibility is measured. A
//! [`VisibilitySource`] reports intersection ratios per section id through
//! callbacks, and hands back an [`Unsubscribe`] handle for each
//! registration. The observer releases every handle on teardown.
//!
//! State machine:
//!
//! ```text
//! Idle --observe--> Observing --callback--> ActiveSectionChanged --> Observing
//!   any state --dispose--> Disposed
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Called with a section's current intersection ratio (0.0 to 1.0)
pub type VisibilityCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Called with `(previous, current)` whenever the active section changes
pub type ActiveSectionCallback = Box<dyn FnMut(Option<&str>, &str) + Send>;

/// Handle that cancels one registration.
pub struct Unsubscribe(Option<Box<dyn FnOnce() + Send>>);

impl Unsubscribe {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Unsubscribe(Some(Box::new(cancel)))
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.0.take() {
            cancel();
        }
    }
}

/// Anything that can report section visibility.
pub trait VisibilitySource {
    fn register(&self, section_id: &str, on_change: VisibilityCallback) -> Unsubscribe;
}

/// Visibility thresholds with hysteresis.
///
/// A section becomes visible once its ratio reaches `enter` and stays
/// visible until it drops below `exit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    enter: f64,
    exit: f64,
}

impl ThresholdBand {
    /// Ratios are clamped to `0.0..=1.0` and `exit` never exceeds `enter`.
    pub fn new(enter: f64, exit: f64) -> Self {
        let enter = clamp_ratio(enter);
        let exit = clamp_ratio(exit).min(enter);
        ThresholdBand { enter, exit }
    }

    pub fn single(threshold: f64) -> Self {
        ThresholdBand::new(threshold, threshold)
    }

    pub fn enter(&self) -> f64 {
        self.enter
    }

    pub fn exit(&self) -> f64 {
        self.exit
    }
}

impl Default for ThresholdBand {
    fn default() -> Self {
        ThresholdBand::new(0.5, 0.2)
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Idle,
    Observing,
    ActiveSectionChanged,
    Disposed,
}

struct Section {
    id: String,
    visible: bool,
}

struct Inner {
    state: ObserverState,
    band: ThresholdBand,
    sections: Vec<Section>,
    active: Option<usize>,
    /// Last section handed to the listener
    notified: Option<usize>,
    /// Set while some thread is delivering changes to the listener
    notifying: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    listener: Mutex<ActiveSectionCallback>,
}

impl Shared {
    fn on_visibility(&self, index: usize, ratio: f64) {
        let mut inner = self.inner.lock();
        if matches!(inner.state, ObserverState::Idle | ObserverState::Disposed) {
            return;
        }

        let band = inner.band;
        let section = &mut inner.sections[index];
        if !section.visible && ratio >= band.enter() {
            section.visible = true;
        } else if section.visible && ratio < band.exit() {
            section.visible = false;
        }

        // First visible section in list order wins; with none visible the
        // previous active section is kept.
        inner.active = inner.sections.iter().position(|s| s.visible).or(inner.active);

        // Reports arriving while the listener runs, from inside it or from
        // another thread, are picked up by the delivery loop below.
        if inner.notifying {
            return;
        }
        inner.notifying = true;

        while inner.state != ObserverState::Disposed && inner.active != inner.notified {
            let Some(current) = inner.active else {
                break;
            };
            let previous = inner.notified.map(|i| inner.sections[i].id.clone());
            let current_id = inner.sections[current].id.clone();
            inner.notified = Some(current);
            inner.state = ObserverState::ActiveSectionChanged;
            drop(inner);

            debug!(previous = ?previous, current = %current_id, "active section changed");
            {
                let mut listener = self.listener.lock();
                (*listener)(previous.as_deref(), &current_id);
            }

            inner = self.inner.lock();
        }

        inner.notifying = false;
        if inner.state == ObserverState::ActiveSectionChanged {
            inner.state = ObserverState::Observing;
        }
    }
}

/// Tracks which of a list of sections is active.
pub struct SectionObserver {
    shared: Arc<Shared>,
    subscriptions: Vec<Unsubscribe>,
}

impl SectionObserver {
    pub fn new<I, S>(
        section_ids: I,
        band: ThresholdBand,
        on_change: impl FnMut(Option<&str>, &str) + Send + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections = section_ids
            .into_iter()
            .map(|id| Section {
                id: id.into(),
                visible: false,
            })
            .collect();

        SectionObserver {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ObserverState::Idle,
                    band,
                    sections,
                    active: None,
                    notified: None,
                    notifying: false,
                }),
                listener: Mutex::new(Box::new(on_change)),
            }),
            subscriptions: Vec::new(),
        }
    }

    /// Register every section with `source`. Only valid from `Idle`.
    pub fn observe(&mut self, source: &dyn VisibilitySource) {
        let ids: Vec<String> = {
            let mut inner = self.shared.inner.lock();
            if inner.state != ObserverState::Idle {
                return;
            }
            inner.state = ObserverState::Observing;
            inner.sections.iter().map(|s| s.id.clone()).collect()
        };

        for (index, id) in ids.iter().enumerate() {
            // Callbacks hold a weak reference so a leaked registration in the
            // source cannot keep the observer alive.
            let weak = Arc::downgrade(&self.shared);
            let callback: VisibilityCallback = Arc::new(move |ratio| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_visibility(index, ratio);
                }
            });
            self.subscriptions.push(source.register(id, callback));
        }

        debug!(sections = ids.len(), "observing sections");
    }

    pub fn state(&self) -> ObserverState {
        self.shared.inner.lock().state
    }

    pub fn active_section(&self) -> Option<String> {
        let inner = self.shared.inner.lock();
        inner.active.map(|i| inner.sections[i].id.clone())
    }

    /// Unregister everything. Later visibility reports are ignored.
    pub fn dispose(&mut self) {
        {
            let mut inner = self.shared.inner.lock();
            if inner.state == ObserverState::Disposed {
                return;
            }
            inner.state = ObserverState::Disposed;
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl Drop for SectionObserver {
    fn drop(&mut self) {
        self.dispose();
    }
}

type Subscriber = (u64, String, VisibilityCallback);

/// In-process visibility source driven by explicit `report` calls.
///
/// Hosts that already receive intersection events from elsewhere (a
/// renderer, a terminal viewport) forward them here.
#[derive(Clone, Default)]
pub struct ManualVisibility {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

impl ManualVisibility {
    pub fn new() -> Self {
        ManualVisibility::default()
    }

    /// Deliver a ratio to every callback registered for `section_id`.
    pub fn report(&self, section_id: &str, ratio: f64) {
        let callbacks: Vec<VisibilityCallback> = self
            .subscribers
            .lock()
            .iter()
            .filter(|(_, id, _)| id == section_id)
            .map(|(_, _, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(ratio);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl VisibilitySource for ManualVisibility {
    fn register(&self, section_id: &str, on_change: VisibilityCallback) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .push((id, section_id.to_string(), on_change));

        let subscribers = Arc::clone(&self.subscribers);
        Unsubscribe::new(move || {
            subscribers.lock().retain(|(sub_id, _, _)| *sub_id != id);
        })
    }
}
