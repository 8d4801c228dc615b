use std::{cell::Cell, rc::Rc};

use crate::{subscription::Sinks, Period, Subscription};


/// Single source of truth for the active reporting period.
///
/// The only mutable root of the engine: everything else is derived from
/// the value held here plus external fetch results. Cloning the handle
/// shares the underlying state.
#[derive(Clone)]
pub struct PeriodSelector(Rc<SelectorNode>);

struct SelectorNode {
    value: Cell<Period>,
    sinks: Sinks<Period>,
}

impl PeriodSelector {
    pub fn new(initial: Period) -> Self {
        PeriodSelector(Rc::new(SelectorNode {
            value: Cell::new(initial),
            sinks: Sinks::new(),
        }))
    }

    /// The latest value, synchronously.
    pub fn current(&self) -> Period {
        self.0.value.get()
    }

    /// Replaces the active period and notifies every subscriber exactly
    /// once. Selecting the value already held emits nothing, so repeated
    /// clicks on the same month never cause a re-fetch storm.
    pub fn select(&self, period: Period) {
        if self.0.value.get() == period {
            tracing::trace!(%period, "selection unchanged, suppressed");
            return;
        }
        self.0.value.set(period);
        tracing::debug!(%period, "period selected");
        self.0.sinks.notify(&period);
    }

    /// Re-emits the current period, bypassing the equal-value
    /// suppression of [`select`](Self::select).
    ///
    /// This is the refresh entry point after a record mutation: the
    /// period did not change, but every derived collection must be
    /// fetched again. The re-fetch targets whatever period is held at
    /// call time; a later `select` supersedes it like any other switch.
    pub fn invalidate(&self) {
        let period = self.0.value.get();
        tracing::debug!(%period, "current period invalidated");
        self.0.sinks.notify(&period);
    }

    /// Observes period changes. `f` receives the current value
    /// immediately, then every subsequent change, until the returned
    /// handle is dropped.
    pub fn subscribe(&self, mut f: impl FnMut(Period) + 'static) -> Subscription {
        f(self.0.value.get());
        self.0.sinks.subscribe(move |period| f(*period))
    }
}

impl std::fmt::Debug for PeriodSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PeriodSelector").field(&self.current()).finish()
    }
}
