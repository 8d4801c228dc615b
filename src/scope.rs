use std::cell::{Cell, RefCell};

use crate::{
    Dashboard, DashboardView, DerivedStream, Period, PeriodSelector, Snapshot, Subscription,
};


/// Owns every subscription a mounted view holds and releases them
/// together.
///
/// Dropping the scope releases everything as well, so teardown is
/// guaranteed on all exit paths, not tied to any rendering framework's
/// lifecycle hook. Disposal only removes this view's registrations; the
/// shared streams and dashboard keep serving other views.
#[derive(Default)]
pub struct ViewScope {
    subscriptions: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

impl ViewScope {
    pub fn new() -> Self {
        ViewScope::default()
    }

    /// Keeps `subscription` until the scope is disposed. A subscription
    /// added after disposal is released immediately.
    pub fn add(&self, subscription: Subscription) {
        if self.disposed.get() {
            drop(subscription);
            return;
        }
        self.subscriptions.borrow_mut().push(subscription);
    }

    pub fn watch<T: 'static>(
        &self,
        stream: &DerivedStream<T>,
        f: impl FnMut(&Snapshot<T>) + 'static,
    ) {
        if self.disposed.get() {
            return;
        }
        self.add(stream.subscribe(f));
    }

    pub fn watch_selector(&self, selector: &PeriodSelector, f: impl FnMut(Period) + 'static) {
        if self.disposed.get() {
            return;
        }
        self.add(selector.subscribe(f));
    }

    pub fn watch_dashboard(&self, dashboard: &Dashboard, f: impl FnMut(&DashboardView) + 'static) {
        if self.disposed.get() {
            return;
        }
        self.add(dashboard.subscribe(f));
    }

    /// Releases every subscription held by this scope. Harmless to call
    /// more than once.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.subscriptions.borrow_mut().clear();
    }
}
