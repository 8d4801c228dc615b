use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_ex::derive_ex;

use crate::{
    subscription::Sinks, CollectionKind, FetchError, FetchFailure, FetchFn, Period,
    PeriodSelector, Spawner, Subscription,
};


/// Re-fetches one data collection whenever the active period changes and
/// multicasts the newest result to any number of observers.
///
/// Exactly one fetch is issued per period emission, no matter how many
/// observers are attached. Each issued fetch carries an epoch; a
/// completion whose epoch is no longer current belongs to a superseded
/// period and is discarded, so a slow fetch for an old period can never
/// overwrite a faster fetch for the current one.
#[derive_ex(Clone, bound())]
pub struct DerivedStream<T: 'static>(Rc<StreamNode<T>>);

/// Most recent fetch outcome of one collection, tagged with the period
/// the fetch was issued for.
#[derive(Debug)]
#[derive_ex(Clone, bound())]
pub struct Snapshot<T: 'static> {
    pub period: Period,
    pub outcome: Result<Rc<Vec<T>>, FetchFailure>,
}

impl<T> Snapshot<T> {
    /// Rows to render; empty when the fetch failed.
    pub fn rows(&self) -> &[T] {
        match &self.outcome {
            Ok(rows) => rows,
            Err(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome.is_err()
    }
}

struct StreamNode<T: 'static> {
    collection: CollectionKind,
    fetch: FetchFn<T>,
    spawner: Spawner,
    epoch: Cell<u64>,
    snapshot: RefCell<Option<Snapshot<T>>>,
    sinks: Sinks<Snapshot<T>>,
    _selector: RefCell<Subscription>,
}

impl<T: 'static> DerivedStream<T> {
    /// Creates the stream and immediately issues a fetch for the
    /// selector's current period.
    pub fn new(
        collection: CollectionKind,
        selector: &PeriodSelector,
        spawner: Spawner,
        fetch: FetchFn<T>,
    ) -> Self {
        let node = Rc::new(StreamNode {
            collection,
            fetch,
            spawner,
            epoch: Cell::new(0),
            snapshot: RefCell::new(None),
            sinks: Sinks::new(),
            _selector: RefCell::new(Subscription::empty()),
        });
        let weak = Rc::downgrade(&node);
        let sub = selector.subscribe(move |period| {
            if let Some(node) = weak.upgrade() {
                node.issue(period);
            }
        });
        *node._selector.borrow_mut() = sub;
        DerivedStream(node)
    }

    pub fn collection(&self) -> CollectionKind {
        self.0.collection
    }

    /// Latest snapshot, if any fetch has completed.
    pub fn latest(&self) -> Option<Snapshot<T>> {
        self.0.snapshot.borrow().clone()
    }

    /// Observes snapshots. The cached snapshot, when present, is
    /// delivered immediately without triggering a fetch; subsequent
    /// snapshots follow until the returned handle is dropped.
    pub fn subscribe(&self, mut f: impl FnMut(&Snapshot<T>) + 'static) -> Subscription {
        if let Some(snapshot) = self.latest() {
            f(&snapshot);
        }
        self.0.sinks.subscribe(f)
    }
}

impl<T: 'static> StreamNode<T> {
    fn issue(self: &Rc<Self>, period: Period) {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        tracing::debug!(collection = %self.collection, %period, "fetch issued");
        let fut = (self.fetch)(period);
        let weak = Rc::downgrade(self);
        self.spawner.spawn(async move {
            let result = fut.await;
            if let Some(node) = weak.upgrade() {
                node.complete(epoch, period, result);
            }
        });
    }

    fn complete(&self, epoch: u64, period: Period, result: Result<Vec<T>, FetchError>) {
        if epoch != self.epoch.get() {
            tracing::debug!(collection = %self.collection, %period, "stale fetch discarded");
            return;
        }
        let outcome = match result {
            Ok(rows) => Ok(Rc::new(rows)),
            Err(source) => {
                tracing::warn!(collection = %self.collection, %period, error = %source, "fetch failed");
                Err(FetchFailure {
                    collection: self.collection,
                    period,
                    source,
                })
            }
        };
        let snapshot = Snapshot { period, outcome };
        *self.snapshot.borrow_mut() = Some(snapshot.clone());
        self.sinks.notify(&snapshot);
    }
}
