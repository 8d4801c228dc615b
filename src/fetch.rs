use std::{future::Future, rc::Rc};

use futures::{
    future::LocalBoxFuture,
    task::{LocalSpawn, LocalSpawnExt},
};
use thiserror::Error;

use crate::{CollectionKind, Period};

/// Read issued against the data-access layer for one collection and
/// period.
///
/// Fetches must be idempotent and report failures as values rather than
/// panicking on the event loop.
pub type FetchFn<T> =
    Box<dyn Fn(Period) -> LocalBoxFuture<'static, Result<Vec<T>, FetchError>>>;

/// Cause reported by a failed data-access fetch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(Rc<str>);

impl FetchError {
    pub fn new(message: impl Into<Rc<str>>) -> Self {
        FetchError(message.into())
    }
}

/// A [`FetchError`] tagged with the collection and period the fetch was
/// issued for.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("fetch of {collection} for {period} failed: {source}")]
pub struct FetchFailure {
    pub collection: CollectionKind,
    pub period: Period,
    pub source: FetchError,
}

/// Runs fetch futures on the application's single-threaded event loop.
#[derive(Clone)]
pub struct Spawner(Rc<dyn LocalSpawn>);

impl Spawner {
    pub fn new(spawn: impl LocalSpawn + 'static) -> Self {
        Spawner(Rc::new(spawn))
    }

    pub(crate) fn spawn(&self, fut: impl Future<Output = ()> + 'static) {
        if self.0.spawn_local(fut).is_err() {
            tracing::warn!("executor is shut down, task dropped");
        }
    }
}
