use std::{cell::RefCell, rc::Rc};

use futures::{channel::oneshot, FutureExt};

use crate::{FetchError, FetchFn, Period};

pub fn period(s: &str) -> Period {
    s.parse().unwrap()
}

/// Hands out fetch futures whose completion the test controls.
pub struct FetchController<T>(Pending<T>);

type Pending<T> = Rc<RefCell<Vec<(Period, oneshot::Sender<Result<Vec<T>, FetchError>>)>>>;

impl<T: 'static> FetchController<T> {
    pub fn new() -> (FetchFn<T>, Self) {
        let pending: Pending<T> = Rc::new(RefCell::new(Vec::new()));
        let fetch: FetchFn<T> = {
            let pending = pending.clone();
            Box::new(move |period| {
                let (tx, rx) = oneshot::channel();
                pending.borrow_mut().push((period, tx));
                async move {
                    rx.await
                        .unwrap_or_else(|_| Err(FetchError::new("fetch aborted")))
                }
                .boxed_local()
            })
        };
        (fetch, FetchController(pending))
    }

    /// Number of fetches issued and not yet resolved.
    pub fn pending(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn pending_period(&self, index: usize) -> Period {
        self.0.borrow()[index].0
    }

    /// Completes the pending fetch at `index`; later entries shift down.
    pub fn resolve(&self, index: usize, result: Result<Vec<T>, FetchError>) {
        let (_, tx) = self.0.borrow_mut().remove(index);
        let _ = tx.send(result);
    }
}
