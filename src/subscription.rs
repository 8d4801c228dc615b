use std::{
    cell::{Cell, RefCell},
    mem::take,
    rc::Rc,
};

use slabmap::SlabMap;


/// Owns one observer registration. Dropping the handle is the only way to
/// stop deliveries and release what the registration kept alive.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
}

/// Multicast observer registry embedded in every engine node.
///
/// Entries are cloned out of the slab before a delivery burst and carry an
/// active flag, so observers may unsubscribe or attach while a burst is in
/// progress without invalidating the iteration.
pub(crate) struct Sinks<T>(Rc<RefCell<SlabMap<Rc<SinkEntry<T>>>>>);

struct SinkEntry<T> {
    active: Cell<bool>,
    deliver: RefCell<Box<dyn FnMut(&T)>>,
}

impl<T: 'static> Sinks<T> {
    pub fn new() -> Self {
        Sinks(Rc::new(RefCell::new(SlabMap::new())))
    }

    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let entry = Rc::new(SinkEntry {
            active: Cell::new(true),
            deliver: RefCell::new(Box::new(f)),
        });
        let key = self.0.borrow_mut().insert(entry.clone());
        let slab = Rc::downgrade(&self.0);
        Subscription::from_fn(move || {
            entry.active.set(false);
            if let Some(slab) = slab.upgrade() {
                slab.borrow_mut().remove(key);
            }
        })
    }

    pub fn notify(&self, value: &T) {
        let entries: Vec<_> = self.0.borrow().values().cloned().collect();
        for entry in entries {
            if entry.active.get() {
                (entry.deliver.borrow_mut())(value);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}
