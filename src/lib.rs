//! Reactive synchronization core for a period-driven finance dashboard.
//!
//! One [`PeriodSelector`] holds the active reporting month. Each
//! [`DerivedStream`] re-fetches its collection whenever the selection
//! changes and multicasts the newest snapshot to any number of observers.
//! A [`Dashboard`] combines the collection streams into a renderable
//! view-model, and a [`ViewScope`] ties a view's subscriptions to its
//! lifetime.

mod dashboard;
mod fetch;
mod period;
mod records;
mod scope;
mod selector;
mod stream;
mod subscription;

#[cfg(test)]
mod test_helpers;

pub use dashboard::*;
pub use fetch::*;
pub use period::*;
pub use records::*;
pub use scope::*;
pub use selector::*;
pub use stream::*;
pub use subscription::*;
