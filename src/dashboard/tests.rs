use assert_call::{call, CallRecorder};
use futures::executor::LocalPool;

use crate::{
    test_helpers::{period, FetchController},
    CollectionKind, Dashboard, DerivedStream, Entry, FetchError, PeriodSelector, Receivable,
    SourceState, Spawner, UpcomingPayment,
};

struct Harness {
    pool: LocalPool,
    selector: PeriodSelector,
    dashboard: Dashboard,
    receivables: FetchController<Receivable>,
    expenses: FetchController<Entry>,
    incomes: FetchController<Entry>,
    upcoming: FetchController<UpcomingPayment>,
    _streams: (
        DerivedStream<Receivable>,
        DerivedStream<Entry>,
        DerivedStream<Entry>,
        DerivedStream<UpcomingPayment>,
    ),
}

fn harness(initial: &str) -> Harness {
    let pool = LocalPool::new();
    let spawner = Spawner::new(pool.spawner());
    let selector = PeriodSelector::new(period(initial));
    let (fetch, receivables) = FetchController::new();
    let receivable_stream =
        DerivedStream::new(CollectionKind::Receivables, &selector, spawner.clone(), fetch);
    let (fetch, expenses) = FetchController::new();
    let expense_stream =
        DerivedStream::new(CollectionKind::Expenses, &selector, spawner.clone(), fetch);
    let (fetch, incomes) = FetchController::new();
    let income_stream =
        DerivedStream::new(CollectionKind::Incomes, &selector, spawner.clone(), fetch);
    let (fetch, upcoming) = FetchController::new();
    let upcoming_stream =
        DerivedStream::new(CollectionKind::UpcomingPayments, &selector, spawner, fetch);
    let dashboard = Dashboard::new(
        &selector,
        &receivable_stream,
        &expense_stream,
        &income_stream,
        &upcoming_stream,
    );
    Harness {
        pool,
        selector,
        dashboard,
        receivables,
        expenses,
        incomes,
        upcoming,
        _streams: (
            receivable_stream,
            expense_stream,
            income_stream,
            upcoming_stream,
        ),
    }
}

#[test]
fn withholds_output_until_every_input_has_emitted() {
    let mut h = harness("2026-02");
    let mut cr = CallRecorder::new();
    let _s = h.dashboard.subscribe(|v| call!("{}", v.period));

    h.receivables.resolve(0, Ok(vec![]));
    h.expenses.resolve(0, Ok(vec![]));
    h.incomes.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();
    cr.verify(());
    assert!(h.dashboard.latest().is_none());

    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();
    cr.verify("2026-02");
}

#[test]
fn totals_reflect_the_fetched_collections() {
    let mut h = harness("2026-02");
    h.receivables
        .resolve(0, Ok(vec![Receivable::new(100.0, "acme", 15)]));
    h.expenses.resolve(
        0,
        Ok(vec![
            Entry::new(40.0, "rent", "", 1),
            Entry::new(10.0, "food", "", 3),
        ]),
    );
    h.incomes
        .resolve(0, Ok(vec![Entry::new(200.0, "salary", "", 1)]));
    h.upcoming
        .resolve(0, Ok(vec![UpcomingPayment::new(30.0, "electricity", 20)]));
    h.pool.run_until_stalled();

    let view = h.dashboard.latest().unwrap();
    assert_eq!(view.period, period("2026-02"));
    assert_eq!(view.total_income, 200.0);
    assert_eq!(view.total_expense, 50.0);
    assert_eq!(view.balance, 150.0);
    assert_eq!(view.receivable_total, 100.0);
    assert_eq!(view.upcoming_total, 30.0);
    assert_eq!(view.sources.expenses, SourceState::Ready);
}

#[test]
fn failed_input_degrades_to_empty_and_flagged() {
    let mut h = harness("2026-02");
    h.receivables
        .resolve(0, Ok(vec![Receivable::new(100.0, "acme", 15)]));
    h.expenses
        .resolve(0, Ok(vec![Entry::new(40.0, "rent", "", 1)]));
    h.incomes.resolve(0, Err(FetchError::new("backend down")));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();

    let view = h.dashboard.latest().unwrap();
    assert_eq!(view.total_income, 0.0);
    assert_eq!(view.total_expense, 40.0);
    assert_eq!(view.balance, -40.0);
    assert_eq!(view.sources.incomes, SourceState::Failed);
    assert_eq!(view.sources.expenses, SourceState::Ready);
}

#[test]
fn period_switch_reuses_last_good_values_until_fetches_land() {
    let mut h = harness("2026-01");
    h.receivables.resolve(0, Ok(vec![]));
    h.expenses
        .resolve(0, Ok(vec![Entry::new(40.0, "rent", "", 1)]));
    h.incomes
        .resolve(0, Ok(vec![Entry::new(200.0, "salary", "", 1)]));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();

    // recomputed immediately from the last-good snapshots
    h.selector.select(period("2026-02"));
    let view = h.dashboard.latest().unwrap();
    assert_eq!(view.period, period("2026-02"));
    assert_eq!(view.total_income, 200.0);
    assert_eq!(view.sources.incomes, SourceState::Refreshing);
    assert_eq!(view.sources.expenses, SourceState::Refreshing);

    h.incomes
        .resolve(0, Ok(vec![Entry::new(50.0, "salary", "", 1)]));
    h.pool.run_until_stalled();
    let view = h.dashboard.latest().unwrap();
    assert_eq!(view.total_income, 50.0);
    assert_eq!(view.sources.incomes, SourceState::Ready);
    assert_eq!(view.sources.expenses, SourceState::Refreshing);
}

#[test]
fn expense_breakdown_is_sorted_by_total_then_name() {
    let mut h = harness("2026-02");
    h.receivables.resolve(0, Ok(vec![]));
    h.expenses.resolve(
        0,
        Ok(vec![
            Entry::new(10.0, "food", "", 3),
            Entry::new(50.0, "rent", "", 1),
            Entry::new(30.0, "gym", "", 5),
            Entry::new(20.0, "food", "", 9),
        ]),
    );
    h.incomes.resolve(0, Ok(vec![]));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();

    let view = h.dashboard.latest().unwrap();
    let breakdown: Vec<(&str, f64)> = view
        .expense_by_category
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    assert_eq!(breakdown, [("rent", 50.0), ("food", 30.0), ("gym", 30.0)]);
}

#[test]
fn daily_flow_merges_incomes_and_expenses_by_day() {
    let mut h = harness("2026-02");
    h.receivables.resolve(0, Ok(vec![]));
    h.expenses.resolve(
        0,
        Ok(vec![
            Entry::new(40.0, "rent", "", 1),
            Entry::new(10.0, "food", "", 3),
        ]),
    );
    h.incomes
        .resolve(0, Ok(vec![Entry::new(200.0, "salary", "", 1)]));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();

    let view = h.dashboard.latest().unwrap();
    let days: Vec<(u8, f64, f64)> = view
        .daily_flow
        .iter()
        .map(|d| (d.day, d.income, d.expense))
        .collect();
    assert_eq!(days, [(1, 200.0, 40.0), (3, 0.0, 10.0)]);
}

#[test]
fn any_input_emission_recomputes_the_view() {
    let mut h = harness("2026-01");
    let mut cr = CallRecorder::new();
    let _s = h
        .dashboard
        .subscribe(|v| call!("{}/{}", v.total_income, v.total_expense));

    h.receivables.resolve(0, Ok(vec![]));
    h.expenses.resolve(0, Ok(vec![]));
    h.incomes
        .resolve(0, Ok(vec![Entry::new(100.0, "salary", "", 1)]));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();
    cr.verify("100/0");

    // a single stream emitting again is enough to recompute
    h.selector.invalidate();
    cr.verify("100/0");
    h.expenses
        .resolve(0, Ok(vec![Entry::new(25.0, "rent", "", 1)]));
    h.pool.run_until_stalled();
    cr.verify("100/25");
}

#[test]
fn late_subscriber_receives_last_view_immediately() {
    let mut h = harness("2026-01");
    h.receivables.resolve(0, Ok(vec![]));
    h.expenses.resolve(0, Ok(vec![]));
    h.incomes.resolve(0, Ok(vec![]));
    h.upcoming.resolve(0, Ok(vec![]));
    h.pool.run_until_stalled();

    let mut cr = CallRecorder::new();
    let _s = h.dashboard.subscribe(|v| call!("{}", v.period));
    cr.verify("2026-01");
}
