use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use parse_display::Display;

use crate::{
    subscription::Sinks, DerivedStream, Entry, Period, PeriodSelector, Receivable, Snapshot,
    Subscription, UpcomingPayment,
};

#[cfg(test)]
mod tests;

/// Combines the four collection streams and the period selector into one
/// renderable view-model.
///
/// Recomputes whenever any input emits, always from the latest known
/// value of every input. The first view is produced once every
/// collection has emitted at least once; from then on output is never
/// withheld: failed inputs contribute empty rows and a `Failed` flag,
/// snapshots of a superseded period contribute their last-good rows and
/// a `Refreshing` flag.
#[derive(Clone)]
pub struct Dashboard(Rc<DashboardNode>);

struct DashboardNode {
    selector: PeriodSelector,
    inputs: RefCell<Inputs>,
    view: RefCell<Option<DashboardView>>,
    sinks: Sinks<DashboardView>,
    _sources: RefCell<Vec<Subscription>>,
}

#[derive(Default)]
struct Inputs {
    receivables: Option<Snapshot<Receivable>>,
    expenses: Option<Snapshot<Entry>>,
    incomes: Option<Snapshot<Entry>>,
    upcoming: Option<Snapshot<UpcomingPayment>>,
}

impl Dashboard {
    pub fn new(
        selector: &PeriodSelector,
        receivables: &DerivedStream<Receivable>,
        expenses: &DerivedStream<Entry>,
        incomes: &DerivedStream<Entry>,
        upcoming: &DerivedStream<UpcomingPayment>,
    ) -> Self {
        let node = Rc::new(DashboardNode {
            selector: selector.clone(),
            inputs: RefCell::new(Inputs::default()),
            view: RefCell::new(None),
            sinks: Sinks::new(),
            _sources: RefCell::new(Vec::new()),
        });
        let mut subs = Vec::new();
        {
            let weak = Rc::downgrade(&node);
            subs.push(selector.subscribe(move |_| {
                if let Some(node) = weak.upgrade() {
                    node.recompute();
                }
            }));
        }
        subs.push(input_sub(&node, receivables, |inputs, s| {
            inputs.receivables = Some(s)
        }));
        subs.push(input_sub(&node, expenses, |inputs, s| {
            inputs.expenses = Some(s)
        }));
        subs.push(input_sub(&node, incomes, |inputs, s| {
            inputs.incomes = Some(s)
        }));
        subs.push(input_sub(&node, upcoming, |inputs, s| {
            inputs.upcoming = Some(s)
        }));
        *node._sources.borrow_mut() = subs;
        Dashboard(node)
    }

    /// Latest view, once every collection has emitted.
    pub fn latest(&self) -> Option<DashboardView> {
        self.0.view.borrow().clone()
    }

    /// Observes recomputed views. The last view, when present, is
    /// delivered immediately; subsequent views follow until the returned
    /// handle is dropped.
    pub fn subscribe(&self, mut f: impl FnMut(&DashboardView) + 'static) -> Subscription {
        if let Some(view) = self.latest() {
            f(&view);
        }
        self.0.sinks.subscribe(f)
    }
}

fn input_sub<T: 'static>(
    node: &Rc<DashboardNode>,
    stream: &DerivedStream<T>,
    store: impl Fn(&mut Inputs, Snapshot<T>) + 'static,
) -> Subscription {
    let weak = Rc::downgrade(node);
    stream.subscribe(move |snapshot| {
        if let Some(node) = weak.upgrade() {
            store(&mut node.inputs.borrow_mut(), snapshot.clone());
            node.recompute();
        }
    })
}

impl DashboardNode {
    fn recompute(&self) {
        let period = self.selector.current();
        let inputs = self.inputs.borrow();
        let (Some(receivables), Some(expenses), Some(incomes), Some(upcoming)) = (
            inputs.receivables.as_ref(),
            inputs.expenses.as_ref(),
            inputs.incomes.as_ref(),
            inputs.upcoming.as_ref(),
        ) else {
            return;
        };
        let view = DashboardView::compute(period, receivables, expenses, incomes, upcoming);
        drop(inputs);
        tracing::trace!(%period, "dashboard view recomputed");
        *self.view.borrow_mut() = Some(view.clone());
        self.sinks.notify(&view);
    }
}

/// Pure projection of the latest snapshots for the active period:
/// totals, category breakdown, per-day chart series and per-collection
/// freshness. Rendering consumes this by reference and never mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub period: Period,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub receivable_total: f64,
    pub upcoming_total: f64,
    /// Expense totals per category, largest first; ties break on the
    /// category name so equal inputs always render identically.
    pub expense_by_category: Vec<CategoryTotal>,
    /// One point per day that saw any movement, in day order.
    pub daily_flow: Vec<DailyFlow>,
    pub sources: SourceReport,
}

impl DashboardView {
    fn compute(
        period: Period,
        receivables: &Snapshot<Receivable>,
        expenses: &Snapshot<Entry>,
        incomes: &Snapshot<Entry>,
        upcoming: &Snapshot<UpcomingPayment>,
    ) -> Self {
        let total_income: f64 = incomes.rows().iter().map(|e| e.amount).sum();
        let total_expense: f64 = expenses.rows().iter().map(|e| e.amount).sum();
        let receivable_total: f64 = receivables.rows().iter().map(|r| r.amount).sum();
        let upcoming_total: f64 = upcoming.rows().iter().map(|u| u.amount).sum();

        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in expenses.rows() {
            *by_category.entry(entry.category.as_str()).or_default() += entry.amount;
        }
        let mut expense_by_category: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
        expense_by_category.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        let mut by_day: BTreeMap<u8, DailyFlow> = BTreeMap::new();
        for entry in incomes.rows() {
            by_day
                .entry(entry.day)
                .or_insert_with(|| DailyFlow::at(entry.day))
                .income += entry.amount;
        }
        for entry in expenses.rows() {
            by_day
                .entry(entry.day)
                .or_insert_with(|| DailyFlow::at(entry.day))
                .expense += entry.amount;
        }

        DashboardView {
            period,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            receivable_total,
            upcoming_total,
            expense_by_category,
            daily_flow: by_day.into_values().collect(),
            sources: SourceReport {
                receivables: source_state(period, receivables),
                expenses: source_state(period, expenses),
                incomes: source_state(period, incomes),
                upcoming: source_state(period, upcoming),
            },
        }
    }
}

/// Expense total of one category within the period.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Aggregated cash movement of one day, one point of the month chart.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyFlow {
    pub day: u8,
    pub income: f64,
    pub expense: f64,
}

impl DailyFlow {
    fn at(day: u8) -> Self {
        DailyFlow {
            day,
            income: 0.0,
            expense: 0.0,
        }
    }
}

/// Freshness of every input as of the last recomputation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceReport {
    pub receivables: SourceState,
    pub expenses: SourceState,
    pub incomes: SourceState,
    pub upcoming: SourceState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
#[display(style = "snake_case")]
pub enum SourceState {
    /// The snapshot matches the active period and carries data.
    Ready,
    /// The snapshot belongs to a superseded period; its rows are shown
    /// until the fetch for the active period lands.
    Refreshing,
    /// The fetch for the active period failed; rows degrade to empty.
    Failed,
}

fn source_state<T>(period: Period, snapshot: &Snapshot<T>) -> SourceState {
    if snapshot.period != period {
        SourceState::Refreshing
    } else if snapshot.is_failed() {
        SourceState::Failed
    } else {
        SourceState::Ready
    }
}
