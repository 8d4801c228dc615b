use parse_display::Display;

/// A cash movement within one period; used by both the expenses and the
/// incomes collections.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub amount: f64,
    pub category: String,
    pub note: String,
    /// Day of the month the movement happened on.
    pub day: u8,
}

impl Entry {
    pub fn new(amount: f64, category: impl Into<String>, note: impl Into<String>, day: u8) -> Self {
        Entry {
            amount,
            category: category.into(),
            note: note.into(),
            day,
        }
    }
}

/// An amount owed to the user, expected within the period.
#[derive(Clone, Debug, PartialEq)]
pub struct Receivable {
    pub amount: f64,
    pub debtor: String,
    pub due_day: u8,
}

impl Receivable {
    pub fn new(amount: f64, debtor: impl Into<String>, due_day: u8) -> Self {
        Receivable {
            amount,
            debtor: debtor.into(),
            due_day,
        }
    }
}

/// A payment scheduled against the user within the period.
#[derive(Clone, Debug, PartialEq)]
pub struct UpcomingPayment {
    pub amount: f64,
    pub payee: String,
    pub due_day: u8,
}

impl UpcomingPayment {
    pub fn new(amount: f64, payee: impl Into<String>, due_day: u8) -> Self {
        UpcomingPayment {
            amount,
            payee: payee.into(),
            due_day,
        }
    }
}

/// The data collections the dashboard keeps in sync with the selected
/// period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[display(style = "snake_case")]
pub enum CollectionKind {
    Receivables,
    Expenses,
    Incomes,
    UpcomingPayments,
}
