//! Monthly finances and the "funding achieved" notice policy.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

/// This month's income against expected expenses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finances {
    /// Money received so far this month.
    pub income: f64,
    /// Actual expenses plus the estimate for regular ones.
    pub expenses: f64,
}

impl Finances {
    /// Creates a new report.
    pub fn new(income: f64, expenses: f64) -> Self {
        Self { income, expenses }
    }

    /// The month's expenses are covered.
    pub fn is_funded(&self) -> bool {
        self.income >= self.expenses
    }

    /// Income strictly exceeds expenses.
    pub fn has_positive_cash_flow(&self) -> bool {
        self.income > self.expenses
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundingMark {
    /// Month number, 1-12.
    pub month: u32,
    /// Year.
    pub year: i32,
}

impl FundingMark {
    /// Creates a new mark.
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    /// The month `at` falls in, in the instant's own timezone.
    pub fn of<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self::new(at.month(), at.year())
    }
}

/// Remembers the last month a funding notice was sent.
///
/// The mark is only ever moved forward; losing funding later in the same
/// month does not re-arm the notice.
#[derive(Debug, Default)]
pub struct FundingTracker {
    mark: Option<FundingMark>,
}

impl FundingTracker {
    /// Creates a tracker that has never sent a notice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a notice must be sent for `finances` in `month`,
    /// recording `month` as notified.
    pub fn observe(&mut self, finances: &Finances, month: FundingMark) -> bool {
        if !finances.is_funded() || self.mark == Some(month) {
            return false;
        }
        self.mark = Some(month);
        true
    }

    /// The last month a notice was sent for.
    pub fn mark(&self) -> Option<FundingMark> {
        self.mark
    }
}
