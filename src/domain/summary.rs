//! Report shapes produced by the aggregator.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::core::time::{end_of_day, start_of_day, MonthKey};
use crate::domain::transaction::{Transaction, TransactionType};

/// Income/expense totals for one calendar month.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct MonthlySummary {
    pub income: f64,
    pub expense: f64,
    pub income_tax: f64,
    pub expense_tax: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

impl MonthlySummary {
    pub fn record(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionType::Income => {
                self.income += txn.amount;
                self.income_tax += txn.tax_amount;
            }
            TransactionType::Expense => {
                self.expense += txn.amount;
                self.expense_tax += txn.tax_amount;
            }
        }
        self.transaction_count += 1;
        self.balance = self.income - self.expense;
    }
}

/// One bar of the trend chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTotals {
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// One slice of the distribution chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotals {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub value: f64,
}

/// Category amount and its share of the type total for a month.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl TypeFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(TypeFilter::All);
        }
        TransactionType::parse(value).map(TypeFilter::Only)
    }

    pub fn matches(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(trimmed.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => name == category,
        }
    }
}

/// Selection for the history view: an inclusive date range plus type and category filters.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: TypeFilter,
    pub category: CategoryFilter,
}

impl HistoryFilter {
    /// January 1st through December 31st of `year`, no type or category restriction.
    pub fn for_year(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
        Self {
            start,
            end,
            kind: TypeFilter::All,
            category: CategoryFilter::All,
        }
    }

    pub fn for_year_of(instant: &DateTime<Utc>) -> Self {
        Self::for_year(instant.year())
    }

    pub fn range_start(&self) -> DateTime<Utc> {
        start_of_day(self.start)
    }

    pub fn range_end(&self) -> DateTime<Utc> {
        end_of_day(self.end)
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        txn.date >= self.range_start()
            && txn.date <= self.range_end()
            && self.kind.matches(txn.kind)
            && self.category.matches(&txn.category)
    }
}

/// Filtered transactions plus the trend and distribution series derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub monthly: Vec<MonthTotals>,
    pub by_category: Vec<CategoryTotals>,
    pub totals: MonthlySummary,
}

/// Overview of what is currently persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorageInfo {
    pub transaction_count: usize,
    pub category_count: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

pub(crate) fn month_label(instant: &DateTime<Utc>) -> String {
    MonthKey::of(instant).to_string()
}
