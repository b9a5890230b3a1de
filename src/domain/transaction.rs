use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tolerance used when comparing amounts that were rounded for display.
pub const AMOUNT_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded income or expense. Immutable once stored; only deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub base_amount: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub tax_percentage: f64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Creates an untaxed transaction where the base equals the headline amount.
    pub fn new(
        kind: TransactionType,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount,
            base_amount: amount,
            tax_amount: 0.0,
            tax_percentage: 0.0,
            description: description.into(),
            category: category.into(),
            kind,
            date,
        }
    }

    /// Replaces the amount split; the headline amount becomes `base + tax`.
    pub fn with_tax(mut self, base: f64, tax: f64, percentage: f64) -> Self {
        self.base_amount = base;
        self.tax_amount = tax;
        self.tax_percentage = percentage;
        self.amount = base + tax;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Fills in the split for records written before the tax fields existed.
    pub fn normalize(&mut self) {
        let missing_split = self.base_amount == 0.0 && self.tax_amount == 0.0;
        if missing_split && self.amount != 0.0 {
            self.base_amount = self.amount;
            self.tax_percentage = 0.0;
        }
    }

    pub fn is_consistent(&self) -> bool {
        (self.amount - (self.base_amount + self.tax_amount)).abs() <= AMOUNT_TOLERANCE
    }
}
