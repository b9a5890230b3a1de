//! Portable JSON backup of every ledger section.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CategoryBook, Settings, Transaction};
use crate::errors::LedgerError;
use crate::ledger::Ledger;

use super::Result;

pub const BACKUP_VERSION: &str = "1.0";
const FILE_PREFIX: &str = "tally-backup";

/// Categories appear either grouped by type or as a flat list of tagged entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoriesPayload {
    Grouped(CategoryBook),
    List(Vec<Category>),
}

impl CategoriesPayload {
    pub fn into_book(self) -> CategoryBook {
        match self {
            CategoriesPayload::Grouped(book) => {
                CategoryBook::from_categories(book.iter().collect::<Vec<_>>())
            }
            CategoriesPayload::List(list) => CategoryBook::from_categories(list),
        }
    }
}

/// On-disk backup document. Sections absent from an imported file are left alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: String,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub categories: Option<CategoriesPayload>,
    #[serde(default)]
    pub settings: Option<Settings>,
}

/// The validated, normalized content of a backup ready to be written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackupSections {
    pub transactions: Option<Vec<Transaction>>,
    pub categories: Option<CategoryBook>,
    pub settings: Option<Settings>,
}

impl BackupSections {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_none() && self.categories.is_none() && self.settings.is_none()
    }
}

impl BackupDocument {
    pub fn from_ledger(ledger: &Ledger, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            export_date: Some(exported_at),
            transactions: Some(ledger.transactions.clone()),
            categories: Some(CategoriesPayload::Grouped(ledger.categories.clone())),
            settings: Some(ledger.settings.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a backup; any syntax or shape problem is reported as an invalid backup.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| LedgerError::InvalidBackup(format!("unreadable document: {err}")))
    }

    /// Checks the whole document and returns normalized sections. Nothing is
    /// written here, so a failure leaves existing data untouched.
    pub fn into_sections(self) -> Result<BackupSections> {
        if self.version.trim().is_empty() {
            return Err(LedgerError::InvalidBackup("missing version".into()));
        }

        let transactions = match self.transactions {
            Some(list) => Some(validate_transactions(list)?),
            None => None,
        };

        if let Some(settings) = &self.settings {
            settings
                .validate()
                .map_err(|err| LedgerError::InvalidBackup(format!("settings: {err}")))?;
        }

        let sections = BackupSections {
            transactions,
            categories: self.categories.map(CategoriesPayload::into_book),
            settings: self.settings,
        };
        if sections.is_empty() {
            return Err(LedgerError::InvalidBackup(
                "document contains no transactions, categories or settings".into(),
            ));
        }
        Ok(sections)
    }
}

fn validate_transactions(mut list: Vec<Transaction>) -> Result<Vec<Transaction>> {
    let mut seen = HashSet::new();
    for (index, txn) in list.iter_mut().enumerate() {
        txn.normalize();
        let label = if txn.id.is_empty() {
            format!("transaction #{}", index + 1)
        } else {
            format!("transaction `{}`", txn.id)
        };
        if txn.id.trim().is_empty() {
            return Err(LedgerError::InvalidBackup(format!("{label} has no id")));
        }
        if !seen.insert(txn.id.clone()) {
            return Err(LedgerError::InvalidBackup(format!("{label} appears twice")));
        }
        let amounts = [txn.amount, txn.base_amount, txn.tax_amount, txn.tax_percentage];
        if amounts.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(LedgerError::InvalidBackup(format!(
                "{label} has a negative or non-numeric amount"
            )));
        }
        if !txn.is_consistent() {
            return Err(LedgerError::InvalidBackup(format!(
                "{label}: amount {} does not equal base {} plus tax {}",
                txn.amount, txn.base_amount, txn.tax_amount
            )));
        }
    }
    Ok(list)
}

/// `tally-backup-YYYY-MM-DD.json`
pub fn default_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}-{}.json", date.format("%Y-%m-%d"))
}
