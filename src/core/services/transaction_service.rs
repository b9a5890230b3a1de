//! Business logic helpers for recording transactions.

use chrono::{DateTime, Utc};

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::tax::{self, EditedField};
use crate::domain::{CategoryBook, Settings, Transaction, TransactionType};
use crate::ledger::Ledger;

const MIN_DESCRIPTION_CHARS: usize = 3;

/// Raw form values for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInput {
    pub kind: TransactionType,
    /// The figure the user typed. In professional mode `entered` says which field it is.
    pub amount: f64,
    pub entered: EditedField,
    /// Overrides the settings rate in professional mode.
    pub rate: Option<f64>,
    pub category: String,
    pub description: String,
}

impl EntryInput {
    pub fn new(
        kind: TransactionType,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            entered: EditedField::Base,
            rate: None,
            category: category.into(),
            description: description.into(),
        }
    }

    pub fn entered_as(mut self, field: EditedField) -> Self {
        self.entered = field;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }
}

/// Provides validated CRUD helpers for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Validates `input` and builds a transaction dated `date`.
    ///
    /// Basic mode records the amount untaxed. Professional mode derives the
    /// base/tax/total split from the entered field and stores the 2-decimal
    /// values shown to the user, with `amount = base + tax`.
    pub fn draft(
        settings: &Settings,
        categories: &CategoryBook,
        input: &EntryInput,
        date: DateTime<Utc>,
    ) -> ServiceResult<Transaction> {
        let description = Self::validate_description(&input.description)?;
        let category = Self::resolve_category(categories, input.kind, &input.category)?;

        if !input.amount.is_finite() {
            return Err(ServiceError::Invalid("Amount must be a number".into()));
        }

        if !settings.mode.is_professional() {
            if input.amount <= 0.0 {
                return Err(ServiceError::Invalid(
                    "Amount must be greater than zero".into(),
                ));
            }
            return Ok(Transaction::new(
                input.kind,
                input.amount,
                category,
                description,
                date,
            ));
        }

        let rate = input.rate.unwrap_or(settings.tax_percentage);
        let split = tax::split_from(input.entered, input.amount, rate)?.rounded();
        if split.base <= 0.0 {
            return Err(ServiceError::Invalid(
                "Base amount must be greater than zero".into(),
            ));
        }
        Ok(
            Transaction::new(input.kind, 0.0, category, description, date)
                .with_tax(split.base, split.tax, rate),
        )
    }

    /// Adds a new transaction and returns its identifier.
    pub fn add(ledger: &mut Ledger, transaction: Transaction) -> ServiceResult<String> {
        if ledger.transaction(&transaction.id).is_some() {
            return Err(ServiceError::Invalid(format!(
                "Transaction `{}` already exists",
                transaction.id
            )));
        }
        Ok(ledger.add_transaction(transaction))
    }

    /// Removes the transaction identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<Transaction> {
        ledger
            .remove_transaction(id)
            .ok_or_else(|| ServiceError::Invalid(format!("Transaction `{id}` not found")))
    }

    /// Newest first, optionally truncated.
    pub fn list(ledger: &Ledger, limit: Option<usize>) -> Vec<&Transaction> {
        let mut items: Vec<&Transaction> = ledger.transactions.iter().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        items
    }

    fn validate_description(raw: &str) -> ServiceResult<String> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(ServiceError::Invalid(format!(
                "Description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Returns the stored spelling of the category, which must exist for `kind`.
    fn resolve_category(
        categories: &CategoryBook,
        kind: TransactionType,
        raw: &str,
    ) -> ServiceResult<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Invalid("Category is required".into()));
        }
        categories
            .position(kind, trimmed)
            .map(|index| categories.names(kind)[index].clone())
            .ok_or_else(|| {
                ServiceError::Invalid(format!("Unknown {kind} category `{trimmed}`"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryMode;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 13, 10, 0, 0).unwrap()
    }

    fn professional(rate: f64) -> Settings {
        Settings {
            tax_percentage: rate,
            mode: EntryMode::Professional,
        }
    }

    #[test]
    fn basic_mode_records_untaxed_amount() {
        let input = EntryInput::new(TransactionType::Expense, 500.0, "food", "Groceries");
        let txn = TransactionService::draft(
            &Settings::default(),
            &CategoryBook::defaults(),
            &input,
            date(),
        )
        .unwrap();
        assert_eq!(txn.amount, 500.0);
        assert_eq!(txn.base_amount, 500.0);
        assert_eq!(txn.tax_amount, 0.0);
        assert_eq!(txn.tax_percentage, 0.0);
        assert_eq!(txn.category, "Food");
    }

    #[test]
    fn professional_mode_splits_from_total() {
        let input = EntryInput::new(TransactionType::Income, 116.0, "Freelance", "Invoice 7")
            .entered_as(EditedField::Total);
        let txn =
            TransactionService::draft(&professional(16.0), &CategoryBook::defaults(), &input, date())
                .unwrap();
        assert_eq!(txn.base_amount, 100.0);
        assert_eq!(txn.tax_amount, 16.0);
        assert_eq!(txn.amount, 116.0);
        assert_eq!(txn.tax_percentage, 16.0);
        assert!(txn.is_consistent());
    }

    #[test]
    fn explicit_rate_overrides_settings() {
        let input = EntryInput::new(TransactionType::Expense, 100.0, "Services", "Hosting")
            .with_rate(21.0);
        let txn =
            TransactionService::draft(&professional(16.0), &CategoryBook::defaults(), &input, date())
                .unwrap();
        assert_eq!(txn.tax_amount, 21.0);
        assert_eq!(txn.tax_percentage, 21.0);
    }

    #[test]
    fn zero_rate_tax_entry_is_rejected_as_zero_base() {
        let input = EntryInput::new(TransactionType::Expense, 10.0, "Food", "Dinner")
            .entered_as(EditedField::Tax);
        let err =
            TransactionService::draft(&professional(0.0), &CategoryBook::defaults(), &input, date())
                .unwrap_err();
        assert!(err.to_string().contains("Base amount"), "{err}");
    }

    #[test]
    fn validation_rejects_short_description_and_unknown_category() {
        let book = CategoryBook::defaults();
        let short = EntryInput::new(TransactionType::Expense, 5.0, "Food", " ab ");
        assert!(TransactionService::draft(&Settings::default(), &book, &short, date()).is_err());

        let unknown = EntryInput::new(TransactionType::Expense, 5.0, "Salary", "Wrong type");
        let err = TransactionService::draft(&Settings::default(), &book, &unknown, date())
            .unwrap_err();
        assert!(err.to_string().contains("Unknown expense category"));

        let zero = EntryInput::new(TransactionType::Expense, 0.0, "Food", "Nothing");
        assert!(TransactionService::draft(&Settings::default(), &book, &zero, date()).is_err());
    }

    #[test]
    fn list_orders_newest_first_and_honours_limit() {
        let mut ledger = Ledger::with_defaults();
        for day in [3, 1, 2] {
            let when = Utc.with_ymd_and_hms(2025, 7, day, 0, 0, 0).unwrap();
            TransactionService::add(
                &mut ledger,
                Transaction::new(TransactionType::Expense, day as f64, "Food", "Meal", when),
            )
            .unwrap();
        }
        let listed = TransactionService::list(&ledger, Some(2));
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].amount, 3.0);
        assert_eq!(listed[1].amount, 2.0);
    }

    #[test]
    fn remove_fails_for_missing_transaction() {
        let mut ledger = Ledger::with_defaults();
        let err = TransactionService::remove(&mut ledger, "missing").unwrap_err();
        assert!(
            matches!(err, ServiceError::Invalid(ref message) if message.contains("not found")),
            "unexpected error: {err:?}"
        );
    }
}
