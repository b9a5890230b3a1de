use crate::domain::{CategoryBook, Settings, Transaction};

/// Everything the tracker knows about: transactions, category tags and settings.
///
/// Each part is persisted under its own storage key; this struct is only the
/// in-memory view handed to services.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub categories: CategoryBook,
    pub settings: Settings,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>, categories: CategoryBook, settings: Settings) -> Self {
        Self {
            transactions,
            categories,
            settings,
        }
    }

    /// Empty ledger with the default category tags and settings.
    pub fn with_defaults() -> Self {
        Self {
            transactions: Vec::new(),
            categories: CategoryBook::defaults(),
            settings: Settings::default(),
        }
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> String {
        let id = transaction.id.clone();
        self.transactions.push(transaction);
        id
    }

    pub fn remove_transaction(&mut self, id: &str) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        Some(self.transactions.remove(index))
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Transactions still tagged with `name`, whether or not the tag exists.
    pub fn references_to(&self, name: &str) -> usize {
        self.transactions
            .iter()
            .filter(|txn| txn.category == name)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionType;
    use chrono::{TimeZone, Utc};

    #[test]
    fn add_and_remove_round_trip() {
        let mut ledger = Ledger::with_defaults();
        let date = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();
        let id = ledger.add_transaction(Transaction::new(
            TransactionType::Income,
            5000.0,
            "Salary",
            "July payroll",
            date,
        ));
        assert_eq!(ledger.transaction_count(), 1);
        assert_eq!(ledger.references_to("Salary"), 1);

        let removed = ledger.remove_transaction(&id).expect("transaction removed");
        assert_eq!(removed.amount, 5000.0);
        assert!(ledger.transaction(&id).is_none());
        assert!(ledger.remove_transaction(&id).is_none());
    }
}
