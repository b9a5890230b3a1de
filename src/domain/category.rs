//! Domain types representing transaction categories.
//!
//! Categories are plain named tags grouped by transaction type. Transactions
//! refer to them by name only, so renaming or removing a tag never rewrites
//! existing records.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::transaction::TransactionType;

const DEFAULT_EXPENSE: &[&str] = &[
    "Food",
    "Transport",
    "Entertainment",
    "Health",
    "Home",
    "Education",
    "Clothing",
    "Services",
    "Other Expenses",
];

const DEFAULT_INCOME: &[&str] = &[
    "Salary",
    "Freelance",
    "Investments",
    "Sales",
    "Bonuses",
    "Other Income",
];

static DEFAULT_BOOK: Lazy<CategoryBook> = Lazy::new(|| CategoryBook {
    income: DEFAULT_INCOME.iter().map(|name| name.to_string()).collect(),
    expense: DEFAULT_EXPENSE.iter().map(|name| name.to_string()).collect(),
});

/// A single category tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Category names grouped by transaction type, persisted as `{income:[], expense:[]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryBook {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
}

impl CategoryBook {
    pub fn defaults() -> Self {
        DEFAULT_BOOK.clone()
    }

    pub fn names(&self, kind: TransactionType) -> &[String] {
        match kind {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    fn names_mut(&mut self, kind: TransactionType) -> &mut Vec<String> {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        }
    }

    /// Case-insensitive position lookup on trimmed names.
    pub fn position(&self, kind: TransactionType, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.names(kind)
            .iter()
            .position(|candidate| candidate.trim().to_lowercase() == needle)
    }

    pub fn contains(&self, kind: TransactionType, name: &str) -> bool {
        self.position(kind, name).is_some()
    }

    pub fn push(&mut self, kind: TransactionType, name: impl Into<String>) {
        self.names_mut(kind).push(name.into());
    }

    pub fn replace(&mut self, kind: TransactionType, index: usize, name: impl Into<String>) {
        if let Some(slot) = self.names_mut(kind).get_mut(index) {
            *slot = name.into();
        }
    }

    pub fn remove_at(&mut self, kind: TransactionType, index: usize) -> Option<String> {
        let names = self.names_mut(kind);
        if index < names.len() {
            Some(names.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.income.len() + self.expense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates every tag, income first.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.income
            .iter()
            .map(|name| Category::new(name.clone(), TransactionType::Income))
            .chain(
                self.expense
                    .iter()
                    .map(|name| Category::new(name.clone(), TransactionType::Expense)),
            )
    }

    /// Builds a book from a flat list, skipping blank and duplicate names.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut book = CategoryBook::default();
        for category in categories {
            let name = category.name.trim();
            if name.is_empty() || book.contains(category.kind, name) {
                continue;
            }
            book.push(category.kind, name);
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_types() {
        let book = CategoryBook::defaults();
        assert!(book.contains(TransactionType::Expense, "Food"));
        assert!(book.contains(TransactionType::Income, "salary"));
        assert!(!book.contains(TransactionType::Income, "Food"));
        assert_eq!(book.len(), DEFAULT_EXPENSE.len() + DEFAULT_INCOME.len());
    }

    #[test]
    fn from_categories_drops_duplicates_per_type() {
        let book = CategoryBook::from_categories(vec![
            Category::new("Rent", TransactionType::Expense),
            Category::new(" rent ", TransactionType::Expense),
            Category::new("Rent", TransactionType::Income),
            Category::new("  ", TransactionType::Income),
        ]);
        assert_eq!(book.expense, vec!["Rent".to_string()]);
        assert_eq!(book.income, vec!["Rent".to_string()]);
    }

    #[test]
    fn iter_yields_typed_categories() {
        let mut book = CategoryBook::default();
        book.push(TransactionType::Income, "Salary");
        book.push(TransactionType::Expense, "Food");
        let all: Vec<_> = book.iter().collect();
        assert_eq!(all[0], Category::new("Salary", TransactionType::Income));
        assert_eq!(all[1], Category::new("Food", TransactionType::Expense));
    }
}
