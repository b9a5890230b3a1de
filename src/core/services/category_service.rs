use crate::domain::{Category, CategoryBook, TransactionType};
use crate::ledger::Ledger;

use super::{ServiceError, ServiceResult};

/// Edits the category book. Transactions keep whatever name they were
/// recorded with; nothing here rewrites them.
pub struct CategoryService;

impl CategoryService {
    pub fn add(ledger: &mut Ledger, kind: TransactionType, name: &str) -> ServiceResult<String> {
        let name = Self::validate_name(&ledger.categories, kind, None, name)?;
        ledger.categories.push(kind, name.clone());
        Ok(name)
    }

    pub fn rename(
        ledger: &mut Ledger,
        kind: TransactionType,
        current: &str,
        new_name: &str,
    ) -> ServiceResult<String> {
        let index = Self::locate(&ledger.categories, kind, current)?;
        let name = Self::validate_name(&ledger.categories, kind, Some(index), new_name)?;
        ledger.categories.replace(kind, index, name.clone());
        Ok(name)
    }

    /// Removes the tag and reports how many transactions still reference it.
    pub fn remove(ledger: &mut Ledger, kind: TransactionType, name: &str) -> ServiceResult<usize> {
        let index = Self::locate(&ledger.categories, kind, name)?;
        let removed = ledger
            .categories
            .remove_at(kind, index)
            .ok_or_else(|| ServiceError::Invalid(format!("Category `{name}` not found")))?;
        Ok(ledger.references_to(&removed))
    }

    pub fn reset_defaults(ledger: &mut Ledger) {
        ledger.categories = CategoryBook::defaults();
    }

    pub fn list(ledger: &Ledger, kind: Option<TransactionType>) -> Vec<Category> {
        ledger
            .categories
            .iter()
            .filter(|category| kind.map_or(true, |wanted| category.kind == wanted))
            .collect()
    }

    fn locate(book: &CategoryBook, kind: TransactionType, name: &str) -> ServiceResult<usize> {
        book.position(kind, name).ok_or_else(|| {
            ServiceError::Invalid(format!("Category `{}` not found", name.trim()))
        })
    }

    fn validate_name(
        book: &CategoryBook,
        kind: TransactionType,
        exclude: Option<usize>,
        candidate: &str,
    ) -> ServiceResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Invalid("Category name is required".into()));
        }
        match book.position(kind, trimmed) {
            Some(index) if Some(index) != exclude => Err(ServiceError::Invalid(format!(
                "Category `{trimmed}` already exists"
            ))),
            _ => Ok(trimmed.to_string()),
        }
    }
}
