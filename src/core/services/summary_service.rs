use std::collections::{BTreeMap, HashMap};

use crate::core::time::MonthKey;
use crate::domain::summary::month_label;
use crate::domain::{
    CategoryBook, CategoryShare, CategoryTotals, HistoryFilter, HistoryReport, MonthTotals,
    MonthlySummary, StorageInfo, Transaction, TransactionType,
};

use super::{ServiceError, ServiceResult};

/// Read-only aggregation over the transaction list.
pub struct SummaryService;

impl SummaryService {
    /// Income/expense/tax sums for every transaction dated inside `month`.
    pub fn monthly(transactions: &[Transaction], month: MonthKey) -> MonthlySummary {
        transactions
            .iter()
            .filter(|txn| month.contains(&txn.date))
            .fold(MonthlySummary::default(), |mut summary, txn| {
                summary.record(txn);
                summary
            })
    }

    pub fn history<'a>(
        transactions: &'a [Transaction],
        filter: &HistoryFilter,
    ) -> ServiceResult<HistoryReport<'a>> {
        if filter.start > filter.end {
            return Err(ServiceError::Invalid(format!(
                "Start date {} is after end date {}",
                filter.start, filter.end
            )));
        }

        let mut selected: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| filter.matches(txn))
            .collect();
        selected.sort_by(|a, b| a.date.cmp(&b.date));

        let mut totals = MonthlySummary::default();
        let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut categories: HashMap<(String, TransactionType), f64> = HashMap::new();

        for txn in &selected {
            totals.record(txn);
            let bucket = months.entry(month_label(&txn.date)).or_insert((0.0, 0.0));
            match txn.kind {
                TransactionType::Income => bucket.0 += txn.amount,
                TransactionType::Expense => bucket.1 += txn.amount,
            }
            *categories
                .entry((txn.category.clone(), txn.kind))
                .or_insert(0.0) += txn.amount;
        }

        let monthly = months
            .into_iter()
            .map(|(month, (income, expense))| MonthTotals {
                month,
                income,
                expense,
            })
            .collect();

        let mut by_category: Vec<CategoryTotals> = categories
            .into_iter()
            .map(|((name, kind), value)| CategoryTotals { name, kind, value })
            .collect();
        by_category.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.kind.cmp(&b.kind))
        });

        Ok(HistoryReport {
            transactions: selected,
            monthly,
            by_category,
            totals,
        })
    }

    /// Per-category totals of one type within `month`, with each share of the type total.
    pub fn category_breakdown(
        transactions: &[Transaction],
        kind: TransactionType,
        month: MonthKey,
    ) -> Vec<CategoryShare> {
        let mut sums: HashMap<&str, f64> = HashMap::new();
        let mut total = 0.0;
        for txn in transactions
            .iter()
            .filter(|txn| txn.kind == kind && month.contains(&txn.date))
        {
            *sums.entry(txn.category.as_str()).or_insert(0.0) += txn.amount;
            total += txn.amount;
        }

        let mut shares: Vec<CategoryShare> = sums
            .into_iter()
            .map(|(name, amount)| CategoryShare {
                name: name.to_string(),
                amount,
                percentage: if total > 0.0 {
                    amount / total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        shares.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.name.cmp(&b.name))
        });
        shares
    }

    pub fn storage_info(transactions: &[Transaction], categories: &CategoryBook) -> StorageInfo {
        StorageInfo {
            transaction_count: transactions.len(),
            category_count: categories.len(),
            oldest: transactions.iter().map(|txn| txn.date).min(),
            newest: transactions.iter().map(|txn| txn.date).max(),
        }
    }
}
