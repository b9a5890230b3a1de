pub mod category;
pub mod settings;
pub mod summary;
pub mod transaction;

pub use category::{Category, CategoryBook};
pub use settings::{EntryMode, Settings};
pub use summary::{
    CategoryFilter, CategoryShare, CategoryTotals, HistoryFilter, HistoryReport, MonthTotals,
    MonthlySummary, StorageInfo, TypeFilter,
};
pub use transaction::{Transaction, TransactionType};
