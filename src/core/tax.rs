//! Tax-consistency calculator.
//!
//! Keeps base, tax and total linked under a percentage rate: whichever field
//! was edited last is authoritative and the other two are derived from it.
//! Values keep full precision; call [`TaxSplit::rounded`] for display.

use crate::errors::LedgerError;

/// Rates offered as one-tap presets by entry forms.
pub const TAX_RATE_PRESETS: [f64; 6] = [0.0, 5.0, 10.0, 15.0, 19.0, 21.0];

const IDENTITY_TOLERANCE: f64 = 1e-9;

/// The three linked amounts plus the rate they were derived under.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TaxSplit {
    pub base: f64,
    pub tax: f64,
    pub total: f64,
    pub rate: f64,
}

impl TaxSplit {
    /// Rounds every amount to two decimals for presentation.
    pub fn rounded(&self) -> TaxSplit {
        TaxSplit {
            base: round2(self.base),
            tax: round2(self.tax),
            total: round2(self.total),
            rate: self.rate,
        }
    }

    pub fn is_consistent(&self) -> bool {
        (self.total - (self.base + self.tax)).abs() <= IDENTITY_TOLERANCE
    }
}

/// Which of the three fields the user typed into last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditedField {
    #[default]
    Base,
    Tax,
    Total,
}

impl EditedField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" => Some(EditedField::Base),
            "tax" => Some(EditedField::Tax),
            "total" => Some(EditedField::Total),
            _ => None,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_input(label: &str, value: f64) -> Result<(), LedgerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(LedgerError::Validation(format!(
            "{label} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// `tax = base * rate / 100`, `total = base + tax`.
pub fn split_from_base(base: f64, rate: f64) -> Result<TaxSplit, LedgerError> {
    check_input("base amount", base)?;
    check_input("tax rate", rate)?;
    let tax = base * (rate / 100.0);
    Ok(TaxSplit {
        base,
        tax,
        total: base + tax,
        rate,
    })
}

/// `base = tax / (rate / 100)`, `total = base + tax`.
///
/// A zero rate cannot yield a base from a tax figure; the base is then 0.
pub fn split_from_tax(tax: f64, rate: f64) -> Result<TaxSplit, LedgerError> {
    check_input("tax amount", tax)?;
    check_input("tax rate", rate)?;
    let base = if rate == 0.0 { 0.0 } else { tax / (rate / 100.0) };
    Ok(TaxSplit {
        base,
        tax,
        total: base + tax,
        rate,
    })
}

/// `base = total / (1 + rate / 100)`, `tax = total - base`.
pub fn split_from_total(total: f64, rate: f64) -> Result<TaxSplit, LedgerError> {
    check_input("total amount", total)?;
    check_input("tax rate", rate)?;
    let base = total / (1.0 + rate / 100.0);
    let tax = total - base;
    Ok(TaxSplit {
        base,
        tax,
        total,
        rate,
    })
}

/// Derives the full split from a single edited field.
pub fn split_from(field: EditedField, value: f64, rate: f64) -> Result<TaxSplit, LedgerError> {
    match field {
        EditedField::Base => split_from_base(value, rate),
        EditedField::Tax => split_from_tax(value, rate),
        EditedField::Total => split_from_total(value, rate),
    }
}

/// Stateful form model for the three linked fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxCalculator {
    split: TaxSplit,
    last_edited: EditedField,
}

impl TaxCalculator {
    pub fn new(rate: f64) -> Self {
        Self {
            split: TaxSplit {
                rate,
                ..TaxSplit::default()
            },
            last_edited: EditedField::Base,
        }
    }

    pub fn split(&self) -> TaxSplit {
        self.split
    }

    pub fn last_edited(&self) -> EditedField {
        self.last_edited
    }

    pub fn rate(&self) -> f64 {
        self.split.rate
    }

    pub fn set_base(&mut self, base: f64) -> Result<TaxSplit, LedgerError> {
        self.apply(EditedField::Base, base, self.split.rate)
    }

    pub fn set_tax(&mut self, tax: f64) -> Result<TaxSplit, LedgerError> {
        self.apply(EditedField::Tax, tax, self.split.rate)
    }

    pub fn set_total(&mut self, total: f64) -> Result<TaxSplit, LedgerError> {
        self.apply(EditedField::Total, total, self.split.rate)
    }

    /// Changes the rate and re-derives from whichever field was edited last.
    pub fn set_rate(&mut self, rate: f64) -> Result<TaxSplit, LedgerError> {
        let anchor = match self.last_edited {
            EditedField::Base => self.split.base,
            EditedField::Tax => self.split.tax,
            EditedField::Total => self.split.total,
        };
        self.apply(self.last_edited, anchor, rate)
    }

    fn apply(&mut self, field: EditedField, value: f64, rate: f64) -> Result<TaxSplit, LedgerError> {
        let split = split_from(field, value, rate)?;
        self.split = split;
        self.last_edited = field;
        Ok(split)
    }
}
