use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

pub const DEFAULT_TAX_PERCENTAGE: f64 = 16.0;

/// How amounts are entered: a single figure, or the linked base/tax/total split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    #[default]
    Basic,
    Professional,
}

impl EntryMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(EntryMode::Basic),
            "professional" | "pro" => Some(EntryMode::Professional),
            _ => None,
        }
    }

    pub fn is_professional(self) -> bool {
        matches!(self, EntryMode::Professional)
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryMode::Basic => "basic",
            EntryMode::Professional => "professional",
        };
        f.write_str(label)
    }
}

/// Global user settings, persisted as a single JSON value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "Settings::default_tax_percentage")]
    pub tax_percentage: f64,
    #[serde(default)]
    pub mode: EntryMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_percentage: DEFAULT_TAX_PERCENTAGE,
            mode: EntryMode::Basic,
        }
    }
}

impl Settings {
    pub fn default_tax_percentage() -> f64 {
        DEFAULT_TAX_PERCENTAGE
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.tax_percentage.is_finite() || self.tax_percentage < 0.0 {
            return Err(LedgerError::Validation(format!(
                "tax percentage must be a non-negative number, got {}",
                self.tax_percentage
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tax_percentage, 16.0);
    }

    #[test]
    fn serializes_with_source_field_names() {
        let settings = Settings {
            tax_percentage: 21.0,
            mode: EntryMode::Professional,
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["taxPercentage"], 21.0);
        assert_eq!(json["mode"], "professional");
    }

    #[test]
    fn rejects_negative_rate() {
        let settings = Settings {
            tax_percentage: -1.0,
            mode: EntryMode::Basic,
        };
        assert!(settings.validate().is_err());
    }
}
