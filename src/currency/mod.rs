//! Amount formatting and parsing for terminal input and output.

use crate::config::Config;
use crate::errors::LedgerError;

/// Separators and symbol used to render money amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

impl AmountFormat {
    pub fn from_config(config: &Config) -> Self {
        let (decimal_separator, grouping_separator) = separators_for(&config.locale);
        Self {
            symbol: symbol_for(&config.currency),
            decimal_separator,
            grouping_separator,
        }
    }

    /// `-$1,234.50` style: sign, symbol, grouped integer part, two decimals.
    pub fn amount(&self, value: f64) -> String {
        let body = format_number(self, value.abs(), 2);
        if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{}{}", self.symbol, body)
        } else {
            format!("{}{}", self.symbol, body)
        }
    }

    pub fn percent(&self, value: f64) -> String {
        format!("{}%", format_number(self, value, 1))
    }

    /// Reads a number typed with this locale's separators.
    ///
    /// Grouping separators are only accepted between groups of three digits,
    /// so `12,50` under `en-US` is rejected instead of read as `1250`.
    pub fn parse(&self, input: &str) -> Result<f64, LedgerError> {
        let invalid = || LedgerError::Validation(format!("invalid amount `{}`", input.trim()));
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix(self.symbol.trim()).unwrap_or(trimmed).trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (int_part, frac_part) = match body.rsplit_once(self.decimal_separator) {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (body, None),
        };
        let digits = ungroup(int_part, self.grouping_separator).ok_or_else(invalid)?;
        let mut normalized = if negative { format!("-{digits}") } else { digits };
        if let Some(frac) = frac_part {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            normalized.push('.');
            normalized.push_str(frac);
        }
        normalized.parse::<f64>().map_err(|_| invalid())
    }
}

/// Strips grouping separators from an integer part, rejecting misplaced ones.
fn ungroup(int_part: &str, separator: char) -> Option<String> {
    let groups: Vec<&str> = int_part.split(separator).collect();
    let (first, rest) = groups.split_first()?;
    let valid_first = !first.is_empty()
        && first.chars().all(|c| c.is_ascii_digit())
        && (rest.is_empty() || first.len() <= 3);
    let valid_rest = rest
        .iter()
        .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));
    (valid_first && valid_rest).then(|| groups.concat())
}

/// Decimal and grouping separators for a language tag.
fn separators_for(locale: &str) -> (char, char) {
    let language = locale
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match language.as_str() {
        "es" | "de" | "it" | "pt" | "nl" | "id" | "tr" => (',', '.'),
        "fr" => (',', ' '),
        _ => ('.', ','),
    }
}

fn symbol_for(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" | "MXN" | "CAD" | "AUD" | "ARS" | "CLP" | "COP" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        other => format!("{other} "),
    }
}

pub fn format_number(format: &AmountFormat, value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let grouped = match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, format.grouping_separator)),
        None => group_digits(int_part, format.grouping_separator),
    };
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, format.decimal_separator, frac),
        None => grouped,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_locale_separators() {
        let us = AmountFormat::default();
        assert_eq!(us.amount(1234567.5), "$1,234,567.50");
        assert_eq!(us.amount(-4500.0), "-$4,500.00");
        assert_eq!(us.amount(-0.001), "$0.00");

        let config = Config {
            locale: "es-ES".into(),
            currency: "EUR".into(),
            ..Config::default()
        };
        let es = AmountFormat::from_config(&config);
        assert_eq!(es.amount(1234.5), "€1.234,50");
        assert_eq!(es.percent(75.0), "75,0%");
    }

    #[test]
    fn parses_amounts_with_locale_separators() {
        let us = AmountFormat::default();
        assert_eq!(us.parse("1,234.50").unwrap(), 1234.5);
        assert_eq!(us.parse("$12.5").unwrap(), 12.5);
        assert_eq!(us.parse("-40").unwrap(), -40.0);
        assert!(us.parse("12,50").is_err());
        assert!(us.parse("1,2345").is_err());
        assert!(us.parse("12.").is_err());
        assert!(us.parse("abc").is_err());

        let config = Config {
            locale: "es-MX".into(),
            currency: "MXN".into(),
            ..Config::default()
        };
        let mx = AmountFormat::from_config(&config);
        assert_eq!(mx.parse("12,50").unwrap(), 12.5);
        assert_eq!(mx.parse("1.234,5").unwrap(), 1234.5);
        assert_eq!(mx.parse("1.000").unwrap(), 1000.0);
        assert!(mx.parse("12.50").is_err());
    }

    #[test]
    fn unknown_currency_uses_code_prefix() {
        let config = Config {
            currency: "chf".into(),
            ..Config::default()
        };
        assert_eq!(AmountFormat::from_config(&config).amount(12.0), "CHF 12.00");
    }
}
