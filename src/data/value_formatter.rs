//! Display formatting for table cells
//!
//! The transform is picked from the column header: percentages get a forced
//! sign, money columns are abbreviated, ratio columns get two decimals and
//! long text is truncated. Formatting never touches the underlying data.

use crate::data::datatable::DataValue;
use regex::Regex;
use std::sync::OnceLock;

const CURRENCY_THRESHOLD: f64 = 1_000_000.0;
pub const DEFAULT_TRUNCATE_LEN: usize = 20;
pub const DEFAULT_PLACEHOLDER: &str = "-";

static CURRENCY_HEADER: OnceLock<Regex> = OnceLock::new();
static RATIO_HEADER: OnceLock<Regex> = OnceLock::new();

fn currency_header() -> &'static Regex {
    CURRENCY_HEADER.get_or_init(|| Regex::new(r"USD|Cap|Revenue|Income").expect("valid regex"))
}

fn ratio_header() -> &'static Regex {
    RATIO_HEADER.get_or_init(|| Regex::new(r"P/(E|S|B|CFO)").expect("valid regex"))
}

/// Which transform produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Percentage,
    Currency,
    Ratio,
    Truncated,
    Plain,
}

/// Colour hint for change-like columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellTone {
    #[default]
    Neutral,
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedCell {
    pub text: String,
    /// Untruncated text when `text` was shortened
    pub full_text: Option<String>,
    pub kind: CellKind,
    pub numeric: bool,
    pub tone: CellTone,
}

impl FormattedCell {
    /// The complete value, whether or not the display text was truncated
    pub fn full(&self) -> &str {
        self.full_text.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone)]
pub struct ValueFormatter {
    truncate_len: usize,
    placeholder: String,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TRUNCATE_LEN, DEFAULT_PLACEHOLDER)
    }
}

impl ValueFormatter {
    pub fn new(truncate_len: usize, placeholder: impl Into<String>) -> Self {
        Self {
            truncate_len,
            placeholder: placeholder.into(),
        }
    }

    pub fn format(&self, header: &str, value: &DataValue) -> FormattedCell {
        if value.is_empty() {
            return FormattedCell {
                text: self.placeholder.clone(),
                full_text: None,
                kind: CellKind::Empty,
                numeric: false,
                tone: CellTone::Neutral,
            };
        }

        let number = value.as_number();
        let tone = match number {
            Some(n) if header.contains('%') || header.contains("Change") => {
                if n > 0.0 {
                    CellTone::Positive
                } else if n < 0.0 {
                    CellTone::Negative
                } else {
                    CellTone::Neutral
                }
            }
            _ => CellTone::Neutral,
        };

        let cell = |text: String, kind: CellKind| FormattedCell {
            text,
            full_text: None,
            kind,
            numeric: number.is_some(),
            tone,
        };

        if let Some(n) = number {
            if header.contains('%') {
                return cell(format_percentage(n), CellKind::Percentage);
            }
            if currency_header().is_match(header) {
                return cell(format_currency(n), CellKind::Currency);
            }
            if ratio_header().is_match(header) {
                return cell(format!("{:.2}", n), CellKind::Ratio);
            }
        }

        if let DataValue::String(s) = value {
            if s.chars().count() > self.truncate_len {
                let shortened: String = s.chars().take(self.truncate_len).collect();
                return FormattedCell {
                    text: format!("{}...", shortened),
                    full_text: Some(s.clone()),
                    kind: CellKind::Truncated,
                    numeric: number.is_some(),
                    tone,
                };
            }
        }

        cell(value.to_string(), CellKind::Plain)
    }
}

/// Two decimals with an explicit sign for positive values
pub fn format_percentage(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

/// Dollar amounts: T/B/M suffix from one million up, grouped digits below
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    if magnitude >= 1e12 {
        format!("{}${:.2}T", sign, magnitude / 1e12)
    } else if magnitude >= 1e9 {
        format!("{}${:.2}B", sign, magnitude / 1e9)
    } else if magnitude >= CURRENCY_THRESHOLD {
        format!("{}${:.2}M", sign, magnitude / 1e6)
    } else {
        format!("{}${}", sign, group_thousands(magnitude))
    }
}

/// Thousands separators with at most three fraction digits
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
