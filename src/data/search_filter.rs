use crate::data::datatable::{DataRow, DataValue};

/// Case-insensitive substring search across every column of a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    normalized: String,
}

impl SearchTerm {
    pub fn new(term: &str) -> Self {
        Self {
            normalized: term.to_lowercase(),
        }
    }

    /// The lowercased term
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// An empty term filters nothing
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// A row matches when any cell's text contains the term.
    /// Missing values never match.
    pub fn matches(&self, row: &DataRow) -> bool {
        if self.is_empty() {
            return true;
        }
        row.values.iter().any(|value| self.matches_value(value))
    }

    fn matches_value(&self, value: &DataValue) -> bool {
        match value {
            DataValue::Null => false,
            DataValue::String(s) => s.to_lowercase().contains(&self.normalized),
            other => other.to_string().to_lowercase().contains(&self.normalized),
        }
    }
}
