//! Numeric range filters and the filter panel state that feeds them
//!
//! A [`FilterSpec`] maps column names to inclusive numeric bounds. The
//! [`FilterPanel`] holds one control per filterable column, seeded from the
//! column statistics, and produces a spec from the enabled controls.

use crate::data::column_stats::ColumnStatistics;
use crate::data::datatable::{DataRow, DataTable};
use crate::error::ViewError;
use std::collections::BTreeMap;

/// Inclusive bounds for one column. A missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Active per-column range constraints, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    ranges: BTreeMap<String, ColumnRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, column: impl Into<String>, range: ColumnRange) -> Self {
        self.insert(column, range);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, range: ColumnRange) {
        self.ranges.insert(column.into(), range);
    }

    pub fn remove(&mut self, column: &str) -> Option<ColumnRange> {
        self.ranges.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnRange> {
        self.ranges.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of columns with an active range
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnRange)> {
        self.ranges.iter()
    }

    /// Check every range against the table, resolving names to indices
    pub fn compile(&self, table: &DataTable) -> Result<CompiledFilter, ViewError> {
        let mut ranges = Vec::with_capacity(self.ranges.len());
        for (column, range) in &self.ranges {
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(ViewError::InvalidRange {
                        column: column.clone(),
                        min,
                        max,
                    });
                }
            }
            let index = table
                .get_column_index(column)
                .ok_or_else(|| ViewError::UnknownColumn(column.clone()))?;
            ranges.push((index, *range));
        }
        Ok(CompiledFilter { ranges })
    }
}

/// A filter spec resolved against a particular table
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    ranges: Vec<(usize, ColumnRange)>,
}

impl CompiledFilter {
    /// A row passes when every filtered column holds a number inside its range.
    /// Values that do not read as numbers fail any filter on their column.
    pub fn matches(&self, row: &DataRow) -> bool {
        self.ranges.iter().all(|(index, range)| {
            row.get(*index)
                .and_then(|value| value.as_number())
                .is_some_and(|n| range.contains(n))
        })
    }
}

/// UI state for one filterable column
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub column: String,
    pub enabled: bool,
    pub min: f64,
    pub max: f64,
    /// Column bounds from the statistics, restored on clear
    pub data_min: f64,
    pub data_max: f64,
    pub average: f64,
}

/// One control per numeric column except the identifier column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPanel {
    controls: Vec<FilterControl>,
}

impl FilterPanel {
    pub fn from_statistics(stats: &ColumnStatistics, identifier_column: &str) -> Self {
        let controls = stats
            .iter()
            .filter(|stat| !stat.column_name.eq_ignore_ascii_case(identifier_column))
            .map(|stat| FilterControl {
                column: stat.column_name.clone(),
                enabled: false,
                min: stat.min,
                max: stat.max,
                data_min: stat.min,
                data_max: stat.max,
                average: stat.average,
            })
            .collect();
        Self { controls }
    }

    pub fn controls(&self) -> &[FilterControl] {
        &self.controls
    }

    pub fn control(&self, column: &str) -> Option<&FilterControl> {
        self.controls.iter().find(|c| c.column == column)
    }

    fn control_mut(&mut self, column: &str) -> Result<&mut FilterControl, ViewError> {
        self.controls
            .iter_mut()
            .find(|c| c.column == column)
            .ok_or_else(|| ViewError::UnknownColumn(column.to_string()))
    }

    pub fn set_enabled(&mut self, column: &str, enabled: bool) -> Result<(), ViewError> {
        self.control_mut(column)?.enabled = enabled;
        Ok(())
    }

    /// Set the bounds of a column and enable its filter
    pub fn set_bounds(&mut self, column: &str, min: f64, max: f64) -> Result<(), ViewError> {
        if min > max {
            return Err(ViewError::InvalidRange {
                column: column.to_string(),
                min,
                max,
            });
        }
        let control = self.control_mut(column)?;
        control.min = min;
        control.max = max;
        control.enabled = true;
        Ok(())
    }

    /// Spec built from the enabled controls only
    pub fn to_spec(&self) -> FilterSpec {
        self.controls
            .iter()
            .filter(|c| c.enabled)
            .fold(FilterSpec::new(), |spec, c| {
                spec.with_range(c.column.clone(), ColumnRange::between(c.min, c.max))
            })
    }

    /// Disable every control and restore its bounds to the column range
    pub fn reset(&mut self) {
        for control in &mut self.controls {
            control.enabled = false;
            control.min = control.data_min;
            control.max = control.data_max;
        }
    }

    pub fn active_count(&self) -> usize {
        self.controls.iter().filter(|c| c.enabled).count()
    }
}

/// Status line shown next to the filter panel
pub fn filter_status(active_filters: usize, rows_shown: usize) -> String {
    format!(
        "{} active filters — {} rows shown",
        active_filters, rows_shown
    )
}
