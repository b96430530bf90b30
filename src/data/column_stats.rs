use crate::data::datatable::DataTable;
use tracing::debug;

/// Summary of the numeric values found in one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistic {
    pub column_name: String,
    pub column_index: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub sum: f64,
    /// Number of numeric-parseable values the summary covers
    pub numeric_count: usize,
    /// Number of empty cells in the column
    pub empty_count: usize,
}

/// Statistics for every column holding at least one numeric value, in
/// column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatistics {
    columns: Vec<ColumnStatistic>,
}

impl ColumnStatistics {
    pub fn get(&self, column_name: &str) -> Option<&ColumnStatistic> {
        self.columns.iter().find(|s| s.column_name == column_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnStatistic> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Calculate statistics for a single column.
/// Returns None when no value in the column reads as a number.
pub fn calculate_column_statistic(table: &DataTable, column_index: usize) -> Option<ColumnStatistic> {
    let column = table.columns.get(column_index)?;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut numeric_count = 0;
    let mut empty_count = 0;

    for row in &table.rows {
        let Some(value) = row.get(column_index) else {
            continue;
        };
        if value.is_empty() {
            empty_count += 1;
            continue;
        }
        if let Some(num) = value.as_number() {
            min = min.min(num);
            max = max.max(num);
            sum += num;
            numeric_count += 1;
        }
    }

    if numeric_count == 0 {
        return None;
    }

    Some(ColumnStatistic {
        column_name: column.name.clone(),
        column_index,
        min,
        max,
        average: sum / numeric_count as f64,
        sum,
        numeric_count,
        empty_count,
    })
}

/// Calculate statistics for all numeric columns of a table
pub fn calculate_table_statistics(table: &DataTable) -> ColumnStatistics {
    let columns: Vec<ColumnStatistic> = (0..table.column_count())
        .filter_map(|idx| calculate_column_statistic(table, idx))
        .collect();

    debug!(
        "Computed statistics for {} of {} columns in '{}'",
        columns.len(),
        table.column_count(),
        table.name
    );

    ColumnStatistics { columns }
}
