use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Represents the data type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Text,
    Integer,
    Float,
    Null,
    Mixed, // Numbers and text in the same column
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return DataType::Null;
        }

        if trimmed.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if parse_number(trimmed).is_some() {
            return DataType::Float;
        }

        DataType::Text
    }

    /// Merge two types (for columns with mixed types)
    pub fn merge(&self, other: &DataType) -> DataType {
        if self == other {
            return *self;
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => *t,
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                DataType::Float
            }
            _ => DataType::Mixed,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

/// Parse a string as a finite number, ignoring surrounding whitespace.
/// Empty strings and non-finite spellings ("NaN", "inf") are not numbers.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Column metadata and definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
    pub null_count: usize,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Null,
            null_count: 0,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// A single cell value in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl DataValue {
    /// Build a value from raw text, typing numbers and mapping blanks to Null
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return DataValue::Null;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return DataValue::Integer(i);
        }

        match parse_number(trimmed) {
            Some(f) => DataValue::Float(f),
            None => DataValue::String(trimmed.to_string()),
        }
    }

    /// Keep text exactly as written; only blank fields become Null.
    /// Numeric readings still come from [`as_number`](Self::as_number).
    pub fn from_raw_text(s: &str) -> Self {
        if s.trim().is_empty() {
            DataValue::Null
        } else {
            DataValue::String(s.to_string())
        }
    }

    /// Null and the empty string both mark a missing value
    pub fn is_empty(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Numeric reading of the value, parsing text when needed
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) if f.is_finite() => Some(*f),
            DataValue::Float(_) => None,
            DataValue::String(s) => parse_number(s),
            DataValue::Null => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::String(_) => DataType::Text,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::Null => DataType::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Null => write!(f, ""),
        }
    }
}

/// A row of data in the table, one value per column in column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub values: Vec<DataValue>,
}

impl DataRow {
    pub fn new(values: Vec<DataValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The loaded dataset: ordered columns plus rows in source order.
/// Replaced wholesale on every load, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
    pub metadata: HashMap<String, String>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> Result<(), String> {
        if row.len() != self.columns.len() {
            return Err(format!(
                "Row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get column names as a vector
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Infer and update column types based on data
    pub fn infer_column_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            let mut inferred_type = DataType::Null;
            let mut null_count = 0;

            for row in &self.rows {
                if let Some(value) = row.get(col_idx) {
                    if value.is_empty() {
                        null_count += 1;
                    } else {
                        let value_type = match value {
                            DataValue::String(text) => DataType::infer_from_string(text),
                            other => other.data_type(),
                        };
                        inferred_type = inferred_type.merge(&value_type);
                    }
                }
            }

            column.data_type = inferred_type;
            column.null_count = null_count;
        }
    }

    /// Get a value at specific row and column
    pub fn get_value(&self, row: usize, col: usize) -> Option<&DataValue> {
        self.rows.get(row)?.get(col)
    }

    /// Get a value by row index and column name
    pub fn get_value_by_name(&self, row: usize, col_name: &str) -> Option<&DataValue> {
        let col_idx = self.get_column_index(col_name)?;
        self.get_value(row, col_idx)
    }

    /// Build a table from a header list and JSON record objects.
    /// Values are looked up by the header as given, then by its trimmed form;
    /// keys missing from a record become Null. Column names are trimmed.
    pub fn from_json_records(
        name: &str,
        headers: &[String],
        records: &[JsonValue],
    ) -> Result<Self, String> {
        debug!(
            "Converting {} JSON records into table '{}'",
            records.len(),
            name
        );

        let mut table = DataTable::new(name);
        for header in headers {
            table.add_column(DataColumn::new(header.trim()));
        }

        for (idx, record) in records.iter().enumerate() {
            let obj = record
                .as_object()
                .ok_or_else(|| format!("Record {} is not an object", idx))?;

            let values = headers
                .iter()
                .map(|header| {
                    obj.get(header)
                        .or_else(|| obj.get(header.trim()))
                        .map(json_value_to_data_value)
                        .unwrap_or(DataValue::Null)
                })
                .collect();

            table.add_row(DataRow::new(values))?;
        }

        table.infer_column_types();
        table
            .metadata
            .insert("total_rows".to_string(), table.row_count().to_string());

        debug!(
            "Created table with {} columns and {} rows",
            table.column_count(),
            table.row_count()
        );

        Ok(table)
    }
}

/// Convert a JSON scalar into a cell value
fn json_value_to_data_value(json: &JsonValue) -> DataValue {
    match json {
        JsonValue::Null => DataValue::Null,
        JsonValue::Bool(b) => DataValue::String(b.to_string()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                DataValue::Float(f)
            } else {
                DataValue::String(n.to_string())
            }
        }
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                DataValue::Null
            } else {
                DataValue::String(trimmed.to_string())
            }
        }
        JsonValue::Array(_) | JsonValue::Object(_) => DataValue::String(json.to_string()),
    }
}
