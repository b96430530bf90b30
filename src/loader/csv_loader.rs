//! Local CSV to DataTable loader, for working without the upload backend

use crate::data::datatable::{DataColumn, DataRow, DataTable, DataValue};
use crate::error::LoadError;
use crate::loader::{check_extension, table_name_for, DatasetLoader};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CsvFileLoader;

impl CsvFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read CSV from any reader. Fields keep the text as written, blank fields
    /// become Null.
    /// Short rows are padded with Null, long rows are rejected.
    pub fn load_from_reader<R: std::io::Read>(
        reader: R,
        table_name: &str,
    ) -> Result<DataTable, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| LoadError::ParseFailure(e.to_string()))?
            .clone();

        let mut table = DataTable::new(table_name);
        for header in headers.iter() {
            table.add_column(DataColumn::new(header.trim()));
        }

        for result in reader.records() {
            let record = result.map_err(|e| LoadError::ParseFailure(e.to_string()))?;
            let mut values: Vec<DataValue> = record.iter().map(DataValue::from_raw_text).collect();
            if values.len() < headers.len() {
                values.resize(headers.len(), DataValue::Null);
            }
            table
                .add_row(DataRow::new(values))
                .map_err(LoadError::ParseFailure)?;
        }

        table.infer_column_types();

        info!(
            "CSV load complete: {} rows, {} columns",
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }
}

impl DatasetLoader for CsvFileLoader {
    fn check_input(&self, path: &Path) -> Result<(), LoadError> {
        check_extension(path, "csv")
            .map_err(|_| LoadError::WrongFormat(format!("Not a CSV file: {}", path.display())))
    }

    fn load(&self, path: &Path) -> Result<DataTable, LoadError> {
        self.check_input(path)?;

        info!("Loading CSV file {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| LoadError::ParseFailure(e.to_string()))?;
        Self::load_from_reader(file, &table_name_for(path))
    }
}
