use crate::data::datatable::{DataRow, DataValue};
use crate::error::ViewError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_EXPORT_FILENAME: &str = "stock_screener_data.csv";

/// Result of writing an export to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub row_count: usize,
}

/// CSV text for a view together with the number of data rows it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub text: String,
    pub row_count: usize,
}

/// Turns the current view into comma-separated text
pub struct DataExporter;

impl DataExporter {
    /// Header line followed by one line per row, in the order given.
    /// Fails with `EmptyExport` when there are no rows.
    pub fn rows_to_csv<'a, I>(columns: &[String], rows: I) -> Result<CsvExport, ViewError>
    where
        I: IntoIterator<Item = &'a DataRow>,
    {
        let mut lines = vec![columns
            .iter()
            .map(|name| Self::escape_csv_field(name))
            .collect::<Vec<_>>()
            .join(",")];

        for row in rows {
            let line = (0..columns.len())
                .map(|idx| Self::csv_field(row.get(idx)))
                .collect::<Vec<_>>()
                .join(",");
            lines.push(line);
        }

        let row_count = lines.len() - 1;
        if row_count == 0 {
            return Err(ViewError::EmptyExport);
        }

        Ok(CsvExport {
            text: lines.join("\n"),
            row_count,
        })
    }

    /// Write an export produced by [`rows_to_csv`](Self::rows_to_csv) to a file
    pub fn write_csv_file(path: &Path, export: &CsvExport) -> Result<ExportSummary> {
        fs::write(path, &export.text)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;

        info!("Exported {} rows to {}", export.row_count, path.display());

        Ok(ExportSummary {
            path: path.to_path_buf(),
            row_count: export.row_count,
        })
    }

    fn csv_field(value: Option<&DataValue>) -> String {
        match value {
            None | Some(DataValue::Null) => String::new(),
            Some(DataValue::String(s)) => Self::escape_csv_field(s),
            Some(other) => other.to_string(),
        }
    }

    /// Helper to escape CSV fields that contain special characters
    pub fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            // Escape quotes by doubling them and wrap field in quotes
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}
