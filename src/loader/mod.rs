//! Dataset sources
//!
//! A loader turns a file into a [`DataTable`] or a [`LoadError`]. The view
//! never sees partial results: either a whole table comes back or nothing.

pub mod csv_loader;
pub mod upload_client;

use crate::data::datatable::DataTable;
use crate::error::LoadError;
use std::path::Path;

pub use csv_loader::CsvFileLoader;
pub use upload_client::{parse_upload_response, UploadClient, UploadResponse};

/// Anything that can produce a dataset from a file
pub trait DatasetLoader {
    /// Cheap checks on the path alone, run before the load starts
    fn check_input(&self, _path: &Path) -> Result<(), LoadError> {
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<DataTable, LoadError>;
}

/// Reject files whose name does not end in `.{extension}`.
/// Runs before any I/O.
pub fn check_extension(path: &Path, extension: &str) -> Result<(), LoadError> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let accepted = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(&suffix));

    if accepted {
        Ok(())
    } else {
        Err(LoadError::wrong_format())
    }
}

/// Table name derived from the file stem
pub(crate) fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string()
}
