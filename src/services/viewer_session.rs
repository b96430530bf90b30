use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::data::data_exporter::{DataExporter, ExportSummary};
use crate::data::data_view::DataView;
use crate::data::datatable::DataTable;
use crate::error::LoadError;
use crate::loader::DatasetLoader;

/// Which section of the screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for a file, possibly with an error message shown
    UploadPrompt,
    /// An upload is in flight; no second upload is accepted
    Loading,
    /// A dataset is loaded and the table is showing
    Data,
}

/// Presentation-side state around a [`DataView`]: the current phase, the
/// error region and upload gating.
#[derive(Debug)]
pub struct ViewerSession {
    view: DataView,
    phase: SessionPhase,
    error: Option<String>,
}

impl ViewerSession {
    pub fn new(view: DataView) -> Self {
        Self {
            view,
            phase: SessionPhase::UploadPrompt,
            error: None,
        }
    }

    pub fn view(&self) -> &DataView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut DataView {
        &mut self.view
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Message for the error region, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Show a message in the error region without changing phase
    pub fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.error = Some(message);
    }

    /// Enter the loading phase. Returns false while another upload is in flight.
    pub fn begin_upload(&mut self) -> bool {
        if self.phase == SessionPhase::Loading {
            warn!("Upload ignored: another upload is still in progress");
            return false;
        }
        self.phase = SessionPhase::Loading;
        self.error = None;
        true
    }

    /// Leave the loading phase with the loader's result. On failure the view
    /// is reset and the upload prompt comes back with the error message.
    pub fn finish_upload(&mut self, result: Result<DataTable, LoadError>) -> Result<(), LoadError> {
        match result {
            Ok(table) => {
                info!("Upload finished: {} rows", table.row_count());
                self.view.load(table);
                self.phase = SessionPhase::Data;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                warn!("Upload failed: {}", err);
                self.view.reset();
                self.phase = SessionPhase::UploadPrompt;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Run a loader synchronously through the loading phase.
    ///
    /// A path the loader rejects up front is reported without entering the
    /// loading phase, so any loaded dataset stays on screen.
    pub fn upload_with(&mut self, loader: &dyn DatasetLoader, path: &Path) -> Result<(), LoadError> {
        if let Err(err) = loader.check_input(path) {
            self.report_error(err.to_string());
            return Err(err);
        }
        if !self.begin_upload() {
            return Ok(());
        }
        let result = loader.load(path);
        self.finish_upload(result)
    }

    /// Write the whole view as CSV. An empty view is reported in the error
    /// region and nothing is written.
    pub fn export_to(&mut self, path: &Path) -> Result<ExportSummary> {
        let export = match self.view.export_csv() {
            Ok(export) => export,
            Err(err) => {
                self.report_error(err.to_string());
                return Err(err.into());
            }
        };
        DataExporter::write_csv_file(path, &export)
    }
}
