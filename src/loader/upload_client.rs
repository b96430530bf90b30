use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::data::datatable::DataTable;
use crate::error::LoadError;
use crate::loader::{check_extension, table_name_for, DatasetLoader};

/// Body returned by the upload endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub preview: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub total_rows: Option<usize>,
}

/// Sends a spreadsheet to the backend and decodes the parsed rows
#[derive(Clone)]
pub struct UploadClient {
    upload_url: String,
    accepted_extension: String,
    client: Client,
}

impl UploadClient {
    pub fn new(config: &UploadConfig) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        Ok(Self {
            upload_url: config.upload_url(),
            accepted_extension: config.accepted_extension.clone(),
            client,
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl DatasetLoader for UploadClient {
    fn check_input(&self, path: &Path) -> Result<(), LoadError> {
        check_extension(path, &self.accepted_extension)
    }

    fn load(&self, path: &Path) -> Result<DataTable, LoadError> {
        self.check_input(path)?;

        info!("Uploading {} to {}", path.display(), self.upload_url);
        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|e| LoadError::ParseFailure(e.to_string()))?;

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        parse_upload_response(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &body,
            &table_name_for(path),
        )
    }
}

/// Decode the upload endpoint's answer into a table.
///
/// A non-2xx status is a transport error carrying code and reason. A body
/// with `success: false` is a backend error carrying the server's message.
pub fn parse_upload_response(
    status: u16,
    reason: &str,
    body: &str,
    fallback_name: &str,
) -> Result<DataTable, LoadError> {
    if !(200..300).contains(&status) {
        warn!("Upload failed with HTTP {} {}", status, reason);
        return Err(LoadError::Transport(format!("HTTP {}: {}", status, reason)));
    }

    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| LoadError::ParseFailure(e.to_string()))?;

    if !response.success {
        warn!("Backend rejected upload: {:?}", response.error);
        return Err(LoadError::backend(response.error));
    }

    let name = response
        .filename
        .as_deref()
        .map(|f| table_name_for(Path::new(f)))
        .unwrap_or_else(|| fallback_name.to_string());

    // Records are keyed by the header as sent; column names are trimmed later
    let mut table = DataTable::from_json_records(&name, &response.headers, &response.preview)
        .map_err(LoadError::ParseFailure)?;

    if let Some(total) = response.total_rows {
        table
            .metadata
            .insert("reported_rows".to_string(), total.to_string());
    }

    info!(
        "Upload parsed: {} columns, {} rows",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataValue;

    #[test]
    fn test_successful_response() {
        let body = r#"{
            "success": true,
            "filename": "screen.xlsx",
            "headers": [" Name ", "Price"],
            "preview": [{"Name": "A", "Price": 10}, {"Name": "B", "Price": ""}],
            "total_rows": 2
        }"#;

        let table = parse_upload_response(200, "OK", body, "upload").unwrap();
        assert_eq!(table.name, "screen");
        assert_eq!(table.column_names(), vec!["Name", "Price"]);
        assert_eq!(table.get_value_by_name(0, "Price"), Some(&DataValue::Integer(10)));
        assert_eq!(table.get_value_by_name(1, "Price"), Some(&DataValue::Null));
        assert_eq!(table.metadata.get("reported_rows"), Some(&"2".to_string()));
    }

    #[test]
    fn test_padded_header_keys_resolve() {
        let body = r#"{
            "success": true,
            "headers": [" Name ", "Price"],
            "preview": [{" Name ": "A", "Price": 1}]
        }"#;

        let table = parse_upload_response(200, "OK", body, "upload").unwrap();
        assert_eq!(table.column_names(), vec!["Name", "Price"]);
        assert_eq!(
            table.get_value_by_name(0, "Name"),
            Some(&DataValue::String("A".into()))
        );
    }

    #[test]
    fn test_http_error_is_transport() {
        let err = parse_upload_response(500, "Internal Server Error", "", "x").unwrap_err();
        assert_eq!(
            err,
            LoadError::Transport("HTTP 500: Internal Server Error".to_string())
        );
    }

    #[test]
    fn test_backend_error_message() {
        let body = r#"{"success": false, "error": "Error reading file: bad zip"}"#;
        let err = parse_upload_response(200, "OK", body, "x").unwrap_err();
        assert_eq!(err.to_string(), "Error reading file: bad zip");

        let err = parse_upload_response(200, "OK", "{}", "x").unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload file");
    }

    #[test]
    fn test_invalid_body_is_parse_failure() {
        let err = parse_upload_response(200, "OK", "<html>", "x").unwrap_err();
        assert!(matches!(err, LoadError::ParseFailure(_)));
    }

    #[test]
    fn test_wrong_extension_rejected_before_network() {
        let config = UploadConfig {
            // Nothing listens here; the check must fail first
            base_url: "http://127.0.0.1:9".to_string(),
            ..UploadConfig::default()
        };
        let client = UploadClient::new(&config).unwrap();
        let err = client.load(Path::new("data.csv")).unwrap_err();
        assert!(err.is_input_rejected());
    }
}
