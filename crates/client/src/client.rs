//! Console HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers browse (environments → products → folders), dataset
//! preview/save, the staged analysis flow, both upload paths, pipeline
//! runs, and remote event logging.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use dataramp_config::{load_auth, Settings};
use dataramp_wizard::{
    FileSummary, IngestBackend, IngestContext, NewTablePlan, StepData, StepNumber,
    StructureReport, ValidationReport,
};

use crate::progress::{drive_progress, ProgressReader};

/// Files at or above this size go through the resumable upload path.
pub const RESUMABLE_THRESHOLD: u64 = 300 * 1024 * 1024;

/// Console API client (blocking).
#[derive(Clone)]
pub struct ConsoleClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
}

/// Error type for console operations.
#[derive(Debug)]
pub enum ApiError {
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// File I/O error
    Io(String),
    /// Server returned a validation error (4xx with message)
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Io(msg) => write!(f, "I/O error: {}", msg),
            ApiError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// A storage environment and its buckets.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub buckets: Vec<String>,
}

/// A data product (top-level folder in a bucket).
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ProductInfo {
    pub name: String,
    #[serde(default)]
    pub table_count: Option<u64>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// A table folder under a product.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct TableEntry {
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Latest dataset of a table, as the preview endpoint returns it.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct DatasetPreview {
    pub headers: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl ConsoleClient {
    /// Create a client from saved settings and (optionally) saved auth.
    pub fn from_saved_config() -> Self {
        let settings = Settings::load();
        let auth = load_auth();
        let api_base = auth
            .as_ref()
            .and_then(|a| a.api_base.clone())
            .unwrap_or(settings.api_base);
        Self::new(api_base, auth.map(|a| a.token))
    }

    /// Create a client with an explicit base URL and optional token.
    pub fn new(api_base: String, token: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("dramp/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Test constructor: point at a mock server, no auth.
    pub fn with_base_url(api_base: &str) -> Self {
        Self::new(api_base.to_string(), None)
    }

    // ── Browse ──────────────────────────────────────────────────────

    /// List storage environments and their buckets.
    pub fn environments(&self) -> Result<Vec<Environment>, ApiError> {
        let url = format!("{}/api/storage/environments", self.api_base);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// List data products in a bucket.
    pub fn products(&self, env_id: &str, bucket: &str) -> Result<Vec<ProductInfo>, ApiError> {
        let url = format!(
            "{}/api/storage/products?env_id={}&bucket_name={}",
            self.api_base, env_id, bucket
        );
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// List table folders under a product.
    pub fn folders(
        &self,
        env_id: &str,
        bucket: &str,
        product: &str,
    ) -> Result<Vec<TableEntry>, ApiError> {
        let url = format!(
            "{}/api/storage/folders/{}?env_id={}&bucket_name={}",
            self.api_base, product, env_id, bucket
        );
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    // ── Datasets ────────────────────────────────────────────────────

    /// Fetch the latest dataset of a table for grid editing.
    pub fn preview_latest(
        &self,
        env_id: &str,
        bucket: &str,
        product: &str,
        table: &str,
    ) -> Result<DatasetPreview, ApiError> {
        let url = format!(
            "{}/api/storage/products/{}/{}/preview-latest?env_id={}&bucket_name={}",
            self.api_base, product, table, env_id, bucket
        );
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Persist edited rows as the table's new dataset.
    /// Returns the server's confirmation message.
    pub fn save_dataset(
        &self,
        env_id: &str,
        bucket: &str,
        product: &str,
        table: &str,
        rows: &[serde_json::Map<String, serde_json::Value>],
    ) -> Result<String, ApiError> {
        let url = format!("{}/api/storage/products/save-data", self.api_base);
        let body = serde_json::json!({
            "env_id": env_id,
            "bucket_name": bucket,
            "product": product,
            "table": table,
            "rows": rows,
        });
        let resp = self.post_json(&url, &body)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(json["message"]
            .as_str()
            .unwrap_or("Data saved")
            .to_string())
    }

    // ── Staged analysis ─────────────────────────────────────────────

    /// Run one analysis step for a file being ingested.
    pub fn analyze_step(
        &self,
        step: StepNumber,
        ctx: &IngestContext,
        is_new_table: bool,
    ) -> Result<StepData, ApiError> {
        let url = format!("{}/api/storage/analyze", self.api_base);
        let file = File::open(&ctx.file_path).map_err(|e| ApiError::Io(e.to_string()))?;
        let len = file
            .metadata()
            .map_err(|e| ApiError::Io(e.to_string()))?
            .len();
        let file_name = file_name_of(&ctx.file_path);

        let part = reqwest::blocking::multipart::Part::reader_with_length(file, len)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::Io(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("step", step.as_u8().to_string())
            .text("env_id", ctx.env_id.clone())
            .text("bucket_name", ctx.bucket_name.clone())
            .text("destination", ctx.destination())
            .text("is_new_table", is_new_table.to_string());

        let resp = self.post_multipart(&url, form)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        parse_step(step, ctx, json)
    }

    // ── Uploads ─────────────────────────────────────────────────────

    /// Small-file path: single multipart POST, body streamed with
    /// progress. Table metadata and schema ride along in new-table
    /// mode.
    pub fn upload_small(
        &self,
        ctx: &IngestContext,
        new_table: Option<&NewTablePlan>,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, ApiError> {
        let url = format!("{}/api/storage/upload", self.api_base);
        let file = File::open(&ctx.file_path).map_err(|e| ApiError::Io(e.to_string()))?;
        let len = file
            .metadata()
            .map_err(|e| ApiError::Io(e.to_string()))?
            .len();
        let file_name = file_name_of(&ctx.file_path);

        let sent = Arc::new(AtomicU64::new(0));
        let reader = ProgressReader::new(file, Arc::clone(&sent));

        let part = reqwest::blocking::multipart::Part::reader_with_length(reader, len)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::Io(e.to_string()))?;
        let mut form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("env_id", ctx.env_id.clone())
            .text("bucket_name", ctx.bucket_name.clone())
            .text("destination", ctx.destination());

        if let Some(plan) = new_table {
            let schema =
                serde_json::to_string(&plan.schema).map_err(|e| ApiError::Parse(e.to_string()))?;
            let descriptions = serde_json::to_string(&plan.metadata.column_descriptions)
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            form = form
                .text("table_description", plan.metadata.table_description.clone())
                .text("column_descriptions", descriptions)
                .text("schema", schema);
        }

        drive_progress(Arc::clone(&sent), len, on_progress, || {
            let resp = self.post_multipart(&url, form)?;
            let json: serde_json::Value =
                resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
            Ok(json["message"]
                .as_str()
                .unwrap_or("File uploaded")
                .to_string())
        })
    }

    /// Open a resumable upload session; returns the session URL.
    pub fn initiate_resumable_upload(
        &self,
        ctx: &IngestContext,
        file_name: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}/api/storage/initiate-resumable-upload", self.api_base);
        let body = serde_json::json!({
            "env_id": ctx.env_id,
            "bucket_name": ctx.bucket_name,
            "destination": ctx.destination(),
            "file_name": file_name,
        });
        let resp = self.post_json(&url, &body)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        json["session_url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ApiError::Parse("Missing session_url in response".into()))
    }

    /// Stream the file body to a resumable session URL. The session
    /// URL is pre-signed; no bearer token is attached.
    pub fn upload_via_session(
        &self,
        session_url: &str,
        path: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<(), ApiError> {
        let file = File::open(path).map_err(|e| ApiError::Io(e.to_string()))?;
        let len = file
            .metadata()
            .map_err(|e| ApiError::Io(e.to_string()))?
            .len();

        let sent = Arc::new(AtomicU64::new(0));
        let reader = ProgressReader::new(file, Arc::clone(&sent));

        drive_progress(Arc::clone(&sent), len, on_progress, || {
            let response = self
                .http
                .put(session_url)
                .header("Content-Type", "application/octet-stream")
                .body(reqwest::blocking::Body::sized(reader, len))
                .send()
                .map_err(|e| ApiError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            if !response.status().is_success() {
                let body = response.text().unwrap_or_default();
                return Err(ApiError::Http(status, body));
            }
            Ok(())
        })
    }

    /// Upload a file, choosing the path by size: multipart below the
    /// 300 MB threshold, resumable session at or above it.
    pub fn upload_auto(
        &self,
        ctx: &IngestContext,
        new_table: Option<&NewTablePlan>,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, ApiError> {
        let len = std::fs::metadata(&ctx.file_path)
            .map_err(|e| ApiError::Io(e.to_string()))?
            .len();

        if !needs_resumable(len) {
            return self.upload_small(ctx, new_table, on_progress);
        }

        let file_name = file_name_of(&ctx.file_path);
        let session_url = self.initiate_resumable_upload(ctx, &file_name)?;
        self.upload_via_session(&session_url, &ctx.file_path, on_progress)?;
        Ok(format!("File {} uploaded", file_name))
    }

    // ── Pipeline and logging ────────────────────────────────────────

    /// Trigger reprocessing of a product. Returns the job message.
    pub fn run_pipeline(&self, product: &str, project_id: Option<&str>) -> Result<String, ApiError> {
        let url = format!("{}/api/pipeline/run", self.api_base);
        let mut body = serde_json::json!({ "product": product });
        if let Some(id) = project_id {
            body["project_id"] = serde_json::Value::String(id.to_string());
        }
        let resp = self.post_json(&url, &body)?;
        let json: serde_json::Value = resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(json["message"]
            .as_str()
            .unwrap_or("Pipeline started")
            .to_string())
    }

    /// Ship a structured event to the remote log sink.
    /// `level` is one of "info", "warning", "error".
    pub fn log_event(
        &self,
        level: &str,
        message: &str,
        fields: serde_json::Value,
    ) -> Result<(), ApiError> {
        let url = format!("{}/api/logs/{}", self.api_base, level);
        let body = serde_json::json!({
            "message": message,
            "fields": fields,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        self.post_json(&url, &body)?;
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response)
    }

    fn post_multipart(
        &self,
        url: &str,
        form: reqwest::blocking::multipart::Form,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let mut req = self.http.post(url).multipart(form);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response)
    }

    fn check(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            if status == 422 || status == 400 {
                return Err(ApiError::Validation(body));
            }
            return Err(ApiError::Http(status, body));
        }
        Ok(response)
    }
}

impl IngestBackend for ConsoleClient {
    type Error = ApiError;

    fn analyze(
        &mut self,
        step: StepNumber,
        ctx: &IngestContext,
        is_new_table: bool,
    ) -> Result<StepData, ApiError> {
        self.analyze_step(step, ctx, is_new_table)
    }

    fn upload(
        &mut self,
        ctx: &IngestContext,
        new_table: Option<&NewTablePlan>,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, ApiError> {
        self.upload_auto(ctx, new_table, on_progress)
    }
}

// ── Free functions ──────────────────────────────────────────────────

pub(crate) fn needs_resumable(byte_size: u64) -> bool {
    byte_size >= RESUMABLE_THRESHOLD
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string())
}

fn parse_step(
    step: StepNumber,
    ctx: &IngestContext,
    json: serde_json::Value,
) -> Result<StepData, ApiError> {
    match step {
        StepNumber::One => {
            let mut summary: FileSummary =
                serde_json::from_value(json).map_err(|e| ApiError::Parse(e.to_string()))?;
            // The endpoint describes the file only; destination
            // context comes from the session.
            if summary.product.is_none() {
                summary.product = Some(ctx.product_name.clone());
            }
            if summary.dataset.is_none() {
                summary.dataset = Some(ctx.table_name.clone());
            }
            Ok(StepData::Summary(summary))
        }
        StepNumber::Two => {
            let report: StructureReport =
                serde_json::from_value(json).map_err(|e| ApiError::Parse(e.to_string()))?;
            Ok(StepData::Structure(report))
        }
        StepNumber::Three => {
            let report: ValidationReport =
                serde_json::from_value(json).map_err(|e| ApiError::Parse(e.to_string()))?;
            Ok(StepData::Validation(report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;

    fn ctx_for(path: &Path) -> IngestContext {
        IngestContext {
            env_id: "pd".into(),
            bucket_name: "raw-zone".into(),
            product_name: "sales".into(),
            table_name: "orders".into(),
            file_path: path.to_path_buf(),
        }
    }

    #[test]
    fn test_environments() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/storage/environments");
            then.status(200).json_body(serde_json::json!([
                { "id": "pd", "name": "Production", "buckets": ["raw-zone", "curated-zone"] },
                { "id": "ds", "name": "Development" }
            ]));
        });

        let client = ConsoleClient::with_base_url(&server.base_url());
        let envs = client.environments().unwrap();

        mock.assert();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].buckets, vec!["raw-zone", "curated-zone"]);
        assert!(envs[1].buckets.is_empty());
    }

    #[test]
    fn test_bearer_token_attached_when_present() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/storage/environments")
                .header("authorization", "Bearer tok-xyz");
            then.status(200).json_body(serde_json::json!([]));
        });

        let client = ConsoleClient::new(server.base_url(), Some("tok-xyz".into()));
        client.environments().unwrap();
        mock.assert();
    }

    #[test]
    fn test_preview_latest() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/storage/products/sales/orders/preview-latest")
                .query_param("env_id", "pd")
                .query_param("bucket_name", "raw-zone");
            then.status(200).json_body(serde_json::json!({
                "headers": ["id", "name"],
                "rows": [ { "id": 1, "name": "ana" }, { "id": 2, "name": null } ]
            }));
        });

        let client = ConsoleClient::with_base_url(&server.base_url());
        let preview = client
            .preview_latest("pd", "raw-zone", "sales", "orders")
            .unwrap();
        assert_eq!(preview.headers, vec!["id", "name"]);
        assert_eq!(preview.rows.len(), 2);
        assert!(preview.rows[1]["name"].is_null());
    }

    #[test]
    fn test_save_dataset_validation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/storage/products/save-data");
            then.status(422).body("rows do not match table schema");
        });

        let client = ConsoleClient::with_base_url(&server.base_url());
        let err = client
            .save_dataset("pd", "raw-zone", "sales", "orders", &[])
            .unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("schema")),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_step_two_parses_structure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/storage/analyze");
            then.status(200).json_body(serde_json::json!({
                "column_count": 2,
                "record_count": 40,
                "columns": [ { "name": "id", "kind": "Number" }, { "name": "name", "kind": "Text" } ],
                "preview": [ { "id": 1, "name": "ana" } ]
            }));
        });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name\n1,ana").unwrap();

        let client = ConsoleClient::with_base_url(&server.base_url());
        let data = client
            .analyze_step(StepNumber::Two, &ctx_for(file.path()), false)
            .unwrap();
        match data {
            StepData::Structure(report) => {
                assert_eq!(report.column_count, 2);
                assert_eq!(report.record_count, 40);
                assert_eq!(report.columns[0].name, "id");
                assert_eq!(report.preview.len(), 1);
            }
            other => panic!("expected Structure, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_step_one_injects_destination_context() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/storage/analyze");
            then.status(200).json_body(serde_json::json!({
                "file_name": "orders.csv",
                "size": "1.2 MB",
                "file_type": "CSV",
                "upload_date": "27-08-2026",
                "upload_time": "10:15"
            }));
        });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name").unwrap();

        let client = ConsoleClient::with_base_url(&server.base_url());
        let data = client
            .analyze_step(StepNumber::One, &ctx_for(file.path()), false)
            .unwrap();
        match data {
            StepData::Summary(summary) => {
                assert_eq!(summary.product.as_deref(), Some("sales"));
                assert_eq!(summary.dataset.as_deref(), Some("orders"));
            }
            other => panic!("expected Summary, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_small_reports_progress() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/storage/upload");
            then.status(200)
                .json_body(serde_json::json!({ "message": "File orders.csv uploaded" }));
        });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'x'; 64 * 1024]).unwrap();

        let client = ConsoleClient::with_base_url(&server.base_url());
        let mut seen: Vec<u8> = Vec::new();
        let msg = client
            .upload_small(&ctx_for(file.path()), None, &mut |pct| seen.push(pct))
            .unwrap();

        assert_eq!(msg, "File orders.csv uploaded");
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_resumable_flow() {
        let server = MockServer::start();
        let initiate = server.mock(|when, then| {
            when.method(POST).path("/api/storage/initiate-resumable-upload");
            then.status(200).json_body(serde_json::json!({
                "session_url": format!("{}/session/abc", server.base_url())
            }));
        });
        let put = server.mock(|when, then| {
            when.method(PUT).path("/session/abc");
            then.status(200);
        });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();

        let client = ConsoleClient::with_base_url(&server.base_url());
        let ctx = ctx_for(file.path());
        let session_url = client
            .initiate_resumable_upload(&ctx, "orders.csv")
            .unwrap();
        let mut seen = Vec::new();
        client
            .upload_via_session(&session_url, file.path(), &mut |pct| seen.push(pct))
            .unwrap();

        initiate.assert();
        put.assert();
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(!needs_resumable(RESUMABLE_THRESHOLD - 1));
        assert!(needs_resumable(RESUMABLE_THRESHOLD));
        assert!(needs_resumable(RESUMABLE_THRESHOLD + 1));
    }

    #[test]
    fn test_log_event() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/logs/error");
            then.status(200).json_body(serde_json::json!({ "status": "ok" }));
        });

        let client = ConsoleClient::with_base_url(&server.base_url());
        client
            .log_event(
                "error",
                "upload failed",
                serde_json::json!({ "product": "sales" }),
            )
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_run_pipeline() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/pipeline/run");
            then.status(200)
                .json_body(serde_json::json!({ "message": "Pipeline started for sales" }));
        });

        let client = ConsoleClient::with_base_url(&server.base_url());
        let msg = client.run_pipeline("sales", Some("proj-1")).unwrap();
        assert_eq!(msg, "Pipeline started for sales");
    }
}
