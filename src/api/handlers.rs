//! API request handlers
//!
//! Conversion endpoints answer with the shapes the web UI reads:
//! `{json, schema}` on decode success, the workbook bytes on encode success,
//! and `{error}` with a non-2xx status on any failure.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::BytesRejection, Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::server::AppState;
use crate::error::{BridgeError, BridgeResult, ErrorKind};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::parser::parse_encode_request;
use crate::types::{DecodeOutput, Document, WorkbookSchema};

/// Media type of the encode response body
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Multipart field carrying the uploaded workbook
pub const FILE_FIELD: &str = "file";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Standard API response wrapper for the informational endpoints
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }
}

/// Decode success body
#[derive(Serialize)]
pub struct DecodeResponse {
    pub json: Document,
    pub schema: WorkbookSchema,
    pub request_id: String,
}

/// Failure body
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub request_id: String,
}

/// A failed conversion, rendered as `{error}` with a status from its kind
#[derive(Debug)]
pub struct ApiError {
    pub error: BridgeError,
    pub status: StatusCode,
    pub request_id: String,
}

impl ApiError {
    pub fn new(error: BridgeError, request_id: impl Into<String>) -> Self {
        Self {
            status: status_for(error.kind()),
            error,
            request_id: request_id.into(),
        }
    }

    /// A request body that could not be read. Oversized bodies keep the
    /// 413 the extractor reported.
    pub fn unreadable_body(status: StatusCode, message: String) -> Self {
        let mut err = Self::from(BridgeError::Validation(message));
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            err.status = status;
        }
        err
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        Self::new(error, String::new())
    }
}

/// HTTP status for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Format | ErrorKind::Schema => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let message = self.error.to_string();
        if kind == ErrorKind::Internal {
            error!(request_id = %self.request_id, %kind, "{}", message);
        } else {
            warn!(request_id = %self.request_id, %kind, "{}", message);
        }
        let body = ErrorResponse {
            error: message,
            request_id: self.request_id,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Sheetbridge API Server".to_string(),
        version: state.version.clone(),
        description: "Excel ⟷ JSON conversion with automatic schema detection".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/excel-to-json",
                "POST",
                "Convert an uploaded workbook (multipart field 'file') to JSON with schema",
            ),
            EndpointInfo::new(
                "/api/json-to-excel",
                "POST",
                "Convert {json, format} to an .xlsx workbook",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["excel-to-json".to_string(), "json-to-excel".to_string()],
    }))
}

/// POST /api/excel-to-json - Decode an uploaded workbook
pub async fn excel_to_json(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let result: Result<DecodeOutput, ApiError> = async {
        let mut multipart = multipart.map_err(|e| {
            ApiError::unreadable_body(
                e.status(),
                format!("Expected a multipart upload: {}", e.body_text()),
            )
        })?;
        let bytes = read_file_field(&mut multipart).await?;
        info!(request_id = %request_id, size = bytes.len(), "decoding workbook");

        let options = state.options.clone();
        Ok(run_blocking(move || ExcelImporter::new(options).decode(&bytes)).await?)
    }
    .await;

    match result {
        Ok(output) => {
            info!(
                request_id = %request_id,
                sheets = output.document.len(),
                records = output.document.record_count(),
                "decoded workbook"
            );
            Json(DecodeResponse {
                json: output.document,
                schema: output.schema,
                request_id,
            })
            .into_response()
        }
        Err(e) => e.with_request_id(request_id).into_response(),
    }
}

/// POST /api/json-to-excel - Encode a Document into a workbook
pub async fn json_to_excel(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let result: Result<Vec<u8>, ApiError> = async {
        let body = body.map_err(|e| {
            ApiError::unreadable_body(
                e.status(),
                format!("Could not read request body: {}", e.body_text()),
            )
        })?;
        let request = parse_encode_request(&body)?;
        info!(
            request_id = %request_id,
            sheets = request.document.len(),
            records = request.document.record_count(),
            "encoding workbook"
        );

        let options = state.options.clone();
        Ok(run_blocking(move || {
            ExcelExporter::new(options).encode(&request.document, request.format.as_ref())
        })
        .await?)
    }
    .await;

    match result {
        Ok(bytes) => {
            info!(request_id = %request_id, size = bytes.len(), "encoded workbook");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"converted.xlsx\"".to_string(),
                    ),
                    (HeaderName::from_static(REQUEST_ID_HEADER), request_id),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => e.with_request_id(request_id).into_response(),
    }
}

/// Pull the bytes of the `file` field out of a multipart body
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::unreadable_body(
            e.status(),
            format!("Malformed multipart payload: {}", e.body_text()),
        )
    })? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map_err(|e| {
                ApiError::unreadable_body(
                    e.status(),
                    format!("Could not read uploaded file: {}", e.body_text()),
                )
            });
        }
    }
    Err(BridgeError::Validation(format!("missing multipart field '{}'", FILE_FIELD)).into())
}

/// Run CPU-bound conversion work on the blocking pool
async fn run_blocking<T, F>(task: F) -> BridgeResult<T>
where
    F: FnOnce() -> BridgeResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| BridgeError::Internal(format!("conversion task failed: {}", e)))?
}
