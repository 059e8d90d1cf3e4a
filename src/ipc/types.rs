//! IPC request and response types.

use serde::{Deserialize, Serialize};

/// `generate_doc_header` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDocHeaderRequest {
    pub project_id: String,
    pub project_root: String,
    pub file_path: String,
    pub file_content: String,
}

/// `generate_doc_header` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDocHeaderResponse {
    /// Free-form header text; docsentry wraps it in the comment block and
    /// hashes the body itself.
    pub header: String,
}

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
    pub id: u64,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
