//! The HTTP capability (spec §6, "api-call / verify-api-response /
//! get-api-response"): a small external collaborator distinct from `Page`,
//! since API steps don't require a live browser tab at all.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// One API call's outcome, closed over by `VerifyApiResponse`/`GetApiResponse`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: JsonValue,
}

/// The HTTP client capability the executor consumes for `api-call` and its
/// related assertion/query kinds.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn call(&self, method: &str, url: &str, body: Option<JsonValue>) -> Result<ApiResponse>;
}
