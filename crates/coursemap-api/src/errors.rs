// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    MissingUploadFile,
    UploadParseFailed,
    StoreUnavailable,
    Internal,
}

/// Caller-visible error payload, rendered inside the `{"error": {...}}`
/// envelope. Every failure carries a human-readable message; nothing is
/// silently swallowed except the unknown-sort fallback, which is handled at
/// parameter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing_upload_file() -> Self {
        Self::new(ApiErrorCode::MissingUploadFile, "No file uploaded")
    }

    #[must_use]
    pub fn upload_parse_failed(detail: &str) -> Self {
        Self::new(
            ApiErrorCode::UploadParseFailed,
            format!("Failed to process file: {detail}"),
        )
    }

    #[must_use]
    pub fn store_unavailable(detail: &str) -> Self {
        Self::new(
            ApiErrorCode::StoreUnavailable,
            format!("Failed to update courses: {detail}"),
        )
    }

    #[must_use]
    pub fn internal(message: &str) -> Self {
        Self::new(ApiErrorCode::Internal, message)
    }
}
