// SPDX-License-Identifier: Apache-2.0

use coursemap_model::CourseRecord;
use serde::{Deserialize, Serialize};

/// Upload outcome reported to the administrator: imported count plus a
/// bounded preview of the first normalized records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadResponseDto {
    pub success: bool,
    pub message: String,
    pub preview: Vec<CourseRecord>,
    pub total: usize,
}

impl UploadResponseDto {
    #[must_use]
    pub fn imported(preview: Vec<CourseRecord>, total: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully imported {total} courses"),
            preview,
            total,
        }
    }
}
