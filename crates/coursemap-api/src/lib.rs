// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod dto;
mod errors;
mod params;

pub use dto::UploadResponseDto;
pub use errors::{ApiError, ApiErrorCode};
pub use params::parse_course_query;

pub const CRATE_NAME: &str = "coursemap-api";
