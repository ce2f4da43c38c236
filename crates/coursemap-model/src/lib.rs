#![forbid(unsafe_code)]
//! Coursemap model SSOT.

mod header;
mod record;

pub use header::{CourseCodePolicy, FieldPolicy, HeaderSchema, RawRow};
pub use record::{split_aok, CourseRecord, SortField};

pub const CRATE_NAME: &str = "coursemap-model";
