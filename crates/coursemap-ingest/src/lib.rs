// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod decode;

use coursemap_model::{CourseRecord, HeaderSchema};
use std::fmt::{Display, Formatter};

pub use decode::{decode_csv_rows, decode_workbook_rows, detect_format, SourceFormat};

pub const CRATE_NAME: &str = "coursemap-ingest";

/// Rows reported back to the caller as an upload preview.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug)]
pub struct IngestError(pub String);
impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for IngestError {}

/// The normalized output of one ingestion run. Record order is source row
/// order; the store assigns surrogate ids in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub records: Vec<CourseRecord>,
}

impl IngestOutcome {
    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn preview(&self) -> &[CourseRecord] {
        &self.records[..self.records.len().min(PREVIEW_ROWS)]
    }
}

/// Decodes and normalizes one uploaded dataset with the default header
/// dialect table. Any decode failure aborts before the caller touches the
/// store, so a malformed file can never leave a partial record set behind.
pub fn ingest_bytes(bytes: &[u8]) -> Result<IngestOutcome, IngestError> {
    ingest_bytes_with_schema(bytes, &HeaderSchema::default())
}

pub fn ingest_bytes_with_schema(
    bytes: &[u8],
    schema: &HeaderSchema,
) -> Result<IngestOutcome, IngestError> {
    let records = match detect_format(bytes) {
        SourceFormat::Json => serde_json::from_slice::<Vec<CourseRecord>>(bytes)
            .map_err(|e| IngestError(format!("invalid JSON dataset: {e}")))?,
        SourceFormat::Workbook => schema.normalize_all(&decode_workbook_rows(bytes)?),
        SourceFormat::Csv => schema.normalize_all(&decode_csv_rows(bytes)?),
    };
    Ok(IngestOutcome { records })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_upload_normalizes_through_the_uceap_dialect() {
        let csv = "\
Program(s),UCEAP Official Title,UCEAP Course Number,UCEAP Course Suffix,UCEAP Semester Units,UCEAP Subject Area(s)\n\
Rome,Roman History,101,A,3,\"Humanities, Arts\"\n\
Tokyo,Modern Japan,20,,4,Science\n";
        let outcome = ingest_bytes(csv.as_bytes()).expect("ingest csv");
        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.records[0].program, "Rome");
        assert_eq!(outcome.records[0].foreign_course_code, "UCEAP 101A");
        assert_eq!(outcome.records[0].aok, "Humanities, Arts");
        assert_eq!(outcome.records[1].foreign_course_code, "UCEAP 20");
        assert_eq!(outcome.records[1].foreign_credits, "4");
    }

    #[test]
    fn json_upload_accepts_course_record_arrays() {
        let json = r#"[
            {"program":"Rome","foreign_credits":"3","aok":"Humanities, Arts"},
            {"program":"Tokyo","foreign_credits":"4","aok":"Science"}
        ]"#;
        let outcome = ingest_bytes(json.as_bytes()).expect("ingest json");
        assert_eq!(outcome.total(), 2);
        assert_eq!(outcome.records[0].program, "Rome");
        assert_eq!(outcome.records[1].aok, "Science");
    }

    #[test]
    fn malformed_json_is_rejected_with_a_parse_error() {
        let err = ingest_bytes(b"[{\"program\": oops]").expect_err("must fail");
        assert!(err.0.contains("invalid JSON dataset"));
    }

    #[test]
    fn preview_is_bounded_to_five_records() {
        let records: Vec<CourseRecord> = (0..8)
            .map(|i| CourseRecord {
                program: format!("P{i}"),
                ..CourseRecord::default()
            })
            .collect();
        let outcome = IngestOutcome { records };
        assert_eq!(outcome.preview().len(), PREVIEW_ROWS);
        assert_eq!(outcome.preview()[0].program, "P0");
        let short = IngestOutcome {
            records: vec![CourseRecord::default()],
        };
        assert_eq!(short.preview().len(), 1);
    }
}
