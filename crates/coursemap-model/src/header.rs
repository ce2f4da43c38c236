// SPDX-License-Identifier: Apache-2.0

use crate::record::CourseRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One decoded spreadsheet row: source header name -> raw cell value.
pub type RawRow = BTreeMap<String, String>;

/// Priority-ordered candidate source headers for one output field. The first
/// present, non-empty value wins; otherwise the field stays empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldPolicy {
    pub header_keys: Vec<String>,
}

impl FieldPolicy {
    #[must_use]
    pub fn from_keys(header_keys: Vec<String>) -> Self {
        Self { header_keys }
    }

    #[must_use]
    pub fn resolve(&self, row: &RawRow) -> String {
        for key in &self.header_keys {
            if let Some(value) = row.get(key) {
                if !value.is_empty() {
                    return value.clone();
                }
            }
        }
        String::new()
    }
}

/// Resolution policy for the foreign course code. When the numeric
/// course-number header carries a value the code is synthesized as
/// `"<prefix> <number><suffix>"` (suffix appended with no separator, absent
/// suffix contributes nothing); only otherwise does the plain code header
/// apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CourseCodePolicy {
    pub prefix: String,
    pub number_key: String,
    pub suffix_key: String,
    pub fallback: FieldPolicy,
}

impl Default for CourseCodePolicy {
    fn default() -> Self {
        Self {
            prefix: "UCEAP".to_string(),
            number_key: "UCEAP Course Number".to_string(),
            suffix_key: "UCEAP Course Suffix".to_string(),
            fallback: FieldPolicy::from_keys(vec!["Foreign Course Code".to_string()]),
        }
    }
}

impl CourseCodePolicy {
    #[must_use]
    pub fn resolve(&self, row: &RawRow) -> String {
        match row.get(&self.number_key) {
            Some(number) if !number.is_empty() => {
                let suffix = row.get(&self.suffix_key).map_or("", String::as_str);
                format!("{} {}{}", self.prefix, number, suffix)
            }
            _ => self.fallback.resolve(row),
        }
    }
}

/// The full header-dialect table: one candidate list per output field. New
/// source dialects are supported by extending the lists, not by new code
/// paths. The default table covers the UCEAP export dialect and the legacy
/// Pace dialect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderSchema {
    pub program: FieldPolicy,
    pub foreign_course_title: FieldPolicy,
    pub foreign_course_code: CourseCodePolicy,
    pub foreign_credits: FieldPolicy,
    pub home_course_title: FieldPolicy,
    pub aok: FieldPolicy,
    pub home_course_code: FieldPolicy,
    pub course_notes: FieldPolicy,
    pub pace_school: FieldPolicy,
    pub pace_department: FieldPolicy,
}

impl Default for HeaderSchema {
    fn default() -> Self {
        let keys = |names: &[&str]| FieldPolicy::from_keys(names.iter().map(|n| n.to_string()).collect());
        Self {
            program: keys(&["Program(s)", "Study Abroad Program", "Country"]),
            foreign_course_title: keys(&["UCEAP Official Title", "Foreign Course Title"]),
            foreign_course_code: CourseCodePolicy::default(),
            foreign_credits: keys(&[
                "UCEAP Semester Units",
                "UCEAP Quarter Units",
                "Foreign Course Credits",
            ]),
            home_course_title: keys(&[
                "Host Institution Course Title",
                "Home Course Title Equivalent",
            ]),
            aok: keys(&["UCEAP Subject Area(s)", "AOK"]),
            home_course_code: keys(&[
                "Host Institution Course Number(s)",
                "Home Course Code Equivalent",
            ]),
            course_notes: keys(&["UCEAP Course Level", "Course Notes"]),
            pace_school: keys(&["Host Institution", "Pace School"]),
            pace_department: keys(&["Host Institution Department", "Pace Department"]),
        }
    }
}

impl HeaderSchema {
    /// Maps one raw row onto the fixed record schema. Unknown headers are
    /// ignored; unmatched fields stay empty.
    #[must_use]
    pub fn normalize(&self, row: &RawRow) -> CourseRecord {
        CourseRecord {
            program: self.program.resolve(row),
            foreign_course_title: self.foreign_course_title.resolve(row),
            foreign_course_code: self.foreign_course_code.resolve(row),
            foreign_credits: self.foreign_credits.resolve(row),
            home_course_title: self.home_course_title.resolve(row),
            aok: self.aok.resolve(row),
            home_course_code: self.home_course_code.resolve(row),
            course_notes: self.course_notes.resolve(row),
            pace_school: self.pace_school.resolve(row),
            pace_department: self.pace_department.resolve(row),
        }
    }

    #[must_use]
    pub fn normalize_all(&self, rows: &[RawRow]) -> Vec<CourseRecord> {
        rows.iter().map(|row| self.normalize(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn field_policy_takes_first_non_empty_candidate() {
        let policy = FieldPolicy::from_keys(vec![
            "Program(s)".to_string(),
            "Study Abroad Program".to_string(),
            "Country".to_string(),
        ]);
        assert_eq!(
            policy.resolve(&row(&[("Program(s)", "Rome"), ("Country", "Italy")])),
            "Rome"
        );
        assert_eq!(
            policy.resolve(&row(&[("Program(s)", ""), ("Country", "Italy")])),
            "Italy"
        );
        assert_eq!(policy.resolve(&row(&[("Unrelated", "x")])), "");
    }

    #[test]
    fn composite_code_is_synthesized_from_number_and_suffix() {
        let policy = CourseCodePolicy::default();
        assert_eq!(
            policy.resolve(&row(&[
                ("UCEAP Course Number", "101"),
                ("UCEAP Course Suffix", "A"),
            ])),
            "UCEAP 101A"
        );
        assert_eq!(
            policy.resolve(&row(&[("UCEAP Course Number", "101")])),
            "UCEAP 101"
        );
    }

    #[test]
    fn composite_code_wins_over_plain_code_header() {
        let policy = CourseCodePolicy::default();
        assert_eq!(
            policy.resolve(&row(&[
                ("UCEAP Course Number", "101"),
                ("Foreign Course Code", "HIST 1"),
            ])),
            "UCEAP 101"
        );
        assert_eq!(
            policy.resolve(&row(&[
                ("UCEAP Course Number", ""),
                ("Foreign Course Code", "HIST 1"),
            ])),
            "HIST 1"
        );
    }

    #[test]
    fn uceap_dialect_row_normalizes_onto_every_field() {
        let schema = HeaderSchema::default();
        let record = schema.normalize(&row(&[
            ("Program(s)", "Rome"),
            ("UCEAP Official Title", "Roman History"),
            ("UCEAP Course Number", "101"),
            ("UCEAP Course Suffix", "A"),
            ("UCEAP Semester Units", "3"),
            ("Host Institution Course Title", "World History I"),
            ("UCEAP Subject Area(s)", "Humanities, Arts"),
            ("Host Institution Course Number(s)", "HIS 113"),
            ("UCEAP Course Level", "Lower Division"),
            ("Host Institution", "Dyson"),
            ("Host Institution Department", "History"),
        ]));
        assert_eq!(record.program, "Rome");
        assert_eq!(record.foreign_course_title, "Roman History");
        assert_eq!(record.foreign_course_code, "UCEAP 101A");
        assert_eq!(record.foreign_credits, "3");
        assert_eq!(record.home_course_title, "World History I");
        assert_eq!(record.aok, "Humanities, Arts");
        assert_eq!(record.home_course_code, "HIS 113");
        assert_eq!(record.course_notes, "Lower Division");
        assert_eq!(record.pace_school, "Dyson");
        assert_eq!(record.pace_department, "History");
    }

    #[test]
    fn pace_dialect_row_normalizes_onto_every_field() {
        let schema = HeaderSchema::default();
        let record = schema.normalize(&row(&[
            ("Study Abroad Program", "Tokyo"),
            ("Foreign Course Title", "Modern Japan"),
            ("Foreign Course Code", "JPN 20"),
            ("Foreign Course Credits", "4"),
            ("Home Course Title Equivalent", "East Asian Studies"),
            ("AOK", "Science"),
            ("Home Course Code Equivalent", "EAS 201"),
            ("Course Notes", "Taught in English"),
            ("Pace School", "Seidenberg"),
            ("Pace Department", "Asian Studies"),
        ]));
        assert_eq!(record.program, "Tokyo");
        assert_eq!(record.foreign_course_title, "Modern Japan");
        assert_eq!(record.foreign_course_code, "JPN 20");
        assert_eq!(record.foreign_credits, "4");
        assert_eq!(record.home_course_title, "East Asian Studies");
        assert_eq!(record.aok, "Science");
        assert_eq!(record.home_course_code, "EAS 201");
        assert_eq!(record.course_notes, "Taught in English");
        assert_eq!(record.pace_school, "Seidenberg");
        assert_eq!(record.pace_department, "Asian Studies");
    }

    #[test]
    fn unknown_headers_are_ignored_and_missing_fields_stay_empty() {
        let schema = HeaderSchema::default();
        let record = schema.normalize(&row(&[
            ("Program(s)", "Rome"),
            ("Completely Unknown Column", "noise"),
        ]));
        assert_eq!(record.program, "Rome");
        assert_eq!(record.foreign_course_title, "");
        assert_eq!(record.foreign_course_code, "");
    }

    #[test]
    fn normalize_all_preserves_row_count_and_order() {
        let schema = HeaderSchema::default();
        let rows = vec![
            row(&[("Program(s)", "Rome")]),
            row(&[]),
            row(&[("Country", "Japan")]),
        ];
        let records = schema.normalize_all(&rows);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].program, "Rome");
        assert_eq!(records[1].program, "");
        assert_eq!(records[2].program, "Japan");
    }
}
