// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// One course equivalency mapping (foreign course -> home institution
/// equivalent). Every field is a string and defaults to empty, never
/// null/absent, so filter and search predicates stay total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourseRecord {
    pub program: String,
    pub foreign_course_title: String,
    pub foreign_course_code: String,
    pub foreign_credits: String,
    pub home_course_title: String,
    pub aok: String,
    pub home_course_code: String,
    pub course_notes: String,
    pub pace_school: String,
    pub pace_department: String,
}

/// Columns a catalog query may be ordered by. `course_notes` is free text and
/// is deliberately not sortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SortField {
    Program,
    ForeignCourseTitle,
    ForeignCourseCode,
    ForeignCredits,
    HomeCourseTitle,
    Aok,
    HomeCourseCode,
    PaceSchool,
    PaceDepartment,
}

impl SortField {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "program" => Some(Self::Program),
            "foreign_course_title" => Some(Self::ForeignCourseTitle),
            "foreign_course_code" => Some(Self::ForeignCourseCode),
            "foreign_credits" => Some(Self::ForeignCredits),
            "home_course_title" => Some(Self::HomeCourseTitle),
            "aok" => Some(Self::Aok),
            "home_course_code" => Some(Self::HomeCourseCode),
            "pace_school" => Some(Self::PaceSchool),
            "pace_department" => Some(Self::PaceDepartment),
            _ => None,
        }
    }

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::ForeignCourseTitle => "foreign_course_title",
            Self::ForeignCourseCode => "foreign_course_code",
            Self::ForeignCredits => "foreign_credits",
            Self::HomeCourseTitle => "home_course_title",
            Self::Aok => "aok",
            Self::HomeCourseCode => "home_course_code",
            Self::PaceSchool => "pace_school",
            Self::PaceDepartment => "pace_department",
        }
    }
}

/// Splits a raw delimiter-joined Area-of-Knowledge value into its trimmed,
/// non-empty fragments. The stored field stays joined; only facet computation
/// works at fragment granularity.
#[must_use]
pub fn split_aok(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
