use coursemap_model::SortField;
use coursemap_query::{CourseQuery, SortOrder};
use std::collections::BTreeMap;

/// Maps a request query string onto a catalog query. Empty-valued parameters
/// count as absent (the filter UI submits empty strings for untouched
/// controls). An unrecognized `sort` column is ignored, not an error: the
/// default ordering applies.
#[must_use]
pub fn parse_course_query(query: &BTreeMap<String, String>) -> CourseQuery {
    let non_empty = |key: &str| query.get(key).filter(|value| !value.is_empty()).cloned();
    CourseQuery {
        search: non_empty("search"),
        program: non_empty("program"),
        credits: non_empty("credits"),
        aok: non_empty("aok"),
        school: non_empty("school"),
        department: non_empty("department"),
        sort: query.get("sort").and_then(|raw| SortField::parse(raw)),
        order: query
            .get("order")
            .map_or(SortOrder::Asc, |raw| SortOrder::parse(raw)),
    }
}
