#![forbid(unsafe_code)]

use coursemap_model::{split_aok, CourseRecord, SortField};
use rusqlite::{params_from_iter, types::Value, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const CRATE_NAME: &str = "coursemap-query";

/// Columns probed by the free-text search, in match order. Course notes are
/// deliberately excluded.
pub const SEARCH_COLUMNS: [&str; 5] = [
    "foreign_course_title",
    "foreign_course_code",
    "home_course_title",
    "home_course_code",
    "program",
];

const RECORD_COLUMNS: [&str; 10] = [
    "program",
    "foreign_course_title",
    "foreign_course_code",
    "foreign_credits",
    "home_course_title",
    "aok",
    "home_course_code",
    "course_notes",
    "pace_school",
    "pace_department",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything but the literal `desc` sorts ascending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "desc" {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    #[must_use]
    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One catalog query: every filter optional, all filters AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
    pub search: Option<String>,
    pub program: Option<String>,
    pub credits: Option<String>,
    pub aok: Option<String>,
    pub school: Option<String>,
    pub department: Option<String>,
    pub sort: Option<SortField>,
    pub order: SortOrder,
}

/// Distinct filterable values for populating filter UI options. `aoks` is the
/// one facet finer-grained than its stored field: raw values are split on
/// `,`/`;`, trimmed, deduplicated, and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOptions {
    pub programs: Vec<String>,
    pub credits: Vec<String>,
    pub aoks: Vec<String>,
    pub schools: Vec<String>,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogStats {
    pub total: u64,
    pub programs: u64,
}

#[derive(Debug)]
pub struct QueryError(pub String);

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for QueryError {}

/// Runs one filter/sort query against the current record set. Never mutates
/// the set; the result is a filtered, ordered subsequence.
pub fn query_courses(
    conn: &Connection,
    query: &CourseQuery,
) -> Result<Vec<CourseRecord>, QueryError> {
    let (sql, params) = build_sql(query);
    let mut stmt = conn.prepare(&sql).map_err(|e| QueryError(e.to_string()))?;
    let mapped = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(CourseRecord {
                program: row.get(0)?,
                foreign_course_title: row.get(1)?,
                foreign_course_code: row.get(2)?,
                foreign_credits: row.get(3)?,
                home_course_title: row.get(4)?,
                aok: row.get(5)?,
                home_course_code: row.get(6)?,
                course_notes: row.get(7)?,
                pace_school: row.get(8)?,
                pace_department: row.get(9)?,
            })
        })
        .map_err(|e| QueryError(e.to_string()))?;
    mapped
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| QueryError(e.to_string()))
}

fn build_sql(query: &CourseQuery) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT {} FROM courses", RECORD_COLUMNS.join(", "));
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(term));
        let group = SEARCH_COLUMNS
            .iter()
            .map(|column| format!("{column} LIKE ? ESCAPE '!'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        where_parts.push(format!("({group})"));
        for _ in 0..SEARCH_COLUMNS.len() {
            params.push(Value::Text(pattern.clone()));
        }
    }
    if let Some(program) = &query.program {
        where_parts.push("program = ?".to_string());
        params.push(Value::Text(program.clone()));
    }
    if let Some(credits) = &query.credits {
        where_parts.push("foreign_credits = ?".to_string());
        params.push(Value::Text(credits.clone()));
    }
    if let Some(aok) = &query.aok {
        // Containment against the raw joined field, tag boundaries included.
        where_parts.push("aok LIKE ? ESCAPE '!'".to_string());
        params.push(Value::Text(format!("%{}%", escape_like(aok))));
    }
    if let Some(school) = &query.school {
        where_parts.push("pace_school = ?".to_string());
        params.push(Value::Text(school.clone()));
    }
    if let Some(department) = &query.department {
        where_parts.push("pace_department = ?".to_string());
        params.push(Value::Text(department.clone()));
    }

    if !where_parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_parts.join(" AND "));
    }

    // Trailing id keeps equal keys in insertion order.
    match query.sort {
        Some(field) => sql.push_str(&format!(
            " ORDER BY {} COLLATE NOCASE {}, id ASC",
            field.column(),
            query.order.sql()
        )),
        None => sql.push_str(
            " ORDER BY program COLLATE NOCASE ASC, foreign_course_title COLLATE NOCASE ASC, id ASC",
        ),
    }

    (sql, params)
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Computes the distinct-value facets for the filter UI.
pub fn compute_filter_options(conn: &Connection) -> Result<FilterOptions, QueryError> {
    Ok(FilterOptions {
        programs: distinct_non_empty(conn, "program")?,
        credits: distinct_non_empty(conn, "foreign_credits")?,
        aoks: aok_facet(conn)?,
        schools: distinct_non_empty(conn, "pace_school")?,
        departments: distinct_non_empty(conn, "pace_department")?,
    })
}

fn distinct_non_empty(conn: &Connection, column: &str) -> Result<Vec<String>, QueryError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT {column} FROM courses WHERE {column} != '' ORDER BY {column}"
        ))
        .map_err(|e| QueryError(e.to_string()))?;
    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| QueryError(e.to_string()))?;
    values
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| QueryError(e.to_string()))
}

fn aok_facet(conn: &Connection) -> Result<Vec<String>, QueryError> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT aok FROM courses WHERE aok != ''")
        .map_err(|e| QueryError(e.to_string()))?;
    let raw = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| QueryError(e.to_string()))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| QueryError(e.to_string()))?;

    let mut fragments = BTreeSet::new();
    for joined in raw {
        for fragment in split_aok(&joined) {
            fragments.insert(fragment);
        }
    }
    Ok(fragments.into_iter().collect())
}

pub fn compute_stats(conn: &Connection) -> Result<CatalogStats, QueryError> {
    let total = conn
        .query_row("SELECT COUNT(*) FROM courses", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| QueryError(e.to_string()))?;
    let programs = conn
        .query_row(
            "SELECT COUNT(DISTINCT program) FROM courses WHERE program != ''",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|e| QueryError(e.to_string()))?;
    Ok(CatalogStats {
        total: total as u64,
        programs: programs as u64,
    })
}
