//! Pagination, search, and sort for list queries.
//!
//! Sort columns are closed enums mapped to static SQL fragments, and search
//! terms are always bound parameters, so no caller-supplied text is ever
//! interpolated into SQL.

use serde::{Deserialize, Serialize};

use mb_core::enums::SortDirection;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// A 0-based page request. The size is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.page_size as u64
    }

    /// `LIMIT .. OFFSET ..` clause. Both values are integers, never user text.
    #[must_use]
    pub fn limit_clause(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.page_size, self.offset())
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total.div_ceil(u64::from(request.page_size)),
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sortable mentor columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorSort {
    #[default]
    LastName,
    FirstName,
    Email,
    CreatedAt,
}

impl MentorSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::LastName => "last_name COLLATE NOCASE",
            Self::FirstName => "first_name COLLATE NOCASE",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Sortable student columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentSort {
    #[default]
    LastName,
    FirstName,
    YearLevel,
    CreatedAt,
}

impl StudentSort {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::LastName => "last_name COLLATE NOCASE",
            Self::FirstName => "first_name COLLATE NOCASE",
            Self::YearLevel => "year_level",
            Self::CreatedAt => "created_at",
        }
    }
}

/// `ORDER BY` clause with a stable `id` tiebreaker.
#[must_use]
pub fn order_clause(column: &'static str, direction: SortDirection) -> String {
    format!("ORDER BY {column} {}, id ASC", direction.as_sql())
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Which records to include by archive state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFilter {
    #[default]
    Active,
    Archived,
    All,
}

impl ArchiveFilter {
    const fn condition(self) -> Option<&'static str> {
        match self {
            Self::Active => Some("end_date IS NULL"),
            Self::Archived => Some("end_date IS NOT NULL"),
            Self::All => None,
        }
    }
}

/// Escape `%`, `_`, and `\` and wrap in `%..%` for `LIKE .. ESCAPE '\'`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Accumulates `WHERE` conditions with positional parameters.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    conditions: Vec<String>,
    params: Vec<libsql::Value>,
}

impl WhereClause {
    /// Add a condition with one bound value. `{}` in `template` is replaced
    /// by the parameter placeholder.
    pub(crate) fn bind(&mut self, template: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        let placeholder = format!("?{}", self.params.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    pub(crate) fn raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    /// Search several columns with one term.
    pub(crate) fn search(&mut self, columns: &[&str], term: &str) {
        self.params.push(like_pattern(term).into());
        let idx = self.params.len();
        let ors: Vec<String> = columns
            .iter()
            .map(|c| format!("{c} LIKE ?{idx} ESCAPE '\\'"))
            .collect();
        self.conditions.push(format!("({})", ors.join(" OR ")));
    }

    pub(crate) fn archive(&mut self, filter: ArchiveFilter) {
        if let Some(cond) = filter.condition() {
            self.raw(cond);
        }
    }

    pub(crate) fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub(crate) fn params(&self) -> Vec<libsql::Value> {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).page_size, 1);
        assert_eq!(PageRequest::new(0, 5000).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
        assert_eq!(PageRequest::new(2, 10).limit_clause(), "LIMIT 10 OFFSET 20");
    }

    #[test]
    fn page_counts() {
        let page = Page::new(vec![1, 2], 41, PageRequest::new(0, 20));
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        let last = Page::new(vec![1], 41, PageRequest::new(2, 20));
        assert!(!last.has_next());
        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" jo "), "%jo%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn where_clause_numbers_params() {
        let mut w = WhereClause::default();
        w.bind("chapter_id = {}", "chp-1");
        w.archive(ArchiveFilter::Active);
        w.search(&["first_name", "last_name"], "ann");
        assert_eq!(
            w.sql(),
            "WHERE chapter_id = ?1 AND end_date IS NULL AND \
             (first_name LIKE ?2 ESCAPE '\\' OR last_name LIKE ?2 ESCAPE '\\')"
        );
        assert_eq!(w.params().len(), 2);
    }

    #[test]
    fn sort_columns_are_static() {
        assert_eq!(
            order_clause(MentorSort::Email.column(), SortDirection::Desc),
            "ORDER BY email DESC, id ASC"
        );
        let parsed: StudentSort = serde_json::from_str("\"year_level\"").unwrap();
        assert_eq!(parsed.column(), "year_level");
    }
}
