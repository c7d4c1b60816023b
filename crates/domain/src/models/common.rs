//! Types shared by several endpoints.

use serde::{Deserialize, Serialize};

/// Plain `{ "message": ... }` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `page`, `limit` and `search` query parameters used by back-office lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl PageQuery {
    /// Search term trimmed, with blank input treated as absent.
    pub fn search_term(&self) -> Option<&str> {
        normalize_search(self.search.as_deref())
    }
}

/// Trims a free-text search and drops it when empty.
pub fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

/// Wraps a search term as an `ILIKE` pattern, escaping wildcards.
pub fn ilike_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(Some("  matrix ")), Some("matrix"));
    }

    #[test]
    fn test_ilike_pattern_escapes_wildcards() {
        assert_eq!(ilike_pattern("dune"), "%dune%");
        assert_eq!(ilike_pattern("100%"), "%100\\%%");
        assert_eq!(ilike_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_page_query_deserialize() {
        let q: PageQuery = serde_json::from_str(r#"{"page":2,"search":"x"}"#).unwrap();
        assert_eq!(q.page, Some(2));
        assert_eq!(q.limit, None);
        assert_eq!(q.search_term(), Some("x"));
    }
}
