//! Search query validation

use serde::Deserialize;

use super::ValidationError;

/// Query string for `GET /api/items/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Non-blank search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: Option<&str>) -> Result<Self, ValidationError> {
        let term = raw.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(ValidationError::Missing {
                field: "search query",
            });
        }
        Ok(Self(term.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ILIKE pattern matching the term as a literal substring.
    ///
    /// `%`, `_` and `\` in the term are escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Case-insensitive substring test, same semantics as the ILIKE pattern.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_term() {
        assert!(SearchQuery::new(None).is_err());
        assert!(SearchQuery::new(Some("")).is_err());
        assert!(SearchQuery::new(Some("   ")).is_err());
    }

    #[test]
    fn trims_term() {
        let q = SearchQuery::new(Some("  foo ")).unwrap();
        assert_eq!(q.as_str(), "foo");
    }

    #[test]
    fn escapes_wildcards() {
        let q = SearchQuery::new(Some("50%_off\\")).unwrap();
        assert_eq!(q.like_pattern(), r"%50\%\_off\\%");
    }

    #[test]
    fn matches_case_insensitively() {
        let q = SearchQuery::new(Some("WiDg")).unwrap();
        assert!(q.matches("blue widget"));
        assert!(!q.matches("gadget"));
    }
}
