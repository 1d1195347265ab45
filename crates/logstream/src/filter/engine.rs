use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid search term: {0}")]
    InvalidTerm(String),
}

/// Case-insensitive literal substring search over entry messages.
pub struct SearchFilter {
    matcher: RegexMatcher,
}

impl SearchFilter {
    /// Build a filter for `term`. Returns `Ok(None)` when the term is empty
    /// or whitespace-only, which disables filtering.
    pub fn new(term: &str) -> Result<Option<Self>, FilterError> {
        if term.trim().is_empty() {
            return Ok(None);
        }

        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .multi_line(false)
            .build(&regex::escape(term))
            .map_err(|e| FilterError::InvalidTerm(e.to_string()))?;

        Ok(Some(Self { matcher }))
    }

    #[inline]
    pub fn matches(&self, message: &str) -> bool {
        self.matcher.is_match(message.as_bytes()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(term: &str) -> SearchFilter {
        SearchFilter::new(term)
            .expect("Failed to create filter")
            .expect("Filter should be enabled")
    }

    #[test]
    fn test_case_insensitive() {
        let f = filter("error");
        assert!(f.matches("Error: something"));
        assert!(f.matches("error: something"));
        assert!(f.matches("ERROR: something"));
        assert!(!f.matches("all good"));
    }

    #[test]
    fn test_unicode_case_folding() {
        let f = filter("größe");
        assert!(f.matches("Datei GRÖßE überschritten"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let f = filter("[warn] (disk)");
        assert!(f.matches("2025 [WARN] (disk) nearly full"));
        assert!(!f.matches("w disk"));

        let dot = filter("a.b");
        assert!(dot.matches("xa.by"));
        assert!(!dot.matches("axb"));
    }

    #[test]
    fn test_empty_term_disables_filtering() {
        assert!(SearchFilter::new("").unwrap().is_none());
        assert!(SearchFilter::new("   ").unwrap().is_none());
    }
}
