//! Query matching over embedded text

use regex::{Regex, RegexBuilder};

/// A compiled, case-insensitive query
#[derive(Debug, Clone)]
pub enum QueryMatcher {
    /// Lowercased substring
    Literal(String),
    /// Regular expression compiled with case-insensitive matching
    Pattern(Regex),
}

impl QueryMatcher {
    /// Compile `query`
    ///
    /// In pattern mode the query is used as written, not escaped, so `a.b`
    /// also matches `axb`. Case folding is done by the regex engine rather
    /// than by lowercasing the pattern, which would turn `\D` into `\d`.
    pub fn new(query: &str, use_regex: bool) -> Result<Self, regex::Error> {
        if use_regex {
            let regex = RegexBuilder::new(query).case_insensitive(true).build()?;
            Ok(Self::Pattern(regex))
        } else {
            Ok(Self::Literal(query.to_lowercase()))
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
            Self::Pattern(regex) => regex.is_match(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_case_insensitive() {
        let matcher = QueryMatcher::new("cat", false).unwrap();
        assert!(matcher.is_match("The CAT sat."));
        assert!(!matcher.is_match("The dog sat."));

        let matcher = QueryMatcher::new("CAT", false).unwrap();
        assert!(matcher.is_match("concatenate"));
    }

    #[test]
    fn test_literal_treats_pattern_characters_literally() {
        let matcher = QueryMatcher::new("a.b", false).unwrap();
        assert!(matcher.is_match("see a.b here"));
        assert!(!matcher.is_match("see axb here"));
    }

    #[test]
    fn test_pattern_mode_is_unescaped() {
        let matcher = QueryMatcher::new("a.b", true).unwrap();
        assert!(matcher.is_match("see a.b here"));
        assert!(matcher.is_match("see axb here"));
        assert!(!matcher.is_match("see ab here"));
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let matcher = QueryMatcher::new(r"invoice\s+no\.?\s*\d+", true).unwrap();
        assert!(matcher.is_match("INVOICE No. 2231"));
        assert!(!matcher.is_match("invoice pending"));
    }

    #[test]
    fn test_uppercase_classes_keep_meaning() {
        let matcher = QueryMatcher::new(r"^\D+$", true).unwrap();
        assert!(matcher.is_match("letters only"));
        assert!(!matcher.is_match("room 101"));
    }

    #[test]
    fn test_unicode_case_folding() {
        let literal = QueryMatcher::new("zażółć", false).unwrap();
        assert!(literal.is_match("ZAŻÓŁĆ GĘŚLĄ JAŹŃ"));

        let pattern = QueryMatcher::new("gęśl.", true).unwrap();
        assert!(pattern.is_match("ZAŻÓŁĆ GĘŚLĄ JAŹŃ"));
    }

    #[test]
    fn test_empty_literal_matches_everything() {
        let matcher = QueryMatcher::new("", false).unwrap();
        assert!(matcher.is_match(""));
        assert!(matcher.is_match("anything"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(QueryMatcher::new("(unclosed", true).is_err());
        // The same text is fine as a literal
        assert!(QueryMatcher::new("(unclosed", false).is_ok());
    }
}
