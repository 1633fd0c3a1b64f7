//! Lazily compiled regular expressions for code-style fields.

use std::sync::OnceLock;

use regex::Regex;
use tracing::error;

/// A pattern that fails to compile matches nothing and is logged once.
pub(crate) struct CodePattern {
    pattern: &'static str,
    compiled: OnceLock<Option<Regex>>,
}

impl CodePattern {
    pub(crate) const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            compiled: OnceLock::new(),
        }
    }

    pub(crate) fn is_match(&self, value: &str) -> bool {
        self.compiled
            .get_or_init(|| match Regex::new(self.pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    error!(pattern = self.pattern, error = %e, "code pattern does not compile");
                    None
                }
            })
            .as_ref()
            .is_some_and(|re| re.is_match(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_pattern_matches_whole_value() {
        static TWO: CodePattern = CodePattern::new("^[A-Z]{2}$");
        assert!(TWO.is_match("CH"));
        assert!(!TWO.is_match("ch"));
        assert!(!TWO.is_match("CHE"));
    }

    #[test]
    fn broken_pattern_matches_nothing() {
        let broken = CodePattern::new("^[A-Z");
        assert!(!broken.is_match("A"));
        assert!(!broken.is_match(""));
    }
}
