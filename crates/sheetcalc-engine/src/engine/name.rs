//! Variable and cell name rules.
//!
//! A name is a letter or underscore followed by letters, digits or
//! underscores. Callers may narrow the namespace further with [`NameRules`]:
//! a normalizer applied to every name before it is stored or compared, and a
//! validity predicate every normalized name must satisfy.
//!
//! ```ignore
//! let rules = NameRules::new(|s| s.to_uppercase(), |s| s.len() <= 3);
//! assert_eq!(rules.normalize("a1"), "A1");
//! assert!(rules.is_valid("A1"));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("name regex must compile")
    })
}

/// Whether `name` matches the base identifier grammar.
pub fn is_identifier(name: &str) -> bool {
    name_re().is_match(name)
}

type Normalizer = Box<dyn Fn(&str) -> String + Send + Sync>;
type Validator = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Normalizer and validity predicate shared by formulas and cell names.
pub struct NameRules {
    normalize: Normalizer,
    is_valid: Validator,
}

impl NameRules {
    pub fn new(
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
        is_valid: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        NameRules {
            normalize: Box::new(normalize),
            is_valid: Box::new(is_valid),
        }
    }

    /// Canonical form of `name`.
    pub fn normalize(&self, name: &str) -> String {
        (self.normalize)(name)
    }

    /// Caller-supplied restriction, applied to normalized names.
    pub fn is_valid(&self, name: &str) -> bool {
        (self.is_valid)(name)
    }

    /// Normalize `name` and accept it only if the result is an identifier
    /// that passes the validity predicate.
    pub fn accept(&self, name: &str) -> Option<String> {
        let normalized = self.normalize(name);
        (is_identifier(&normalized) && self.is_valid(&normalized)).then_some(normalized)
    }
}

impl Default for NameRules {
    fn default() -> Self {
        NameRules::new(str::to_string, |_| true)
    }
}

impl fmt::Debug for NameRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameRules").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_grammar() {
        for ok in ["a", "_", "A1", "x_23", "_tmp", "abcDEF09"] {
            assert!(is_identifier(ok), "{ok}");
        }
        for bad in ["", "1a", "a b", "a-b", "a1 ", "é"] {
            assert!(!is_identifier(bad), "{bad}");
        }
    }

    #[test]
    fn test_default_rules_are_identity() {
        let rules = NameRules::default();
        assert_eq!(rules.normalize("aBc"), "aBc");
        assert!(rules.is_valid("anything"));
        assert_eq!(rules.accept("x1").as_deref(), Some("x1"));
        assert_eq!(rules.accept("1x"), None);
    }

    #[test]
    fn test_accept_checks_normalized_form() {
        // normalizing into something that is not an identifier is rejected
        let rules = NameRules::new(|s| format!("{s}!"), |_| true);
        assert_eq!(rules.accept("a"), None);

        let rules = NameRules::new(|s| s.to_uppercase(), |s| s.starts_with('A'));
        assert_eq!(rules.accept("a1").as_deref(), Some("A1"));
        assert_eq!(rules.accept("b1"), None);
    }
}
