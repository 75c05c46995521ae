//! Strings compared after trimming surrounding whitespace.
//!
//! Multi-line rule documents (ownership rules, fingerprinting rules) come
//! back from the Service without the trailing newline a heredoc adds.

use crate::attr::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrimmedString(String);

impl TrimmedString {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn semantic_eq(&self, other: &TrimmedString) -> bool {
        self.0.trim() == other.0.trim()
    }
}

impl From<&str> for TrimmedString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrimmedString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TrimmedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keep the prior text when it only differs from `fresh` by surrounding
/// whitespace.
#[must_use]
pub fn preserve_trimmed(prior: &Value<TrimmedString>, fresh: TrimmedString) -> TrimmedString {
    match prior.as_known() {
        Some(prior) if prior.semantic_eq(&fresh) => prior.clone(),
        _ => fresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_eq() {
        let a = TrimmedString::from("path:src/* #backend\n");
        let b = TrimmedString::from("path:src/* #backend");
        assert!(a.semantic_eq(&b));
        assert!(!a.semantic_eq(&TrimmedString::from("path:lib/* #backend")));
    }

    #[test]
    fn test_preserve() {
        let prior = Value::Known(TrimmedString::from("rule\n"));
        assert_eq!(
            preserve_trimmed(&prior, TrimmedString::from("rule")).as_str(),
            "rule\n"
        );
        assert_eq!(
            preserve_trimmed(&prior, TrimmedString::from("other")).as_str(),
            "other"
        );
    }
}
