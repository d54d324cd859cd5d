//! Advisory hints for recurring toolchain misconfigurations.

use super::MessageStream;
use crate::config::KnownErrorConfig;
use crate::errors::ConfigurationError;
use regex::Regex;

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Pattern(Regex),
}

/// One recognisable failure and the hint to show for it.
#[derive(Debug, Clone)]
pub struct KnownErrorSignature {
    matcher: Matcher,
    hint: String,
}

impl KnownErrorSignature {
    /// Matches when the captured text contains `text`.
    #[must_use]
    pub fn literal(text: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Literal(text.into()),
            hint: hint.into(),
        }
    }

    /// Matches when the captured text matches `pattern`.
    pub fn pattern(pattern: &str, hint: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            matcher: Matcher::Pattern(Regex::new(pattern)?),
            hint: hint.into(),
        })
    }

    /// Returns the hint text.
    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Returns true if `text` shows this failure.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(needle) => text.contains(needle.as_str()),
            Matcher::Pattern(regex) => regex.is_match(text),
        }
    }
}

/// The set of signatures checked after a failed run.
#[derive(Debug, Clone)]
pub struct KnownErrors {
    signatures: Vec<KnownErrorSignature>,
}

impl Default for KnownErrors {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnownErrors {
    /// Creates an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// The signatures every session checks.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            signatures: vec![
                KnownErrorSignature::literal(
                    "No enum constant com.sun.tools.javac.main.Option.BOOT_CLASS_PATH",
                    "A tools.jar from JDK 8 or older is being used with JDK 9 or newer. \
                     Remove tools.jar from the inherited classpath or point the toolchain home at a matching JDK.",
                ),
                KnownErrorSignature::literal(
                    "Unable to find package java.",
                    "The toolchain cannot find the JDK class library. \
                     Set a toolchain home or enable classpath inheritance.",
                ),
            ],
        }
    }

    /// Adds one signature.
    #[must_use]
    pub fn with_signature(mut self, signature: KnownErrorSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Adds the regex signatures from configuration.
    pub fn with_config(mut self, entries: &[KnownErrorConfig]) -> Result<Self, ConfigurationError> {
        for entry in entries {
            let signature = KnownErrorSignature::pattern(&entry.pattern, entry.hint.clone())
                .map_err(|err| {
                    ConfigurationError::Invalid(format!(
                        "known error pattern '{}': {err}",
                        entry.pattern
                    ))
                })?;
            self.signatures.push(signature);
        }
        Ok(self)
    }

    /// Returns the hints whose signature appears in `text`.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<&str> {
        self.signatures
            .iter()
            .filter(|s| s.matches(text))
            .map(KnownErrorSignature::hint)
            .collect()
    }

    /// Appends a warning for every signature found in the stream's log.
    ///
    /// Returns the number of hints added.
    pub fn annotate(&self, messages: &MessageStream) -> usize {
        let log = messages.collect_log();
        let hints = self.scan(&log);
        for hint in &hints {
            messages.warn(hint);
        }
        hints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_literal_matches() {
        let known = KnownErrors::builtin();
        let hints = known.scan("error: Unable to find package java.lang in classpath");
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("JDK class library"));
    }

    #[test]
    fn test_no_match_no_hint() {
        assert!(KnownErrors::builtin().scan("all good").is_empty());
    }

    #[test]
    fn test_annotate_appends_warnings() {
        let messages = MessageStream::new();
        messages.append_raw("No enum constant com.sun.tools.javac.main.Option.BOOT_CLASS_PATH\n");
        let added = KnownErrors::builtin().annotate(&messages);

        assert_eq!(added, 1);
        assert!(messages.collect_log().contains("warning: A tools.jar"));
    }

    #[test]
    fn test_config_patterns() {
        let known = KnownErrors::empty()
            .with_config(&[KnownErrorConfig::new(r"OutOfMemoryError: \w+", "Raise the heap size.")])
            .unwrap();
        assert_eq!(known.scan("java.lang.OutOfMemoryError: Metaspace"), vec!["Raise the heap size."]);
    }

    #[test]
    fn test_invalid_config_pattern_is_rejected() {
        let err = KnownErrors::empty()
            .with_config(&[KnownErrorConfig::new("(", "x")])
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG-007-INVALID");
    }
}
