use regex::{Regex, RegexBuilder};
use tgram_core::{Result, TgramError};

/// Case-insensitive regex matched anywhere in the subject (search, not full match).
/// Capture groups are never extracted; handlers get the raw subject.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`; invalid syntax is a [`TgramError::Pattern`].
    pub fn new(source: &str) -> Result<Self> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| TgramError::Pattern(format!("{}: {}", source, e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The literal pattern string as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the pattern occurs anywhere in `subject`.
    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}
