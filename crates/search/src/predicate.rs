use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// Compiled label test for one search request
#[derive(Debug, Clone)]
pub enum Predicate {
    Contains(String),
    /// Case-insensitive substring; the needle is stored lower-cased.
    ContainsIgnoreCase(String),
    Regex(Regex),
}

impl Predicate {
    pub fn compile(text: &str, case_sensitive: bool, is_regex: bool) -> Result<Self> {
        if is_regex {
            let regex = RegexBuilder::new(text)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| {
                    log::warn!("Couldn't compile regular expression {text:?}: {e}");
                    e
                })?;
            return Ok(Predicate::Regex(regex));
        }

        Ok(if case_sensitive {
            Predicate::Contains(text.to_string())
        } else {
            Predicate::ContainsIgnoreCase(text.to_lowercase())
        })
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            Predicate::Contains(needle) => label.contains(needle.as_str()),
            Predicate::ContainsIgnoreCase(needle) => label.to_lowercase().contains(needle.as_str()),
            Predicate::Regex(regex) => regex.is_match(label),
        }
    }
}
