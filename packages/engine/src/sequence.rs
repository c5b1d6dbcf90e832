//! Rendered selections as sequences of phrases and elisions

use crate::config;
use serde::{Deserialize, Serialize};

/// Selected phrases in document order, with `None` standing for elided text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSequence(Vec<Option<String>>);

impl TextSequence {
    pub fn new(phrases: Vec<Option<String>>) -> Self {
        Self(phrases)
    }

    pub fn items(&self) -> &[Option<String>] {
        &self.0
    }

    /// Selected phrases only, without elisions
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|p| p.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.phrases().next().is_none()
    }

    fn trimmed_phrases(&self) -> Vec<&str> {
        self.phrases()
            .map(|p| p.trim().trim_matches(config::PHRASE_TRIM_CHARS).trim())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Whether the two sequences select the same phrases, ignoring edge punctuation.
    pub fn means(&self, other: &TextSequence) -> bool {
        self.trimmed_phrases() == other.trimmed_phrases()
    }

    /// Whether every phrase of `other` is contained, in order, in a phrase of this sequence.
    pub fn implies(&self, other: &TextSequence) -> bool {
        let ours = self.trimmed_phrases();
        let theirs = other.trimmed_phrases();
        if theirs.is_empty() {
            return true;
        }
        let mut index = 0;
        for needed in theirs {
            match ours[index..].iter().position(|p| p.contains(needed)) {
                Some(found) => index += found,
                None => return false,
            }
        }
        true
    }
}

impl std::fmt::Display for TextSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for phrase in &self.0 {
            match phrase {
                Some(text) => f.write_str(text)?,
                None => f.write_str(config::ELLIPSIS)?,
            }
        }
        Ok(())
    }
}
