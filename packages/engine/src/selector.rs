//! Text selectors
//!
//! Two ways of pointing at a span of provision text:
//!
//! 1. **Position selector**: half-open character range `start..end`
//! 2. **Quote selector**: the exact phrase, optionally with the text
//!    immediately before (`prefix`) and after (`suffix`) it
//!
//! All offsets are counted in characters (Unicode scalar values), never bytes,
//! so that selections survive a round trip through JSON clients that index
//! strings differently.
//!
//! # Examples
//!
//! ```
//! use provision_engine::selector::{TextPositionSelector, TextQuoteSelector};
//!
//! let text = "A well regulated Militia, being necessary to the security of a free State";
//! let quote = TextQuoteSelector::new("well regulated Militia");
//! let position = quote.locate(text).unwrap();
//! assert_eq!(position, TextPositionSelector::new(2, 24).unwrap());
//! assert_eq!(position.text_in(text), "well regulated Militia");
//! ```

use crate::config;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Half-open character range within a text, `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPositionSelector")]
pub struct TextPositionSelector {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawPositionSelector {
    start: usize,
    end: usize,
}

impl TryFrom<RawPositionSelector> for TextPositionSelector {
    type Error = EngineError;

    fn try_from(raw: RawPositionSelector) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl TextPositionSelector {
    /// Create a selector for `start..end`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSelector` if `start >= end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidSelector { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a selector checked against the text it will be applied to.
    ///
    /// A missing `end` selects through the end of the text.
    pub fn from_text(text: &str, start: usize, end: Option<usize>) -> Result<Self> {
        let length = char_len(text);
        let end = end.unwrap_or(length);
        if end > length {
            return Err(EngineError::SelectionOutOfRange { start, end, length });
        }
        Self::new(start, end)
    }

    pub(crate) fn new_unchecked(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "selector {start}..{end} must not be empty");
        Self { start, end }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: selectors cannot be empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check that the selector fits inside a text of `length` characters.
    pub fn check_within(&self, length: usize) -> Result<()> {
        if self.end > length {
            return Err(EngineError::SelectionOutOfRange {
                start: self.start,
                end: self.end,
                length,
            });
        }
        Ok(())
    }

    /// Whether `other` lies entirely within this selector
    pub fn contains(&self, other: &TextPositionSelector) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The selected substring of `text` (clamped to the text length)
    pub fn text_in<'t>(&self, text: &'t str) -> &'t str {
        char_slice(text, self.start, self.end)
    }

    /// Express this selector as a quote with just enough context to be unique in `text`.
    pub fn as_quote(&self, text: &str) -> TextQuoteSelector {
        let chars: Vec<char> = text.chars().collect();
        let end = self.end.min(chars.len());
        let start = self.start.min(end);
        let exact: String = chars[start..end].iter().collect();

        let mut quote = TextQuoteSelector::new(exact);
        for width in 0..=config::MAX_QUOTE_CONTEXT {
            let prefix_start = start.saturating_sub(width);
            let suffix_end = (end + width).min(chars.len());
            quote.prefix = chars[prefix_start..start].iter().collect();
            quote.suffix = chars[end..suffix_end].iter().collect();
            if quote.locate(text).ok() == Some(*self) {
                break;
            }
            if prefix_start == 0 && suffix_end == chars.len() {
                break;
            }
        }
        quote
    }
}

impl std::fmt::Display for TextPositionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Phrase to find in a text, with optional surrounding context
///
/// An empty `exact` selects everything between the end of `prefix`
/// (or the start of the text) and the start of `suffix` (or the end of the text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextQuoteSelector {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub exact: String,
    #[serde(default)]
    pub suffix: String,
}

impl TextQuoteSelector {
    /// Create a quote selector for an exact phrase
    pub fn new(exact: impl Into<String>) -> Self {
        Self {
            prefix: String::new(),
            exact: exact.into(),
            suffix: String::new(),
        }
    }

    /// Require the phrase to be preceded by `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Require the phrase to be followed by `suffix`
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Resolve the quote to its unique position in `text`.
    ///
    /// # Errors
    ///
    /// - `EngineError::QuoteNotFound` if the phrase (with its context) does not occur
    /// - `EngineError::AmbiguousQuote` if it occurs more than once
    pub fn locate(&self, text: &str) -> Result<TextPositionSelector> {
        let matches = self.byte_matches(text);
        match matches.as_slice() {
            [] => Err(EngineError::QuoteNotFound {
                exact: self.describe(),
            }),
            [(start, end)] => Ok(TextPositionSelector::new_unchecked(
                byte_to_char(text, *start),
                byte_to_char(text, *end),
            )),
            _ => Err(EngineError::AmbiguousQuote {
                exact: self.describe(),
                matches: matches.len(),
            }),
        }
    }

    fn describe(&self) -> String {
        if self.exact.is_empty() {
            format!("{}…{}", self.prefix, self.suffix)
        } else {
            self.exact.clone()
        }
    }

    /// Byte ranges of every occurrence of the quote, overlapping occurrences included.
    fn byte_matches(&self, text: &str) -> Vec<(usize, usize)> {
        if self.exact.is_empty() {
            return self.byte_matches_between_context(text);
        }

        let mut result = Vec::new();
        let mut from = 0;
        while from <= text.len() {
            let Some(offset) = text[from..].find(&self.exact) else {
                break;
            };
            let start = from + offset;
            let end = start + self.exact.len();
            if text[..start].ends_with(&self.prefix) && text[end..].starts_with(&self.suffix) {
                result.push((start, end));
            }
            from = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
        result
    }

    fn byte_matches_between_context(&self, text: &str) -> Vec<(usize, usize)> {
        if self.prefix.is_empty() && self.suffix.is_empty() {
            return Vec::new();
        }

        let starts: Vec<usize> = if self.prefix.is_empty() {
            vec![0]
        } else {
            text.match_indices(&self.prefix)
                .map(|(i, p)| i + p.len())
                .collect()
        };

        starts
            .into_iter()
            .filter_map(|start| {
                let end = if self.suffix.is_empty() {
                    text.len()
                } else {
                    start + text[start..].find(&self.suffix)?
                };
                (end > start).then_some((start, end))
            })
            .collect()
    }
}

impl std::fmt::Display for TextQuoteSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}|{}|{}\"", self.prefix, self.exact, self.suffix)
    }
}

/// Any selector a caller may pass to build a selection
///
/// An object with `start` and `end` is always read as a position, so an
/// inverted range is rejected instead of being taken for an empty quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selector {
    /// Character range
    Position(TextPositionSelector),
    /// Quoted phrase
    Quote(TextQuoteSelector),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Position { start: usize, end: usize },
    Quote(TextQuoteSelector),
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawSelector::deserialize(deserializer)? {
            RawSelector::Position { start, end } => TextPositionSelector::new(start, end)
                .map(Selector::Position)
                .map_err(serde::de::Error::custom),
            RawSelector::Quote(quote) => Ok(Selector::Quote(quote)),
        }
    }
}

impl Selector {
    /// Resolve to a position selector valid for `text`.
    pub fn resolve(&self, text: &str) -> Result<TextPositionSelector> {
        match self {
            Selector::Position(position) => {
                position.check_within(char_len(text))?;
                Ok(*position)
            }
            Selector::Quote(quote) => quote.locate(text),
        }
    }
}

impl From<TextPositionSelector> for Selector {
    fn from(selector: TextPositionSelector) -> Self {
        Selector::Position(selector)
    }
}

impl From<TextQuoteSelector> for Selector {
    fn from(selector: TextQuoteSelector) -> Self {
        Selector::Quote(selector)
    }
}

impl From<&str> for Selector {
    fn from(exact: &str) -> Self {
        Selector::Quote(TextQuoteSelector::new(exact))
    }
}

impl From<String> for Selector {
    fn from(exact: String) -> Self {
        Selector::Quote(TextQuoteSelector::new(exact))
    }
}

impl From<&String> for Selector {
    fn from(exact: &String) -> Self {
        Selector::Quote(TextQuoteSelector::new(exact.as_str()))
    }
}

/// Length of `text` in characters
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Substring of `text` between two character offsets, clamped to the text
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = char_to_byte(text, start);
    let end_byte = char_to_byte(text, end).max(start_byte);
    &text[start_byte..end_byte]
}

fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}

fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
