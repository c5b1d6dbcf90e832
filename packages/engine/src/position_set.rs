//! Normalized sets of selected character ranges
//!
//! A [`TextPositionSet`] is always kept in normal form:
//! - selectors are sorted by start offset
//! - no two selectors overlap
//! - selectors separated by a gap of at most [`config::GAP_FUSION_WIDTH`]
//!   characters are fused into one
//!
//! Because of the normal form, structural equality of two sets is the same as
//! equality of the text they cover, and containment can be checked with a
//! single sorted sweep.
//!
//! # Examples
//!
//! ```
//! use provision_engine::position_set::TextPositionSet;
//!
//! let text = "Congress shall make no law respecting an establishment of religion";
//! let selection = TextPositionSet::from_quotes(text, ["Congress shall make no law", "religion"]).unwrap();
//! assert_eq!(selection.render(text), "Congress shall make no law…religion");
//! ```

use crate::config;
use crate::error::Result;
use crate::selector::{char_len, char_slice, Selector, TextPositionSelector};
use crate::sequence::TextSequence;
use serde::{Deserialize, Serialize};

/// Ordered, non-overlapping, gap-fused set of position selectors
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<TextPositionSelector>", into = "Vec<TextPositionSelector>")]
pub struct TextPositionSet {
    positions: Vec<TextPositionSelector>,
}

impl From<Vec<TextPositionSelector>> for TextPositionSet {
    fn from(positions: Vec<TextPositionSelector>) -> Self {
        Self::new(positions)
    }
}

impl From<TextPositionSet> for Vec<TextPositionSelector> {
    fn from(set: TextPositionSet) -> Self {
        set.positions
    }
}

impl From<TextPositionSelector> for TextPositionSet {
    fn from(selector: TextPositionSelector) -> Self {
        Self {
            positions: vec![selector],
        }
    }
}

impl FromIterator<TextPositionSelector> for TextPositionSet {
    fn from_iter<I: IntoIterator<Item = TextPositionSelector>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TextPositionSet {
    /// Build a normalized set from selectors in any order.
    pub fn new(mut positions: Vec<TextPositionSelector>) -> Self {
        positions.sort();
        let mut normalized: Vec<TextPositionSelector> = Vec::with_capacity(positions.len());
        for selector in positions {
            match normalized.last_mut() {
                Some(last) if selector.start() <= last.end().saturating_add(config::GAP_FUSION_WIDTH) => {
                    if selector.end() > last.end() {
                        *last = TextPositionSelector::new_unchecked(last.start(), selector.end());
                    }
                }
                _ => normalized.push(selector),
            }
        }
        Self {
            positions: normalized,
        }
    }

    /// Empty selection
    pub fn empty() -> Self {
        Self::default()
    }

    /// Selection of every character of `text` (empty if the text is empty).
    pub fn whole(text: &str) -> Self {
        let length = char_len(text);
        if length == 0 {
            return Self::empty();
        }
        TextPositionSelector::new_unchecked(0, length).into()
    }

    /// Resolve each quote or phrase against `text` in turn.
    ///
    /// # Errors
    ///
    /// Fails on the first phrase that is missing (`QuoteNotFound`)
    /// or occurs more than once (`AmbiguousQuote`).
    pub fn from_quotes<S, I>(text: &str, quotes: I) -> Result<Self>
    where
        S: Into<Selector>,
        I: IntoIterator<Item = S>,
    {
        Self::from_selectors(text, quotes)
    }

    /// Resolve quote or position selectors against `text`.
    ///
    /// Position selectors are checked against the text length
    /// (`SelectionOutOfRange`).
    pub fn from_selectors<S, I>(text: &str, selectors: I) -> Result<Self>
    where
        S: Into<Selector>,
        I: IntoIterator<Item = S>,
    {
        let positions = selectors
            .into_iter()
            .map(|selector| selector.into().resolve(text))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(positions))
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of disjoint spans after normalization
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextPositionSelector> {
        self.positions.iter()
    }

    pub fn positions(&self) -> &[TextPositionSelector] {
        &self.positions
    }

    /// End offset of the last span, or 0 if empty
    pub fn max_end(&self) -> usize {
        self.positions.last().map_or(0, TextPositionSelector::end)
    }

    /// Union of two selections, re-normalized.
    pub fn union(&self, other: &TextPositionSet) -> TextPositionSet {
        let mut positions = self.positions.clone();
        positions.extend(other.positions.iter().copied());
        Self::new(positions)
    }

    /// Whether every span of `other` is covered by this selection.
    pub fn implies(&self, other: &TextPositionSet) -> bool {
        let mut covering = self.positions.iter().peekable();
        'outer: for needed in &other.positions {
            while let Some(candidate) = covering.peek() {
                if candidate.contains(needed) {
                    continue 'outer;
                }
                if candidate.end() > needed.start() {
                    return false;
                }
                covering.next();
            }
            return false;
        }
        true
    }

    /// Whether the two selections cover exactly the same characters.
    pub fn means(&self, other: &TextPositionSet) -> bool {
        self == other
    }

    /// Whether any span of `other` overlaps or touches (within the fusion gap) a span of this set.
    pub fn overlaps(&self, other: &TextPositionSet) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.union(other).len() < self.len() + other.len()
    }

    /// Restrict the selection to `start..end`.
    pub fn limit(&self, start: usize, end: usize) -> TextPositionSet {
        let positions = self
            .positions
            .iter()
            .filter_map(|selector| {
                let clipped_start = selector.start().max(start);
                let clipped_end = selector.end().min(end);
                (clipped_start < clipped_end)
                    .then(|| TextPositionSelector::new_unchecked(clipped_start, clipped_end))
            })
            .collect();
        Self { positions }
    }

    /// Move every span `offset` characters later, saturating at `usize::MAX`.
    pub fn shift_forward(&self, offset: usize) -> TextPositionSet {
        let positions = self
            .positions
            .iter()
            .map(|s| {
                TextPositionSelector::new_unchecked(
                    s.start().saturating_add(offset),
                    s.end().saturating_add(offset),
                )
            })
            .collect();
        Self { positions }
    }

    /// Move every span `offset` characters earlier, dropping what falls before 0.
    pub fn shift_back(&self, offset: usize) -> TextPositionSet {
        self.limit(offset, usize::MAX).rebase(offset)
    }

    fn rebase(&self, offset: usize) -> TextPositionSet {
        let positions = self
            .positions
            .iter()
            .map(|s| TextPositionSelector::new_unchecked(s.start() - offset, s.end() - offset))
            .collect();
        Self { positions }
    }

    /// Split `text` into selected phrases and elided gaps.
    ///
    /// Gaps at the start or end of the text are included only if the
    /// selection does not reach that edge.
    pub fn text_sequence(&self, text: &str) -> TextSequence {
        let length = char_len(text);
        let mut phrases = Vec::with_capacity(self.positions.len() * 2 + 1);
        let mut cursor = 0;
        for selector in &self.positions {
            let start = selector.start().min(length);
            let end = selector.end().min(length);
            if start >= end {
                continue;
            }
            if start > cursor {
                phrases.push(None);
            }
            phrases.push(Some(char_slice(text, start, end).to_string()));
            cursor = end;
        }
        if cursor < length {
            phrases.push(None);
        }
        TextSequence::new(phrases)
    }

    /// Render the selected text, joining non-adjacent spans with an ellipsis.
    ///
    /// An empty selection renders as the full text.
    pub fn render(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        self.text_sequence(text).to_string()
    }
}

impl<'a> IntoIterator for &'a TextPositionSet {
    type Item = &'a TextPositionSelector;
    type IntoIter = std::slice::Iter<'a, TextPositionSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

impl std::fmt::Display for TextPositionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let spans: Vec<String> = self.positions.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", spans.join(", "))
    }
}
