//! Comparing and combining passages
//!
//! Two passages are compared in the full-text offset space of whichever node is
//! the ancestor (or either node, if they share a path). The descendant's
//! selection is translated by the descendant's offset when the ancestor tree
//! contains it with identical text; otherwise each selected phrase is located
//! again in the ancestor's text.
//!
//! Passages on unrelated branches, or whose phrases cannot be located in the
//! other's text, are compared by their selected phrases instead.

use crate::error::{EngineError, Result};
use crate::passage::Passage;
use crate::position_set::TextPositionSet;
use crate::selector::{TextPositionSelector, TextQuoteSelector};
use crate::uri::PathRelation;

/// Selection of `inner` expressed in `outer`'s full text.
///
/// `inner` must be at `outer`'s path or below it. Nothing selected in `inner`
/// stands for all of its text.
fn align(outer: &Passage, inner: &Passage) -> Result<TextPositionSet> {
    match inner.path().relation_to(outer.path()) {
        PathRelation::Same | PathRelation::Descendant => {}
        PathRelation::Ancestor | PathRelation::Unrelated => {
            return Err(EngineError::IncompatibleNodes {
                left: outer.path().to_string(),
                right: inner.path().to_string(),
            })
        }
    }

    let selection = inner.effective_selection();
    match outer.node().find_with_offset(inner.path()) {
        Some((offset, found)) if found.text() == inner.text() => {
            return Ok(selection.shift_forward(offset));
        }
        Some(_) => {}
        None => {
            if let Some(link) = outer.node().link_covering(inner.path()) {
                return Err(EngineError::UnexpandedNode(link.to_string()));
            }
        }
    }

    tracing::debug!(
        outer = %outer.path(),
        inner = %inner.path(),
        "Text differs between versions, locating selected phrases again"
    );
    let positions = selection
        .iter()
        .map(|selector| reanchor(outer.text(), selector.as_quote(inner.text())))
        .collect::<Result<Vec<_>>>()?;
    Ok(TextPositionSet::new(positions))
}

/// Locate a quote in another text, dropping its context if the context no longer matches.
fn reanchor(text: &str, quote: TextQuoteSelector) -> Result<TextPositionSelector> {
    match quote.locate(text) {
        Ok(position) => Ok(position),
        Err(err) if quote.prefix.is_empty() && quote.suffix.is_empty() => Err(err),
        Err(_) => TextQuoteSelector::new(quote.exact).locate(text),
    }
}

/// Both selections in the offset space of the outermost node, `(a, b)` order kept.
fn shared_space(a: &Passage, b: &Passage) -> Result<(TextPositionSet, TextPositionSet)> {
    match a.path().relation_to(b.path()) {
        PathRelation::Same | PathRelation::Ancestor => Ok((a.effective_selection(), align(a, b)?)),
        PathRelation::Descendant => Ok((align(b, a)?, b.effective_selection())),
        PathRelation::Unrelated => Err(EngineError::IncompatibleNodes {
            left: a.path().to_string(),
            right: b.path().to_string(),
        }),
    }
}

/// Whether `a` selects at least all the text `b` selects.
pub fn implies(a: &Passage, b: &Passage) -> bool {
    match shared_space(a, b) {
        Ok((left, right)) => left.implies(&right),
        Err(_) => a.text_sequence().implies(&b.text_sequence()),
    }
}

/// Whether `a` and `b` select the same text.
pub fn means(a: &Passage, b: &Passage) -> bool {
    match shared_space(a, b) {
        Ok((left, right)) => left.means(&right),
        Err(_) => a.text_sequence().means(&b.text_sequence()),
    }
}

/// Whether `a` implies `b` and selects more than `b`.
pub fn strictly_implies(a: &Passage, b: &Passage) -> bool {
    implies(a, b) && !means(a, b)
}

/// Whether the selections overlap or touch within the gap-fusion width.
///
/// Always false for passages that cannot be placed in a shared offset space.
pub fn overlaps(a: &Passage, b: &Passage) -> bool {
    shared_space(a, b).is_ok_and(|(left, right)| left.overlaps(&right))
}

/// Merge two passages into one passage at the outer node.
///
/// # Errors
///
/// - `IncompatibleNodes` if neither path is the other or its ancestor
/// - `IncompatibleDates` if the two versions were never in force at the same time
/// - `UnexpandedNode` if the outer tree holds the inner path only as a link
/// - `QuoteNotFound` / `AmbiguousQuote` if a phrase from a differing version
///   cannot be located in the outer text
pub fn combine(a: &Passage, b: &Passage) -> Result<Passage> {
    let (outer, inner) = match a.path().relation_to(b.path()) {
        PathRelation::Same | PathRelation::Ancestor => (a, b),
        PathRelation::Descendant => (b, a),
        PathRelation::Unrelated => {
            return Err(EngineError::IncompatibleNodes {
                left: a.path().to_string(),
                right: b.path().to_string(),
            })
        }
    };

    if !outer.node().validity_overlaps(inner.node()) {
        return Err(EngineError::IncompatibleDates {
            left: outer.node().describe_validity(),
            right: inner.node().describe_validity(),
        });
    }

    let aligned = align(outer, inner)?;
    let selection = outer.effective_selection();
    if selection.implies(&aligned) {
        return Ok(outer.clone());
    }
    outer.select_set(selection.union(&aligned))
}

impl Passage {
    /// See [`implies`]
    pub fn implies(&self, other: &Passage) -> bool {
        implies(self, other)
    }

    /// See [`means`]
    pub fn means(&self, other: &Passage) -> bool {
        means(self, other)
    }

    /// See [`strictly_implies`]
    pub fn strictly_implies(&self, other: &Passage) -> bool {
        strictly_implies(self, other)
    }

    /// See [`combine`]
    pub fn combine(&self, other: &Passage) -> Result<Passage> {
        combine(self, other)
    }
}
