//! Passages: a provision plus the part of its text that is in play
//!
//! A [`Passage`] shares its [`ProvisionNode`] subtree and carries a normalized
//! selection over the node's full text (own content followed by descendants).
//! Every operation that changes the selection returns a new passage.
//!
//! # Example
//!
//! ```
//! use provision_engine::passage::Passage;
//! use provision_engine::provision::ProvisionNode;
//! use provision_engine::uri::ProvisionPath;
//! use chrono::NaiveDate;
//!
//! let node = ProvisionNode::builder(
//!     ProvisionPath::parse("/us/const/amendment/IV").unwrap(),
//!     NaiveDate::from_ymd_opt(1791, 12, 15).unwrap(),
//! )
//! .content("The right of the people to be secure in their persons, houses, papers, and effects, against unreasonable searches and seizures, shall not be violated")
//! .build()
//! .unwrap();
//!
//! let passage = Passage::whole(node)
//!     .select(["The right of the people", "shall not be violated"])
//!     .unwrap();
//! assert_eq!(passage.selected_text(), "The right of the people…shall not be violated");
//! ```

use crate::citation::{Citation, CodeLevel};
use crate::error::{EngineError, Result};
use crate::position_set::TextPositionSet;
use crate::provision::ProvisionNode;
use crate::selector::{Selector, TextPositionSelector, TextQuoteSelector};
use crate::sequence::TextSequence;
use crate::uri::ProvisionPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A provision node with a selection over its full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    node: Arc<ProvisionNode>,
    selection: TextPositionSet,
}

impl Passage {
    /// Passage with an explicit selection.
    ///
    /// # Errors
    ///
    /// `SelectionOutOfRange` if the selection reaches past the node's full text.
    pub fn new(node: impl Into<Arc<ProvisionNode>>, selection: TextPositionSet) -> Result<Self> {
        let node = node.into();
        check_selection(&node, &selection)?;
        Ok(Self { node, selection })
    }

    /// Passage selecting all of the node's text
    pub fn whole(node: impl Into<Arc<ProvisionNode>>) -> Self {
        let node = node.into();
        let selection = TextPositionSet::whole(node.text());
        Self { node, selection }
    }

    /// Passage selecting nothing
    pub fn unselected(node: impl Into<Arc<ProvisionNode>>) -> Self {
        Self {
            node: node.into(),
            selection: TextPositionSet::empty(),
        }
    }

    pub fn node(&self) -> &Arc<ProvisionNode> {
        &self.node
    }

    pub fn path(&self) -> &ProvisionPath {
        self.node.path()
    }

    /// Full text of the node, regardless of selection
    pub fn text(&self) -> &str {
        self.node.text()
    }

    pub fn selection(&self) -> &TextPositionSet {
        &self.selection
    }

    /// Selection over the node's full text, descendants included
    pub fn tree_selection(&self) -> TextPositionSet {
        self.selection.clone()
    }

    /// The selection as it reads: nothing selected stands for the whole text.
    pub fn effective_selection(&self) -> TextPositionSet {
        if self.selection.is_empty() {
            TextPositionSet::whole(self.text())
        } else {
            self.selection.clone()
        }
    }

    /// Selection restricted to the node's own content
    pub fn content_selection(&self) -> TextPositionSet {
        let content_len = self.node.padded_length().saturating_sub(1);
        self.selection.limit(0, content_len)
    }

    fn with_selection(&self, selection: TextPositionSet) -> Passage {
        Passage {
            node: Arc::clone(&self.node),
            selection,
        }
    }

    /// Replace the selection with the given quotes or positions.
    pub fn select<S, I>(&self, selectors: I) -> Result<Passage>
    where
        S: Into<Selector>,
        I: IntoIterator<Item = S>,
    {
        let selection = TextPositionSet::from_selectors(self.text(), selectors)?;
        Ok(self.with_selection(selection))
    }

    /// Add the given quotes or positions to the selection.
    pub fn select_more<S, I>(&self, selectors: I) -> Result<Passage>
    where
        S: Into<Selector>,
        I: IntoIterator<Item = S>,
    {
        let added = TextPositionSet::from_selectors(self.text(), selectors)?;
        Ok(self.with_selection(self.selection.union(&added)))
    }

    /// Replace the selection with a prepared set.
    pub fn select_set(&self, selection: TextPositionSet) -> Result<Passage> {
        check_selection(&self.node, &selection)?;
        Ok(self.with_selection(selection))
    }

    /// Add a prepared set to the selection.
    pub fn select_more_set(&self, added: &TextPositionSet) -> Result<Passage> {
        check_selection(&self.node, added)?;
        Ok(self.with_selection(self.selection.union(added)))
    }

    pub fn select_all(&self) -> Passage {
        self.with_selection(TextPositionSet::whole(self.text()))
    }

    pub fn clear_selection(&self) -> Passage {
        self.with_selection(TextPositionSet::empty())
    }

    /// Keep only the selected text between `start` and `end` (end of text if `None`).
    pub fn limit_selection(&self, start: usize, end: Option<usize>) -> Result<Passage> {
        let limit = TextPositionSelector::from_text(self.text(), start, end)?;
        Ok(self.with_selection(self.selection.limit(limit.start(), limit.end())))
    }

    /// Selected text, joining separated spans with an ellipsis.
    ///
    /// Nothing selected renders the whole text.
    pub fn selected_text(&self) -> String {
        self.selection.render(self.text())
    }

    /// Selected phrases with elided text marked
    ///
    /// Nothing selected reads as one phrase holding the whole text.
    pub fn text_sequence(&self) -> TextSequence {
        self.effective_selection().text_sequence(self.text())
    }

    /// Each selected span as a quote that is unique in the full text
    pub fn as_quotes(&self) -> Vec<TextQuoteSelector> {
        self.selection
            .iter()
            .map(|selector| selector.as_quote(self.text()))
            .collect()
    }

    /// One passage per child, with this selection translated into each child's text.
    ///
    /// # Errors
    ///
    /// `UnexpandedNode` if any child is an unexpanded link.
    pub fn child_passages(&self) -> Result<Vec<Passage>> {
        if let Some(link) = self.node.links().next() {
            return Err(EngineError::UnexpandedNode(link.to_string()));
        }
        Ok(self
            .node
            .child_offsets()
            .into_iter()
            .map(|(offset, child)| {
                let selection = self
                    .selection
                    .limit(offset, offset + child.text_len())
                    .shift_back(offset);
                Passage {
                    node: Arc::clone(child),
                    selection,
                }
            })
            .collect())
    }

    /// Latest start date of any version whose text is selected
    pub fn start_date(&self) -> NaiveDate {
        self.node
            .content_spans()
            .into_iter()
            .filter(|span| !self.selection.limit(span.start, span.end).is_empty())
            .map(|span| span.start_date)
            .fold(self.node.start_date(), NaiveDate::max)
    }

    /// Earliest end date of any version whose text is selected
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.node
            .content_spans()
            .into_iter()
            .filter(|span| !self.selection.limit(span.start, span.end).is_empty())
            .filter_map(|span| span.end_date)
            .fold(self.node.end_date(), |current, end| {
                Some(current.map_or(end, |c| c.min(end)))
            })
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.node.jurisdiction()
    }

    pub fn code(&self) -> Option<&str> {
        self.node.code()
    }

    pub fn title(&self) -> Option<&str> {
        self.node.title()
    }

    pub fn section(&self) -> Option<&str> {
        self.node.section()
    }

    pub fn is_federal(&self) -> bool {
        self.node.is_federal()
    }

    pub fn level(&self) -> Result<CodeLevel> {
        self.node.level()
    }

    /// Citation for the passage's node
    pub fn citation(&self) -> Result<Citation> {
        Citation::for_node(&self.node)
    }
}

impl std::fmt::Display for Passage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" ({} {})",
            self.selected_text(),
            self.path(),
            self.start_date()
        )
    }
}

/// A quoted passage with the spans of an external document that cite it
///
/// `anchors` are offsets into the citing document, not into the provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredPassage {
    pub passage: Passage,
    #[serde(default)]
    pub anchors: TextPositionSet,
}

impl AnchoredPassage {
    pub fn new(passage: Passage, anchors: TextPositionSet) -> Self {
        Self { passage, anchors }
    }

    /// Add anchors for further places the document cites the passage.
    pub fn anchor_more(&self, anchors: &TextPositionSet) -> Self {
        Self {
            passage: self.passage.clone(),
            anchors: self.anchors.union(anchors),
        }
    }
}

impl From<ProvisionNode> for Passage {
    fn from(node: ProvisionNode) -> Self {
        Passage::whole(node)
    }
}

impl From<Arc<ProvisionNode>> for Passage {
    fn from(node: Arc<ProvisionNode>) -> Self {
        Passage::whole(node)
    }
}

fn check_selection(node: &ProvisionNode, selection: &TextPositionSet) -> Result<()> {
    selection
        .iter()
        .try_for_each(|selector| selector.check_within(node.text_len()))
}
