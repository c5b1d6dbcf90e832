//! JSON records exchanged with the data source and with callers
//!
//! Input: one [`RawProvision`] per provision version, as served by the
//! legislation API. Children are either nested records or link strings, and
//! the node's own text may be given as `text_version.content` or `content`.
//!
//! Output: a [`PassageRecord`] per passage, nesting one record per node with
//! the selection local to that node's own content.

use crate::config;
use crate::error::{EngineError, Result};
use crate::passage::Passage;
use crate::position_set::TextPositionSet;
use crate::provision::{ProvisionChild, ProvisionNode};
use crate::reference::CrossReference;
use crate::selector::{char_len, Selector, TextPositionSelector, TextQuoteSelector};
use crate::uri::ProvisionPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text of one version of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTextVersion {
    Object {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Plain(String),
}

impl RawTextVersion {
    pub fn content(&self) -> &str {
        match self {
            RawTextVersion::Object { content, .. } => content,
            RawTextVersion::Plain(content) => content,
        }
    }
}

/// Child entry of a provision record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChild {
    Link(String),
    Node(Box<RawProvision>),
}

/// Provision record as served by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProvision {
    pub node: ProvisionPath,
    #[serde(default)]
    pub heading: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_version: Option<RawTextVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub children: Vec<RawChild>,
    #[serde(default)]
    pub citations: Vec<CrossReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_published: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_in_db: Option<NaiveDate>,
}

impl RawProvision {
    /// Parse a provision record from JSON.
    ///
    /// # Errors
    ///
    /// `LoadError` if the document exceeds [`config::MAX_JSON_SIZE`];
    /// `JsonError` if it is not a valid record.
    pub fn from_json_str(json: &str) -> Result<Self> {
        check_size(json)?;
        Ok(serde_json::from_str(json)?)
    }

    /// Own text at this node; `text_version` wins over `content`
    pub fn own_content(&self) -> &str {
        self.text_version
            .as_ref()
            .map(RawTextVersion::content)
            .or(self.content.as_deref())
            .unwrap_or_default()
    }

    /// Convert into a validated provision tree.
    ///
    /// # Errors
    ///
    /// `LoadError` if nesting exceeds [`config::MAX_TREE_DEPTH`]; path and
    /// date errors from [`ProvisionNode::builder`].
    pub fn into_node(self) -> Result<ProvisionNode> {
        let node = self.into_node_at_depth(0)?;
        tracing::debug!(
            path = %node.path(),
            start_date = %node.start_date(),
            text_len = node.text_len(),
            "Loaded provision"
        );
        Ok(node)
    }

    fn into_node_at_depth(self, depth: usize) -> Result<ProvisionNode> {
        if depth > config::MAX_TREE_DEPTH {
            tracing::warn!(
                path = %self.node,
                max = config::MAX_TREE_DEPTH,
                "Provision record exceeds nesting limit"
            );
            return Err(EngineError::LoadError(format!(
                "Provision record exceeds maximum nesting depth ({})",
                config::MAX_TREE_DEPTH
            )));
        }

        let content = self.own_content().to_string();
        let children = self
            .children
            .into_iter()
            .map(|child| match child {
                RawChild::Link(link) => ProvisionPath::parse(&link).map(ProvisionChild::Link),
                RawChild::Node(raw) => raw
                    .into_node_at_depth(depth + 1)
                    .map(|node| ProvisionChild::Node(Arc::new(node))),
            })
            .collect::<Result<Vec<_>>>()?;

        ProvisionNode::builder(self.node, self.start_date)
            .heading(self.heading)
            .end_date(self.end_date)
            .content(content)
            .children(children)
            .citations(self.citations)
            .coverage(self.first_published, self.earliest_in_db)
            .build()
    }
}

impl TryFrom<RawProvision> for ProvisionNode {
    type Error = EngineError;

    fn try_from(raw: RawProvision) -> Result<Self> {
        raw.into_node()
    }
}

/// Position with an optional end (end of text when absent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosition {
    pub start: usize,
    #[serde(default)]
    pub end: Option<usize>,
}

/// Selection as written by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSelection {
    /// `true` selects everything, `false` nothing
    All(bool),
    /// List of quote or position selectors
    Selectors(Vec<Selector>),
    /// Separate lists of positions and quotes
    Sets {
        #[serde(default)]
        positions: Vec<RawPosition>,
        #[serde(default)]
        quotes: Vec<TextQuoteSelector>,
    },
}

impl RawSelection {
    /// Resolve against a node's full text.
    pub fn resolve(&self, text: &str) -> Result<TextPositionSet> {
        match self {
            RawSelection::All(true) => Ok(TextPositionSet::whole(text)),
            RawSelection::All(false) => Ok(TextPositionSet::empty()),
            RawSelection::Selectors(selectors) => {
                TextPositionSet::from_selectors(text, selectors.iter().cloned())
            }
            RawSelection::Sets { positions, quotes } => {
                let mut resolved = positions
                    .iter()
                    .map(|p| TextPositionSelector::from_text(text, p.start, p.end))
                    .collect::<Result<Vec<_>>>()?;
                for quote in quotes {
                    resolved.push(quote.locate(text)?);
                }
                Ok(TextPositionSet::new(resolved))
            }
        }
    }
}

/// Passage as written by callers: a provision record and an optional selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPassage {
    #[serde(alias = "enactment")]
    pub provision: RawProvision,
    #[serde(default)]
    pub selection: Option<RawSelection>,
}

impl RawPassage {
    pub fn from_json_str(json: &str) -> Result<Self> {
        check_size(json)?;
        Ok(serde_json::from_str(json)?)
    }

    /// Build the passage; a missing selection selects all text.
    pub fn into_passage(self) -> Result<Passage> {
        let node = self.provision.into_node()?;
        let selection = match &self.selection {
            Some(selection) => selection.resolve(node.text())?,
            None => TextPositionSet::whole(node.text()),
        };
        Passage::new(node, selection)
    }
}

/// Child entry of a passage record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRecord {
    Link(ProvisionPath),
    Node(Box<PassageRecord>),
}

/// Serialized passage: one record per node, selections local to each node's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRecord {
    pub node: ProvisionPath,
    #[serde(default)]
    pub heading: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default)]
    pub selection: Vec<TextPositionSelector>,
    #[serde(default)]
    pub children: Vec<ChildRecord>,
}

impl PassageRecord {
    /// Record for a passage and its whole subtree
    ///
    /// Local selections cover node content only. A separator between two
    /// nodes' texts is kept when the selection runs across it, but one
    /// selected only at the edge of a span is not recorded, so the rebuilt
    /// passage selects the same phrases without that trailing or leading space.
    pub fn from_passage(passage: &Passage) -> Self {
        Self::for_node(passage.node(), passage.selection())
    }

    /// `selection` is in `node`'s full-text space
    fn for_node(node: &ProvisionNode, selection: &TextPositionSet) -> Self {
        let content_len = char_len(node.content());
        let mut offset = node.padded_length();
        let children = node
            .children()
            .iter()
            .map(|child| match child {
                ProvisionChild::Link(path) => ChildRecord::Link(path.clone()),
                ProvisionChild::Node(child) => {
                    let local = selection
                        .limit(offset, offset + child.text_len())
                        .shift_back(offset);
                    offset += child.span_length();
                    ChildRecord::Node(Box::new(Self::for_node(child, &local)))
                }
            })
            .collect();

        Self {
            node: node.path().clone(),
            heading: node.heading().to_string(),
            start_date: node.start_date(),
            end_date: node.end_date(),
            content: node.content().to_string(),
            selection: selection.limit(0, content_len).positions().to_vec(),
            children,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        check_size(json)?;
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild the passage, assembling its selection from every node's local selection.
    ///
    /// # Errors
    ///
    /// `SelectionOutOfRange` if a local selection reaches past its node's
    /// content; the provision builder's errors for invalid trees.
    pub fn into_passage(self) -> Result<Passage> {
        let (node, selection) = self.into_parts(0)?;
        Passage::new(node, selection)
    }

    fn into_parts(self, depth: usize) -> Result<(ProvisionNode, TextPositionSet)> {
        if depth > config::MAX_TREE_DEPTH {
            return Err(EngineError::LoadError(format!(
                "Passage record exceeds maximum nesting depth ({})",
                config::MAX_TREE_DEPTH
            )));
        }

        let own = TextPositionSet::new(self.selection);
        let content_len = char_len(&self.content);
        own.iter()
            .try_for_each(|selector| selector.check_within(content_len))?;

        let mut children = Vec::with_capacity(self.children.len());
        let mut child_selections = Vec::new();
        for child in self.children {
            match child {
                ChildRecord::Link(path) => children.push(ProvisionChild::Link(path)),
                ChildRecord::Node(record) => {
                    let (node, selection) = record.into_parts(depth + 1)?;
                    let node = Arc::new(node);
                    child_selections.push((Arc::clone(&node), selection));
                    children.push(ProvisionChild::Node(node));
                }
            }
        }

        let node = ProvisionNode::builder(self.node, self.start_date)
            .heading(self.heading)
            .end_date(self.end_date)
            .content(self.content)
            .children(children)
            .build()?;

        let mut tree_selection = own;
        for ((offset, _), (_, selection)) in node.child_offsets().into_iter().zip(&child_selections) {
            tree_selection = tree_selection.union(&selection.shift_forward(offset));
        }
        Ok((node, tree_selection))
    }
}

impl From<&Passage> for PassageRecord {
    fn from(passage: &Passage) -> Self {
        Self::from_passage(passage)
    }
}

impl Serialize for Passage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        PassageRecord::from_passage(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Passage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        PassageRecord::deserialize(deserializer)?
            .into_passage()
            .map_err(serde::de::Error::custom)
    }
}

pub(crate) fn check_size(json: &str) -> Result<()> {
    if json.len() > config::MAX_JSON_SIZE {
        tracing::warn!(
            size = json.len(),
            max = config::MAX_JSON_SIZE,
            "JSON content exceeds size limit"
        );
        return Err(EngineError::LoadError(format!(
            "JSON content exceeds maximum size limit ({} bytes)",
            config::MAX_JSON_SIZE
        )));
    }
    Ok(())
}
