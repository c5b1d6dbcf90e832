//! Provision tree
//!
//! A [`ProvisionNode`] is one version of a citable unit of enacted text: its
//! path, heading, validity window, own content and ordered children. Children
//! are either loaded nodes or unexpanded links to nodes the data source did not
//! include.
//!
//! The *full text* of a node is its own content followed by the full text of
//! each loaded child, with empty parts skipped and the rest joined by
//! [`config::NODE_SEPARATOR`]. All selection offsets on a node are offsets into
//! this full text, counted in characters:
//!
//! ```text
//! content            child 1 text      child 2 text
//! |-- padded_length -|-- span_length --|-- span_length --|
//! ```
//!
//! Nodes are immutable once built and are shared between passages with `Arc`.

use crate::citation::{identify_code, CodeLevel};
use crate::config;
use crate::error::{EngineError, Result};
use crate::reference::CrossReference;
use crate::selector::char_len;
use crate::uri::ProvisionPath;
use chrono::NaiveDate;
use std::sync::Arc;

/// Child of a provision: loaded, or only known by its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionChild {
    Node(Arc<ProvisionNode>),
    Link(ProvisionPath),
}

impl ProvisionChild {
    pub fn path(&self) -> &ProvisionPath {
        match self {
            ProvisionChild::Node(node) => node.path(),
            ProvisionChild::Link(path) => path,
        }
    }

    /// The loaded node, or `UnexpandedNode` for a link
    pub fn node(&self) -> Result<&Arc<ProvisionNode>> {
        match self {
            ProvisionChild::Node(node) => Ok(node),
            ProvisionChild::Link(path) => Err(EngineError::UnexpandedNode(path.to_string())),
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ProvisionChild::Link(_))
    }
}

/// Location of one node's own content within an ancestor's full text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSpan {
    pub start: usize,
    pub end: usize,
    pub path: ProvisionPath,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// One version of a provision and its loaded subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionNode {
    path: ProvisionPath,
    heading: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    content: String,
    children: Vec<ProvisionChild>,
    citations: Vec<CrossReference>,
    first_published: Option<NaiveDate>,
    earliest_in_db: Option<NaiveDate>,
    text: String,
    text_len: usize,
}

impl ProvisionNode {
    /// Start building a node
    pub fn builder(path: ProvisionPath, start_date: NaiveDate) -> ProvisionNodeBuilder {
        ProvisionNodeBuilder::new(path, start_date)
    }

    pub fn path(&self) -> &ProvisionPath {
        &self.path
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// `None` while the version is still in force
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Text at this node only, excluding children
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn children(&self) -> &[ProvisionChild] {
        &self.children
    }

    /// Citations made by this node's own content
    pub fn citations(&self) -> &[CrossReference] {
        &self.citations
    }

    pub fn first_published(&self) -> Option<NaiveDate> {
        self.first_published
    }

    pub fn earliest_in_db(&self) -> Option<NaiveDate> {
        self.earliest_in_db
    }

    /// Full text: own content followed by every loaded child's full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the full text in characters
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Loaded children in document order
    pub fn loaded_children(&self) -> impl Iterator<Item = &Arc<ProvisionNode>> {
        self.children.iter().filter_map(|child| match child {
            ProvisionChild::Node(node) => Some(node),
            ProvisionChild::Link(_) => None,
        })
    }

    /// Paths of children that were not loaded
    pub fn links(&self) -> impl Iterator<Item = &ProvisionPath> {
        self.children.iter().filter_map(|child| match child {
            ProvisionChild::Link(path) => Some(path),
            ProvisionChild::Node(_) => None,
        })
    }

    /// Whether any child anywhere in the subtree is an unexpanded link
    pub fn has_unexpanded_children(&self) -> bool {
        self.children.iter().any(|child| match child {
            ProvisionChild::Link(_) => true,
            ProvisionChild::Node(node) => node.has_unexpanded_children(),
        })
    }

    /// Content length plus one separator, or 0 for a pure container
    pub fn padded_length(&self) -> usize {
        padded(&self.content)
    }

    /// Characters this node occupies in its parent's full text, separator included
    pub fn span_length(&self) -> usize {
        if self.text_len == 0 {
            0
        } else {
            self.text_len + 1
        }
    }

    /// Loaded children with their offsets in this node's full text
    pub fn child_offsets(&self) -> Vec<(usize, &Arc<ProvisionNode>)> {
        let mut offset = self.padded_length();
        self.loaded_children()
            .map(|child| {
                let entry = (offset, child);
                offset += child.span_length();
                entry
            })
            .collect()
    }

    /// This node or the loaded descendant at `path`
    pub fn find_descendant(&self, path: &ProvisionPath) -> Option<&ProvisionNode> {
        self.find_with_offset(path).map(|(_, node)| node)
    }

    /// Offset of the descendant at `path` within this node's full text
    pub fn offset_of(&self, path: &ProvisionPath) -> Option<usize> {
        self.find_with_offset(path).map(|(offset, _)| offset)
    }

    pub(crate) fn find_with_offset(&self, path: &ProvisionPath) -> Option<(usize, &ProvisionNode)> {
        if &self.path == path {
            return Some((0, self));
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.child_offsets()
            .into_iter()
            .find(|(_, child)| path.starts_with(child.path()))
            .and_then(|(offset, child)| {
                child
                    .find_with_offset(path)
                    .map(|(inner, node)| (offset + inner, node))
            })
    }

    /// Unexpanded link in this subtree that stands in for `path` or one of its ancestors
    pub fn link_covering(&self, path: &ProvisionPath) -> Option<&ProvisionPath> {
        if !path.starts_with(&self.path) {
            return None;
        }
        if let Some(link) = self.links().find(|link| path.starts_with(link)) {
            return Some(link);
        }
        self.loaded_children()
            .find(|child| path.starts_with(child.path()))
            .and_then(|child| child.link_covering(path))
    }

    /// Spans of own content for this node and every loaded descendant
    pub fn content_spans(&self) -> Vec<ContentSpan> {
        let mut spans = Vec::new();
        self.collect_content_spans(0, &mut spans);
        spans
    }

    fn collect_content_spans(&self, offset: usize, spans: &mut Vec<ContentSpan>) {
        if !self.content.is_empty() {
            spans.push(ContentSpan {
                start: offset,
                end: offset + char_len(&self.content),
                path: self.path.clone(),
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        for (child_offset, child) in self.child_offsets() {
            child.collect_content_spans(offset + child_offset, spans);
        }
    }

    /// Cross-references of this node and its loaded descendants, in document order
    pub fn cross_references(&self) -> Vec<CrossReference> {
        let mut references = self.citations.clone();
        for child in self.loaded_children() {
            references.extend(child.cross_references());
        }
        references
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.path.jurisdiction()
    }

    pub fn code(&self) -> Option<&str> {
        self.path.code()
    }

    pub fn title(&self) -> Option<&str> {
        self.path.title()
    }

    pub fn section(&self) -> Option<&str> {
        self.path.section()
    }

    pub fn is_federal(&self) -> bool {
        self.jurisdiction() == Some("us")
    }

    /// Level of the code this provision belongs to
    ///
    /// # Errors
    ///
    /// `UnknownJurisdiction` or `UnknownCode` if the path is not in the known-code table.
    pub fn level(&self) -> Result<CodeLevel> {
        let jurisdiction = self.jurisdiction().unwrap_or_default();
        let code = self.code().unwrap_or_default();
        identify_code(jurisdiction, code).map(|known| known.level)
    }

    /// Whether `start_date` is a real revision date rather than the start of database coverage
    pub fn known_revision_date(&self) -> bool {
        match self.earliest_in_db {
            Some(earliest) if earliest < self.start_date => true,
            Some(earliest) => self
                .first_published
                .is_some_and(|published| earliest <= published),
            None => false,
        }
    }

    /// Whether this version was in force on `date`
    pub fn is_in_force_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end| date < end)
    }

    /// Whether the validity windows of the two versions overlap
    pub fn validity_overlaps(&self, other: &ProvisionNode) -> bool {
        let starts_before_other_ends = other.end_date.is_none_or(|end| self.start_date < end);
        let other_starts_before_end = self.end_date.is_none_or(|end| other.start_date < end);
        starts_before_other_ends && other_starts_before_end
    }

    /// `path@start_date[..end_date]`, used in error messages
    pub(crate) fn describe_validity(&self) -> String {
        match self.end_date {
            Some(end) => format!("{}@{}..{}", self.path, self.start_date, end),
            None => format!("{}@{}..", self.path, self.start_date),
        }
    }

    /// Copy of this subtree with publication coverage dates set on every node
    pub fn with_coverage(
        &self,
        first_published: Option<NaiveDate>,
        earliest_in_db: Option<NaiveDate>,
    ) -> ProvisionNode {
        let children = self
            .children
            .iter()
            .map(|child| match child {
                ProvisionChild::Node(node) => {
                    ProvisionChild::Node(Arc::new(node.with_coverage(first_published, earliest_in_db)))
                }
                ProvisionChild::Link(path) => ProvisionChild::Link(path.clone()),
            })
            .collect();
        ProvisionNode {
            children,
            first_published,
            earliest_in_db,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for ProvisionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path, self.start_date)
    }
}

fn padded(content: &str) -> usize {
    if content.is_empty() {
        0
    } else {
        char_len(content) + 1
    }
}

/// Builder for [`ProvisionNode`], validating dates and child paths
#[derive(Debug, Clone)]
pub struct ProvisionNodeBuilder {
    path: ProvisionPath,
    heading: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    content: String,
    children: Vec<ProvisionChild>,
    citations: Vec<CrossReference>,
    first_published: Option<NaiveDate>,
    earliest_in_db: Option<NaiveDate>,
}

impl ProvisionNodeBuilder {
    pub fn new(path: ProvisionPath, start_date: NaiveDate) -> Self {
        Self {
            path,
            heading: String::new(),
            start_date,
            end_date: None,
            content: String::new(),
            children: Vec::new(),
            citations: Vec::new(),
            first_published: None,
            earliest_in_db: None,
        }
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn child(mut self, child: impl Into<Arc<ProvisionNode>>) -> Self {
        self.children.push(ProvisionChild::Node(child.into()));
        self
    }

    pub fn link(mut self, path: ProvisionPath) -> Self {
        self.children.push(ProvisionChild::Link(path));
        self
    }

    pub fn children(mut self, children: Vec<ProvisionChild>) -> Self {
        self.children = children;
        self
    }

    pub fn citation(mut self, citation: CrossReference) -> Self {
        self.citations.push(citation);
        self
    }

    pub fn citations(mut self, citations: Vec<CrossReference>) -> Self {
        self.citations = citations;
        self
    }

    pub fn coverage(
        mut self,
        first_published: Option<NaiveDate>,
        earliest_in_db: Option<NaiveDate>,
    ) -> Self {
        self.first_published = first_published;
        self.earliest_in_db = earliest_in_db;
        self
    }

    /// Validate and build the node, composing its full text.
    ///
    /// # Errors
    ///
    /// - `InvalidDate` if `end_date` is not after `start_date`
    /// - `InvalidPath` if a child is not a descendant of this node
    pub fn build(self) -> Result<ProvisionNode> {
        if let Some(end) = self.end_date {
            if end <= self.start_date {
                return Err(EngineError::InvalidDate(format!(
                    "{}: end date {} must be after start date {}",
                    self.path, end, self.start_date
                )));
            }
        }
        if let Some(stray) = self
            .children
            .iter()
            .find(|child| !self.path.is_ancestor_of(child.path()))
        {
            return Err(EngineError::InvalidPath(format!(
                "{} is not a descendant of {}",
                stray.path(),
                self.path
            )));
        }

        let mut text = self.content.clone();
        for child in &self.children {
            if let ProvisionChild::Node(node) = child {
                if node.text.is_empty() {
                    continue;
                }
                if !text.is_empty() {
                    text.push(config::NODE_SEPARATOR);
                }
                text.push_str(&node.text);
            }
        }
        let text_len = char_len(&text);

        Ok(ProvisionNode {
            path: self.path,
            heading: self.heading,
            start_date: self.start_date,
            end_date: self.end_date,
            content: self.content,
            children: self.children,
            citations: self.citations,
            first_published: self.first_published,
            earliest_in_db: self.earliest_in_db,
            text,
            text_len,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub(crate) fn path(s: &str) -> ProvisionPath {
        ProvisionPath::parse(s).unwrap()
    }

    pub(crate) fn leaf(p: &str, start: &str, content: &str) -> ProvisionNode {
        ProvisionNode::builder(path(p), date(start))
            .content(content)
            .build()
            .unwrap()
    }

    pub(crate) const THIRTEENTH_1: &str = "Neither slavery nor involuntary servitude, except as a punishment for crime whereof the party shall have been duly convicted, shall exist within the United States, or any place subject to their jurisdiction.";
    pub(crate) const THIRTEENTH_2: &str =
        "Congress shall have power to enforce this article by appropriate legislation.";

    pub(crate) fn thirteenth() -> ProvisionNode {
        ProvisionNode::builder(path("/us/const/amendment/XIII"), date("1865-12-18"))
            .heading("AMENDMENT XIII.")
            .child(leaf("/us/const/amendment/XIII/1", "1865-12-18", THIRTEENTH_1))
            .child(leaf("/us/const/amendment/XIII/2", "1865-12-18", THIRTEENTH_2))
            .build()
            .unwrap()
    }

    pub(crate) fn section_11_subdivided() -> ProvisionNode {
        let parts = [
            ("i", "barbers,"),
            ("ii", "hairdressers, or"),
            ("iii", "other male grooming professionals"),
            ("iii-con", "as they see fit to purchase a beardcoin from a customer"),
            ("iv", "whose beard they have removed,"),
            ("iv-con", "and to resell those beardcoins to the Department of Beards."),
        ];
        let mut builder = ProvisionNode::builder(path("/test/acts/47/11"), date("2013-07-18"))
            .heading("Licensed repurchasers of beardcoin")
            .content("The Department of Beards may issue licenses to such");
        for (label, content) in parts {
            builder = builder.child(leaf(
                &format!("/test/acts/47/11/{label}"),
                "2013-07-18",
                content,
            ));
        }
        builder.build().unwrap()
    }

    // -------------------------------------------------------------------------
    // Full text and offsets
    // -------------------------------------------------------------------------

    mod full_text {
        use super::*;

        #[test]
        fn test_container_text_joins_children() {
            let node = thirteenth();
            assert_eq!(node.text(), format!("{THIRTEENTH_1} {THIRTEENTH_2}"));
            assert_eq!(node.padded_length(), 0);
        }

        #[test]
        fn test_content_then_children() {
            let node = section_11_subdivided();
            assert_eq!(
                node.text(),
                "The Department of Beards may issue licenses to such barbers, hairdressers, or other male grooming professionals as they see fit to purchase a beardcoin from a customer whose beard they have removed, and to resell those beardcoins to the Department of Beards."
            );
        }

        #[test]
        fn test_child_offsets_point_at_child_text() {
            let node = section_11_subdivided();
            for (offset, child) in node.child_offsets() {
                let end = offset + child.text_len();
                assert_eq!(crate::selector::char_slice(node.text(), offset, end), child.text());
            }
        }

        #[test]
        fn test_offset_of_descendant() {
            let node = thirteenth();
            assert_eq!(node.offset_of(&path("/us/const/amendment/XIII")), Some(0));
            assert_eq!(node.offset_of(&path("/us/const/amendment/XIII/1")), Some(0));
            assert_eq!(
                node.offset_of(&path("/us/const/amendment/XIII/2")),
                Some(char_len(THIRTEENTH_1) + 1)
            );
            assert_eq!(node.offset_of(&path("/us/const/amendment/XIV")), None);
        }

        #[test]
        fn test_span_length_of_empty_leaf_is_zero() {
            let empty = ProvisionNode::builder(path("/test/acts/47/1"), date("1935-04-01"))
                .build()
                .unwrap();
            assert_eq!(empty.span_length(), 0);
        }

        #[test]
        fn test_links_contribute_no_text() {
            let node = ProvisionNode::builder(path("/us/usc/t17/s102"), date("2013-07-18"))
                .content("Copyright protection subsists")
                .link(path("/us/usc/t17/s102/a"))
                .link(path("/us/usc/t17/s102/b"))
                .build()
                .unwrap();
            assert_eq!(node.text(), "Copyright protection subsists");
            assert!(node.has_unexpanded_children());
            assert_eq!(node.links().count(), 2);
            assert!(node.children()[0].node().is_err());
        }

        #[test]
        fn test_content_spans_cover_every_content() {
            let spans = section_11_subdivided().content_spans();
            assert_eq!(spans.len(), 7);
            assert_eq!(spans[0].start, 0);
            assert_eq!(spans[1].path, path("/test/acts/47/11/i"));
        }
    }

    // -------------------------------------------------------------------------
    // Builder validation
    // -------------------------------------------------------------------------

    mod builder {
        use super::*;

        #[test]
        fn test_rejects_end_before_start() {
            let result = ProvisionNode::builder(path("/test/acts/47/11"), date("2013-07-18"))
                .end_date(Some(date("1935-04-01")))
                .build();
            assert!(matches!(result, Err(EngineError::InvalidDate(_))));
        }

        #[test]
        fn test_rejects_foreign_child() {
            let result = ProvisionNode::builder(path("/us/const/amendment/XIII"), date("1865-12-18"))
                .child(leaf("/us/const/amendment/XIV/1", "1868-07-28", "All persons"))
                .build();
            assert!(matches!(result, Err(EngineError::InvalidPath(_))));
        }
    }

    // -------------------------------------------------------------------------
    // Dates and code metadata
    // -------------------------------------------------------------------------

    mod metadata {
        use super::*;

        #[test]
        fn test_in_force_window() {
            let node = ProvisionNode::builder(path("/test/acts/47/11"), date("1935-04-01"))
                .end_date(Some(date("2013-07-18")))
                .build()
                .unwrap();
            assert!(node.is_in_force_on(date("1999-01-01")));
            assert!(!node.is_in_force_on(date("2013-07-18")));
            assert!(!node.is_in_force_on(date("1900-01-01")));
        }

        #[test]
        fn test_validity_overlap_is_half_open() {
            let old = ProvisionNode::builder(path("/test/acts/47/11"), date("1935-04-01"))
                .end_date(Some(date("2013-07-18")))
                .build()
                .unwrap();
            let new = leaf("/test/acts/47/11", "2013-07-18", "text");
            assert!(!old.validity_overlaps(&new));
            assert!(!new.validity_overlaps(&old));
            let open = leaf("/test/acts/47/11", "1999-01-01", "text");
            assert!(open.validity_overlaps(&old));
            assert!(open.validity_overlaps(&new));
        }

        #[test]
        fn test_known_revision_date() {
            let node = leaf("/test/acts/47/11", "2013-07-18", "text");
            assert!(!node.known_revision_date());
            let covered = node.with_coverage(Some(date("1935-04-01")), Some(date("1935-04-01")));
            assert!(covered.known_revision_date());
            let original = leaf("/test/acts/47/11", "1935-04-01", "text")
                .with_coverage(Some(date("1935-04-01")), Some(date("1935-04-01")));
            assert!(original.known_revision_date());
            let uncovered = leaf("/us/usc/t17/s102", "2013-07-18", "text")
                .with_coverage(Some(date("1926-06-30")), Some(date("2013-07-18")));
            assert!(!uncovered.known_revision_date());
        }

        #[test]
        fn test_level_and_federal() {
            assert_eq!(thirteenth().level().unwrap(), CodeLevel::Constitution);
            assert!(thirteenth().is_federal());
            assert!(!section_11_subdivided().is_federal());
            let unknown = leaf("/xx/code/1", "2000-01-01", "text");
            assert!(matches!(unknown.level(), Err(EngineError::UnknownJurisdiction(_))));
        }

        #[test]
        fn test_cross_references_include_descendants() {
            let child = ProvisionNode::builder(path("/test/acts/47/8/2"), date("1935-04-01"))
                .content("as defined in section 4")
                .citation(CrossReference::new(path("/test/acts/47/4"), "section 4"))
                .build()
                .unwrap();
            let parent = ProvisionNode::builder(path("/test/acts/47/8"), date("1935-04-01"))
                .content("Under section 6C")
                .citation(CrossReference::new(path("/test/acts/47/6C"), "section 6C"))
                .child(child)
                .build()
                .unwrap();
            let refs = parent.cross_references();
            assert_eq!(refs.len(), 2);
            assert_eq!(refs[0].reference_text, "section 6C");
            assert_eq!(refs[1].target_path, path("/test/acts/47/4"));
        }
    }
}
