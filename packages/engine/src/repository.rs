//! Data sources for provision records
//!
//! A [`ProvisionSource`] answers two questions: what did the provision at a
//! path say on a date, and which provisions cite it. Everything else (reading
//! trees, filling in publication coverage, merging inbound citations) is
//! provided on top of those two calls.
//!
//! [`JsonRepository`] serves recorded responses from memory, in the shape the
//! legislation API returns them.
//!
//! # Version selection
//!
//! Responses are stored per path and per version date. For a request:
//! - The stored entry whose path is the longest segment-prefix of the request is used
//! - Versions with a start date on or before the requested date are considered
//! - The most recent of those is selected (most recent overall without a date)
//! - The requested path is then looked up inside the selected version's tree

use crate::error::{EngineError, Result};
use crate::passage::Passage;
use crate::provision::ProvisionNode;
use crate::record::{check_size, RawChild, RawPassage, RawProvision};
use crate::reference::{
    CitingProvisionLocation, CrossReference, InboundReference, ProvisionRequest, RawCitingRecord,
};
use crate::uri::ProvisionPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Date range of a code's provisions that the data source has text for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationCoverage {
    pub first_published: NaiveDate,
    pub earliest_in_db: NaiveDate,
}

impl PublicationCoverage {
    pub fn new(first_published: NaiveDate, earliest_in_db: NaiveDate) -> Self {
        Self {
            first_published,
            earliest_in_db,
        }
    }

    /// Coverage of the United States Constitution, complete since ratification
    pub fn us_constitution() -> Self {
        let ratified = NaiveDate::from_ymd_opt(1788, 6, 21).unwrap_or_default();
        Self::new(ratified, ratified)
    }
}

/// Source of provision records and of the citation index.
pub trait ProvisionSource {
    /// Raw record for the provision at the requested path and date.
    ///
    /// # Errors
    ///
    /// `PathNotFound` if nothing is known at the path, `VersionNotFound` if
    /// no version was in force at the date.
    fn fetch(&self, request: &ProvisionRequest) -> Result<RawProvision>;

    /// Raw citation-index records for provisions citing `target`.
    fn fetch_citations_to(&self, target: &ProvisionPath) -> Result<Vec<RawCitingRecord>>;

    /// Publication coverage of the code containing `path`, if known
    fn coverage(&self, _path: &ProvisionPath) -> Option<PublicationCoverage> {
        None
    }

    /// Fetch and build the provision tree, with coverage filled in.
    fn read(&self, request: &ProvisionRequest) -> Result<ProvisionNode> {
        let node = self.fetch(request)?.into_node()?;
        Ok(self.apply_coverage(node))
    }

    /// Build a passage from caller JSON, filling in coverage from this source.
    fn read_passage(&self, raw: RawPassage) -> Result<Passage> {
        let passage = raw.into_passage()?;
        let node = self.apply_coverage(passage.node().as_ref().clone());
        Passage::new(node, passage.selection().clone())
    }

    /// Read the provision where a citing text was enacted.
    fn read_location(&self, location: &CitingProvisionLocation) -> Result<ProvisionNode> {
        self.read(&ProvisionRequest::from(location))
    }

    /// Read the latest provision containing the citing text of `reference`.
    fn read_inbound(&self, reference: &InboundReference) -> Result<ProvisionNode> {
        self.read(&ProvisionRequest::try_from(reference)?)
    }

    /// Read the current version of the target of an outgoing citation.
    fn read_cross_reference(&self, reference: &CrossReference) -> Result<ProvisionNode> {
        self.read(&ProvisionRequest::from(reference))
    }

    /// Provisions citing `target`, one per distinct citing text.
    fn citations_to(&self, target: &ProvisionPath) -> Result<Vec<InboundReference>> {
        let records = self.fetch_citations_to(target)?;
        InboundReference::from_records(target, records)
    }

    #[doc(hidden)]
    fn apply_coverage(&self, node: ProvisionNode) -> ProvisionNode {
        match self.coverage(node.path()) {
            Some(coverage) => {
                node.with_coverage(Some(coverage.first_published), Some(coverage.earliest_in_db))
            }
            None => node,
        }
    }
}

/// On-disk layout of a recorded repository
#[derive(Debug, Default, Deserialize)]
struct RepositoryDocument {
    #[serde(default)]
    responses: BTreeMap<String, BTreeMap<NaiveDate, RawProvision>>,
    #[serde(default)]
    coverage: BTreeMap<String, PublicationCoverage>,
    #[serde(default)]
    citations: BTreeMap<String, Vec<RawCitingRecord>>,
}

/// Provision source backed by recorded API responses.
///
/// # Example
///
/// ```ignore
/// use provision_engine::{JsonRepository, ProvisionRequest, ProvisionSource};
///
/// let repository = JsonRepository::from_json_str(&std::fs::read_to_string("responses.json")?)?;
/// let request = ProvisionRequest::at("/test/acts/47/11".parse()?, date);
/// let section = repository.read(&request)?;
/// ```
#[derive(Debug, Clone)]
pub struct JsonRepository {
    /// path -> version date -> record
    responses: HashMap<ProvisionPath, BTreeMap<NaiveDate, RawProvision>>,
    /// code path -> coverage
    coverage: HashMap<ProvisionPath, PublicationCoverage>,
    /// cited path -> citation-index records
    citations: HashMap<ProvisionPath, Vec<RawCitingRecord>>,
}

impl Default for JsonRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepository {
    /// Empty repository that knows the coverage of the U.S. Constitution.
    pub fn new() -> Self {
        let mut coverage = HashMap::new();
        if let Ok(constitution) = ProvisionPath::parse("/us/const") {
            coverage.insert(constitution, PublicationCoverage::us_constitution());
        }
        Self {
            responses: HashMap::new(),
            coverage,
            citations: HashMap::new(),
        }
    }

    /// Load a repository from a JSON document with `responses`, `coverage`
    /// and `citations` maps keyed by path.
    ///
    /// # Errors
    ///
    /// `LoadError` for oversized documents, `JsonError` for malformed ones,
    /// `InvalidPath` for bad keys.
    pub fn from_json_str(json: &str) -> Result<Self> {
        check_size(json)?;
        let document: RepositoryDocument = serde_json::from_str(json)?;
        let mut repository = Self::new();
        for (path, versions) in document.responses {
            repository
                .responses
                .entry(ProvisionPath::parse(&path)?)
                .or_default()
                .extend(versions);
        }
        for (path, coverage) in document.coverage {
            repository.set_coverage(ProvisionPath::parse(&path)?, coverage);
        }
        for (path, records) in document.citations {
            repository.add_citations(ProvisionPath::parse(&path)?, records);
        }
        tracing::debug!(
            paths = repository.responses.len(),
            cited = repository.citations.len(),
            "Loaded recorded responses"
        );
        Ok(repository)
    }

    /// Store a version under its own path.
    pub fn insert(&mut self, record: RawProvision) {
        self.insert_at(record.node.clone(), record);
    }

    /// Store a version under `path`, which may be an ancestor of the record's node.
    pub fn insert_at(&mut self, path: ProvisionPath, record: RawProvision) {
        self.responses
            .entry(path)
            .or_default()
            .insert(record.start_date, record);
    }

    pub fn set_coverage(&mut self, code_path: ProvisionPath, coverage: PublicationCoverage) {
        self.coverage.insert(code_path, coverage);
    }

    pub fn add_citations(&mut self, target: ProvisionPath, records: Vec<RawCitingRecord>) {
        self.citations.entry(target).or_default().extend(records);
    }

    /// Number of stored paths
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Versions stored at the deepest path that contains `path`
    fn closest_entry(&self, path: &ProvisionPath) -> Option<&BTreeMap<NaiveDate, RawProvision>> {
        self.responses
            .iter()
            .filter(|(stored, _)| path.starts_with(stored))
            .max_by_key(|(stored, _)| stored.depth())
            .map(|(_, versions)| versions)
    }

    fn select_version<'a>(
        versions: &'a BTreeMap<NaiveDate, RawProvision>,
        request: &ProvisionRequest,
    ) -> Result<&'a RawProvision> {
        let selected = match request.date {
            Some(date) => versions.range(..=date).next_back(),
            None => versions.iter().next_back(),
        };
        selected.map(|(_, record)| record).ok_or_else(|| EngineError::VersionNotFound {
            path: request.path.to_string(),
            date: request
                .date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "latest".to_string()),
        })
    }
}

/// Find the record for `path` inside a version's tree.
fn search_tree<'a>(branch: &'a RawProvision, path: &ProvisionPath) -> Option<&'a RawProvision> {
    if &branch.node == path {
        return Some(branch);
    }
    branch.children.iter().find_map(|child| match child {
        RawChild::Node(nested) if path.starts_with(&nested.node) => search_tree(nested, path),
        _ => None,
    })
}

impl ProvisionSource for JsonRepository {
    fn fetch(&self, request: &ProvisionRequest) -> Result<RawProvision> {
        let versions = self
            .closest_entry(&request.path)
            .ok_or_else(|| EngineError::PathNotFound(request.path.to_string()))?;
        let version = Self::select_version(versions, request)?;
        let found = search_tree(version, &request.path)
            .ok_or_else(|| EngineError::PathNotFound(request.path.to_string()))?;
        tracing::debug!(
            request = %request,
            version = %version.start_date,
            "Serving recorded provision"
        );
        Ok(found.clone())
    }

    fn fetch_citations_to(&self, target: &ProvisionPath) -> Result<Vec<RawCitingRecord>> {
        Ok(self.citations.get(target).cloned().unwrap_or_default())
    }

    fn coverage(&self, path: &ProvisionPath) -> Option<PublicationCoverage> {
        self.coverage.get(&path.code_path()?).copied()
    }
}
