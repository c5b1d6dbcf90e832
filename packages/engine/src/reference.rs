//! Cross-references between provisions
//!
//! Outbound references are [`CrossReference`]s stored on the citing node.
//! Inbound references come from the data source's citation index: each record
//! is a piece of citing text and every place in the code where that text has
//! been enacted.

use crate::error::{EngineError, Result};
use crate::uri::ProvisionPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A provision's citation to another provision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Path of the cited provision
    #[serde(rename = "target_uri", alias = "target_path")]
    pub target_path: ProvisionPath,
    /// Text in the citing provision that identifies the target
    pub reference_text: String,
    /// API location of the target, if the data source supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl CrossReference {
    pub fn new(target_path: ProvisionPath, reference_text: impl Into<String>) -> Self {
        Self {
            target_path,
            reference_text: reference_text.into(),
            target_url: None,
        }
    }
}

impl std::fmt::Display for CrossReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CrossReference(target_uri=\"{}\", reference_text=\"{}\")",
            self.target_path, self.reference_text
        )
    }
}

/// One historical placement of a citing provision, ordered by date then path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CitingProvisionLocation {
    pub start_date: NaiveDate,
    pub node: ProvisionPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub heading: String,
}

impl CitingProvisionLocation {
    pub fn new(node: ProvisionPath, start_date: NaiveDate) -> Self {
        Self {
            start_date,
            node,
            end_date: None,
            heading: String::new(),
        }
    }
}

impl std::fmt::Display for CitingProvisionLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.node, self.start_date)
    }
}

/// Record returned by the data source's citation index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitingRecord {
    /// Citing text
    pub content: String,
    #[serde(default)]
    pub locations: Vec<CitingProvisionLocation>,
    /// Every citation made by the citing text, not only the one to the target
    #[serde(default)]
    pub citations: Vec<CrossReference>,
}

/// Citing text that refers to a target provision, with every location it was enacted at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundReference {
    #[serde(rename = "target_uri")]
    pub target_path: ProvisionPath,
    pub content: String,
    pub reference_text: String,
    /// Sorted by start date ascending
    pub locations: Vec<CitingProvisionLocation>,
}

impl InboundReference {
    /// Build a reference to `target` from one citation-index record.
    ///
    /// `reference_text` is taken from the record's citation to `target`, or
    /// left empty if the record has none.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` if the record has no locations.
    pub fn from_record(target: &ProvisionPath, record: RawCitingRecord) -> Result<Self> {
        if record.locations.is_empty() {
            return Err(EngineError::InvalidRecord(format!(
                "Citation to {} has no citing locations",
                target
            )));
        }
        let reference_text = record
            .citations
            .iter()
            .rev()
            .find(|citation| &citation.target_path == target)
            .map(|citation| citation.reference_text.clone())
            .unwrap_or_default();
        let mut locations = record.locations;
        locations.sort();
        locations.dedup();
        Ok(Self {
            target_path: target.clone(),
            content: record.content,
            reference_text,
            locations,
        })
    }

    /// Build references from a batch of records, merging records with identical citing text.
    pub fn from_records(
        target: &ProvisionPath,
        records: impl IntoIterator<Item = RawCitingRecord>,
    ) -> Result<Vec<Self>> {
        let mut merged: Vec<InboundReference> = Vec::new();
        for record in records {
            let reference = Self::from_record(target, record)?;
            match merged.iter_mut().find(|r| r.content == reference.content) {
                Some(existing) => {
                    tracing::debug!(
                        target_path = %target,
                        locations = reference.locations.len(),
                        "Merging inbound reference with identical citing text"
                    );
                    existing.add_locations(reference.locations);
                    if existing.reference_text.is_empty() {
                        existing.reference_text = reference.reference_text;
                    }
                }
                None => merged.push(reference),
            }
        }
        Ok(merged)
    }

    fn add_locations(&mut self, locations: Vec<CitingProvisionLocation>) {
        self.locations.extend(locations);
        self.locations.sort();
        self.locations.dedup();
    }

    /// Most recent location where the citing text was enacted
    pub fn latest_location(&self) -> Option<&CitingProvisionLocation> {
        self.locations.iter().max()
    }
}

impl std::fmt::Display for InboundReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InboundReference to {}", self.target_path)?;
        if let Some(latest) = self.latest_location() {
            write!(f, ", from {}", latest)?;
        }
        if self.locations.len() > 1 {
            write!(f, " and {} other locations", self.locations.len() - 1)?;
        }
        Ok(())
    }
}

/// What to ask the data source for: a path, optionally at a date
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub path: ProvisionPath,
    /// `None` asks for the latest version
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ProvisionRequest {
    pub fn new(path: ProvisionPath) -> Self {
        Self { path, date: None }
    }

    pub fn at(path: ProvisionPath, date: NaiveDate) -> Self {
        Self {
            path,
            date: Some(date),
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }
}

impl From<ProvisionPath> for ProvisionRequest {
    fn from(path: ProvisionPath) -> Self {
        Self::new(path)
    }
}

impl From<&CitingProvisionLocation> for ProvisionRequest {
    fn from(location: &CitingProvisionLocation) -> Self {
        Self::at(location.node.clone(), location.start_date)
    }
}

impl From<&CrossReference> for ProvisionRequest {
    fn from(reference: &CrossReference) -> Self {
        Self::new(reference.target_path.clone())
    }
}

impl TryFrom<&InboundReference> for ProvisionRequest {
    type Error = EngineError;

    /// Request for the citing provision at its latest location
    fn try_from(reference: &InboundReference) -> Result<Self> {
        reference
            .latest_location()
            .map(ProvisionRequest::from)
            .ok_or_else(|| {
                EngineError::InvalidRecord(format!(
                    "Inbound reference to {} has no citing locations",
                    reference.target_path
                ))
            })
    }
}

impl std::fmt::Display for ProvisionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}@{}", self.path, date),
            None => write!(f, "{}", self.path),
        }
    }
}
