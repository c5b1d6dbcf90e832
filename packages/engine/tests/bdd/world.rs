//! World struct for Cucumber BDD tests
//!
//! Contains the test state that persists across steps in a scenario.

use chrono::NaiveDate;
use cucumber::World;
use provision_engine::{
    EngineError, InboundReference, JsonRepository, Passage, PassageGroup, ProvisionPath,
    ProvisionRequest, ProvisionSource,
};
use std::collections::HashMap;
use std::fmt;

use crate::helpers::repository_loader::load_recorded_repository;

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct PassageWorld {
    /// Recorded API responses
    pub repository: JsonRepository,
    /// Passages by the name the scenario gave them
    pub passages: HashMap<String, Passage>,
    /// Last combination result (if successful)
    pub combined: Option<Passage>,
    /// Last group built
    pub group: Option<PassageGroup>,
    /// Last inbound citation query
    pub references: Vec<InboundReference>,
    /// Last error (if an operation failed)
    pub error: Option<EngineError>,
}

impl fmt::Debug for PassageWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassageWorld")
            .field("passages", &self.passages.keys().collect::<Vec<_>>())
            .field("combined", &self.combined.as_ref().map(|p| p.to_string()))
            .field("group", &self.group.as_ref().map(|g| g.to_string()))
            .field("references", &self.references.len())
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field(
                "repository",
                &format!("<{} paths recorded>", self.repository.len()),
            )
            .finish()
    }
}

impl Default for PassageWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PassageWorld {
    /// Create a new world with the recorded responses loaded.
    pub fn new() -> Self {
        let repository = match load_recorded_repository() {
            Ok(repository) => repository,
            Err(e) => panic!("Failed to load recorded responses: {}", e),
        };

        Self {
            repository,
            passages: HashMap::new(),
            combined: None,
            group: None,
            references: Vec::new(),
            error: None,
        }
    }

    /// Read a provision, storing it as a fully selected passage or recording the error
    pub fn read(&mut self, name: &str, path: &str, date: Option<&str>) {
        let request = ProvisionPath::parse(path).map(|path| {
            ProvisionRequest::new(path)
                .with_date(date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
        });
        match request.and_then(|request| self.repository.read(&request)) {
            Ok(node) => {
                self.passages.insert(name.to_string(), Passage::whole(node));
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Named passage; panics with a readable message if the scenario never created it
    pub fn passage(&self, name: &str) -> &Passage {
        self.passages
            .get(name)
            .unwrap_or_else(|| panic!("No passage named '{}' (last error: {:?})", name, self.error_message()))
    }

    /// Replace a named passage with the result of `update`, recording any error
    pub fn update(&mut self, name: &str, update: impl FnOnce(&Passage) -> provision_engine::Result<Passage>) {
        match update(self.passage(name)) {
            Ok(passage) => {
                self.passages.insert(name.to_string(), passage);
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Get error message if the last operation failed
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::PassageWorld;

    #[test]
    fn test_world_initialization() {
        let world = PassageWorld::new();
        assert!(
            !world.repository.is_empty(),
            "Expected recorded responses to be loaded"
        );
    }
}
