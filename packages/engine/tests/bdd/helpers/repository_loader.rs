//! Repository loader for BDD tests
//!
//! Loads the recorded API responses shared with the integration tests.

use provision_engine::{EngineError, JsonRepository};
use std::path::Path;

/// Load `tests/fixtures/repository.json` relative to the package manifest.
pub fn load_recorded_repository() -> Result<JsonRepository, EngineError> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let fixture = Path::new(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join("repository.json");

    let content = std::fs::read_to_string(&fixture).map_err(|e| {
        EngineError::LoadError(format!("Failed to read {}: {}", fixture.display(), e))
    })?;
    let repository = JsonRepository::from_json_str(&content)?;

    tracing::debug!(paths = repository.len(), "Loaded recorded repository");
    Ok(repository)
}
