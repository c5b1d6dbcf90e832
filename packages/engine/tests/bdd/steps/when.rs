//! When step definitions
//!
//! Steps that execute actions (reads, combinations, grouping).

use cucumber::{gherkin::Step, when};
use provision_engine::{combine, PassageGroup, ProvisionPath, ProvisionSource};

use crate::world::PassageWorld;

// =============================================================================
// Reading
// =============================================================================

#[when(expr = "the provision {string} is requested as {string}")]
fn request_latest(world: &mut PassageWorld, path: String, name: String) {
    world.read(&name, &path, None);
}

#[when(expr = "the provision {string} in force on {string} is requested as {string}")]
fn request_at_date(world: &mut PassageWorld, path: String, date: String, name: String) {
    world.read(&name, &path, Some(&date));
}

// =============================================================================
// Combining
// =============================================================================

#[when(expr = "{string} is combined with {string}")]
fn combine_passages(world: &mut PassageWorld, left: String, right: String) {
    match combine(world.passage(&left), world.passage(&right)) {
        Ok(passage) => {
            world.combined = Some(passage);
            world.error = None;
        }
        Err(e) => {
            world.combined = None;
            world.error = Some(e);
        }
    }
}

#[when("the passages are grouped:")]
fn group_passages(world: &mut PassageWorld, step: &Step) {
    let Some(table) = &step.table else {
        panic!("Expected a table of passage names");
    };
    let passages: Vec<_> = table
        .rows
        .iter()
        .filter_map(|row| row.first())
        .map(|name| world.passage(name).clone())
        .collect();
    world.group = Some(PassageGroup::from_passages(passages));
}

#[when(expr = "{string} is added to the group")]
fn add_to_group(world: &mut PassageWorld, name: String) {
    let passage = world.passage(&name).clone();
    let group = world.group.take().unwrap_or_default();
    world.group = Some(group.with(passage));
}

// =============================================================================
// Citations
// =============================================================================

#[when(expr = "the citations to {string} are requested")]
fn request_citations(world: &mut PassageWorld, target: String) {
    let result = ProvisionPath::parse(&target).and_then(|path| world.repository.citations_to(&path));
    match result {
        Ok(references) => {
            world.references = references;
            world.error = None;
        }
        Err(e) => {
            world.references.clear();
            world.error = Some(e);
        }
    }
}

#[when(expr = "the latest citing provision is read as {string}")]
fn read_latest_citing(world: &mut PassageWorld, name: String) {
    let Some(reference) = world.references.first() else {
        panic!("No inbound references were loaded");
    };
    match world.repository.read_inbound(reference) {
        Ok(node) => {
            world.passages.insert(name, node.into());
            world.error = None;
        }
        Err(e) => world.error = Some(e),
    }
}
