//! Then step definitions
//!
//! Steps that verify outcomes and assertions.

use cucumber::then;
use provision_engine::{implies, means};

use crate::helpers::error_kind;
use crate::world::PassageWorld;

// =============================================================================
// Selected text
// =============================================================================

#[then(expr = "the selected text of {string} is {string}")]
fn assert_selected_text(world: &mut PassageWorld, name: String, expected: String) {
    assert_eq!(world.passage(&name).selected_text(), expected);
}

#[then(expr = "{string} has {int} children")]
fn assert_child_count(world: &mut PassageWorld, name: String, count: usize) {
    assert_eq!(world.passage(&name).node().children().len(), count);
}

#[then(expr = "child {int} of {string} reads {string}")]
fn assert_child_text(world: &mut PassageWorld, index: usize, name: String, expected: String) {
    let children = world
        .passage(&name)
        .child_passages()
        .unwrap_or_else(|e| panic!("Expected child passages of '{}', got {}", name, e));
    let child = children
        .get(index)
        .unwrap_or_else(|| panic!("'{}' has only {} children", name, children.len()));
    assert_eq!(child.selected_text(), expected);
}

#[then(expr = "{string} is in force until {string}")]
fn assert_end_date(world: &mut PassageWorld, name: String, expected: String) {
    let end_date = world.passage(&name).end_date().map(|d| d.to_string());
    assert_eq!(end_date.as_deref(), Some(expected.as_str()));
}

// =============================================================================
// Comparison
// =============================================================================

#[then(expr = "{string} means {string}")]
fn assert_means(world: &mut PassageWorld, left: String, right: String) {
    let (a, b) = (world.passage(&left), world.passage(&right));
    assert!(means(a, b), "Expected {} to mean {}", a, b);
    assert!(means(b, a), "Expected {} to mean {}", b, a);
}

#[then(expr = "{string} does not mean {string}")]
fn assert_not_means(world: &mut PassageWorld, left: String, right: String) {
    let (a, b) = (world.passage(&left), world.passage(&right));
    assert!(!means(a, b), "Expected {} not to mean {}", a, b);
}

#[then(expr = "{string} implies {string}")]
fn assert_implies(world: &mut PassageWorld, left: String, right: String) {
    let (a, b) = (world.passage(&left), world.passage(&right));
    assert!(implies(a, b), "Expected {} to imply {}", a, b);
}

#[then(expr = "{string} does not imply {string}")]
fn assert_not_implies(world: &mut PassageWorld, left: String, right: String) {
    let (a, b) = (world.passage(&left), world.passage(&right));
    assert!(!implies(a, b), "Expected {} not to imply {}", a, b);
}

#[then(expr = "{string} strictly implies {string}")]
fn assert_strictly_implies(world: &mut PassageWorld, left: String, right: String) {
    let (a, b) = (world.passage(&left), world.passage(&right));
    assert!(a.strictly_implies(b), "Expected {} to strictly imply {}", a, b);
}

// =============================================================================
// Combination and groups
// =============================================================================

#[then(expr = "the combined passage is at {string}")]
fn assert_combined_path(world: &mut PassageWorld, expected: String) {
    let combined = world
        .combined
        .as_ref()
        .unwrap_or_else(|| panic!("Expected a combined passage, got error: {:?}", world.error_message()));
    assert_eq!(combined.path().as_str(), expected);
}

#[then(expr = "the combined passage reads {string}")]
fn assert_combined_text(world: &mut PassageWorld, expected: String) {
    let combined = world
        .combined
        .as_ref()
        .unwrap_or_else(|| panic!("Expected a combined passage, got error: {:?}", world.error_message()));
    assert_eq!(combined.selected_text(), expected);
}

#[then(expr = "the operation fails with {word}")]
fn assert_error_kind(world: &mut PassageWorld, expected: String) {
    let error = world
        .error
        .as_ref()
        .unwrap_or_else(|| panic!("Expected {} error, but the operation succeeded", expected));
    assert_eq!(error_kind(error), expected, "Unexpected error: {}", error);
}

#[then(regex = r"^the group has (\d+) members?$")]
fn assert_group_len(world: &mut PassageWorld, expected: usize) {
    let group = world.group.as_ref().expect("No group was built");
    assert_eq!(group.len(), expected, "Group was {}", group);
}

#[then(expr = "member {int} of the group reads {string}")]
fn assert_member_text(world: &mut PassageWorld, index: usize, expected: String) {
    let group = world.group.as_ref().expect("No group was built");
    assert_eq!(group.passages()[index].selected_text(), expected);
}

#[then(expr = "member {int} of the group is at {string}")]
fn assert_member_path(world: &mut PassageWorld, index: usize, expected: String) {
    let group = world.group.as_ref().expect("No group was built");
    assert_eq!(group.passages()[index].path().as_str(), expected);
}

// =============================================================================
// Citations
// =============================================================================

#[then(expr = "the citation of {string} is {string}")]
fn assert_citation(world: &mut PassageWorld, name: String, expected: String) {
    let citation = world
        .passage(&name)
        .citation()
        .unwrap_or_else(|e| panic!("Expected a citation for '{}', got {}", name, e));
    assert_eq!(citation.to_string(), expected);
}

#[then(expr = "citing {string} fails with {word}")]
fn assert_citation_error(world: &mut PassageWorld, name: String, expected: String) {
    match world.passage(&name).citation() {
        Ok(citation) => panic!("Expected {} error, got citation {}", expected, citation),
        Err(e) => assert_eq!(error_kind(&e), expected),
    }
}

#[then(expr = "there are {int} inbound references")]
fn assert_reference_count(world: &mut PassageWorld, expected: usize) {
    assert_eq!(world.references.len(), expected);
}

#[then(expr = "the first inbound reference was enacted at {int} locations")]
fn assert_location_count(world: &mut PassageWorld, expected: usize) {
    let reference = world.references.first().expect("No inbound references");
    assert_eq!(reference.locations.len(), expected);
}
