//! Given step definitions
//!
//! Steps that set up the initial state for scenarios.

use cucumber::{gherkin::Step, given};
use provision_engine::TextPositionSelector;

use crate::world::PassageWorld;

// =============================================================================
// Background steps
// =============================================================================

#[given("the recorded API responses")]
fn recorded_responses(world: &mut PassageWorld) {
    assert!(!world.repository.is_empty());
}

// =============================================================================
// Reading provisions
// =============================================================================

#[given(expr = "the provision {string} read as {string}")]
fn read_latest(world: &mut PassageWorld, path: String, name: String) {
    world.read(&name, &path, None);
    assert!(
        world.error.is_none(),
        "Expected {} to be readable, got {:?}",
        path,
        world.error_message()
    );
}

#[given(expr = "the provision {string} in force on {string} read as {string}")]
fn read_at_date(world: &mut PassageWorld, path: String, date: String, name: String) {
    world.read(&name, &path, Some(&date));
    assert!(
        world.error.is_none(),
        "Expected {} at {} to be readable, got {:?}",
        path,
        date,
        world.error_message()
    );
}

// =============================================================================
// Selecting text
// =============================================================================

#[given(expr = "{string} selects {string}")]
fn select_quote(world: &mut PassageWorld, name: String, quote: String) {
    world.update(&name, |passage| passage.select([quote.as_str()]));
}

#[given(expr = "{string} also selects {string}")]
fn select_more_quote(world: &mut PassageWorld, name: String, quote: String) {
    world.update(&name, |passage| passage.select_more([quote.as_str()]));
}

#[given(regex = r#"^"([^"]*)" selects the phrases:$"#)]
fn select_phrases(world: &mut PassageWorld, name: String, step: &Step) {
    let Some(table) = &step.table else {
        panic!("Expected a table of phrases");
    };
    let phrases: Vec<String> = table.rows.iter().filter_map(|row| row.first().cloned()).collect();
    world.update(&name, |passage| passage.select(phrases.iter().map(String::as_str)));
}

#[given(expr = "{string} selects characters {int} to {int}")]
fn select_positions(world: &mut PassageWorld, name: String, start: usize, end: usize) {
    world.update(&name, |passage| {
        passage.select([TextPositionSelector::new(start, end)?])
    });
}

#[given(expr = "{string} selects nothing")]
fn clear_selection(world: &mut PassageWorld, name: String) {
    world.update(&name, |passage| Ok(passage.clear_selection()));
}
