//! Configuration constants for the provision engine
//!
//! Centralized policy values used throughout the engine for:
//! - Selection normalization (gap fusion)
//! - Rendering of selected text
//! - Input limits for provision records (prevent DoS via huge or deeply nested JSON)
//!
//! These are compile-time constants. The selection policy is part of the
//! meaning of a selection: two selections only compare equal if they were
//! normalized with the same gap width.

/// Maximum gap, in characters, between two selected spans that are fused into one.
///
/// Selecting "Congress shall make no law" and "respecting an establishment"
/// separately should not render as two phrases split by an ellipsis over a
/// single space. Gaps of up to three characters (a space, a comma and a space,
/// a short conjunction) are absorbed into the selection.
pub const GAP_FUSION_WIDTH: usize = 3;

/// Marker rendered in place of unselected text.
pub const ELLIPSIS: &str = "…";

/// Separator between a node's own content and the full text of each child.
pub const NODE_SEPARATOR: char = ' ';

/// Maximum JSON document size in bytes (10 MB).
///
/// Large enough for a complete title of a code with all of its sections.
pub const MAX_JSON_SIZE: usize = 10_000_000;

/// Maximum nesting depth of provision records.
///
/// Real citation paths rarely go beyond eight levels
/// (jurisdiction/code/title/section/subsection/paragraph/...).
pub const MAX_TREE_DEPTH: usize = 32;

/// Maximum number of characters of prefix or suffix generated when a
/// selection is expressed as quote selectors.
pub const MAX_QUOTE_CONTEXT: usize = 64;

/// Characters ignored at the edges of phrases when comparing rendered text.
pub const PHRASE_TRIM_CHARS: &[char] = &[',', ':', ';', '.', ' '];
