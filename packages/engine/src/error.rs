//! Error types for the provision engine

use thiserror::Error;

/// Main error type for selection, comparison and loading operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Quoted phrase does not occur in the text
    #[error("Quote not found: \"{exact}\"")]
    QuoteNotFound { exact: String },

    /// Quoted phrase occurs more than once and its context does not disambiguate
    #[error("Ambiguous quote: \"{exact}\" matches {matches} locations")]
    AmbiguousQuote { exact: String, matches: usize },

    /// Position selector reaches past the end of the text
    #[error("Selection {start}..{end} is out of range for text of length {length}")]
    SelectionOutOfRange {
        start: usize,
        end: usize,
        length: usize,
    },

    /// Position selector with an empty or inverted range
    #[error("Invalid selector: start {start} must be less than end {end}")]
    InvalidSelector { start: usize, end: usize },

    /// Nodes are neither equal nor in an ancestor/descendant relation
    #[error("Incompatible nodes: {left} and {right} are not in the same branch")]
    IncompatibleNodes { left: String, right: String },

    /// Validity periods of the two nodes do not overlap
    #[error("Incompatible dates: {left} and {right} were never in force at the same time")]
    IncompatibleDates { left: String, right: String },

    /// Text or children requested from a child that was never loaded
    #[error("Unexpanded node: {0} must be fetched before its text can be used")]
    UnexpandedNode(String),

    /// Invalid citation path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid date or date range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Record from the data source is structurally invalid
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Jurisdiction segment not in the known-code table
    #[error("\"{0}\" is not a known jurisdiction identifier")]
    UnknownJurisdiction(String),

    /// Code segment not in the known-code table for its jurisdiction
    #[error("\"{code}\" is not a known code identifier in jurisdiction \"{jurisdiction}\"")]
    UnknownCode { jurisdiction: String, code: String },

    /// Citation formatting is only defined for some levels of code
    #[error("Citation serialization not implemented for {level} provision {path}")]
    CitationNotSupported { path: String, level: String },

    /// No provision at the requested path
    #[error("No enacted text found for path {0}")]
    PathNotFound(String),

    /// No version of the provision in force at the requested date
    #[error("No enacted text found for {path} at date {date}")]
    VersionNotFound { path: String, date: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Input rejected before parsing (size or depth limits)
    #[error("Failed to load provision: {0}")]
    LoadError(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
