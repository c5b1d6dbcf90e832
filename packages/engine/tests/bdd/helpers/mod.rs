//! Shared helpers for BDD step definitions

pub mod repository_loader;

use provision_engine::EngineError;

/// Variant name of an engine error, as written in feature files
pub fn error_kind(error: &EngineError) -> &'static str {
    match error {
        EngineError::QuoteNotFound { .. } => "QuoteNotFound",
        EngineError::AmbiguousQuote { .. } => "AmbiguousQuote",
        EngineError::SelectionOutOfRange { .. } => "SelectionOutOfRange",
        EngineError::InvalidSelector { .. } => "InvalidSelector",
        EngineError::IncompatibleNodes { .. } => "IncompatibleNodes",
        EngineError::IncompatibleDates { .. } => "IncompatibleDates",
        EngineError::UnexpandedNode(_) => "UnexpandedNode",
        EngineError::InvalidPath(_) => "InvalidPath",
        EngineError::InvalidDate(_) => "InvalidDate",
        EngineError::InvalidRecord(_) => "InvalidRecord",
        EngineError::UnknownJurisdiction(_) => "UnknownJurisdiction",
        EngineError::UnknownCode { .. } => "UnknownCode",
        EngineError::CitationNotSupported { .. } => "CitationNotSupported",
        EngineError::PathNotFound(_) => "PathNotFound",
        EngineError::VersionNotFound { .. } => "VersionNotFound",
        EngineError::JsonError(_) => "JsonError",
        EngineError::LoadError(_) => "LoadError",
    }
}
