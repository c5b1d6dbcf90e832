//! Provision Engine
//!
//! Selects, compares and merges passages of hierarchically structured
//! legislative text. This library provides functionality for:
//! - Loading versioned provision trees from API-shaped JSON records
//! - Selecting text by quotes or character positions and rendering the selection
//! - Comparing passages across different nodes and versions (implies, means)
//! - Keeping groups of passages free of overlapping members
//! - Formatting statutory citations as text and CSL-JSON
//!
//! # Example
//!
//! ```ignore
//! use provision_engine::{JsonRepository, Passage, ProvisionRequest, ProvisionSource};
//!
//! let repository = JsonRepository::from_json_str(&responses)?;
//! let amendment = repository.read(&ProvisionRequest::new("/us/const/amendment/IV".parse()?))?;
//!
//! let passage = Passage::whole(amendment).select(["The right of the people"])?;
//! assert_eq!(passage.selected_text(), "The right of the people…");
//! ```

pub mod citation;
pub mod compare;
pub mod config;
pub mod error;
pub mod group;
pub mod passage;
pub mod position_set;
pub mod provision;
pub mod record;
pub mod reference;
pub mod repository;
pub mod selector;
pub mod sequence;
pub mod uri;

// Re-export commonly used items
pub use citation::{identify_code, Citation, CodeLevel, KnownCode};
pub use compare::{combine, implies, means, overlaps, strictly_implies};
pub use error::{EngineError, Result};
pub use group::PassageGroup;
pub use passage::{AnchoredPassage, Passage};
pub use position_set::TextPositionSet;
pub use provision::{ContentSpan, ProvisionChild, ProvisionNode, ProvisionNodeBuilder};
pub use record::{
    ChildRecord, PassageRecord, RawChild, RawPassage, RawPosition, RawProvision, RawSelection,
    RawTextVersion,
};
pub use reference::{
    CitingProvisionLocation, CrossReference, InboundReference, ProvisionRequest, RawCitingRecord,
};
pub use repository::{JsonRepository, ProvisionSource, PublicationCoverage};
pub use selector::{Selector, TextPositionSelector, TextQuoteSelector};
pub use sequence::TextSequence;
pub use uri::{PathRelation, ProvisionPath};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
