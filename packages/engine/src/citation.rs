//! Citations to codified provisions
//!
//! Maps a provision's path and date to the fields of a written citation and to
//! CSL-JSON (`type = "legislation"`). Citations bottom out at the section, so a
//! subsection cites the same as its section.

use crate::error::{EngineError, Result};
use crate::provision::ProvisionNode;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Kind of code a provision is published in, in order of precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeLevel {
    Constitution = 1,
    Statute = 2,
    Regulation = 3,
    CourtRule = 4,
}

impl std::fmt::Display for CodeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CodeLevel::Constitution => "constitution",
            CodeLevel::Statute => "statute",
            CodeLevel::Regulation => "regulation",
            CodeLevel::CourtRule => "court rule",
        };
        f.write_str(name)
    }
}

/// Entry of the known-code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCode {
    pub jurisdiction: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub level: CodeLevel,
}

const KNOWN_CODES: &[KnownCode] = &[
    KnownCode {
        jurisdiction: "test",
        code: "acts",
        name: "Test Acts",
        level: CodeLevel::Statute,
    },
    KnownCode {
        jurisdiction: "us",
        code: "const",
        name: "U.S. Const.",
        level: CodeLevel::Constitution,
    },
    KnownCode {
        jurisdiction: "us",
        code: "usc",
        name: "U.S. Code",
        level: CodeLevel::Statute,
    },
    KnownCode {
        jurisdiction: "us",
        code: "cfr",
        name: "CFR",
        level: CodeLevel::Regulation,
    },
    KnownCode {
        jurisdiction: "us-ca",
        code: "const",
        name: "Cal. Const.",
        level: CodeLevel::Constitution,
    },
    KnownCode {
        jurisdiction: "us-ca",
        code: "code",
        name: "Cal. Codes",
        level: CodeLevel::Statute,
    },
    KnownCode {
        jurisdiction: "us-ca",
        code: "ccr",
        name: "Cal. Code Regs.",
        level: CodeLevel::Regulation,
    },
    KnownCode {
        jurisdiction: "us-ca",
        code: "roc",
        name: "Cal. Rules of Court",
        level: CodeLevel::CourtRule,
    },
];

/// Look up a code by its path segments.
///
/// # Errors
///
/// `UnknownJurisdiction` if no code is known for the jurisdiction,
/// `UnknownCode` if the jurisdiction is known but the code is not.
pub fn identify_code(jurisdiction: &str, code: &str) -> Result<KnownCode> {
    let mut in_jurisdiction = KNOWN_CODES
        .iter()
        .filter(|known| known.jurisdiction == jurisdiction)
        .peekable();
    if in_jurisdiction.peek().is_none() {
        return Err(EngineError::UnknownJurisdiction(jurisdiction.to_string()));
    }
    in_jurisdiction
        .find(|known| known.code == code)
        .copied()
        .ok_or_else(|| EngineError::UnknownCode {
            jurisdiction: jurisdiction.to_string(),
            code: code.to_string(),
        })
}

/// Citation to a statutory section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub jurisdiction: String,
    /// Display name of the code, e.g. "U.S. Code"
    pub code: String,
    pub level: CodeLevel,
    /// Title number without its `t` prefix
    pub volume: Option<String>,
    /// Section in the form `sec. 102`
    pub section: Option<String>,
    /// Only set when the date is known to be a revision date
    pub revision_date: Option<NaiveDate>,
}

impl Citation {
    /// Build a citation from raw path segments.
    pub fn new(
        jurisdiction: &str,
        code: &str,
        volume: Option<&str>,
        section: Option<&str>,
        revision_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let known = identify_code(jurisdiction, code)?;
        Ok(Self {
            jurisdiction: jurisdiction.to_string(),
            code: known.name.to_string(),
            level: known.level,
            volume: volume
                .map(|v| v.trim_start_matches('t').to_string())
                .filter(|v| !v.is_empty()),
            section: section.filter(|s| !s.is_empty()).map(|s| {
                if s.starts_with("sec. ") {
                    s.to_string()
                } else {
                    format!("sec. {}", s.trim_start_matches('s'))
                }
            }),
            revision_date,
        })
    }

    /// Citation for a provision.
    ///
    /// # Errors
    ///
    /// `CitationNotSupported` unless the provision is in a statute; the
    /// known-code errors for paths outside the table.
    pub fn for_node(node: &ProvisionNode) -> Result<Self> {
        let level = node.level()?;
        if level != CodeLevel::Statute {
            return Err(EngineError::CitationNotSupported {
                path: node.path().to_string(),
                level: level.to_string(),
            });
        }
        let revision_date = node.known_revision_date().then(|| node.start_date());
        Self::new(
            node.jurisdiction().unwrap_or_default(),
            node.code().unwrap_or_default(),
            node.title(),
            node.section(),
            revision_date,
        )
    }

    /// CSL-JSON object for this citation
    pub fn csl_value(&self) -> serde_json::Value {
        let mut value = json!({
            "type": "legislation",
            "jurisdiction": self.jurisdiction,
            "container-title": self.code,
            "volume": self.volume,
            "section": self.section,
        });
        if let (Some(date), Some(object)) = (self.revision_date, value.as_object_mut()) {
            object.insert(
                "event-date".to_string(),
                json!({ "date-parts": [[date.year().to_string(), date.month(), date.day()]] }),
            );
        }
        value
    }

    /// CSL-JSON string for this citation
    pub fn csl_json(&self) -> String {
        self.csl_value().to_string()
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut name = format!(
            "{} {} {}",
            self.volume.as_deref().unwrap_or_default(),
            self.code,
            self.section.as_deref().unwrap_or_default()
        );
        if let Some(date) = self.revision_date {
            name.push_str(&format!(" ({})", date.year()));
        }
        f.write_str(name.trim().replace("sec.", "§").as_str())
    }
}
