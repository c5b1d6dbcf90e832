//! Citation paths for provisions
//!
//! Provisions are identified by slash-segmented paths in the USLM style:
//!
//! 1. **Jurisdiction**: `us`, `us-ca`, `test`
//! 2. **Code**: `const`, `usc`, `cfr`, `acts`, ...
//! 3. **Title / volume**: `t17`, `amendment`, `47`
//! 4. **Section**: `s102`, `II`, `11`
//! 5. Any number of deeper subdivisions: `b`, `1`, `iii-con`
//!
//! Paths may also arrive as full API URLs (`https://host/api/v1/us/usc/t17/s102/`)
//! or carry a version date (`/test/acts/47/11@2020-01-01`); both are reduced to
//! the bare path.
//!
//! # Examples
//!
//! ```
//! use provision_engine::uri::{PathRelation, ProvisionPath};
//!
//! let path = ProvisionPath::parse("/us/usc/t17/s102/b").unwrap();
//! assert_eq!(path.jurisdiction(), Some("us"));
//! assert_eq!(path.code(), Some("usc"));
//! assert_eq!(path.title(), Some("t17"));
//! assert_eq!(path.section(), Some("s102"));
//!
//! let section = ProvisionPath::parse("us/usc/t17/s102/").unwrap();
//! assert_eq!(section.as_str(), "/us/usc/t17/s102");
//! assert_eq!(section.relation_to(&path), PathRelation::Ancestor);
//! ```

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// How two paths sit relative to each other in the citation hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRelation {
    /// Same path
    Same,
    /// Left path is a proper ancestor of the right path
    Ancestor,
    /// Left path is a proper descendant of the right path
    Descendant,
    /// Different branches
    Unrelated,
}

impl PathRelation {
    /// Whether the two paths are in the same branch
    pub fn is_related(&self) -> bool {
        !matches!(self, PathRelation::Unrelated)
    }
}

/// Normalized citation path, always `/`-prefixed with no trailing slash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProvisionPath {
    path: String,
}

impl TryFrom<String> for ProvisionPath {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ProvisionPath> for String {
    fn from(path: ProvisionPath) -> Self {
        path.path
    }
}

impl std::str::FromStr for ProvisionPath {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ProvisionPath {
    /// Parse a path, API URL or dated path.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidPath` for an empty path, an empty segment
    /// (`/us//const`) or a URL without an `/api/v<N>/` root.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let without_root = if trimmed.contains("://") {
            Self::strip_api_root(trimmed)?
        } else {
            trimmed
        };
        let without_date = without_root
            .split_once('@')
            .map_or(without_root, |(path, _date)| path);

        let inner = without_date.trim_matches('/');
        if inner.is_empty() {
            return Err(EngineError::InvalidPath(format!(
                "Path must have at least one segment, got: {:?}",
                raw
            )));
        }
        if inner.split('/').any(str::is_empty) {
            return Err(EngineError::InvalidPath(format!(
                "Path contains an empty segment: {}",
                raw
            )));
        }

        Ok(Self {
            path: format!("/{inner}"),
        })
    }

    /// Remove `scheme://host/api/vN` from an API URL
    fn strip_api_root(url: &str) -> Result<&str> {
        let after_scheme = url
            .split_once("://")
            .map_or(url, |(_scheme, rest)| rest);
        let mut search_from = 0;
        while let Some(found) = after_scheme[search_from..].find("/api/v") {
            let version_start = search_from + found + "/api/v".len();
            let rest = &after_scheme[version_start..];
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            if digits > 0 && (rest.len() == digits || rest[digits..].starts_with('/')) {
                return Ok(&rest[digits..]);
            }
            search_from = version_start;
        }
        Err(EngineError::InvalidPath(format!(
            "URL does not contain an /api/v<N>/ root: {}",
            url
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path segments without the leading empty segment
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path[1..].split('/')
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Get a segment by position (0 = jurisdiction)
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments().nth(index)
    }

    pub fn jurisdiction(&self) -> Option<&str> {
        self.segment(0)
    }

    pub fn code(&self) -> Option<&str> {
        self.segment(1)
    }

    pub fn title(&self) -> Option<&str> {
        self.segment(2)
    }

    pub fn section(&self) -> Option<&str> {
        self.segment(3)
    }

    /// `/jurisdiction/code` prefix, if the path is that deep
    pub fn code_path(&self) -> Option<ProvisionPath> {
        let jurisdiction = self.jurisdiction()?;
        let code = self.code()?;
        Some(Self {
            path: format!("/{jurisdiction}/{code}"),
        })
    }

    /// Parent path, or `None` at the jurisdiction level
    pub fn parent(&self) -> Option<ProvisionPath> {
        let (parent, _last) = self.path.rsplit_once('/')?;
        (!parent.is_empty()).then(|| Self {
            path: parent.to_string(),
        })
    }

    /// Append a segment.
    pub fn join(&self, segment: &str) -> Result<ProvisionPath> {
        Self::parse(&format!("{}/{}", self.path, segment.trim_matches('/')))
    }

    /// Whether this path is a proper ancestor of `other`, compared segment-wise
    pub fn is_ancestor_of(&self, other: &ProvisionPath) -> bool {
        other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && other.path.as_bytes()[self.path.len()] == b'/'
    }

    /// Whether this path is `other` or one of its descendants
    pub fn starts_with(&self, other: &ProvisionPath) -> bool {
        self == other || other.is_ancestor_of(self)
    }

    /// Relation of this path to `other`
    pub fn relation_to(&self, other: &ProvisionPath) -> PathRelation {
        if self == other {
            PathRelation::Same
        } else if self.is_ancestor_of(other) {
            PathRelation::Ancestor
        } else if other.is_ancestor_of(self) {
            PathRelation::Descendant
        } else {
            PathRelation::Unrelated
        }
    }
}

impl std::fmt::Display for ProvisionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl AsRef<str> for ProvisionPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
