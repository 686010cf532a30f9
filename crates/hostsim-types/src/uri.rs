//! Path-shaped URIs addressing nodes in the simulated host.

use crate::error::FsError;
use serde::{Deserialize, Serialize};

/// An opaque identifier for a node in the simulated filesystem.
///
/// Internally a normalized absolute path: `/` and `\` separators are both
/// accepted and normalized to `/`, redundant separators collapse, and a
/// leading `/` is inserted if missing. No `..` or symlink resolution is
/// performed — the simulated host joins paths textually.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    /// Parse a path-shaped URI. Fails only on empty input.
    pub fn file(input: &str) -> Result<Self, FsError> {
        if input.is_empty() {
            return Err(FsError::InvalidPath(input.to_string()));
        }
        let cleaned = input.replace('\\', "/");
        let segments: Vec<&str> = cleaned.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Ok(Self("/".to_string()));
        }
        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// The normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the root path `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The final path segment, or `""` for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Uri> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Uri("/".to_string())),
            Some(idx) => Some(Uri(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a child segment.
    pub fn join(&self, child: &str) -> Result<Uri, FsError> {
        Uri::file(&format!("{}/{}", self.0, child))
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Uri {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::file(s)
    }
}
