//! Directory Scope Value Object
//!
//! A named subtree of the directory. Scopes are searched in the order they
//! are configured and the tag of the matching one is stored on the session.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryScope {
    pub tag: String,
    pub base_dn: String,
}

/// Error when parsing a scope list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid directory scope entry: {0:?} (expected tag=baseDN)")]
pub struct ScopeParseError(pub String);

impl DirectoryScope {
    pub fn new(tag: impl Into<String>, base_dn: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            base_dn: base_dn.into(),
        }
    }

    /// Parse `tag=baseDN;tag=baseDN`. Only the first `=` separates the tag,
    /// the base DN keeps its own `=` signs.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ScopeParseError> {
        input
            .split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (tag, base_dn) = entry
                    .split_once('=')
                    .ok_or_else(|| ScopeParseError(entry.to_string()))?;
                let (tag, base_dn) = (tag.trim(), base_dn.trim());
                if tag.is_empty() || base_dn.is_empty() {
                    return Err(ScopeParseError(entry.to_string()));
                }
                Ok(Self::new(tag, base_dn))
            })
            .collect()
    }

    /// Staff, faculty and project subtrees under `suffix`, in login priority order
    pub fn defaults(suffix: &str) -> Vec<Self> {
        vec![
            Self::new("staff", format!("ou=staff,ou=people,{suffix}")),
            Self::new("faculty", format!("ou=faculty,ou=people,{suffix}")),
            Self::new("project", format!("ou=project,ou=employee,{suffix}")),
        ]
    }
}

impl fmt::Display for DirectoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}
