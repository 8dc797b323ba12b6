//! # Resource Identifiers
//!
//! Namespaced identifiers (`namespace:path`) for world resources and the category
//! tags (`#namespace:path`) that group them.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Errors produced while parsing a tracked-resource entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The entry was empty after trimming.
    #[error("tracked entry is empty")]
    Empty,
    /// The entry has no `:` separating namespace and path.
    #[error("tracked entry {0:?} is missing the ':' namespace separator")]
    MissingSeparator(String),
    /// The namespace is empty or contains characters outside `[a-z0-9_.-]`.
    #[error("tracked entry {0:?} has an invalid namespace")]
    InvalidNamespace(String),
    /// The path is empty or contains characters outside `[a-z0-9_.-/]`.
    #[error("tracked entry {0:?} has an invalid path")]
    InvalidPath(String),
}

/// A namespaced resource identifier such as `minecraft:diamond_ore`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    namespace: String,
    path: String,
}

impl ResourceId {
    /// Builds an identifier from already-validated parts.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// The namespace part (before the `:`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The path part (after the `:`).
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for ResourceId {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TrackingError::Empty);
        }
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| TrackingError::MissingSeparator(s.to_string()))?;
        if namespace.is_empty() || !namespace.chars().all(is_namespace_char) {
            return Err(TrackingError::InvalidNamespace(s.to_string()));
        }
        if path.is_empty() || !path.chars().all(is_path_char) {
            return Err(TrackingError::InvalidPath(s.to_string()));
        }
        Ok(ResourceId::new(namespace, path))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// A reference to a category tag, written `#namespace:path` in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagRef(ResourceId);

impl TagRef {
    /// Wraps an identifier as a tag reference.
    pub fn new(id: ResourceId) -> Self {
        Self(id)
    }

    /// The tag's identifier, without the leading `#`.
    pub fn id(&self) -> &ResourceId {
        &self.0
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
