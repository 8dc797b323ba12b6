//! # Tracked-Resource Registry
//!
//! Turns the per-slot configuration strings into concrete match sets.
//!
//! Two grammars are accepted:
//! - `namespace:id`: an exact resource identifier (e.g. `minecraft:diamond_ore`)
//! - `#namespace:tag`: a category tag (e.g. `#c:ores`)
//!
//! Validation happens when configuration is saved ([`validate_entry`]). When a set is
//! built ([`TrackedSet::from_entries`]) invalid entries are dropped with a warning and
//! the remaining entries stay in effect; a set that ends up empty leaves its slot
//! unconfigured.

mod resource_id;

use std::{collections::HashSet, str::FromStr};

pub use resource_id::{ResourceId, TagRef, TrackingError};

/// Answers category-tag membership questions for resources.
///
/// The world view implements this so the registry never needs its own copy of the
/// host's tag tables.
pub trait TagLookup {
    /// Returns `true` if `resource` belongs to the category `tag`.
    fn has_tag(&self, resource: &ResourceId, tag: &TagRef) -> bool;
}

/// One parsed configuration entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackedEntry {
    /// Matches exactly one resource identifier.
    Exact(ResourceId),
    /// Matches every resource carrying the tag.
    Tag(TagRef),
}

impl FromStr for TrackedEntry {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_prefix('#') {
            Some(tag) => Ok(TrackedEntry::Tag(TagRef::new(tag.parse()?))),
            None => Ok(TrackedEntry::Exact(trimmed.parse()?)),
        }
    }
}

/// Validates a single configuration entry against the tracked-entry grammar.
///
/// This is the check applied when configuration is saved; anything it rejects must
/// never reach the scanner.
pub fn validate_entry(entry: &str) -> Result<TrackedEntry, TrackingError> {
    entry.parse()
}

/// The resolved collection of exact identifiers and category tags a slot scans for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackedSet {
    exact_ids: HashSet<ResourceId>,
    tag_matchers: HashSet<TagRef>,
}

impl TrackedSet {
    /// Builds a set from raw configuration strings.
    ///
    /// Blank entries are ignored silently (the slot editor writes them when a field is
    /// cleared). Malformed entries are logged and skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = TrackedSet::default();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.trim().is_empty() {
                continue;
            }
            match validate_entry(entry) {
                Ok(TrackedEntry::Exact(id)) => {
                    set.exact_ids.insert(id);
                }
                Ok(TrackedEntry::Tag(tag)) => {
                    log::debug!("Tracking resource tag: {}", tag);
                    set.tag_matchers.insert(tag);
                }
                Err(error) => {
                    log::warn!("Dropping tracked entry: {}", error);
                }
            }
        }
        set
    }

    /// Returns `false` when nothing is tracked; such a slot is skipped by the scanner
    /// and by slot cycling.
    pub fn is_configured(&self) -> bool {
        !self.exact_ids.is_empty() || !self.tag_matchers.is_empty()
    }

    /// Exact identifiers in this set.
    pub fn exact_ids(&self) -> &HashSet<ResourceId> {
        &self.exact_ids
    }

    /// Category tags in this set.
    pub fn tag_matchers(&self) -> &HashSet<TagRef> {
        &self.tag_matchers
    }

    /// Total number of entries (exact ids plus tags).
    pub fn len(&self) -> usize {
        self.exact_ids.len() + self.tag_matchers.len()
    }

    /// Returns `true` if the set has no entries.
    pub fn is_empty(&self) -> bool {
        !self.is_configured()
    }

    /// Tests one resource against the set: exact ids first, then each tag.
    pub fn matches<L: TagLookup + ?Sized>(&self, resource: &ResourceId, tags: &L) -> bool {
        self.exact_ids.contains(resource)
            || self
                .tag_matchers
                .iter()
                .any(|tag| tags.has_tag(resource, tag))
    }
}
