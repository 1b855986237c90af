//! Cross-reference table
//!
//! Registered anchors are owned by the table for the lifetime of one build.
//! Registration is a map insert: a later registration under the same name
//! replaces the earlier one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A linkable location registered by the anchor hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Document name (root-relative path without extension)
    pub docname: String,

    /// Root-relative path of the source file
    pub path: String,

    /// Anchor identifier the location is published under
    pub anchor_id: String,

    /// Heading title text
    pub title: String,

    /// Captured version
    pub version: String,

    /// 1-indexed line of the heading
    pub line: u32,

    /// For alias entries, the anchor identifier this alias points to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

/// The registration surface of a host cross-reference system
pub trait AnchorTable {
    /// Register `record` under `name`, returning the record it replaced
    fn register(&mut self, name: String, record: AnchorRecord) -> Option<AnchorRecord>;
}

/// In-memory label table, ordered by name
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: BTreeMap<String, AnchorRecord>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a label (anchor identifier or alias)
    pub fn get(&self, name: &str) -> Option<&AnchorRecord> {
        self.labels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnchorRecord)> {
        self.labels.iter()
    }
}

impl AnchorTable for LabelTable {
    fn register(&mut self, name: String, record: AnchorRecord) -> Option<AnchorRecord> {
        self.labels.insert(name, record)
    }
}
