//! Entity registry: who owns which story prop, and what state it is in.
//!
//! The registry is the single source of truth for ownership. Every prompt
//! that mentions props is built from [`EntityRegistry::describe`], so a
//! character can lie about the wallet but the director always knows whose
//! it is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status a prop gets when registered without one.
pub const DEFAULT_STATUS: &str = "present";

/// The canonical record for one prop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Set at registration; never changed by [`EntityRegistry::update`].
    pub owner: String,
    pub status: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A partial set of fields to register or merge into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl EntityPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that only sets the status.
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Add or replace one attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.attributes.is_empty()
    }
}

/// Ownership and status ledger for story props, keyed by item name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistry {
    items: BTreeMap<String, EntityRecord>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the full record for `name`.
    pub fn register(&mut self, name: impl Into<String>, owner: impl Into<String>, attrs: EntityPatch) {
        let record = EntityRecord {
            owner: owner.into(),
            status: attrs.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            attributes: attrs.attributes,
        };
        self.items.insert(name.into(), record);
    }

    /// Merge `patch` into an existing record.
    ///
    /// Returns false (and changes nothing) if the item was never registered.
    pub fn update(&mut self, name: &str, patch: EntityPatch) -> bool {
        let Some(current) = self.items.get(name) else {
            return false;
        };

        // Build the merged record first so the swap is all-or-nothing.
        let mut merged = current.clone();
        if let Some(status) = patch.status {
            merged.status = status;
        }
        merged.attributes.extend(patch.attributes);
        self.items.insert(name.to_string(), merged);
        true
    }

    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.items.get(name)
    }

    pub fn get_owner(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(|r| r.owner.as_str())
    }

    /// Names of every item owned by `owner`, in name order.
    pub fn list_by_owner(&self, owner: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter(|(_, r)| r.owner == owner)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.items.iter().map(|(name, r)| (name.as_str(), r))
    }

    /// Render the registry as a prompt block.
    pub fn describe(&self) -> String {
        if self.items.is_empty() {
            return String::new();
        }

        let mut out = String::from("ENTITY REGISTRY (true ownership):\n");
        for (name, record) in &self.items {
            out.push_str(&format!(
                "- {name}: OWNER={} STATUS={}",
                record.owner, record.status
            ));
            for (key, value) in &record.attributes {
                out.push_str(&format!(" {key}={value}"));
            }
            out.push('\n');
        }
        out
    }
}
