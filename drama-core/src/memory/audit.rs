//! Before/after records of every memory update.

use crate::story::{EmotionalState, StoryState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The mutable feelings of one character at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileValues {
    pub trust: BTreeMap<String, f32>,
    pub suspicion: BTreeMap<String, f32>,
    pub emotional_state: EmotionalState,
}

/// What caused a memory update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditSource {
    Dialogue { speaker: String, signals: Vec<String> },
    Action { actor: String, rule: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryAuditEntry {
    pub turn: u32,
    pub source: AuditSource,
    pub before: BTreeMap<String, ProfileValues>,
    pub after: BTreeMap<String, ProfileValues>,
}

impl MemoryAuditEntry {
    /// Names of characters whose values differ between before and after.
    pub fn changed(&self) -> Vec<&str> {
        self.after
            .iter()
            .filter(|(name, after)| self.before.get(name.as_str()) != Some(after))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub(crate) fn capture(state: &StoryState) -> BTreeMap<String, ProfileValues> {
    state
        .profiles()
        .map(|p| {
            (
                p.name.clone(),
                ProfileValues {
                    trust: p.trust.clone(),
                    suspicion: p.suspicion.clone(),
                    emotional_state: p.emotional_state,
                },
            )
        })
        .collect()
}
