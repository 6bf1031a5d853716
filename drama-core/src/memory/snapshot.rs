//! Read-only view of one character's memory, as handed to prompts.

use crate::story::{EmotionalState, StoryState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_RELATIONSHIPS: usize = 2;
const RECENT_OWN_LINES: usize = 3;
const KEY_KNOWLEDGE: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub name: String,
    pub emotional_state: EmotionalState,
    /// Highest trust first; ties by name.
    pub top_trust: Vec<(String, f32)>,
    pub top_suspicion: Vec<(String, f32)>,
    pub recent_own_dialogue: Vec<String>,
    pub key_knowledge: Vec<String>,
    pub inventory: Vec<String>,
}

impl MemorySnapshot {
    pub(crate) fn build(state: &StoryState, name: &str) -> Option<Self> {
        let profile = state.profile(name)?;
        Some(Self {
            name: profile.name.clone(),
            emotional_state: profile.emotional_state,
            top_trust: top_n(&profile.trust, TOP_RELATIONSHIPS),
            top_suspicion: top_n(&profile.suspicion, TOP_RELATIONSHIPS),
            recent_own_dialogue: state
                .recent_lines_of(name, RECENT_OWN_LINES)
                .into_iter()
                .map(String::from)
                .collect(),
            key_knowledge: profile.recent_knowledge(KEY_KNOWLEDGE).to_vec(),
            inventory: profile.inventory.clone(),
        })
    }

    /// Plain-text block for the character prompt.
    pub fn describe(&self) -> String {
        let pairs = |list: &[(String, f32)]| {
            list.iter()
                .map(|(n, v)| format!("{n}={v:.2}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut out = format!(
            "Emotional State: {}\nTrust: {}\nSuspicion: {}\nKnowledge: {}",
            self.emotional_state.name(),
            pairs(&self.top_trust),
            pairs(&self.top_suspicion),
            self.key_knowledge.join(", "),
        );
        if !self.inventory.is_empty() {
            out.push_str(&format!("\nCarrying: {}", self.inventory.join(", ")));
        }
        out
    }
}

fn top_n(values: &BTreeMap<String, f32>, n: usize) -> Vec<(String, f32)> {
    let mut sorted: Vec<(String, f32)> = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted
}
