//! Character profiles: the structured memory each character carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trust every character starts with toward every other character.
pub const DEFAULT_TRUST: f32 = 0.5;

/// Suspicion every character starts with toward every other character.
pub const DEFAULT_SUSPICION: f32 = 0.1;

/// How a character currently feels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    #[default]
    Neutral,
    Angry,
    Anxious,
    Calm,
    Defensive,
    Desperate,
    Determined,
    Nervous,
}

impl EmotionalState {
    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            EmotionalState::Neutral => "neutral",
            EmotionalState::Angry => "angry",
            EmotionalState::Anxious => "anxious",
            EmotionalState::Calm => "calm",
            EmotionalState::Defensive => "defensive",
            EmotionalState::Desperate => "desperate",
            EmotionalState::Determined => "determined",
            EmotionalState::Nervous => "nervous",
        }
    }
}

/// Social standing that gates some dialogue signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SocialRole {
    /// Holds official power over the scene (e.g. the constable).
    Authority,
    /// Has the least leverage in the scene (e.g. the rickshaw driver).
    LowStatus,
    #[default]
    Ordinary,
}

/// Per-character memory: relationships, mood, knowledge and inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub role: SocialRole,
    /// Trust toward each other character, in [0, 1].
    pub trust: BTreeMap<String, f32>,
    /// Suspicion toward each other character, in [0, 1].
    pub suspicion: BTreeMap<String, f32>,
    pub emotional_state: EmotionalState,
    /// Knowledge tokens in the order they were learned, without duplicates.
    knowledge: Vec<String>,
    pub inventory: Vec<String>,
}

impl CharacterProfile {
    /// Create a profile with no relationships yet.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            role: SocialRole::Ordinary,
            trust: BTreeMap::new(),
            suspicion: BTreeMap::new(),
            emotional_state: EmotionalState::Neutral,
            knowledge: Vec::new(),
            inventory: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: SocialRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_inventory(mut self, inventory: Vec<String>) -> Self {
        self.inventory = inventory;
        self
    }

    /// Seed default trust and suspicion toward everyone else in the cast.
    pub fn seed_relationships<'a>(&mut self, cast: impl IntoIterator<Item = &'a str>) {
        for other in cast {
            if other == self.name {
                continue;
            }
            self.trust.entry(other.to_string()).or_insert(DEFAULT_TRUST);
            self.suspicion
                .entry(other.to_string())
                .or_insert(DEFAULT_SUSPICION);
        }
    }

    /// Trust toward `other` (0.0 if never met).
    pub fn trust_toward(&self, other: &str) -> f32 {
        self.trust.get(other).copied().unwrap_or(0.0)
    }

    /// Suspicion toward `other` (0.0 if never met).
    pub fn suspicion_toward(&self, other: &str) -> f32 {
        self.suspicion.get(other).copied().unwrap_or(0.0)
    }

    /// Shift trust toward `other`, clamped to [0, 1].
    pub fn adjust_trust(&mut self, other: &str, delta: f32) {
        let value = self.trust.entry(other.to_string()).or_insert(0.0);
        *value = (*value + delta).clamp(0.0, 1.0);
    }

    /// Shift suspicion toward `other`, clamped to [0, 1].
    pub fn adjust_suspicion(&mut self, other: &str, delta: f32) {
        let value = self.suspicion.entry(other.to_string()).or_insert(0.0);
        *value = (*value + delta).clamp(0.0, 1.0);
    }

    pub fn average_trust(&self) -> f32 {
        average(self.trust.values())
    }

    pub fn average_suspicion(&self) -> f32 {
        average(self.suspicion.values())
    }

    /// Learn a knowledge token. Returns false if it was already known.
    pub fn learn(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.knows(&token) {
            return false;
        }
        self.knowledge.push(token);
        true
    }

    pub fn knows(&self, token: &str) -> bool {
        self.knowledge.iter().any(|k| k == token)
    }

    /// All knowledge tokens, oldest first.
    pub fn knowledge(&self) -> &[String] {
        &self.knowledge
    }

    /// The most recently learned `n` tokens, oldest first.
    pub fn recent_knowledge(&self, n: usize) -> &[String] {
        let start = self.knowledge.len().saturating_sub(n);
        &self.knowledge[start..]
    }
}

fn average<'a>(values: impl Iterator<Item = &'a f32>) -> f32 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count.max(1) as f32
}
