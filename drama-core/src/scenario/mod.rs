//! Scenario data packs: cast, phases, catalogs and mystery tables.
//!
//! A scenario is plain data. The built-in [`Scenario::rickshaw_accident`]
//! is defined in [`rickshaw`]; others can be loaded from JSON.

mod rickshaw;

use crate::memory::KnowledgeGrant;
use crate::mystery::{default_schedule, ClueGrants, ClueScheduler, ClueSet, HiddenTruth};
use crate::plot_clock::{Phase, PlotClock};
use crate::registry::{EntityPatch, EntityRegistry};
use crate::story::{CharacterProfile, SocialRole};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid plot clock: {0}")]
    PlotClock(String),

    #[error("Scenario has no characters")]
    EmptyRoster,

    #[error("Duplicate character: {0}")]
    DuplicateCharacter(String),

    #[error("Unknown character '{name}' in {context}")]
    UnknownCharacter { name: String, context: String },

    #[error("Missing {table} entry for hidden truth {truth}")]
    MissingTruth { table: &'static str, truth: HiddenTruth },
}

/// Title and premise shown to every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStory {
    pub title: String,
    pub description: String,
}

/// How one character starts the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSeed {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub role: SocialRole,
    #[serde(default)]
    pub inventory: Vec<String>,
    #[serde(default)]
    pub initial_trust: BTreeMap<String, f32>,
    #[serde(default)]
    pub initial_suspicion: BTreeMap<String, f32>,
}

impl CharacterSeed {
    pub fn to_profile(&self, roster: &[String]) -> CharacterProfile {
        let mut profile = CharacterProfile::new(&self.name, &self.description)
            .with_role(self.role)
            .with_inventory(self.inventory.clone());
        profile.seed_relationships(roster.iter().map(String::as_str));
        for (other, value) in &self.initial_trust {
            profile.trust.insert(other.clone(), value.clamp(0.0, 1.0));
        }
        for (other, value) in &self.initial_suspicion {
            profile.suspicion.insert(other.clone(), value.clamp(0.0, 1.0));
        }
        profile
    }
}

/// A scripted beat: an intervention or a turning point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub id: String,
    pub narration: String,
    pub effect: String,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeGrant>,
}

/// A prop registered when the story starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropSeed {
    pub name: String,
    pub owner: String,
    #[serde(flatten)]
    pub patch: EntityPatch,
}

/// A change to a prop's starting state under one hidden truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropOverride {
    pub name: String,
    #[serde(flatten)]
    pub patch: EntityPatch,
}

/// Everything needed to run one drama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: SeedStory,
    pub characters: Vec<CharacterSeed>,
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub action_templates: BTreeMap<String, Vec<String>>,
    pub interventions: Vec<ScriptedEvent>,
    pub turning_points: Vec<ScriptedEvent>,
    pub clues: BTreeMap<HiddenTruth, ClueSet>,
    #[serde(default)]
    pub clue_grants: BTreeMap<HiddenTruth, ClueGrants>,
    pub reveals: BTreeMap<HiddenTruth, String>,
    pub fallback_reveal: String,
    /// Closing sentence keyed by turning-point id.
    #[serde(default)]
    pub codas: BTreeMap<String, String>,
    #[serde(default)]
    pub props: Vec<PropSeed>,
    #[serde(default)]
    pub prop_overrides: BTreeMap<HiddenTruth, Vec<PropOverride>>,
}

impl Scenario {
    /// The built-in Karachi street drama.
    pub fn rickshaw_accident() -> Self {
        rickshaw::RICKSHAW_ACCIDENT.clone()
    }

    /// Load and validate a scenario from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = tokio::fs::read_to_string(path).await?;
        let scenario: Scenario = serde_json::from_str(&json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn names(&self) -> Vec<String> {
        self.characters.iter().map(|c| c.name.clone()).collect()
    }

    pub fn plot_clock(&self) -> Result<PlotClock, ScenarioError> {
        PlotClock::new(self.phases.clone())
    }

    pub fn clue_scheduler(&self) -> ClueScheduler {
        ClueScheduler::new(default_schedule(), self.clues.clone(), self.clue_grants.clone())
    }

    /// Reveal paragraph for `truth` followed by the coda of the turning
    /// point assigned to this story.
    pub fn reveal(&self, truth: HiddenTruth, turning_point_id: &str) -> String {
        let base = self.reveals.get(&truth).unwrap_or(&self.fallback_reveal);
        match self.codas.get(turning_point_id) {
            Some(coda) => format!("{base} {coda}"),
            None => base.clone(),
        }
    }

    /// Registry as it stands at turn zero under `truth`.
    pub fn initial_registry(&self, truth: HiddenTruth) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        for prop in &self.props {
            registry.register(&prop.name, &prop.owner, prop.patch.clone());
        }
        for change in self.prop_overrides.get(&truth).into_iter().flatten() {
            registry.update(&change.name, change.patch.clone());
        }
        registry
    }

    pub fn templates_for(&self, character: &str) -> &[String] {
        self.action_templates
            .get(character)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check that the scenario is internally consistent.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.characters.is_empty() {
            return Err(ScenarioError::EmptyRoster);
        }
        let mut names = BTreeSet::new();
        for c in &self.characters {
            if !names.insert(c.name.as_str()) {
                return Err(ScenarioError::DuplicateCharacter(c.name.clone()));
            }
        }

        PlotClock::new(self.phases.clone())?;

        let known = |name: &str, context: &str| {
            if names.contains(name) {
                Ok(())
            } else {
                Err(ScenarioError::UnknownCharacter {
                    name: name.to_string(),
                    context: context.to_string(),
                })
            }
        };

        for character in self.action_templates.keys() {
            known(character, "action templates")?;
        }
        for phase in &self.phases {
            for character in phase.speaker_mandates.keys() {
                known(character, &format!("phase '{}'", phase.name))?;
            }
        }
        for event in self.interventions.iter().chain(&self.turning_points) {
            for grant in &event.knowledge {
                known(&grant.character, &format!("event '{}'", event.id))?;
            }
        }
        for grants in self.clue_grants.values() {
            for grant in grants.hint.iter().chain(&grants.evidence).chain(&grants.weapon) {
                known(&grant.character, "clue grants")?;
            }
        }

        for truth in HiddenTruth::ALL {
            if !self.clues.contains_key(&truth) {
                return Err(ScenarioError::MissingTruth { table: "clues", truth });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scenario_is_valid() {
        let scenario = Scenario::rickshaw_accident();
        scenario.validate().unwrap();
        assert_eq!(scenario.characters.len(), 4);
        assert_eq!(scenario.interventions.len(), 3);
        assert_eq!(scenario.turning_points.len(), 3);
    }

    #[test]
    fn test_wallet_status_depends_on_truth() {
        let scenario = Scenario::rickshaw_accident();

        let never_stolen = scenario.initial_registry(HiddenTruth::WalletNeverStolen);
        let wallet = never_stolen.get("wallet").unwrap();
        assert_eq!(wallet.owner, "Saleem");
        assert_eq!(wallet.status, "in_rickshaw");

        let stolen = scenario.initial_registry(HiddenTruth::AhmedStoleWallet);
        assert_eq!(stolen.get("wallet").unwrap().status, "in_ahmed_briefcase");
        assert_eq!(stolen.get_owner("wallet"), Some("Saleem"));

        let other = scenario.initial_registry(HiddenTruth::RazaCorrupt);
        assert_eq!(other.get("wallet").unwrap().status, "missing");
    }

    #[test]
    fn test_reveal_appends_coda() {
        let scenario = Scenario::rickshaw_accident();
        let text = scenario.reveal(HiddenTruth::WalletNeverStolen, "dashcam_revealed");
        assert!(text.starts_with("Saleem's hand found the wallet"));
        assert!(text.ends_with("time-stamped and geotagged."));

        let bare = scenario.reveal(HiddenTruth::WalletNeverStolen, "unknown");
        assert!(bare.ends_with("swallowed them all."));
    }

    #[test]
    fn test_json_round_trip_keeps_validity() {
        let scenario = Scenario::rickshaw_accident();
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_validate_rejects_unknown_template_owner() {
        let mut scenario = Scenario::rickshaw_accident();
        scenario
            .action_templates
            .insert("Ghost".to_string(), vec!["haunts".to_string()]);
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::UnknownCharacter { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_json_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        let json = serde_json::to_string_pretty(&Scenario::rickshaw_accident()).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let loaded = Scenario::load_json(&path).await.unwrap();
        assert_eq!(loaded.seed.title, "The Rickshaw Accident");
    }
}
