//! The hidden mystery and the turn-indexed clue schedule.

use crate::memory::KnowledgeGrant;
use crate::story::StoryState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What really happened. Fixed once when a story is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenTruth {
    SaleemInnocent,
    AhmedStoleWallet,
    RazaCorrupt,
    WalletNeverStolen,
    UncleWitnessedBribe,
}

impl HiddenTruth {
    pub const ALL: [HiddenTruth; 5] = [
        HiddenTruth::SaleemInnocent,
        HiddenTruth::AhmedStoleWallet,
        HiddenTruth::RazaCorrupt,
        HiddenTruth::WalletNeverStolen,
        HiddenTruth::UncleWitnessedBribe,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HiddenTruth::SaleemInnocent => "saleem_innocent",
            HiddenTruth::AhmedStoleWallet => "ahmed_stole_wallet",
            HiddenTruth::RazaCorrupt => "raza_corrupt",
            HiddenTruth::WalletNeverStolen => "wallet_never_stolen",
            HiddenTruth::UncleWitnessedBribe => "uncle_witnessed_bribe",
        }
    }
}

impl std::fmt::Display for HiddenTruth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The three kinds of clue, released in escalating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueType {
    Hint,
    Evidence,
    Weapon,
}

impl ClueType {
    pub fn name(&self) -> &'static str {
        match self {
            ClueType::Hint => "hint",
            ClueType::Evidence => "evidence",
            ClueType::Weapon => "weapon",
        }
    }
}

/// Clue text for each clue type under one hidden truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueSet {
    pub hint: String,
    pub evidence: String,
    pub weapon: String,
}

impl ClueSet {
    pub fn text(&self, clue: ClueType) -> &str {
        match clue {
            ClueType::Hint => &self.hint,
            ClueType::Evidence => &self.evidence,
            ClueType::Weapon => &self.weapon,
        }
    }
}

/// Knowledge handed out when each clue type drops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueGrants {
    #[serde(default)]
    pub hint: Vec<KnowledgeGrant>,
    #[serde(default)]
    pub evidence: Vec<KnowledgeGrant>,
    #[serde(default)]
    pub weapon: Vec<KnowledgeGrant>,
}

impl ClueGrants {
    pub fn for_clue(&self, clue: ClueType) -> &[KnowledgeGrant] {
        match clue {
            ClueType::Hint => &self.hint,
            ClueType::Evidence => &self.evidence,
            ClueType::Weapon => &self.weapon,
        }
    }
}

/// Which clue type drops on which turn.
pub fn default_schedule() -> BTreeMap<u32, ClueType> {
    BTreeMap::from([
        (5, ClueType::Hint),
        (10, ClueType::Evidence),
        (15, ClueType::Weapon),
    ])
}

/// A clue that dropped this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueRelease {
    pub turn: u32,
    pub clue_type: ClueType,
    pub content: String,
    pub grants: Vec<KnowledgeGrant>,
}

/// Releases each clue type once, on its scheduled turn.
#[derive(Debug, Clone)]
pub struct ClueScheduler {
    schedule: BTreeMap<u32, ClueType>,
    clues: BTreeMap<HiddenTruth, ClueSet>,
    grants: BTreeMap<HiddenTruth, ClueGrants>,
}

impl ClueScheduler {
    pub fn new(
        schedule: BTreeMap<u32, ClueType>,
        clues: BTreeMap<HiddenTruth, ClueSet>,
        grants: BTreeMap<HiddenTruth, ClueGrants>,
    ) -> Self {
        Self {
            schedule,
            clues,
            grants,
        }
    }

    pub fn scheduled_at(&self, turn: u32) -> Option<ClueType> {
        self.schedule.get(&turn).copied()
    }

    /// The clue due on `turn`, if any and not yet released. Does not mutate.
    pub fn peek(&self, state: &StoryState, turn: u32) -> Option<ClueRelease> {
        let clue_type = self.scheduled_at(turn)?;
        if state.released_clues.contains(&clue_type) {
            return None;
        }
        let content = self.clues.get(&state.hidden_truth)?.text(clue_type).to_string();
        let grants = self
            .grants
            .get(&state.hidden_truth)
            .map(|g| g.for_clue(clue_type).to_vec())
            .unwrap_or_default();

        Some(ClueRelease {
            turn,
            clue_type,
            content,
            grants,
        })
    }

    /// Release the clue due on `turn`, marking it released in `state`.
    ///
    /// Knowledge grants are returned for the caller to apply through the
    /// memory model.
    pub fn release(&self, state: &mut StoryState, turn: u32) -> Option<ClueRelease> {
        let release = self.peek(state, turn)?;
        state.released_clues.insert(release.clue_type);
        tracing::info!(
            turn,
            clue = release.clue_type.name(),
            grants = release.grants.len(),
            "Clue released"
        );
        Some(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;

    #[test]
    fn test_hidden_truth_serializes_snake_case() {
        let json = serde_json::to_string(&HiddenTruth::WalletNeverStolen).unwrap();
        assert_eq!(json, "\"wallet_never_stolen\"");
        for truth in HiddenTruth::ALL {
            let name = serde_json::to_value(truth).unwrap();
            assert_eq!(name, truth.name());
        }
    }

    #[test]
    fn test_clues_release_once_on_schedule() {
        let harness = TestHarness::with_truth(HiddenTruth::RazaCorrupt);
        let scheduler = harness.scheduler();
        let mut state = harness.state();

        assert!(scheduler.release(&mut state, 4).is_none());

        let hint = scheduler.release(&mut state, 5).unwrap();
        assert_eq!(hint.clue_type, ClueType::Hint);
        assert!(scheduler.release(&mut state, 5).is_none());

        let evidence = scheduler.release(&mut state, 10).unwrap();
        assert_eq!(evidence.clue_type, ClueType::Evidence);

        let weapon = scheduler.release(&mut state, 15).unwrap();
        assert_eq!(weapon.clue_type, ClueType::Weapon);

        assert_eq!(state.released_clues.len(), 3);
    }

    #[test]
    fn test_peek_does_not_mark_released() {
        let harness = TestHarness::with_truth(HiddenTruth::SaleemInnocent);
        let scheduler = harness.scheduler();
        let state = harness.state();

        assert!(scheduler.peek(&state, 5).is_some());
        assert!(state.released_clues.is_empty());
    }
}
