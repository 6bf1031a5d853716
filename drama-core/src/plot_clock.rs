//! The plot clock: which narrative phase a turn belongs to.

use crate::scenario::ScenarioError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mandate for characters a phase says nothing about.
pub const DEFAULT_MANDATE: &str = "React naturally to what just happened.";

/// How hard the scene is pushing toward an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pressure {
    Low,
    High,
    Critical,
}

impl Pressure {
    pub fn name(&self) -> &'static str {
        match self {
            Pressure::Low => "low",
            Pressure::High => "high",
            Pressure::Critical => "critical",
        }
    }
}

/// Inclusive turn range. `end: None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRange {
    pub start: u32,
    #[serde(default)]
    pub end: Option<u32>,
}

impl TurnRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: u32) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, turn: u32) -> bool {
        turn >= self.start && self.end.map_or(true, |end| turn <= end)
    }
}

impl std::fmt::Display for TurnRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}+", self.start),
        }
    }
}

/// One stage of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub turns: TurnRange,
    pub goal: String,
    pub pressure: Pressure,
    /// Default per-character goal while this phase is active.
    #[serde(default)]
    pub speaker_mandates: BTreeMap<String, String>,
}

impl Phase {
    pub fn mandate_for(&self, character: &str) -> &str {
        self.speaker_mandates
            .get(character)
            .map(String::as_str)
            .unwrap_or(DEFAULT_MANDATE)
    }
}

/// Ordered phases whose ranges partition the positive turns.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotClock {
    phases: Vec<Phase>,
}

impl PlotClock {
    /// Build a clock, checking that the phases start at turn 1, are
    /// contiguous, and end with an open-ended phase.
    pub fn new(phases: Vec<Phase>) -> Result<Self, ScenarioError> {
        let Some(first) = phases.first() else {
            return Err(ScenarioError::PlotClock("no phases configured".into()));
        };
        if first.turns.start != 1 {
            return Err(ScenarioError::PlotClock(format!(
                "first phase '{}' starts at turn {}, expected 1",
                first.name, first.turns.start
            )));
        }

        for pair in phases.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            let Some(end) = current.turns.end else {
                return Err(ScenarioError::PlotClock(format!(
                    "phase '{}' is open-ended but is not the last phase",
                    current.name
                )));
            };
            if end < current.turns.start || next.turns.start != end + 1 {
                return Err(ScenarioError::PlotClock(format!(
                    "phase '{}' ({}) does not run straight into '{}' ({})",
                    current.name, current.turns, next.name, next.turns
                )));
            }
        }

        if let Some(last) = phases.last() {
            if last.turns.end.is_some() {
                return Err(ScenarioError::PlotClock(format!(
                    "last phase '{}' must be open-ended",
                    last.name
                )));
            }
        }

        Ok(Self { phases })
    }

    /// The phase containing `turn`, or the last phase if none does.
    pub fn phase_at(&self, turn: u32) -> &Phase {
        self.phases
            .iter()
            .find(|p| p.turns.contains(turn))
            .unwrap_or_else(|| self.final_phase())
    }

    pub fn final_phase(&self) -> &Phase {
        // `new` rejects an empty phase list.
        &self.phases[self.phases.len() - 1]
    }

    pub fn is_final(&self, turn: u32) -> bool {
        std::ptr::eq(self.phase_at(turn), self.final_phase())
    }

    pub fn mandate(&self, turn: u32, character: &str) -> &str {
        self.phase_at(turn).mandate_for(character)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    fn phase(name: &str, turns: TurnRange) -> Phase {
        Phase {
            name: name.to_string(),
            turns,
            goal: String::new(),
            pressure: Pressure::Low,
            speaker_mandates: BTreeMap::new(),
        }
    }

    fn default_clock() -> PlotClock {
        PlotClock::new(Scenario::rickshaw_accident().phases).unwrap()
    }

    #[test]
    fn test_every_turn_has_exactly_one_phase() {
        let clock = PlotClock::new(vec![
            phase("a", TurnRange::new(1, 5)),
            phase("b", TurnRange::new(6, 16)),
            phase("c", TurnRange::open(17)),
        ])
        .unwrap();

        for turn in 1..=200 {
            let matching = clock
                .phases()
                .iter()
                .filter(|p| p.turns.contains(turn))
                .count();
            assert_eq!(matching, 1, "turn {turn} matched {matching} phases");
        }
        assert_eq!(clock.phase_at(5).name, "a");
        assert_eq!(clock.phase_at(6).name, "b");
        assert_eq!(clock.phase_at(17).name, "c");
        assert_eq!(clock.phase_at(9_999).name, "c");
    }

    #[test]
    fn test_turn_zero_falls_back_to_last_phase() {
        let clock = default_clock();
        assert_eq!(clock.phase_at(0).name, clock.final_phase().name);
    }

    #[test]
    fn test_rejects_gaps_overlaps_and_closed_tail() {
        let gap = PlotClock::new(vec![
            phase("a", TurnRange::new(1, 5)),
            phase("b", TurnRange::open(7)),
        ]);
        assert!(gap.is_err());

        let overlap = PlotClock::new(vec![
            phase("a", TurnRange::new(1, 5)),
            phase("b", TurnRange::open(5)),
        ]);
        assert!(overlap.is_err());

        let closed = PlotClock::new(vec![phase("a", TurnRange::new(1, 5))]);
        assert!(closed.is_err());

        let late_start = PlotClock::new(vec![phase("a", TurnRange::open(2))]);
        assert!(late_start.is_err());

        assert!(PlotClock::new(Vec::new()).is_err());
    }

    #[test]
    fn test_builtin_clock_phases() {
        let clock = default_clock();
        assert_eq!(clock.phase_at(1).name, "escalation");
        assert_eq!(clock.phase_at(15).name, "complexity");
        assert!(!clock.is_final(16));
        assert!(clock.is_final(17));
        assert_eq!(clock.phase_at(17).pressure, Pressure::Critical);
    }

    #[test]
    fn test_mandate_defaults_for_unknown_character() {
        let clock = default_clock();
        assert_eq!(clock.mandate(1, "A Passing Cyclist"), DEFAULT_MANDATE);
        assert!(clock.mandate(1, "Saleem").contains("innocence"));
    }
}
