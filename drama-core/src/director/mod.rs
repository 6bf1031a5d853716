//! The director: decides what happens each turn.
//!
//! The director holds only immutable scenario data. Everything that must
//! survive between turns (trigger flags, released clues, used action
//! templates) lives in [`StoryState`], and every random draw comes from
//! the caller's rng, so a director can be shared freely and a turn can be
//! replayed from a cloned state.

mod conclusion;
mod moves;
mod speaker;
mod triggers;

pub use conclusion::ConclusionCheck;
pub use moves::{keywords, ActionChoice, MoveKind, DEFAULT_ACTION};
pub use speaker::{SpeakerReply, SpeakerSelection};

use crate::config::Pacing;
use crate::memory::MemoryModel;
use crate::mystery::ClueScheduler;
use crate::plot_clock::{Phase, PlotClock};
use crate::scenario::{Scenario, ScenarioError};
use crate::story::StoryState;

pub struct Director {
    scenario: Scenario,
    clock: PlotClock,
    clues: ClueScheduler,
    pacing: Pacing,
    memory: MemoryModel,
}

impl Director {
    pub fn new(scenario: Scenario, pacing: Pacing) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let clock = scenario.plot_clock()?;
        let clues = scenario.clue_scheduler();
        Ok(Self {
            scenario,
            clock,
            clues,
            pacing,
            memory: MemoryModel::new(),
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn clock(&self) -> &PlotClock {
        &self.clock
    }

    pub fn clues(&self) -> &ClueScheduler {
        &self.clues
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn memory(&self) -> &MemoryModel {
        &self.memory
    }

    /// Phase of the turn being played.
    pub fn current_phase(&self, state: &StoryState) -> &Phase {
        self.clock.phase_at(state.turn)
    }

    /// Default goal for `character` on the turn being played.
    pub fn speaker_mandate(&self, state: &StoryState, character: &str) -> &str {
        self.clock.mandate(state.turn, character)
    }
}
