//! One-shot narrative triggers.

use super::Director;
use crate::scenario::ScriptedEvent;
use crate::story::StoryState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

impl Director {
    /// Fire the hard intervention if it is due: once per story, from the
    /// intervention turn on, and only while the story is not yet in its
    /// final phase.
    pub(crate) fn check_hard_intervention(
        &self,
        state: &mut StoryState,
        rng: &mut StdRng,
    ) -> Option<ScriptedEvent> {
        let turn = state.turn;
        if state.triggers.intervention_fired
            || turn < self.pacing.intervention_turn
            || self.clock.is_final(turn)
        {
            return None;
        }

        let intervention = self.scenario.interventions.choose(rng)?.clone();
        state.triggers.intervention_fired = true;
        self.memory.grant_knowledge(state, &intervention.knowledge);

        tracing::info!(turn, id = %intervention.id, "Hard intervention fired");
        Some(intervention)
    }

    /// Fire the story's turning point on the first check in the final phase.
    pub(crate) fn fire_turning_point_if_needed(&self, state: &mut StoryState) -> Option<ScriptedEvent> {
        let turn = state.turn;
        if state.triggers.turning_point_fired || !self.clock.is_final(turn) {
            return None;
        }

        let event = self
            .scenario
            .turning_points
            .iter()
            .find(|tp| tp.id == state.triggers.turning_point_id)?
            .clone();
        state.triggers.turning_point_fired = true;
        self.memory.grant_knowledge(state, &event.knowledge);

        tracing::info!(turn, id = %event.id, "Turning point fired");
        Some(event)
    }
}
