//! Choosing who speaks next.

use super::Director;
use crate::generation::{parse_structured, GenerationRequest, Structured, TextGenerator};
use crate::prompts::SpeakerPrompt;
use crate::scenario::ScriptedEvent;
use crate::story::StoryState;
use rand::rngs::StdRng;
use serde::Deserialize;

/// What the director model is asked to return.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakerReply {
    #[serde(default)]
    pub next_speaker: String,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub speaker_goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerSelection {
    pub speaker: String,
    pub narration: String,
    pub speaker_goal: String,
    pub turning_point: Option<ScriptedEvent>,
    pub intervention: Option<ScriptedEvent>,
}

impl Director {
    /// Characters allowed to speak this turn: anyone who spoke both of the
    /// last two dialogue turns sits out, as long as someone else is left.
    pub fn speaker_candidates(&self, state: &StoryState) -> Vec<String> {
        let recent = state.recent_speakers(2);
        let mut candidates = state.roster.clone();
        if let [a, b] = recent.as_slice() {
            if a == b && candidates.len() > 1 && candidates.iter().any(|c| c == a) {
                candidates.retain(|c| c != a);
            }
        }
        candidates
    }

    /// Fire any due trigger, then ask the generator who speaks.
    ///
    /// Never fails: an unusable reply falls back to the first candidate
    /// with the phase mandate as their goal.
    pub async fn select_next_speaker(
        &self,
        state: &mut StoryState,
        rng: &mut StdRng,
        generator: &dyn TextGenerator,
    ) -> SpeakerSelection {
        let intervention = self.check_hard_intervention(state, rng);
        let turning_point = if intervention.is_none() {
            self.fire_turning_point_if_needed(state)
        } else {
            None
        };

        let override_narration = intervention
            .as_ref()
            .or(turning_point.as_ref())
            .map(|e| e.narration.clone());

        let state: &StoryState = state;
        let candidates = self.speaker_candidates(state);
        let fallback = candidates.first().cloned().unwrap_or_default();

        let pending_clue = self.clues.peek(state, state.turn);
        let prompt = SpeakerPrompt {
            state,
            phase: self.current_phase(state),
            candidates: &candidates,
            active_intervention: override_narration.as_deref(),
            clue: pending_clue
                .as_ref()
                .map(|c| (c.clue_type.name(), c.content.as_str())),
        }
        .render();

        let reply = match generator.generate(GenerationRequest::director(prompt)).await {
            Ok(text) => match parse_structured::<SpeakerReply>(&text) {
                Structured::Parsed(reply) => reply,
                Structured::Raw(raw) => {
                    tracing::warn!(turn = state.turn, raw = %raw, "Unparseable speaker reply, using fallback");
                    SpeakerReply::default()
                }
            },
            Err(e) => {
                tracing::warn!(turn = state.turn, error = %e, "Speaker generation failed, using fallback");
                SpeakerReply::default()
            }
        };

        let speaker = if candidates.iter().any(|c| *c == reply.next_speaker) {
            reply.next_speaker
        } else {
            if !reply.next_speaker.is_empty() {
                tracing::warn!(
                    turn = state.turn,
                    proposed = %reply.next_speaker,
                    fallback = %fallback,
                    "Proposed speaker not in candidate pool"
                );
            }
            fallback
        };

        let narration = override_narration.unwrap_or(reply.narration);
        let speaker_goal = if reply.speaker_goal.trim().is_empty() {
            self.speaker_mandate(state, &speaker).to_string()
        } else {
            reply.speaker_goal
        };

        tracing::info!(
            turn = state.turn,
            phase = %self.current_phase(state).name,
            speaker = %speaker,
            goal = %speaker_goal,
            "Speaker selected"
        );

        SpeakerSelection {
            speaker,
            narration,
            speaker_goal,
            turning_point,
            intervention,
        }
    }
}
