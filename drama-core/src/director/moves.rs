//! Action-versus-dialogue scheduling and actor selection.

use super::Director;
use crate::story::StoryState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Action text for a character with no templates.
pub const DEFAULT_ACTION: &str = "performs an action";

const MIN_KEYWORD_LEN: usize = 4;
const RECENT_LINES: usize = 3;
const MAX_TARGETS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Action,
    Dialogue,
}

/// A physical action chosen for this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionChoice {
    pub character: String,
    pub action: String,
    pub targets: Vec<String>,
    /// `[PHASE] character: action`
    pub effect: String,
    pub phase: String,
}

/// Lowercase alphanumeric words of at least four characters.
pub fn keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(String::from)
        .collect()
}

impl Director {
    /// Decide whether the turn being played is an action or a dialogue.
    ///
    /// Rules are checked in order and the first match wins. A random draw
    /// is only taken when its rule's turn condition already holds.
    pub fn decide_next_move(&self, state: &StoryState, rng: &mut StdRng) -> MoveKind {
        let turn = state.turn;
        let p = &self.pacing;

        let (kind, rule) = if turn < p.minimum_turn
            && state.action_count < p.min_actions
            && state.consecutive_dialogue_count >= p.early_force_after
        {
            (MoveKind::Action, "action_quota")
        } else if state.consecutive_dialogue_count >= p.force_after {
            (MoveKind::Action, "dialogue_streak")
        } else if p.escalation_interval > 0
            && turn % p.escalation_interval == 0
            && rng.gen::<f64>() < p.escalation_chance
        {
            (MoveKind::Action, "escalation")
        } else if turn > p.ambient_action_after && rng.gen::<f64>() < p.ambient_action_chance {
            (MoveKind::Action, "ambient")
        } else {
            (MoveKind::Dialogue, "default")
        };

        tracing::info!(
            turn,
            ?kind,
            rule,
            actions = state.action_count,
            consecutive_dialogue = state.consecutive_dialogue_count,
            "Move decided"
        );
        kind
    }

    /// Pick who acts and what they do, marking the template used.
    ///
    /// Returns `None` only for an empty roster.
    pub fn select_actor_for_action(
        &self,
        state: &mut StoryState,
        rng: &mut StdRng,
    ) -> Option<ActionChoice> {
        let jitter = self.pacing.actor_jitter;

        let mut best: Option<(String, f64)> = None;
        for profile in state.profiles() {
            let score = f64::from(profile.average_suspicion()) - f64::from(profile.average_trust())
                + rng.gen::<f64>() * jitter;
            // Strictly greater, so ties go to the earlier roster entry.
            if best.as_ref().map_or(true, |(_, top)| score > *top) {
                best = Some((profile.name.clone(), score));
            }
        }
        let (actor, score) = best?;

        let action = self.pick_template(state, &actor, rng);

        let others: Vec<String> = state.roster.iter().filter(|n| **n != actor).cloned().collect();
        let targets: Vec<String> = others.choose_multiple(rng, MAX_TARGETS).cloned().collect();

        let phase = self.current_phase(state).name.clone();
        let effect = format!("[{}] {}: {}", phase.to_uppercase(), actor, action);

        tracing::info!(turn = state.turn, actor = %actor, score, action = %action, ?targets, "Action selected");

        Some(ActionChoice {
            character: actor,
            action,
            targets,
            effect,
            phase,
        })
    }

    fn pick_template(&self, state: &mut StoryState, actor: &str, rng: &mut StdRng) -> String {
        let all = self.scenario.templates_for(actor);
        if all.is_empty() {
            return DEFAULT_ACTION.to_string();
        }

        let recent: BTreeSet<String> = state
            .recent_lines_of(actor, RECENT_LINES)
            .into_iter()
            .flat_map(keywords)
            .collect();

        let used = state.used_actions.entry(actor.to_string()).or_default();
        let mut available: Vec<&String> = all.iter().filter(|a| !used.contains(*a)).collect();
        if available.is_empty() {
            used.clear();
            available = all.iter().collect();
        }

        let preferred: Vec<&String> = available
            .iter()
            .copied()
            .filter(|a| keywords(a).is_disjoint(&recent))
            .collect();
        let pool = if preferred.is_empty() { &available } else { &preferred };

        let chosen = pool
            .choose(rng)
            .map(|a| (*a).clone())
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());
        used.insert(chosen.clone());
        chosen
    }
}
