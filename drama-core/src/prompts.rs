//! Prompt text for the director and the characters.

use crate::memory::MemorySnapshot;
use crate::plot_clock::Phase;
use crate::story::StoryState;

const DIRECTOR_RECENT_TURNS: usize = 4;
const CHARACTER_RECENT_TURNS: usize = 15;

/// Inputs to the speaker-selection prompt.
pub struct SpeakerPrompt<'a> {
    pub state: &'a StoryState,
    pub phase: &'a Phase,
    pub candidates: &'a [String],
    pub active_intervention: Option<&'a str>,
    pub clue: Option<(&'a str, &'a str)>,
}

impl SpeakerPrompt<'_> {
    pub fn render(&self) -> String {
        let clue = self
            .clue
            .map(|(kind, text)| format!("\nACTIVE CLUE ({}): {text}", kind.to_uppercase()))
            .unwrap_or_default();

        format!(
            "You are the Director of a street drama.\n\n\
             SCENE: {scene}\n\n\
             NARRATIVE PHASE: {phase} (Turns {turns})\n\
             PHASE GOAL: {goal}\n\n\
             ACTIVE INTERVENTION: {intervention}{clue}\n\n\
             {registry}\n\
             Recent Conversation (last {n} turns):\n{recent}\n\n\
             Available Characters: {candidates}\n\n\
             Select who speaks next, write one sentence of narration that moves the scene \
             into its next beat, and give the speaker one concrete goal for their line.\n\
             The ENTITY REGISTRY is the truth about who owns what; goals involving items \
             must name the true owner.\n\n\
             Respond with JSON only:\n\
             {{\"next_speaker\": \"Character Name\", \"narration\": \"...\", \"speaker_goal\": \"...\"}}",
            scene = self.state.seed.description,
            phase = self.phase.name.to_uppercase(),
            turns = self.phase.turns,
            goal = self.phase.goal,
            intervention = self.active_intervention.unwrap_or("None"),
            registry = self.state.registry.describe(),
            n = DIRECTOR_RECENT_TURNS,
            recent = recent_dialogue(self.state, DIRECTOR_RECENT_TURNS),
            candidates = self.candidates.join(", "),
        )
    }
}

/// Inputs to a character's line.
pub struct CharacterPrompt<'a> {
    pub state: &'a StoryState,
    pub name: &'a str,
    pub snapshot: &'a MemorySnapshot,
    pub speaker_goal: &'a str,
    pub narration: &'a str,
}

impl CharacterPrompt<'_> {
    pub fn render(&self) -> String {
        let description = self
            .state
            .profile(self.name)
            .map(|p| p.description.as_str())
            .unwrap_or_default();

        let mut already_said = String::new();
        if !self.snapshot.recent_own_dialogue.is_empty() {
            already_said.push_str("\nYOU HAVE ALREADY SAID THESE; DO NOT REPEAT THEM:\n");
            for line in &self.snapshot.recent_own_dialogue {
                already_said.push_str(&format!("  - \"{line}\"\n"));
            }
        }

        let last_action = self
            .state
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                crate::story::NarrativeEvent::Action {
                    character, action, ..
                } => Some(format!("\nJUST HAPPENED: {character} {action}. React to it.\n")),
                _ => None,
            })
            .unwrap_or_default();

        format!(
            "You are {name}.\n\n\
             PROFILE: {description}\n\n\
             YOUR INTERNAL STATE:\n{memory}\n\
             {already_said}\n\
             YOUR GOAL THIS TURN: {goal}\n\
             {last_action}\n\
             {registry}\n\
             CURRENT SITUATION:\n\
             Initial Event: {scene}\n\
             Director Narration: {narration}\n\n\
             Recent Dialogue:\n{recent}\n\n\
             Think about your situation, then respond with JSON only:\n\
             {{\"thought\": \"your private reasoning\", \
             \"action_decision\": \"a brief gesture or 'none'\", \
             \"dialogue\": \"what you say, one or two sentences\", \
             \"entity_updates\": {{}}}}\n\
             Use entity_updates only to change the status of an item in the registry, \
             e.g. {{\"wallet\": {{\"status\": \"found\"}}}}.",
            name = self.name,
            memory = self.snapshot.describe(),
            goal = self.speaker_goal,
            registry = self.state.registry.describe(),
            scene = self.state.seed.description,
            narration = self.narration,
            recent = recent_dialogue(self.state, CHARACTER_RECENT_TURNS),
        )
    }
}

fn recent_dialogue(state: &StoryState, n: usize) -> String {
    if state.dialogue_history.is_empty() {
        return "No dialogue yet. The story is just starting.".to_string();
    }
    let start = state.dialogue_history.len().saturating_sub(n);
    state.dialogue_history[start..]
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryModel;
    use crate::testing::TestHarness;

    #[test]
    fn test_speaker_prompt_lists_only_candidates() {
        let harness = TestHarness::new();
        let state = harness.state();
        let clock = harness.clock();
        let candidates = vec!["Saleem".to_string(), "Uncle Jameel".to_string()];

        let text = SpeakerPrompt {
            state: &state,
            phase: clock.phase_at(1),
            candidates: &candidates,
            active_intervention: None,
            clue: Some(("hint", "Something bulges under the seat.")),
        }
        .render();

        assert!(text.contains("Available Characters: Saleem, Uncle Jameel"));
        assert!(text.contains("ACTIVE CLUE (HINT)"));
        assert!(text.contains("OWNER=Saleem"));
        assert!(text.contains("No dialogue yet"));
    }

    #[test]
    fn test_character_prompt_carries_goal_and_memory() {
        let state = TestHarness::new().state();
        let snapshot = MemoryModel::new().snapshot(&state, "Saleem").unwrap();

        let text = CharacterPrompt {
            state: &state,
            name: "Saleem",
            snapshot: &snapshot,
            speaker_goal: "Deny fault.",
            narration: "Horns blare.",
        }
        .render();

        assert!(text.starts_with("You are Saleem."));
        assert!(text.contains("YOUR GOAL THIS TURN: Deny fault."));
        assert!(text.contains("Emotional State: neutral"));
        assert!(text.contains("Carrying: crumpled license"));
    }
}
