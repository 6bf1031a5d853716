//! Plain-text rendering of story events.

use drama_core::{NarrativeEvent, StoryState};
use std::path::Path;

pub fn print_header(state: &StoryState, seed: u64) {
    println!("=== {} ===", state.seed.title);
    println!("{}", state.seed.description);
    println!();
    println!("Cast: {}", state.roster.join(", "));
    println!("Seed: {seed}  Turn limit: {}", state.max_turns);
    println!();
}

pub fn print_event(event: &NarrativeEvent) {
    println!("{}", format_event(event));
}

/// One event as a tagged line.
pub fn format_event(event: &NarrativeEvent) -> String {
    match event {
        NarrativeEvent::HardIntervention { turn, content, .. } => {
            format!("[{turn:>2}] [INTERVENTION] {content}")
        }
        NarrativeEvent::TurningPoint { turn, content, .. } => {
            format!("[{turn:>2}] [TURNING POINT] {content}")
        }
        NarrativeEvent::MysteryClue {
            turn,
            clue_type,
            content,
        } => format!("[{turn:>2}] [CLUE: {}] {content}", clue_type.name()),
        NarrativeEvent::DirectorNote { turn, content } => format!("[{turn:>2}] ({content})"),
        NarrativeEvent::Dialogue {
            turn,
            speaker,
            content,
            ..
        } => format!("[{turn:>2}] {speaker}: {content}"),
        NarrativeEvent::Action { turn, effect, .. } => format!("[{turn:>2}] [ACTION] {effect}"),
        NarrativeEvent::Conclusion { turn, content } => {
            format!("\n[{turn:>2}] [CONCLUSION]\n{content}")
        }
    }
}

pub fn print_summary(state: &StoryState, output: &Path) {
    println!();
    println!("=== Story complete ===");
    println!(
        "Turns: {}  Dialogue: {}  Actions: {}  Events: {}",
        state.turn,
        state.dialogue_turn_count(),
        state.action_count,
        state.events.len()
    );
    if let Some(conclusion) = &state.conclusion {
        println!("Reason: {}", conclusion.reason);
    }
    println!("Saved to {}", output.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use drama_core::story::AgenticReasoning;

    #[test]
    fn test_dialogue_line() {
        let event = NarrativeEvent::Dialogue {
            turn: 3,
            speaker: "Saleem".to_string(),
            content: "Sahib, please!".to_string(),
            speaker_goal: String::new(),
            agentic_reasoning: AgenticReasoning::default(),
        };
        assert_eq!(format_event(&event), "[ 3] Saleem: Sahib, please!");
    }

    #[test]
    fn test_clue_line() {
        let event = NarrativeEvent::MysteryClue {
            turn: 10,
            clue_type: drama_core::ClueType::Evidence,
            content: "A receipt.".to_string(),
        };
        assert_eq!(format_event(&event), "[10] [CLUE: evidence] A receipt.");
    }
}
