//! Integration tests that call the real Claude API.
//!
//! These tests require ANTHROPIC_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p drama-core --test api_integration -- --ignored`

use std::sync::Arc;

use drama_core::testing::{assert_event_order, assert_one_move_per_turn, count_kind};
use drama_core::{ClaudeGenerator, NarrativeEvent, Scenario, StoryConfig, StoryOrchestrator};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("ANTHROPIC_API_KEY").is_ok()
}

#[tokio::test]
#[ignore] // Run with: cargo test -p drama-core --test api_integration -- --ignored
async fn test_live_story_runs_to_conclusion() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let config = StoryConfig::from_env().with_seed(42).with_max_tokens(300);
    let generator = ClaudeGenerator::from_env(&config).expect("Failed to create generator");
    let mut story =
        StoryOrchestrator::new(Scenario::rickshaw_accident(), config, Arc::new(generator))
            .expect("Failed to create story");

    story.run().await.expect("Story should conclude");
    let state = story.state();

    assert!(state.concluded);
    assert_eq!(count_kind(state, "mystery_clue"), 3);
    assert_one_move_per_turn(state);
    assert_event_order(state);

    let spoke = state
        .events
        .iter()
        .filter(|e| matches!(e, NarrativeEvent::Dialogue { content, .. } if content != "..."))
        .count();
    assert!(spoke > 0, "the model should produce at least one real line");
}
