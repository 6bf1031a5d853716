//! Story configuration and pacing constants.

use crate::mystery::HiddenTruth;
use std::env;

/// Every tunable number the director uses to pace a story.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// No conclusion before this turn; early forced actions apply below it.
    pub minimum_turn: u32,

    /// Actions wanted before `minimum_turn`.
    pub min_actions: u32,

    /// Consecutive dialogue turns that force an action while short of `min_actions`.
    pub early_force_after: u32,

    /// Consecutive dialogue turns that always force an action.
    pub force_after: u32,

    /// Turns that are a multiple of this may escalate to an action.
    pub escalation_interval: u32,
    pub escalation_chance: f64,

    /// Past this turn every turn may become an action.
    pub ambient_action_after: u32,
    pub ambient_action_chance: f64,

    /// Earliest turn a hard intervention may fire.
    pub intervention_turn: u32,

    /// From this turn the story may end early.
    pub early_conclusion_turn: u32,
    pub early_conclusion_chance: f64,

    /// Inclusive range the story's turn limit is drawn from.
    pub max_turns_range: (u32, u32),

    /// Upper bound of the random bonus added to actor scores.
    pub actor_jitter: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            minimum_turn: 15,
            min_actions: 5,
            early_force_after: 2,
            force_after: 3,
            escalation_interval: 4,
            escalation_chance: 0.5,
            ambient_action_after: 5,
            ambient_action_chance: 0.3,
            intervention_turn: 15,
            early_conclusion_turn: 18,
            early_conclusion_chance: 0.2,
            max_turns_range: (18, 22),
            actor_jitter: 0.3,
        }
    }
}

/// Configuration for creating a story.
#[derive(Debug, Clone)]
pub struct StoryConfig {
    /// Seed for the story's random source.
    pub seed: u64,

    /// Pin the hidden truth instead of drawing it.
    pub hidden_truth: Option<HiddenTruth>,

    pub pacing: Pacing,

    /// Model to use for generation.
    pub model: Option<String>,

    /// Maximum tokens per generation.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryConfig {
    pub fn new() -> Self {
        Self {
            seed: 0,
            hidden_truth: None,
            pacing: Pacing::default(),
            model: None,
            max_tokens: 512,
            temperature: Some(0.9),
        }
    }

    /// Read overrides from `DRAMA_SEED`, `DRAMA_MODEL`, `DRAMA_MAX_TOKENS`
    /// and `DRAMA_TEMPERATURE`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Some(seed) = env_parse("DRAMA_SEED") {
            config.seed = seed;
        }
        if let Ok(model) = env::var("DRAMA_MODEL") {
            if !model.trim().is_empty() {
                config.model = Some(model);
            }
        }
        if let Some(max_tokens) = env_parse("DRAMA_MAX_TOKENS") {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = env_parse("DRAMA_TEMPERATURE") {
            config.temperature = Some(temperature);
        }
        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_hidden_truth(mut self, truth: HiddenTruth) -> Self {
        self.hidden_truth = Some(truth);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparseable environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pacing_matches_story_rules() {
        let pacing = Pacing::default();
        assert_eq!(pacing.minimum_turn, 15);
        assert_eq!(pacing.max_turns_range, (18, 22));
        assert!(pacing.early_conclusion_turn >= pacing.minimum_turn);
    }

    #[test]
    fn test_builder() {
        let config = StoryConfig::new()
            .with_seed(42)
            .with_model("claude-sonnet-4-20250514")
            .with_max_tokens(256)
            .with_temperature(0.5)
            .with_hidden_truth(HiddenTruth::RazaCorrupt);

        assert_eq!(config.seed, 42);
        assert_eq!(config.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.hidden_truth, Some(HiddenTruth::RazaCorrupt));
    }
}
