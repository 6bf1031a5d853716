//! Action effect rules. The first rule whose keyword appears wins.

use crate::story::EmotionalState;
use lazy_static::lazy_static;

/// How a physical action changes the actor and the people it targets.
///
/// Deltas are applied by each target toward the actor.
#[derive(Debug, Clone)]
pub struct ActionRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub actor_emotion: EmotionalState,
    pub target_trust_delta: f32,
    pub target_suspicion_delta: f32,
    /// Targets learn `<prefix>:<actor>`.
    pub target_knowledge: Option<&'static str>,
    pub actor_knowledge: Option<&'static str>,
}

lazy_static! {
    pub static ref ACTION_RULES: Vec<ActionRule> = vec![
        ActionRule {
            name: "accuse",
            keywords: &["accuse", "blame"],
            actor_emotion: EmotionalState::Angry,
            target_trust_delta: -0.1,
            target_suspicion_delta: 0.2,
            target_knowledge: None,
            actor_knowledge: None,
        },
        ActionRule {
            name: "reveal",
            keywords: &["show", "reveal"],
            actor_emotion: EmotionalState::Determined,
            target_trust_delta: 0.15,
            target_suspicion_delta: 0.0,
            target_knowledge: Some("saw_evidence_from"),
            actor_knowledge: None,
        },
        ActionRule {
            name: "threaten",
            keywords: &["demand", "threaten"],
            actor_emotion: EmotionalState::Angry,
            target_trust_delta: -0.15,
            target_suspicion_delta: 0.2,
            target_knowledge: None,
            actor_knowledge: None,
        },
        ActionRule {
            name: "mediate",
            keywords: &["calm", "mediat", "chai", "between"],
            actor_emotion: EmotionalState::Calm,
            target_trust_delta: 0.2,
            target_suspicion_delta: 0.0,
            target_knowledge: None,
            actor_knowledge: None,
        },
        ActionRule {
            name: "bribe",
            keywords: &["bribe", "fee", "money"],
            actor_emotion: EmotionalState::Nervous,
            target_trust_delta: 0.0,
            target_suspicion_delta: 0.3,
            target_knowledge: Some("bribe_hinted_by"),
            actor_knowledge: None,
        },
        ActionRule {
            name: "search",
            keywords: &["search", "check", "inspect", "examin"],
            actor_emotion: EmotionalState::Anxious,
            target_trust_delta: 0.0,
            target_suspicion_delta: 0.0,
            target_knowledge: None,
            actor_knowledge: Some("searched_scene"),
        },
        ActionRule {
            name: "withdraw",
            keywords: &["leave", "walk"],
            actor_emotion: EmotionalState::Defensive,
            target_trust_delta: 0.0,
            target_suspicion_delta: 0.1,
            target_knowledge: None,
            actor_knowledge: None,
        },
    ];
}

/// The rule that applies to `action`, if any.
pub fn match_rule(action: &str) -> Option<&'static ActionRule> {
    let lowered = action.to_lowercase();
    ACTION_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
}

/// `did:<first four words>` for any action text.
pub fn action_token(action: &str) -> String {
    format!("did:{}", snake_words(action, 4))
}

/// Lowercase alphanumeric words joined by underscores.
pub fn snake_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .take(limit)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        // "examining" and "walks" both appear; search comes first.
        let rule = match_rule("walks around vehicles examining damage with flashlight").unwrap();
        assert_eq!(rule.name, "search");

        let rule = match_rule("suggests moving to side while hinting at facilitation fee").unwrap();
        assert_eq!(rule.name, "bribe");

        let rule = match_rule("Steps BETWEEN arguing parties").unwrap();
        assert_eq!(rule.name, "mediate");
    }

    #[test]
    fn test_unmatched_action() {
        assert!(match_rule("addresses the crowd directly").is_none());
    }

    #[test]
    fn test_action_token() {
        assert_eq!(
            action_token("calls someone — possibly a lawyer"),
            "did:calls_someone_possibly_a"
        );
        assert_eq!(action_token("nods"), "did:nods");
    }
}
