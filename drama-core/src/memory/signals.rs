//! Dialogue signal lexicons.
//!
//! Every category is checked independently: one line can be aggressive and
//! a victim appeal at the same time, and all matching deltas apply.

use crate::story::SocialRole;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Aggressive,
    Conciliatory,
    CorruptPractice,
    VictimAppeal,
}

impl SignalCategory {
    pub fn name(&self) -> &'static str {
        match self {
            SignalCategory::Aggressive => "aggressive",
            SignalCategory::Conciliatory => "conciliatory",
            SignalCategory::CorruptPractice => "corrupt_practice",
            SignalCategory::VictimAppeal => "victim_appeal",
        }
    }
}

/// One lexicon and the deltas every listener applies toward the speaker.
#[derive(Debug, Clone)]
pub struct DialogueSignal {
    pub category: SignalCategory,
    pub keywords: &'static [&'static str],
    /// Only counts when the speaker holds this role.
    pub speaker_role: Option<SocialRole>,
    pub suspicion_delta: f32,
    pub trust_delta: f32,
}

impl DialogueSignal {
    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str, speaker_role: SocialRole) -> bool {
        if let Some(required) = self.speaker_role {
            if required != speaker_role {
                return false;
            }
        }
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

lazy_static! {
    pub static ref DIALOGUE_SIGNALS: Vec<DialogueSignal> = vec![
        DialogueSignal {
            category: SignalCategory::Aggressive,
            keywords: &[
                "liar", "thief", "chor", "how dare", "shut up", "idiot", "fool",
                "you will pay", "sue you", "lawyer", "arrest", "jail", "bakwas",
                "get out of my way",
            ],
            speaker_role: None,
            suspicion_delta: 0.15,
            trust_delta: -0.10,
        },
        DialogueSignal {
            category: SignalCategory::Conciliatory,
            keywords: &[
                "please", "sorry", "maaf", "calm down", "let us talk", "let's talk",
                "i understand", "together", "bhai", "agree", "settle",
            ],
            speaker_role: None,
            suspicion_delta: 0.0,
            trust_delta: 0.08,
        },
        DialogueSignal {
            category: SignalCategory::CorruptPractice,
            keywords: &[
                "fee", "chai pani", "facilitation", "arrange something", "kharcha",
                "something for my trouble", "between us", "paperwork can wait",
                "make this go away",
            ],
            speaker_role: Some(SocialRole::Authority),
            suspicion_delta: 0.20,
            trust_delta: -0.15,
        },
        DialogueSignal {
            category: SignalCategory::VictimAppeal,
            keywords: &[
                "my children", "my family", "bachay", "poor man", "livelihood",
                "my wife", "roti", "day's earnings", "garib", "i beg",
            ],
            speaker_role: Some(SocialRole::LowStatus),
            suspicion_delta: 0.0,
            trust_delta: 0.05,
        },
    ];
}

/// Every signal a line triggers, in lexicon order.
pub fn detect(text: &str, speaker_role: SocialRole) -> Vec<&'static DialogueSignal> {
    let lowered = text.to_lowercase();
    DIALOGUE_SIGNALS
        .iter()
        .filter(|s| s.matches(&lowered, speaker_role))
        .collect()
}
