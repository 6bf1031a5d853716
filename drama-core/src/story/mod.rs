//! Story data model: profiles, events and the state aggregate.

mod event;
mod profile;
mod state;

pub use event::{AgenticReasoning, NarrativeEvent};
pub use profile::{CharacterProfile, EmotionalState, SocialRole, DEFAULT_SUSPICION, DEFAULT_TRUST};
pub use state::{Conclusion, DialogueTurn, StoryId, StoryState, TriggerLedger};
