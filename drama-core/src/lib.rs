//! Turn-based director for multi-character dramas.
//!
//! This crate provides:
//! - A deterministic story loop driven by a seeded rng
//! - A plot clock, clue schedule and one-shot triggers for pacing
//! - Per-character memory of trust, suspicion and knowledge
//! - An entity registry that owns the truth about story props
//! - A text generator seam with a Claude-backed implementation
//!
//! # Quick Start
//!
//! ```ignore
//! use drama_core::{ClaudeGenerator, Scenario, StoryConfig, StoryOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryConfig::from_env().with_seed(42);
//!     let generator = Arc::new(ClaudeGenerator::from_env(&config)?);
//!
//!     let mut story = StoryOrchestrator::new(Scenario::rickshaw_accident(), config, generator)?;
//!     while !story.is_concluded() {
//!         let outcome = story.step().await?;
//!         println!("turn {}: {} events", outcome.turn, outcome.events.len());
//!     }
//!
//!     story.save("story_output.json").await?;
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod config;
pub mod director;
pub mod generation;
pub mod memory;
pub mod mystery;
pub mod orchestrator;
pub mod persist;
pub mod plot_clock;
pub mod prompts;
pub mod registry;
pub mod scenario;
pub mod story;
pub mod testing;

// Primary public API
pub use config::{Pacing, StoryConfig};
pub use director::{ConclusionCheck, Director, MoveKind};
pub use generation::{ClaudeGenerator, GenerationError, GenerationRequest, TextGenerator};
pub use memory::{KnowledgeGrant, MemoryModel, MemorySnapshot};
pub use mystery::{ClueType, HiddenTruth};
pub use orchestrator::{StoryError, StoryOrchestrator, TurnOutcome};
pub use persist::{PersistError, StoryArtifact};
pub use plot_clock::{Phase, PlotClock};
pub use registry::{EntityPatch, EntityRecord, EntityRegistry};
pub use scenario::{Scenario, ScenarioError};
pub use story::{CharacterProfile, NarrativeEvent, StoryState};
pub use testing::{MockResponse, ScriptedGenerator, TestHarness};
