//! Command-line runner for AI-directed dramas.
//!
//! Plays one story to its conclusion, printing each event as it happens,
//! and writes the artifact to `story_output.json`.
//!
//! ```bash
//! cargo run -p drama -- --seed 42
//! cargo run -p drama -- --offline --seed 7 --truth wallet_never_stolen
//! ```

mod args;
mod render;

use args::RunArgs;
use drama_core::{
    ClaudeGenerator, Scenario, ScriptedGenerator, StoryConfig, StoryOrchestrator, TextGenerator,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        args::print_help();
        return Ok(());
    }
    let run = match RunArgs::parse(&args) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    let mut config = StoryConfig::from_env();
    if let Some(seed) = run.seed {
        config = config.with_seed(seed);
    }
    if let Some(truth) = run.truth {
        config = config.with_hidden_truth(truth);
    }

    let scenario = match &run.scenario {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading scenario");
            Scenario::load_json(path).await?
        }
        None => Scenario::rickshaw_accident(),
    };

    let generator: Arc<dyn TextGenerator> = if run.offline {
        Arc::new(ScriptedGenerator::offline(&scenario))
    } else {
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            eprintln!("Error: ANTHROPIC_API_KEY environment variable not set.");
            eprintln!("Set it in .env, export it, or pass --offline.");
            std::process::exit(1);
        }
        Arc::new(ClaudeGenerator::from_env(&config)?)
    };

    let seed = config.seed;
    let mut story = StoryOrchestrator::new(scenario, config, generator)?;
    render::print_header(story.state(), seed);

    while !story.is_concluded() {
        let outcome = story.step().await?;
        for event in &outcome.events {
            render::print_event(event);
        }
    }

    story.save(&run.output).await?;
    tracing::info!(path = %run.output.display(), turns = story.state().turn, "story saved");
    render::print_summary(story.state(), &run.output);
    Ok(())
}
