//! Argument parsing for the runner.

use drama_core::HiddenTruth;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "story_output.json";

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub seed: Option<u64>,
    pub truth: Option<HiddenTruth>,
    pub scenario: Option<PathBuf>,
    pub output: PathBuf,
    pub offline: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            seed: None,
            truth: None,
            scenario: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            offline: false,
        }
    }
}

impl RunArgs {
    /// Parse `std::env::args()`, program name included.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut run = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    let value = value_of(args, i, "--seed")?;
                    run.seed = Some(
                        value
                            .parse()
                            .map_err(|_| format!("--seed expects an integer, got '{value}'"))?,
                    );
                    i += 1;
                }
                "--truth" => {
                    let value = value_of(args, i, "--truth")?;
                    run.truth = Some(parse_truth(value)?);
                    i += 1;
                }
                "--scenario" => {
                    run.scenario = Some(PathBuf::from(value_of(args, i, "--scenario")?));
                    i += 1;
                }
                "--output" | "-o" => {
                    run.output = PathBuf::from(value_of(args, i, "--output")?);
                    i += 1;
                }
                "--offline" => run.offline = true,
                other => return Err(format!("unknown argument '{other}'")),
            }
            i += 1;
        }

        Ok(run)
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} needs a value"))
}

fn parse_truth(s: &str) -> Result<HiddenTruth, String> {
    let wanted = s.to_lowercase().replace('-', "_");
    HiddenTruth::ALL
        .into_iter()
        .find(|t| t.name() == wanted)
        .ok_or_else(|| format!("unknown hidden truth '{s}'"))
}

pub fn print_help() {
    println!("drama - AI-directed street drama");
    println!();
    println!("USAGE:");
    println!("  drama [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help            Show this help message");
    println!("  --seed <N>            Seed for every random draw (default: DRAMA_SEED or 0)");
    println!("  --truth <TRUTH>       Pin the hidden truth instead of drawing it");
    println!("  --scenario <PATH>     Load a scenario from JSON instead of the built-in one");
    println!("  -o, --output <PATH>   Where to write the story (default: {DEFAULT_OUTPUT})");
    println!("  --offline             Use scripted replies instead of calling the API");
    println!();
    println!("TRUTHS:");
    let names: Vec<&str> = HiddenTruth::ALL.iter().map(|t| t.name()).collect();
    println!("  {}", names.join(", "));
    println!();
    println!("ENVIRONMENT:");
    println!("  ANTHROPIC_API_KEY     Required unless --offline");
    println!("  DRAMA_MODEL, DRAMA_MAX_TOKENS, DRAMA_TEMPERATURE, DRAMA_SEED");
    println!("  RUST_LOG              Log filter (default: info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("drama")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let run = RunArgs::parse(&args(&[])).unwrap();
        assert_eq!(run, RunArgs::default());
        assert_eq!(run.output, PathBuf::from("story_output.json"));
    }

    #[test]
    fn test_all_flags() {
        let run = RunArgs::parse(&args(&[
            "--seed",
            "42",
            "--truth",
            "raza-corrupt",
            "--offline",
            "-o",
            "out.json",
        ]))
        .unwrap();

        assert_eq!(run.seed, Some(42));
        assert_eq!(run.truth, Some(HiddenTruth::RazaCorrupt));
        assert!(run.offline);
        assert_eq!(run.output, PathBuf::from("out.json"));
    }

    #[test]
    fn test_bad_input() {
        assert!(RunArgs::parse(&args(&["--seed", "many"])).is_err());
        assert!(RunArgs::parse(&args(&["--seed"])).is_err());
        assert!(RunArgs::parse(&args(&["--truth", "aliens"])).is_err());
        assert!(RunArgs::parse(&args(&["--verbose"])).is_err());
    }
}
