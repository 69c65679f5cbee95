use crate::exit_code::ExitCode;
use crate::mock_config::{self, MockConfig};
use anyhow::{Context, Result};
use arena_types::RunResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub struct GenerateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub per_scenario: bool,
    pub merge: bool,
    pub scenario: Vec<String>,
    pub provider: Vec<String>,
    pub dry_run: bool,
}

pub fn generate(args: GenerateArgs) -> Result<ExitCode> {
    let results = load_results(&args.input)?;
    let generated = mock_config::generate_from_results(&results, args.per_scenario, &args.scenario, &args.provider);

    if args.dry_run {
        println!("would write {} mock entries to {}", generated.mocks.len(), args.output.display());
        for entry in &generated.mocks {
            println!("  [{}] {} #{}: {}", entry.provider, entry.scenario, entry.turn_index, truncate(&entry.content, 60));
        }
        return Ok(ExitCode::Success);
    }

    let final_config = if args.merge && args.output.exists() {
        let mut base = MockConfig::load_from(&args.output).with_context(|| format!("reading existing {}", args.output.display()))?;
        mock_config::merge(&mut base, generated);
        base
    } else {
        generated
    };

    final_config.save_to(&args.output).with_context(|| format!("writing {}", args.output.display()))?;
    println!("wrote {} mock entries to {}", final_config.mocks.len(), args.output.display());
    Ok(ExitCode::Success)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect::<String>() + "..."
    }
}

fn load_results(input: &Path) -> Result<Vec<RunResult>> {
    #[derive(Deserialize)]
    struct IndexFile {
        run_ids: Vec<String>,
    }

    let index_text = std::fs::read_to_string(input.join("index.json"))
        .with_context(|| format!("reading index.json from {}", input.display()))?;
    let index: IndexFile = serde_json::from_str(&index_text)?;

    index
        .run_ids
        .iter()
        .map(|id| {
            let path = input.join(format!("{id}.json"));
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            Ok(serde_json::from_str(&text)?)
        })
        .collect()
}
