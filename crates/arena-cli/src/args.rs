use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prompt-arena")]
#[command(about = "Run matrices of multi-turn LLM conversation simulations across providers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Execute a run matrix",
        long_about = "Plan and execute the scenario x provider x region matrix described by
a configuration file, then persist the results in one or more report
formats.

Provider credentials and HTTP clients are out of this tool's scope —
`--mock-provider` drives every configured provider from a scripted
response table instead, which is also what `mocks generate` produces."
    )]
    Run {
        #[arg(long, help = "Path to the TOML configuration file")]
        config: PathBuf,

        #[arg(long = "scenario", help = "Restrict to these scenario IDs (repeatable)")]
        scenario: Vec<String>,

        #[arg(long = "provider", help = "Restrict to these provider IDs (repeatable)")]
        provider: Vec<String>,

        #[arg(long = "region", help = "Restrict to these regions (repeatable)")]
        region: Vec<String>,

        #[arg(long, default_value_t = 4, help = "Maximum in-flight conversation runs")]
        concurrency: usize,

        #[arg(long = "out", help = "Output directory for reports")]
        out: Option<PathBuf>,

        #[arg(long = "format", value_enum, help = "Report format to emit (repeatable)")]
        format: Vec<ReportFormat>,

        #[arg(long, help = "Exit non-zero if any run errored or any hard assertion failed")]
        ci: bool,

        #[arg(long, help = "Drive every configured provider with scripted mock replies")]
        mock_provider: bool,

        #[arg(long, help = "Scripted response table for --mock-provider")]
        mock_config: Option<PathBuf>,

        #[arg(long, help = "Deterministic seed forwarded to every run's Params")]
        seed: Option<u64>,

        #[arg(long, help = "Sampling temperature forwarded to every run's Params")]
        temperature: Option<f32>,

        #[arg(long, help = "Max output tokens forwarded to every run's Params")]
        max_tokens: Option<u32>,

        #[arg(long, short = 'v', help = "Print one line per completed run as it finishes")]
        verbose: bool,
    },

    #[command(about = "Regenerate aggregate reports from an on-disk index and per-run JSON files")]
    Render {
        #[arg(long, help = "Directory containing index.json and <RunID>.json files")]
        input: PathBuf,

        #[arg(long = "format", value_enum, help = "Report format to emit (repeatable)")]
        format: Vec<ReportFormat>,

        #[arg(long = "output", help = "Output directory for regenerated reports")]
        output: Option<PathBuf>,
    },

    #[command(about = "Derive a scripted mock-response table from prior JSON results")]
    Mocks {
        #[command(subcommand)]
        command: MocksCommand,
    },
}

#[derive(Subcommand)]
pub enum MocksCommand {
    #[command(
        about = "Derive a mock-response table from prior JSON results",
        long_about = "Replays the assistant messages already recorded in a directory of
<RunID>.json files into a scripted response table that --mock-provider
can load, so a recorded run can be replayed deterministically offline."
    )]
    Generate {
        #[arg(long, help = "Directory containing index.json and <RunID>.json files")]
        input: PathBuf,

        #[arg(long, help = "Where to write the generated mock-response table")]
        output: PathBuf,

        #[arg(long, help = "Collapse all providers' replies into one shared script")]
        per_scenario: bool,

        #[arg(long, help = "Merge into an existing output file instead of overwriting it")]
        merge: bool,

        #[arg(long = "scenario", help = "Only replay these scenario IDs (repeatable)")]
        scenario: Vec<String>,

        #[arg(long = "provider", help = "Only replay these provider IDs (repeatable)")]
        provider: Vec<String>,

        #[arg(long, help = "Print what would be written without touching the output file")]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Junit,
    Html,
    Markdown,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Junit => "xml",
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }
}
