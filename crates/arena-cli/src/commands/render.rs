use crate::args::ReportFormat;
use crate::exit_code::ExitCode;
use anyhow::{Context, Result};
use arena_repository::{HtmlSink, JsonSink, JunitSink, MarkdownSink, ResultRepository, ResultSink, Summary};
use arena_types::{RunId, RunResult};
use std::path::{Path, PathBuf};

pub struct RenderArgs {
    pub input: PathBuf,
    pub format: Vec<ReportFormat>,
    pub output: Option<PathBuf>,
}

/// Regenerates aggregate reports from a previously written `index.json` and
/// its per-run `<RunID>.json` files, without re-executing anything.
pub fn handle(args: RenderArgs) -> Result<ExitCode> {
    let summary = load_summary(&args.input)?;
    let results = load_results(&args.input, &summary.run_ids)?;

    let out_dir = args.output.unwrap_or_else(|| args.input.clone());
    let formats = if args.format.is_empty() { vec![ReportFormat::Html, ReportFormat::Markdown, ReportFormat::Junit] } else { args.format };

    let sinks: Vec<Box<dyn ResultSink>> = formats
        .into_iter()
        .map(|format| -> Box<dyn ResultSink> {
            match format {
                ReportFormat::Json => Box::new(JsonSink::new(out_dir.clone())),
                ReportFormat::Junit => Box::new(JunitSink::new(out_dir.join("junit.xml"))),
                ReportFormat::Html => Box::new(HtmlSink::new(out_dir.join("report.html"))),
                ReportFormat::Markdown => Box::new(MarkdownSink::new(out_dir.join("report.md"))),
            }
        })
        .collect();

    let repository = ResultRepository::new(sinks);
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let report = runtime.block_on(repository.save(&results, &summary));

    for (sink, message) in &report.failures {
        eprintln!("warning: {sink} sink failed: {message}");
    }

    Ok(if report.is_ok() { ExitCode::Success } else { ExitCode::RunFailure })
}

fn load_summary(input: &Path) -> Result<Summary> {
    let text = std::fs::read_to_string(input.join("index.json"))
        .with_context(|| format!("reading index.json from {}", input.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn load_results(input: &Path, run_ids: &[RunId]) -> Result<Vec<RunResult>> {
    run_ids
        .iter()
        .map(|id| {
            let path = input.join(format!("{id}.json"));
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            Ok(serde_json::from_str(&text)?)
        })
        .collect()
}
