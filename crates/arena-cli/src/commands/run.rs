use crate::args::ReportFormat;
use crate::exit_code::ExitCode;
use crate::mock_config::MockConfig;
use anyhow::{Context, Result, bail};
use arena_core::CancellationToken;
use arena_engine::planner::PlanFilters;
use arena_repository::{HtmlSink, JsonSink, JunitSink, MarkdownSink, ResultRepository, ResultSink};
use arena_sdk::{ArenaBuilder, ArenaConfig};
use arena_types::{Params, ProviderId, Region, ScenarioId};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[allow(clippy::too_many_arguments)]
pub struct RunArgs {
    pub config: PathBuf,
    pub scenario: Vec<String>,
    pub provider: Vec<String>,
    pub region: Vec<String>,
    pub concurrency: usize,
    pub out: Option<PathBuf>,
    pub format: Vec<ReportFormat>,
    pub ci: bool,
    pub mock_provider: bool,
    pub mock_config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub verbose: bool,
}

pub fn handle(args: RunArgs) -> Result<ExitCode> {
    let config = ArenaConfig::load_from(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    let scenarios = config.scenarios_typed().context("converting configured scenarios")?;
    if scenarios.is_empty() {
        bail!("configuration at {} defines no scenarios", args.config.display());
    }

    let providers = if args.provider.is_empty() { config.provider_ids() } else { args.provider.iter().map(|p| ProviderId::from(p.as_str())).collect() };
    if providers.is_empty() {
        bail!("no providers configured or selected with --provider");
    }

    if !args.mock_provider {
        bail!(
            "this build has no HTTP provider clients wired in; pass --mock-provider \
             (with --mock-config to script replies) to drive the matrix"
        );
    }

    let mock_config = match &args.mock_config {
        Some(path) => MockConfig::load_from(path).with_context(|| format!("loading mock config from {}", path.display()))?,
        None => MockConfig::default(),
    };
    let registry = mock_config.build_registry(&providers);

    let mut params = Params::new();
    params.temperature = args.temperature.or(config.defaults.temperature);
    params.max_tokens = args.max_tokens.or(config.defaults.max_tokens);
    params.seed = args.seed.or(config.defaults.seed);

    let regions: Vec<Region> = if args.region.is_empty() { config.region_list() } else { args.region.iter().map(|r| Region::from(r.as_str())).collect() };

    let filters = PlanFilters {
        scenarios: if args.scenario.is_empty() { None } else { Some(args.scenario.iter().map(|s| ScenarioId::from(s.as_str())).collect()) },
        providers: None,
        regions: None,
    };

    let mut builder = ArenaBuilder::new()
        .with_scenarios(scenarios)
        .with_regions(regions)
        .with_params(params)
        .with_filters(filters);
    for provider_id in registry.ids() {
        builder = builder.with_provider(provider_id.clone(), registry.get(provider_id).expect("just listed"));
    }
    let arena = builder.build();

    let cancellation = CancellationToken::new();
    install_ctrlc_handler(cancellation.clone())?;

    let concurrency = args.concurrency.max(1);
    let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("."));
    let config_file = args.config.display().to_string();
    let verbose = args.verbose;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let outcome = runtime.block_on(async {
        if verbose {
            let mut subscription = arena.subscribe();
            tokio::spawn(async move {
                while let Some(event) = subscription.recv().await {
                    println!("{event:?}");
                }
            });
        }
        arena.run(concurrency, config_file, cancellation).await
    })?;

    if verbose {
        for result in &outcome.results {
            println!("{} / {} / {}: {:?}", result.scenario_id, result.provider_id, result.region, result.status);
        }
    }

    let mut sink_failed = false;
    if !args.format.is_empty() {
        let sinks = build_sinks(&args.format, &out_dir);
        let repository = ResultRepository::new(sinks);
        let report = runtime.block_on(arena.save(&repository, &outcome));
        for (sink, message) in &report.failures {
            eprintln!("warning: {sink} sink failed: {message}");
        }
        sink_failed = !report.is_ok();
    }

    let any_errors = outcome.summary.errors > 0;
    let assertions_failed_under_ci = args.ci && outcome.summary.failed_assertions > 0;
    if any_errors || sink_failed || assertions_failed_under_ci {
        Ok(ExitCode::RunFailure)
    } else {
        Ok(ExitCode::Success)
    }
}

fn build_sinks(formats: &[ReportFormat], out_dir: &std::path::Path) -> Vec<Box<dyn ResultSink>> {
    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();
    for format in formats {
        match format {
            ReportFormat::Json => sinks.push(Box::new(JsonSink::new(out_dir.to_path_buf()))),
            ReportFormat::Junit => sinks.push(Box::new(JunitSink::new(out_dir.join("junit.xml")))),
            ReportFormat::Html => sinks.push(Box::new(HtmlSink::new(out_dir.join("report.html")))),
            ReportFormat::Markdown => sinks.push(Box::new(MarkdownSink::new(out_dir.join("report.md")))),
        }
    }
    sinks
}

/// Installs a SIGINT handler that cancels cooperatively rather than killing
/// the process, so in-flight runs still finalise through the normal
/// `Cancelled` path instead of being torn down mid-write.
fn install_ctrlc_handler(cancellation: CancellationToken) -> Result<()> {
    static ALREADY_INSTALLED: AtomicBool = AtomicBool::new(false);
    if ALREADY_INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    ctrlc::set_handler(move || cancellation.cancel()).context("installing SIGINT handler")
}
