mod mocks;
mod render;
mod run;

use crate::args::{Cli, Commands, MocksCommand};
use crate::exit_code::ExitCode;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run {
            config,
            scenario,
            provider,
            region,
            concurrency,
            out,
            format,
            ci,
            mock_provider,
            mock_config,
            seed,
            temperature,
            max_tokens,
            verbose,
        } => run::handle(run::RunArgs {
            config,
            scenario,
            provider,
            region,
            concurrency,
            out,
            format,
            ci,
            mock_provider,
            mock_config,
            seed,
            temperature,
            max_tokens,
            verbose,
        }),

        Commands::Render { input, format, output } => render::handle(render::RenderArgs { input, format, output }),

        Commands::Mocks { command } => match command {
            MocksCommand::Generate { input, output, per_scenario, merge, scenario, provider, dry_run } => {
                mocks::generate(mocks::GenerateArgs { input, output, per_scenario, merge, scenario, provider, dry_run })
            }
        },
    }
}
