use arena_cli::{Cli, ExitCode, run};
use clap::Parser;

fn main() {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::UsageError
        }
    };
    std::process::exit(exit_code.code());
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
