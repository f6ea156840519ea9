mod args;
mod output;
mod run;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rows: Vec<run::CheckRow> = cli
        .addresses
        .iter()
        .map(|address| run::check_address(address, &cli))
        .collect();

    output::write_reports(&rows, &cli)?;

    // exit codes: 0 all checks done, 2 refuted addresses, 1 failed checks
    let code = output::exit_code(&rows);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Logs go to stderr so the report formats stay pipeable; `RUST_LOG`
/// overrides the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
