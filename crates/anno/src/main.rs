use std::io::IsTerminal;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: commands::Commands,
}

impl Cli {
    /// Install the global subscriber; listings go to stdout, logs to stderr
    fn init_tracing(&self) -> Result<()> {
        let json = self.json_logs.then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
        });
        let compact = (!self.json_logs).then(|| {
            fmt::layer()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .without_time()
                .compact()
        });

        tracing_subscriber::registry()
            .with(json)
            .with(compact)
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init()
            .into_diagnostic()
    }
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    cli.init_tracing()?;

    cli.command.handle()
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};
    use miette::{IntoDiagnostic, Result};

    use super::Cli;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_logs_after_subcommand() -> Result<()> {
        let cli = Cli::try_parse_from(["anno", "rda", "list", "-f", "a.rda", "--json-logs"])
            .into_diagnostic()?;
        assert!(cli.json_logs);

        let cli = Cli::try_parse_from(["anno", "rda", "list", "-f", "a.rda"]).into_diagnostic()?;
        assert!(!cli.json_logs);

        Ok(())
    }

    #[test]
    fn update_takes_repeated_deletes() {
        assert!(Cli::try_parse_from([
            "anno", "rda", "update", "-f", "a.rda", "--delete", "x.txt", "--delete", "y.txt",
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["anno", "rda", "pack", "-f", "a.rda"]).is_err());
    }
}
