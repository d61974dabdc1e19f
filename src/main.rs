mod cli;
mod clipboard;
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // The clipboard daemon is a re-exec of this binary and must exit before argument parsing.
    if clipboard::run_daemon_if_requested()? {
        return Ok(());
    }

    let cli_args = cli::Cli::parse();
    setup_logging(cli_args.quiet, cli_args.verbose);

    workflow::run_ctxyank(cli_args)
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}
