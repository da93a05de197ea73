//! amp-purge - strip unused CSS from AMP pages.

use amp_purge::{
    cli::{self, Cli, Commands},
    config::{AppConfig, init_config},
    core, log, logger,
};
use anyhow::Result;
use clap::{ColorChoice, Parser};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(AppConfig::load(&cli)?);

    match &cli.command {
        Commands::Purge { input, output } => {
            let outcome = cli::purge::purge_file(input, output.as_deref(), &config.purge)?;
            // --debug already reported; stdout carries only the document
            if output.is_some()
                && !config.purge.debug
                && let Some(report) = outcome.report()
            {
                log!("purge"; "{report}");
            }
            Ok(())
        }
        Commands::Serve { .. } => cli::serve::bind_server()?.run(),
    }
}
