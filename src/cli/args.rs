//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf};

/// Strip unused CSS from `<style amp-custom>` in AMP pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: amp-purge.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "amp-purge.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub purge: PurgeArgs,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Purge one HTML file
    #[command(visible_alias = "p")]
    Purge {
        /// HTML file to purge
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Serve a directory, purging HTML responses on the fly
    #[command(visible_alias = "s")]
    Serve {
        /// Directory to serve (relative to current directory)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        root: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Purge options shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PurgeArgs {
    /// Minify the purified CSS
    #[arg(short, long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Log a report line for every purged document
    #[arg(short, long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub debug: Option<bool>,

    /// Selectors to keep even when unused (comma-separated, `*name*` for substrings)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub whitelist: Vec<String>,
}

#[allow(unused)]
impl Cli {
    pub const fn is_purge(&self) -> bool {
        matches!(self.command, Commands::Purge { .. })
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
