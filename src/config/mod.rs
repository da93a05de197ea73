//! Configuration management for `amp-purge.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[purge]`  | Minify, whitelist, debug report                |
//! | `[serve]`  | Development server (interface, port, root)     |
//!
//! The file is optional: without one every section takes its defaults.
//! CLI flags override file values.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_from_root};

pub use section::ServeConfig;
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, Commands, PurgeArgs},
    debug, log,
    purge::PurgeOptions,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing amp-purge.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was loaded, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths resolve against: the config file's parent,
    /// or cwd without a config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// CSS purging options
    #[serde(default)]
    pub purge: PurgeOptions,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl AppConfig {
    pub const WHITELIST: FieldPath = FieldPath::new("purge.whitelist");

    /// Load configuration for `cli`, searching upward from cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    /// Load configuration for `cli`, searching upward from `cwd`.
    pub fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let mut config = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.finalize(cli, cwd);
        config.validate(&cli.command)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve paths and apply CLI overrides.
    fn finalize(&mut self, cli: &Cli, cwd: &Path) {
        self.root = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

        self.serve.root = resolve_from_root(&self.serve.root, &self.root);

        self.apply_purge_args(&cli.purge);
        self.apply_command_options(&cli.command, cwd);
    }

    /// Apply `--minify`, `--debug` and `--whitelist`.
    ///
    /// Whitelist entries from the CLI extend the configured ones.
    fn apply_purge_args(&mut self, args: &PurgeArgs) {
        Self::update_option(&mut self.purge.minify, args.minify.as_ref());
        Self::update_option(&mut self.purge.debug, args.debug.as_ref());
        self.purge.whitelist.extend(args.whitelist.iter().cloned());
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, command: &Commands, cwd: &Path) {
        match command {
            Commands::Serve {
                root,
                interface,
                port,
            } => {
                // --root is relative to where the command runs
                if let Some(root) = root {
                    self.serve.root = resolve_from_root(root, cwd);
                }
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Purge { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration for `command`.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, command: &Commands) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.validate_whitelist(&mut diag);
        if let Commands::Serve { .. } = command {
            self.serve.validate(&mut diag);
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_whitelist(&self, diag: &mut ConfigDiagnostics) {
        for (i, entry) in self.purge.whitelist.iter().enumerate() {
            if entry.trim().is_empty() {
                diag.error(Self::WHITELIST, format!("entry {i} is empty"));
            } else if entry.trim() != entry {
                diag.warn(
                    Self::WHITELIST,
                    format!("entry `{entry}` has surrounding whitespace"),
                );
            }
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
