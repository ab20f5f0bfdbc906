//! Main CLI application structure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{module_cmd, plugin_cmd};
use crate::render::Templates;
use crate::storage::{PluginReconcile, ReadOptions};

#[derive(Parser)]
#[command(name = "module-tool")]
#[command(author, version, about = "Scaffolds Unreal project and plugin modules")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// How plugin references are checked against Plugins/ when reading a manifest
    #[arg(long, global = true, default_value = "drop-existing")]
    pub reconcile: ReconcileMode,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command-line names for [`PluginReconcile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReconcileMode {
    /// Hide references whose plugin directory exists
    #[default]
    DropExisting,
    /// Hide references whose plugin directory is missing
    DropMissing,
    /// Leave the plugin list as written
    Keep,
}

impl From<ReconcileMode> for PluginReconcile {
    fn from(mode: ReconcileMode) -> Self {
        match mode {
            ReconcileMode::DropExisting => PluginReconcile::DropExisting,
            ReconcileMode::DropMissing => PluginReconcile::DropMissing,
            ReconcileMode::Keep => PluginReconcile::Keep,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),

    /// Manage modules
    #[command(subcommand)]
    Module(module_cmd::ModuleCommands),
}

/// Shared state handed to every command
pub struct Env {
    pub output: Output,
    pub templates: Templates,
    pub read_options: ReadOptions,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "module_tool=debug"
    } else {
        "module_tool=warn"
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(cli.format, cli.verbose);
    if let Ok(dir) = std::env::current_dir() {
        output.verbose(&format!("Running module-tool in {}", dir.display()));
    }

    let templates = Templates::new().context("Failed to load templates")?;
    let env = Env {
        output,
        templates,
        read_options: ReadOptions {
            reconcile: cli.reconcile.into(),
            ..ReadOptions::default()
        },
    };

    match cli.command {
        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &env)?,
        Commands::Module(cmd) => module_cmd::run(cmd, &env)?,
    }

    env.output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_defaults_to_drop_existing() {
        let cli = Cli::try_parse_from(["module-tool", "module", "list"]).unwrap();
        assert_eq!(
            PluginReconcile::from(cli.reconcile),
            PluginReconcile::DropExisting
        );
    }

    #[test]
    fn reconcile_flag_maps_to_policy() {
        let cli =
            Cli::try_parse_from(["module-tool", "--reconcile", "keep", "module", "list"]).unwrap();
        assert_eq!(PluginReconcile::from(cli.reconcile), PluginReconcile::Keep);

        let args = ["module-tool", "module", "list", "--reconcile", "drop-missing"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(PluginReconcile::from(cli.reconcile), PluginReconcile::DropMissing);
    }

    #[test]
    fn unknown_reconcile_mode_is_rejected() {
        let args = ["module-tool", "--reconcile", "never", "module", "list"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
