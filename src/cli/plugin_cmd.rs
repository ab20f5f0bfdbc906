//! Plugin commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use super::app::Env;
use crate::storage::{AppConfig, Project};

#[derive(Subcommand)]
pub enum PluginCommands {
    /// Create a plugin from a config and link it into a project
    Create {
        /// Config file to read the plugin data from
        #[arg(long)]
        config: PathBuf,

        /// Path to the .uproject or .uplugin file, or the directory containing it
        #[arg(long)]
        project: PathBuf,

        /// Add the plugin to the project disabled
        #[arg(long)]
        disabled: bool,
    },
}

pub fn run(cmd: PluginCommands, env: &Env) -> Result<()> {
    match cmd {
        PluginCommands::Create {
            config,
            project,
            disabled,
        } => create_plugin(env, &config, &project, !disabled),
    }
}

fn create_plugin(env: &Env, config_path: &Path, project_path: &Path, enabled: bool) -> Result<()> {
    let output = &env.output;

    let config = AppConfig::load(config_path)?;
    output.verbose_ctx(
        "plugin",
        &format!(
            "Loaded config for '{}' with {} module(s)",
            config.project.name,
            config.modules().len()
        ),
    );

    let mut project = Project::open(project_path, env.read_options)?;
    output.verbose_ctx(
        "plugin",
        &format!("Opened {}", project.descriptor().manifest_path().display()),
    );

    let created = project.add_plugin(&config, &env.templates, enabled)?;
    let plugin = &created.plugin;

    if output.is_json() {
        let files: Vec<_> = created
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        output.data(&serde_json::json!({
            "plugin": plugin.project_name,
            "manifest": plugin.manifest_path().display().to_string(),
            "enabled": enabled,
            "modules": plugin.modules.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            "files": files,
        }));
    } else {
        output.success(&format!(
            "Created plugin {} at {}",
            plugin.project_name,
            plugin.project_path.display()
        ));
        output.files(project.root(), &created.written);
    }

    Ok(())
}
