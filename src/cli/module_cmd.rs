//! Module commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use super::app::Env;
use crate::storage::{AppConfig, Project};

#[derive(Subcommand)]
pub enum ModuleCommands {
    /// Add the configured modules to a project and generate their sources
    Create {
        /// Config file to read the module data from
        #[arg(long)]
        config: PathBuf,

        /// Path to the .uproject or .uplugin file, or the directory containing it
        #[arg(long)]
        project: PathBuf,
    },

    /// List the modules of a project
    List {
        /// Path to the .uproject or .uplugin file, or the directory containing it
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
}

pub fn run(cmd: ModuleCommands, env: &Env) -> Result<()> {
    match cmd {
        ModuleCommands::Create { config, project } => create_modules(env, &config, &project),
        ModuleCommands::List { project } => list_modules(env, &project),
    }
}

fn create_modules(env: &Env, config_path: &Path, project_path: &Path) -> Result<()> {
    let output = &env.output;

    let config = AppConfig::load(config_path)?;
    let mut project = Project::open(project_path, env.read_options)?;
    output.verbose_ctx(
        "module",
        &format!(
            "Adding {} module(s) to {}",
            config.modules().len(),
            project.descriptor().manifest_path().display()
        ),
    );

    let written = project.add_modules(&config, &env.templates)?;
    let names: Vec<_> = config.modules().iter().map(|m| m.name.as_str()).collect();

    if output.is_json() {
        let files: Vec<_> = written.iter().map(|p| p.display().to_string()).collect();
        output.data(&serde_json::json!({
            "project": project.descriptor().project_name,
            "modules": names,
            "files": files,
        }));
    } else {
        output.success(&format!(
            "Added {} to {}",
            names.join(", "),
            project.descriptor().file_name
        ));
        output.files(project.root(), &written);
    }

    Ok(())
}

fn list_modules(env: &Env, project_path: &Path) -> Result<()> {
    let output = &env.output;
    let project = Project::open(project_path, env.read_options)?;
    let modules = project.module_status()?;

    if output.is_json() {
        output.data(&modules);
    } else if modules.is_empty() {
        println!("No modules in {}", project.descriptor().file_name);
    } else {
        println!(
            "{:<30} {:<16} {:<14} SOURCES",
            "NAME", "LOADING PHASE", "TYPE"
        );
        println!("{}", "-".repeat(70));
        for module in &modules {
            println!(
                "{:<30} {:<16} {:<14} {}",
                module.name,
                module.loading_phase,
                module.module_type,
                if module.on_disk { "yes" } else { "missing" }
            );
        }
    }

    Ok(())
}
