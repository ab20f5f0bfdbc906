//! Persisting descriptors and generated module sources
//!
//! Every public function plans its full set of [`Operation`]s first (looking
//! up config entries and rendering templates), then runs them as one
//! [`OperationStack`]. Planning errors happen before anything touches disk;
//! execution errors roll back every step that completed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::config::AppConfig;
use super::operations::{Operation, OperationStack};
use super::project::ProjectError;
use crate::domain::{ProjectFileDescriptor, ProjectModuleDescriptor};
use crate::render::{BuildFileContext, HeaderContext, Templates};

/// Writes projects, plugins and modules to disk
pub struct ProjectWriter<'a> {
    config: &'a AppConfig,
    templates: &'a Templates,
}

impl<'a> ProjectWriter<'a> {
    pub fn new(config: &'a AppConfig, templates: &'a Templates) -> Self {
        Self { config, templates }
    }

    /// Creates the project directory, the sources of every module and the
    /// manifest itself
    pub fn write_project_file(&self, project: &ProjectFileDescriptor) -> Result<Vec<PathBuf>> {
        let mut stack = OperationStack::new();
        self.plan_project(&mut stack, project)?;
        execute(&mut stack)
    }

    /// Creates the source directories, build rules and header of one module
    pub fn write_project_module(
        &self,
        project: &ProjectFileDescriptor,
        module: &ProjectModuleDescriptor,
    ) -> Result<Vec<PathBuf>> {
        let mut stack = OperationStack::new();
        self.plan_module(&mut stack, project, &module.name)?;
        execute(&mut stack)
    }

    /// Writes the manifest file of `project`
    pub fn write_manifest(&self, project: &ProjectFileDescriptor) -> Result<Vec<PathBuf>> {
        let mut stack = OperationStack::new();
        plan_manifest(&mut stack, project)?;
        execute(&mut stack)
    }

    /// Writes a new plugin and the parent manifest that references it
    ///
    /// On failure all written files are rolled back and the plugin reference
    /// is removed from `parent` again.
    pub fn write_plugin(
        &self,
        parent: &mut ProjectFileDescriptor,
        plugin: &ProjectFileDescriptor,
    ) -> Result<Vec<PathBuf>> {
        let result = self.write_plugin_files(parent, plugin);
        if result.is_err() && parent.remove_plugin(&plugin.project_name).is_some() {
            debug!(plugin = %plugin.project_name, "unlinked plugin after failed write");
        }
        result
    }

    fn write_plugin_files(
        &self,
        parent: &ProjectFileDescriptor,
        plugin: &ProjectFileDescriptor,
    ) -> Result<Vec<PathBuf>> {
        let mut stack = OperationStack::new();
        self.plan_project(&mut stack, plugin)?;
        plan_manifest(&mut stack, parent)?;
        execute(&mut stack)
    }

    /// Writes the sources of `modules` and the manifest that now lists them
    ///
    /// On failure all written files are rolled back and the modules are
    /// removed from `project` again.
    pub fn write_new_modules(
        &self,
        project: &mut ProjectFileDescriptor,
        modules: &[String],
    ) -> Result<Vec<PathBuf>> {
        let result = self.write_module_files(project, modules);
        if result.is_err() {
            for name in modules {
                project.remove_module(name);
            }
            debug!(count = modules.len(), "removed modules after failed write");
        }
        result
    }

    fn write_module_files(
        &self,
        project: &ProjectFileDescriptor,
        modules: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut stack = OperationStack::new();
        for name in modules {
            self.plan_module(&mut stack, project, name)?;
        }
        plan_manifest(&mut stack, project)?;
        execute(&mut stack)
    }

    fn plan_project(
        &self,
        stack: &mut OperationStack,
        project: &ProjectFileDescriptor,
    ) -> Result<()> {
        let manifest = project.manifest_path();
        if manifest.exists() {
            return Err(ProjectError::ManifestExists(manifest).into());
        }

        stack.push(Operation::create_dir(&project.project_path));
        for module in &project.modules {
            self.plan_module(stack, project, &module.name)?;
        }
        plan_manifest(stack, project)
    }

    fn plan_module(
        &self,
        stack: &mut OperationStack,
        project: &ProjectFileDescriptor,
        module: &str,
    ) -> Result<()> {
        let spec = self
            .config
            .module(module)
            .ok_or_else(|| ProjectError::ModuleNotConfigured(module.to_string()))?;

        let build_file = self.templates.render_build_file(&BuildFileContext {
            copyright: self.config.copyright().to_string(),
            module_name: module.to_string(),
            public_dependencies: spec.dependencies.public.clone(),
            private_dependencies: spec.dependencies.private.clone(),
        })?;
        let header = self.templates.render_header(&HeaderContext {
            copyright: self.config.copyright().to_string(),
            module_name: module.to_string(),
            is_game_module: !project.is_plugin,
        })?;

        stack.push(Operation::create_dir(project.module_sources(module)));
        stack.push(Operation::create_dir(project.module_public(module)));
        stack.push(Operation::create_dir(project.module_private(module)));
        stack.push(Operation::write_file(project.module_build_file(module), build_file));
        stack.push(Operation::write_file(project.module_header(module), header));
        Ok(())
    }
}

fn plan_manifest(stack: &mut OperationStack, project: &ProjectFileDescriptor) -> Result<()> {
    let bytes = project
        .to_manifest_bytes()
        .with_context(|| format!("Failed to serialize manifest: {}", project.file_name))?;
    stack.push(Operation::write_file(project.manifest_path(), bytes));
    Ok(())
}

fn execute(stack: &mut OperationStack) -> Result<Vec<PathBuf>> {
    if stack.is_empty() {
        return Ok(Vec::new());
    }
    debug!(steps = stack.len(), "running write plan");
    stack.try_run()?;
    Ok(stack.committed().map(|op| op.path().to_path_buf()).collect())
}
