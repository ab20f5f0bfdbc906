//! Project management
//!
//! Opens a project manifest and runs the create flows on it: factory first,
//! then the writer.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use super::config::{AppConfig, ModuleSpec};
use super::reader::{read_module_dirs, read_project, ReadOptions};
use super::writer::ProjectWriter;
use crate::domain::{create_module, create_plugin, ProjectFileDescriptor, ProjectModuleDescriptor};
use crate::render::Templates;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No .uproject or .uplugin file found in {0}")]
    NotFound(PathBuf),

    #[error("Manifest already exists: {0}")]
    ManifestExists(PathBuf),

    #[error("Module '{0}' is not defined in the config")]
    ModuleNotConfigured(String),

    #[error("Operation {0} already failed; roll back before running again")]
    AlreadyFailed(usize),
}

/// Result of adding a plugin to a project
#[derive(Debug)]
pub struct PluginCreated {
    pub plugin: ProjectFileDescriptor,
    pub written: Vec<PathBuf>,
}

/// A manifest module and whether its sources exist
#[derive(Debug, Clone, Serialize)]
pub struct ModuleStatus {
    pub name: String,
    pub loading_phase: String,
    #[serde(rename = "type")]
    pub module_type: String,
    pub on_disk: bool,
}

fn apply_spec(module: &mut ProjectModuleDescriptor, spec: &ModuleSpec) {
    module.loading_phase = spec.loading_phase.clone();
    module.module_type = spec.module_type.clone();
}

/// An opened project or plugin manifest
pub struct Project {
    descriptor: ProjectFileDescriptor,
}

impl Project {
    /// Opens the manifest at `path` (a file or the directory holding it)
    pub fn open(path: &Path, options: ReadOptions) -> Result<Self> {
        Ok(Self {
            descriptor: read_project(path, options)?,
        })
    }

    /// Returns the manifest descriptor
    pub fn descriptor(&self) -> &ProjectFileDescriptor {
        &self.descriptor
    }

    /// Returns the directory holding the manifest
    pub fn root(&self) -> &Path {
        &self.descriptor.project_path
    }

    /// Creates a plugin named after the configured project
    ///
    /// The plugin gets its default module plus every other configured module,
    /// takes category and description from the config, and is linked into
    /// this project's manifest. Nothing is left behind if any step fails.
    pub fn add_plugin(
        &mut self,
        config: &AppConfig,
        templates: &Templates,
        enabled: bool,
    ) -> Result<PluginCreated> {
        let name = config.project.name.as_str();
        let mut plugin = create_plugin(&mut self.descriptor, name, enabled)?;
        plugin.category = config.project.category.clone();
        plugin.description = config.project.description.clone();

        for spec in config.modules() {
            if plugin.has_module(&spec.name) {
                continue;
            }
            if let Err(e) = create_module(&mut plugin, &spec.name) {
                self.descriptor.remove_plugin(name);
                return Err(e.into());
            }
        }
        for module in plugin.modules.iter_mut() {
            if let Some(spec) = config.module(&module.name) {
                apply_spec(module, spec);
            }
        }

        let writer = ProjectWriter::new(config, templates);
        let written = writer.write_plugin(&mut self.descriptor, &plugin)?;
        Ok(PluginCreated { plugin, written })
    }

    /// Adds every configured module to this manifest and writes their sources
    ///
    /// Fails without changes if any configured module already exists.
    pub fn add_modules(
        &mut self,
        config: &AppConfig,
        templates: &Templates,
    ) -> Result<Vec<PathBuf>> {
        let mut added = Vec::new();
        for spec in config.modules() {
            match create_module(&mut self.descriptor, &spec.name) {
                Ok(module) => {
                    apply_spec(module, spec);
                    added.push(spec.name.clone());
                }
                Err(e) => {
                    for name in &added {
                        self.descriptor.remove_module(name);
                    }
                    return Err(e.into());
                }
            }
        }

        let writer = ProjectWriter::new(config, templates);
        writer.write_new_modules(&mut self.descriptor, &added)
    }

    /// Lists manifest modules alongside whether `Source/<name>` exists
    pub fn module_status(&self) -> Result<Vec<ModuleStatus>> {
        let on_disk = read_module_dirs(&self.descriptor)?;
        Ok(self
            .descriptor
            .modules
            .iter()
            .map(|m| ModuleStatus {
                name: m.name.clone(),
                loading_phase: m.loading_phase.to_string(),
                module_type: m.module_type.to_string(),
                on_disk: on_disk.contains(&m.name),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FactoryError, LoadingPhase, ModuleType, PluginDescriptor};
    use crate::storage::reader::PluginReconcile;
    use std::fs;
    use tempfile::TempDir;

    const PLUGIN_CONFIG: &str = r#"
project:
  name: MyPlugin
  category: Tools
  description: Handy tools
modules:
  - name: MyPlugin
    loading_phase: PostEngineInit
  - name: MyPluginEditor
    type: Editor
"#;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game.uproject"), r#"{"FileVersion": 0}"#).unwrap();
        dir
    }

    fn keep() -> ReadOptions {
        ReadOptions {
            reconcile: PluginReconcile::Keep,
            ..ReadOptions::default()
        }
    }

    #[test]
    fn add_plugin_writes_everything() {
        let dir = setup();
        let config = AppConfig::from_yaml(PLUGIN_CONFIG).unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let created = project.add_plugin(&config, &templates, true).unwrap();

        let plugin = Project::open(&created.plugin.project_path, ReadOptions::default()).unwrap();
        let plugin = plugin.descriptor();
        assert!(plugin.is_plugin);
        assert_eq!(plugin.category, "Tools");
        assert_eq!(plugin.description, "Handy tools");
        let names: Vec<_> = plugin.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["MyPlugin", "MyPluginEditor"]);
        assert_eq!(plugin.modules[0].loading_phase, LoadingPhase::PostEngineInit);
        assert_eq!(plugin.modules[1].module_type, ModuleType::Editor);
        assert!(plugin.module_header("MyPluginEditor").is_file());

        let parent = Project::open(dir.path(), keep()).unwrap();
        assert_eq!(
            parent.descriptor().plugins,
            vec![PluginDescriptor::new("MyPlugin", true)]
        );
        assert!(created
            .written
            .contains(&project.root().join("Game.uproject")));
    }

    #[test]
    fn add_plugin_twice_fails() {
        let dir = setup();
        let config = AppConfig::from_yaml(PLUGIN_CONFIG).unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), keep()).unwrap();
        project.add_plugin(&config, &templates, true).unwrap();

        let err = project.add_plugin(&config, &templates, true).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FactoryError>(),
            Some(&FactoryError::DuplicatePlugin("MyPlugin".to_string()))
        );
    }

    #[test]
    fn add_plugin_twice_with_default_reconcile_fails() {
        let dir = setup();
        let config = AppConfig::from_yaml(PLUGIN_CONFIG).unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        project.add_plugin(&config, &templates, true).unwrap();
        let marker = project.descriptor().plugin_root("MyPlugin").join("marker");
        fs::write(&marker, "kept").unwrap();

        let mut reopened = Project::open(dir.path(), ReadOptions::default()).unwrap();
        assert!(reopened.descriptor().plugins.is_empty());
        let err = reopened.add_plugin(&config, &templates, true).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FactoryError>(),
            Some(&FactoryError::DuplicatePlugin("MyPlugin".to_string()))
        );
        assert_eq!(fs::read_to_string(&marker).unwrap(), "kept");
    }

    #[test]
    fn add_plugin_refuses_to_overwrite_unlisted_plugin() {
        let dir = setup();
        let root = dir.path().join("Plugins").join("MyPlugin");
        fs::create_dir_all(&root).unwrap();
        let manifest = root.join("MyPlugin.uplugin");
        fs::write(&manifest, r#"{"FriendlyName": "Hand written"}"#).unwrap();
        let config = AppConfig::from_yaml(PLUGIN_CONFIG).unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let err = project.add_plugin(&config, &templates, true).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::ManifestExists(path)) if path.ends_with("MyPlugin.uplugin")
        ));
        assert!(project.descriptor().plugins.is_empty());
        assert_eq!(
            fs::read_to_string(&manifest).unwrap(),
            r#"{"FriendlyName": "Hand written"}"#
        );
        assert!(!root.join("Source").exists());
    }

    #[test]
    fn add_modules_keeps_installed_plugin_references() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Game.uproject"),
            r#"{"Plugins": [{"Name": "Installed", "Enabled": true}]}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("Plugins").join("Installed")).unwrap();
        let config = AppConfig::from_yaml("project:\n  name: Game\nmodules:\n  - name: GameCore\n")
            .unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        assert!(project.descriptor().plugins.is_empty());
        project.add_modules(&config, &templates).unwrap();

        let reread = Project::open(dir.path(), keep()).unwrap();
        assert_eq!(
            reread.descriptor().plugins,
            vec![PluginDescriptor::new("Installed", true)]
        );
        assert_eq!(reread.descriptor().modules.len(), 1);
    }

    #[test]
    fn add_plugin_requires_config_entry_for_default_module() {
        let dir = setup();
        let config = AppConfig::from_yaml(
            "project:\n  name: Tools\nmodules:\n  - name: Other\n",
        )
        .unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let err = project.add_plugin(&config, &templates, true).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::ModuleNotConfigured(name)) if name == "Tools"
        ));
        assert!(project.descriptor().plugins.is_empty());
        assert!(!dir.path().join("Plugins").exists());
    }

    #[test]
    fn add_plugin_inside_plugin_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Host.uplugin"), "{}").unwrap();
        let config = AppConfig::from_yaml(PLUGIN_CONFIG).unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let err = project.add_plugin(&config, &templates, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FactoryError>(),
            Some(FactoryError::NestedPlugin(_))
        ));
    }

    #[test]
    fn add_modules_registers_and_generates() {
        let dir = setup();
        let config = AppConfig::from_yaml(
            "project:\n  name: Foo\nmodules:\n  - name: FooCore\n  - name: FooEditor\n    type: Editor\n",
        )
        .unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let written = project.add_modules(&config, &templates).unwrap();
        assert!(!written.is_empty());

        let reread = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let status = reread.module_status().unwrap();
        assert_eq!(status.len(), 2);
        assert!(status.iter().all(|s| s.on_disk));
        assert_eq!(status[1].module_type, "Editor");
    }

    #[test]
    fn add_modules_with_existing_module_changes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Foo.uproject"),
            r#"{"Modules": [{"Name": "FooEditor", "Type": "Editor", "LoadingPhase": "Default"}]}"#,
        )
        .unwrap();
        let config = AppConfig::from_yaml(
            "project:\n  name: Foo\nmodules:\n  - name: FooCore\n  - name: FooEditor\n",
        )
        .unwrap();
        let templates = Templates::new().unwrap();

        let mut project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let err = project.add_modules(&config, &templates).unwrap_err();

        assert_eq!(
            err.downcast_ref::<FactoryError>(),
            Some(&FactoryError::DuplicateModule("FooEditor".to_string()))
        );
        assert_eq!(project.descriptor().modules.len(), 1);
        assert!(!dir.path().join("Source").exists());
    }

    #[test]
    fn module_status_reports_missing_sources() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Foo.uproject"),
            r#"{"Modules": [{"Name": "Ghost"}]}"#,
        )
        .unwrap();

        let project = Project::open(dir.path(), ReadOptions::default()).unwrap();
        let status = project.module_status().unwrap();
        assert_eq!(status.len(), 1);
        assert!(!status[0].on_disk);
        assert_eq!(status[0].loading_phase, "Default");
    }
}
