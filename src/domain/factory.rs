//! In-memory construction of modules and plugins
//!
//! Nothing here touches the filesystem. The writer in `storage` persists
//! whatever these functions produce.

use thiserror::Error;

use super::descriptor::{
    is_valid_name, PluginDescriptor, ProjectFileDescriptor, ProjectModuleDescriptor,
    PLUGIN_EXTENSION,
};

#[derive(Debug, Error, PartialEq)]
pub enum FactoryError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Invalid name '{0}': names must not contain whitespace")]
    InvalidName(String),

    #[error("Module '{0}' is already part of the project")]
    DuplicateModule(String),

    #[error("Plugin '{0}' is already part of the project")]
    DuplicatePlugin(String),

    #[error("Cannot create plugin '{0}' inside another plugin")]
    NestedPlugin(String),
}

fn check_name(name: &str) -> Result<(), FactoryError> {
    if name.is_empty() {
        return Err(FactoryError::EmptyName);
    }
    if !is_valid_name(name) {
        return Err(FactoryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Appends a default-phase runtime module named `name` to `project`
///
/// Returns a reference to the new entry. The module list is left untouched
/// on error.
pub fn create_module<'a>(
    project: &'a mut ProjectFileDescriptor,
    name: &str,
) -> Result<&'a mut ProjectModuleDescriptor, FactoryError> {
    check_name(name)?;
    if project.has_module(name) {
        return Err(FactoryError::DuplicateModule(name.to_string()));
    }

    project.modules.push(ProjectModuleDescriptor::new(name));
    let index = project.modules.len() - 1;
    Ok(&mut project.modules[index])
}

/// Creates the manifest of a new plugin and links it into `project`
///
/// The plugin lives in `Plugins/<name>/<name>.uplugin`, inherits the parent's
/// file version and engine association, and starts with one module named
/// after itself. The parent only gains its plugin reference once the plugin
/// descriptor is complete.
pub fn create_plugin(
    project: &mut ProjectFileDescriptor,
    name: &str,
    enabled: bool,
) -> Result<ProjectFileDescriptor, FactoryError> {
    if project.is_plugin {
        return Err(FactoryError::NestedPlugin(name.to_string()));
    }
    check_name(name)?;
    if project.has_plugin(name) {
        return Err(FactoryError::DuplicatePlugin(name.to_string()));
    }

    let mut plugin = ProjectFileDescriptor::default();
    plugin.file_version = project.file_version;
    plugin.engine_association = project.engine_association.clone();
    plugin.set_location(
        &project.plugin_root(name),
        &format!("{}.{}", name, PLUGIN_EXTENSION),
    );

    create_module(&mut plugin, name)?;

    project.plugins.push(PluginDescriptor::new(name, enabled));
    Ok(plugin)
}
