//! Domain models for module-tool
//!
//! Manifest descriptors and the factory that grows them, without any I/O.

mod descriptor;
mod factory;
mod kinds;

pub use descriptor::{
    is_valid_name, PluginDescriptor, ProjectFileDescriptor, ProjectModuleDescriptor,
    PLUGIN_EXTENSION, PROJECT_EXTENSION, TARGET_ENGINE_ASSOCIATION, TARGET_FILE_VERSION,
};
pub use factory::{create_module, create_plugin, FactoryError};
pub use kinds::{LoadingPhase, ModuleType};
