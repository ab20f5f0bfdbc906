//! Module Tool - scaffolding for Unreal projects and plugins
//!
//! Reads a YAML config describing modules, registers them in a `.uproject`
//! or `.uplugin` manifest, and generates each module's `Build.cs` and public
//! header. All disk writes run through a rollback-capable operation stack.

pub mod cli;
pub mod domain;
pub mod render;
pub mod storage;

pub use domain::{
    LoadingPhase, ModuleType, PluginDescriptor, ProjectFileDescriptor, ProjectModuleDescriptor,
};
pub use render::Templates;
pub use storage::{AppConfig, Project};
