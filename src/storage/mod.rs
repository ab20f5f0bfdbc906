//! # Storage Layer
//!
//! Reading configs and manifests, and writing everything back to disk.
//!
//! ## File Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | YAML | passed with `--config` |
//! | Project manifest | JSON | `<Project>/<Name>.uproject` |
//! | Plugin manifest | JSON | `<Project>/Plugins/<Name>/<Name>.uplugin` |
//! | Module sources | C#, C++ | `<Project>/Source/<Module>/` |
//!
//! ## Write Safety
//!
//! Every write goes through an [`OperationStack`]: steps are planned up
//! front, applied in order, and on the first failure every completed step is
//! undone. Files are replaced via temp file + rename.
//!
//! ## Project Layout
//!
//! ```text
//! Game/
//! ├── Game.uproject
//! ├── Source/
//! │   └── GameCore/
//! │       ├── GameCore.Build.cs
//! │       ├── Public/GameCore.h
//! │       └── Private/
//! └── Plugins/
//!     └── MyPlugin/
//!         ├── MyPlugin.uplugin
//!         └── Source/MyPlugin/...
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for the create flows
//! - [`AppConfig`] - Validated YAML configuration
//! - [`ProjectWriter`] - Plans and runs writes

mod config;
mod operations;
mod project;
mod reader;
mod writer;

pub use config::{
    AppConfig, ConfigError, CopyrightConfig, Dependencies, ModuleSpec, ProjectSection,
};
pub use operations::{Operation, OperationStack, PreviousContent};
pub use project::{ModuleStatus, PluginCreated, Project, ProjectError};
pub use reader::{
    find_project_file, read_module_dirs, read_plugin_dirs, read_project, reconcile_plugins,
    PluginReconcile, ReadOptions,
};
pub use writer::ProjectWriter;
