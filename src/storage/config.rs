//! YAML configuration describing the project and its modules
//!
//! ```yaml
//! project:
//!   name: MyPlugin
//!   copyright:
//!     text: Copyright Example Studio
//!     use_unreal: false
//!   category: Gameplay
//!   description: Gameplay helpers
//! modules:
//!   - name: MyPlugin
//!     loading_phase: Default
//!     type: Runtime
//!     dependencies:
//!       public: [Core]
//!       private: [CoreUObject, Engine]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{is_valid_name, LoadingPhase, ModuleType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Copyright notice placed at the top of generated files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyrightConfig {
    pub text: String,

    /// Use the engine's default notice instead of `text`
    pub use_unreal: bool,
}

/// Project (or plugin) metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub name: String,
    pub copyright: CopyrightConfig,
    pub category: String,
    pub description: String,
}

/// Module dependency names, split by visibility
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    pub public: Vec<String>,
    pub private: Vec<String>,
}

/// One module to generate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    pub name: String,
    pub loading_phase: LoadingPhase,

    #[serde(rename = "type")]
    pub module_type: ModuleType,

    pub dependencies: Dependencies,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    project: ProjectSection,

    #[serde(default)]
    modules: Vec<ModuleSpec>,
}

/// Validated configuration with modules indexed by name
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project: ProjectSection,
    modules: Vec<ModuleSpec>,
    index: HashMap<String, usize>,
}

impl AppConfig {
    /// Reads and validates a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates configuration text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(Self::new(raw.project, raw.modules)?)
    }

    /// Builds a configuration from parts, applying the same validation as
    /// [`AppConfig::from_yaml`]
    pub fn new(project: ProjectSection, modules: Vec<ModuleSpec>) -> Result<Self, ConfigError> {
        if !is_valid_name(&project.name) {
            return Err(ConfigError::Invalid(format!(
                "invalid project name: {:?}",
                project.name
            )));
        }
        if modules.is_empty() {
            return Err(ConfigError::Invalid(
                "want at least 1 module, but 0 were defined".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(modules.len());
        for (i, module) in modules.iter().enumerate() {
            if !is_valid_name(&module.name) {
                return Err(ConfigError::Invalid(format!(
                    "invalid module name: {:?}",
                    module.name
                )));
            }
            if !module.loading_phase.is_known() {
                return Err(ConfigError::Invalid(format!(
                    "module {}: unknown loading_phase {:?} (expected one of {})",
                    module.name,
                    module.loading_phase.as_str(),
                    join(LoadingPhase::all())
                )));
            }
            if !module.module_type.is_known() {
                return Err(ConfigError::Invalid(format!(
                    "module {}: unknown type {:?} (expected one of {})",
                    module.name,
                    module.module_type.as_str(),
                    join(ModuleType::all())
                )));
            }
            let deps = &module.dependencies;
            let bad_dep = deps.public.iter().chain(&deps.private).find(|d| !is_identifier(d));
            if let Some(dep) = bad_dep {
                return Err(ConfigError::Invalid(format!(
                    "module {}: invalid dependency name {:?} (letters, digits and '_' only)",
                    module.name, dep
                )));
            }
            if index.insert(module.name.clone(), i).is_some() {
                return Err(ConfigError::Invalid(format!(
                    "module {} is defined more than once",
                    module.name
                )));
            }
        }

        Ok(Self {
            project,
            modules,
            index,
        })
    }

    /// Modules in declaration order
    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }

    /// Looks up a module by exact name
    pub fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.index.get(name).map(|&i| &self.modules[i])
    }

    /// Copyright text for generated files; empty means "use the default"
    pub fn copyright(&self) -> &str {
        if self.project.copyright.use_unreal {
            ""
        } else {
            &self.project.copyright.text
        }
    }
}

/// Dependency names end up inside C# string literals
fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
