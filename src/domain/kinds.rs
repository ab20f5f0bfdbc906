//! Module loading phases and module types
//!
//! Both are stored in manifests and configs as their canonical string form.
//! Manifests written by other tools may carry values this crate does not know
//! about; those decode to `Other` and are written back untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// When during engine startup a module is loaded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoadingPhase {
    PreDefault,
    #[default]
    Default,
    PostEngineInit,
    /// A value not recognised by this tool, kept verbatim
    Other(String),
}

impl LoadingPhase {
    /// Returns all recognised loading phases
    pub fn all() -> &'static [LoadingPhase] {
        &[
            LoadingPhase::PreDefault,
            LoadingPhase::Default,
            LoadingPhase::PostEngineInit,
        ]
    }

    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        match self {
            LoadingPhase::PreDefault => "PreDefault",
            LoadingPhase::Default => "Default",
            LoadingPhase::PostEngineInit => "PostEngineInit",
            LoadingPhase::Other(s) => s,
        }
    }

    /// Returns false for values decoded into `Other`
    pub fn is_known(&self) -> bool {
        !matches!(self, LoadingPhase::Other(_))
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LoadingPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PreDefault" => LoadingPhase::PreDefault,
            "Default" => LoadingPhase::Default,
            "PostEngineInit" => LoadingPhase::PostEngineInit,
            _ => LoadingPhase::Other(value),
        }
    }
}

impl From<LoadingPhase> for String {
    fn from(phase: LoadingPhase) -> Self {
        match phase {
            LoadingPhase::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Which targets a module is built for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleType {
    #[default]
    Runtime,
    Editor,
    UncookedOnly,
    /// A value not recognised by this tool, kept verbatim
    Other(String),
}

impl ModuleType {
    /// Returns all recognised module types
    pub fn all() -> &'static [ModuleType] {
        &[ModuleType::Runtime, ModuleType::Editor, ModuleType::UncookedOnly]
    }

    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        match self {
            ModuleType::Runtime => "Runtime",
            ModuleType::Editor => "Editor",
            ModuleType::UncookedOnly => "UncookedOnly",
            ModuleType::Other(s) => s,
        }
    }

    /// Returns false for values decoded into `Other`
    pub fn is_known(&self) -> bool {
        !matches!(self, ModuleType::Other(_))
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ModuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Runtime" => ModuleType::Runtime,
            "Editor" => ModuleType::Editor,
            "UncookedOnly" => ModuleType::UncookedOnly,
            _ => ModuleType::Other(value),
        }
    }
}

impl From<ModuleType> for String {
    fn from(kind: ModuleType) -> Self {
        match kind {
            ModuleType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}
