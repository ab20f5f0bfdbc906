//! Project and plugin manifest descriptors
//!
//! A `.uproject` and a `.uplugin` share one schema, modelled here as
//! [`ProjectFileDescriptor`]. Identity fields (where the manifest lives and
//! whether it belongs to a plugin) are never written to the file; the reader
//! fills them in from the file's location and extension.
//!
//! All path helpers are plain joins on the project directory and do no I/O.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kinds::{LoadingPhase, ModuleType};

/// File format version written by [`ProjectFileDescriptor::touch`]
pub const TARGET_FILE_VERSION: u32 = 3;

/// Engine association written by [`ProjectFileDescriptor::touch`]
pub const TARGET_ENGINE_ASSOCIATION: &str = "4.27";

/// Extension of project manifests
pub const PROJECT_EXTENSION: &str = "uproject";

/// Extension of plugin manifests
pub const PLUGIN_EXTENSION: &str = "uplugin";

/// Returns true if `name` can be used for a module, plugin or project
///
/// Names end up in directory names, file names and generated C++/C#
/// identifiers, so they must be non-empty and free of whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// One module entry of a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectModuleDescriptor {
    pub name: String,

    #[serde(default)]
    pub loading_phase: LoadingPhase,

    #[serde(rename = "Type", default)]
    pub module_type: ModuleType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_dependencies: Vec<String>,

    /// Fields this tool does not interpret, kept for the next write
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectModuleDescriptor {
    /// Creates a default-phase runtime module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loading_phase: LoadingPhase::Default,
            module_type: ModuleType::Runtime,
            additional_dependencies: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A reference from a parent manifest to a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginDescriptor {
    pub name: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_target_platforms: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
            supported_target_platforms: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A project or plugin manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectFileDescriptor {
    /// Directory containing the manifest
    #[serde(skip)]
    pub project_path: PathBuf,

    /// Manifest file name, including extension
    #[serde(skip)]
    pub file_name: String,

    /// Manifest file name without extension
    #[serde(skip)]
    pub project_name: String,

    /// Inferred from the extension, never persisted
    #[serde(skip)]
    pub is_plugin: bool,

    /// Plugin references hidden by [`Self::hide_plugins`], with their index
    /// in the list as read
    #[serde(skip)]
    hidden_plugins: Vec<(usize, PluginDescriptor)>,

    #[serde(default)]
    pub file_version: u32,

    #[serde(default)]
    pub engine_association: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ProjectModuleDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_platforms: Vec<String>,

    /// Top-level fields this tool does not interpret (`FriendlyName`,
    /// `VersionName`, ...), kept for the next write
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectFileDescriptor {
    /// Path of the manifest file itself
    pub fn manifest_path(&self) -> PathBuf {
        self.project_path.join(&self.file_name)
    }

    /// Root of all module sources
    pub fn sources(&self) -> PathBuf {
        self.project_path.join("Source")
    }

    /// Root of all plugins of this project
    pub fn plugins_dir(&self) -> PathBuf {
        self.project_path.join("Plugins")
    }

    /// Directory a plugin named `plugin` lives in
    pub fn plugin_root(&self, plugin: &str) -> PathBuf {
        self.plugins_dir().join(plugin)
    }

    pub fn module_sources(&self, module: &str) -> PathBuf {
        self.sources().join(module)
    }

    pub fn module_public(&self, module: &str) -> PathBuf {
        self.module_sources(module).join("Public")
    }

    pub fn module_private(&self, module: &str) -> PathBuf {
        self.module_sources(module).join("Private")
    }

    /// `Source/<module>/<module>.Build.cs`
    pub fn module_build_file(&self, module: &str) -> PathBuf {
        self.module_sources(module).join(format!("{}.Build.cs", module))
    }

    /// `Source/<module>/Public/<module>.h`
    pub fn module_header(&self, module: &str) -> PathBuf {
        self.module_public(module).join(format!("{}.h", module))
    }

    /// Stamps the format version and engine association this tool targets
    pub fn touch(&mut self) {
        // 4.27 descriptor format
        self.file_version = TARGET_FILE_VERSION;
        self.engine_association = TARGET_ENGINE_ASSOCIATION.to_string();
    }

    /// Sets the identity fields from a manifest location
    pub fn set_location(&mut self, project_path: &Path, file_name: &str) {
        let path = Path::new(file_name);
        self.project_path = project_path.to_path_buf();
        self.file_name = file_name.to_string();
        self.project_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.is_plugin = path
            .extension()
            .is_some_and(|ext| ext == PLUGIN_EXTENSION);
    }

    pub fn module(&self, name: &str) -> Option<&ProjectModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.module(name).is_some()
    }

    /// True if the manifest references `name`, hidden references included
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name == name)
            || self.hidden_plugins.iter().any(|(_, p)| p.name == name)
    }

    /// Moves every plugin reference for which `keep` is false out of
    /// [`Self::plugins`], returning how many were hidden
    ///
    /// Hidden references stay part of the manifest: they are written back
    /// unchanged, in their original position.
    pub fn hide_plugins(&mut self, mut keep: impl FnMut(&PluginDescriptor) -> bool) -> usize {
        let before = self.hidden_plugins.len();
        let mut visible = Vec::with_capacity(self.plugins.len());
        for plugin in std::mem::take(&mut self.plugins) {
            if keep(&plugin) {
                visible.push(plugin);
            } else {
                let index = visible.len() + self.hidden_plugins.len();
                self.hidden_plugins.push((index, plugin));
            }
        }
        self.plugins = visible;
        self.hidden_plugins.len() - before
    }

    /// The plugin list as it is written to disk: visible references with the
    /// hidden ones put back at their original index
    pub fn stored_plugins(&self) -> Vec<PluginDescriptor> {
        let mut plugins = self.plugins.clone();
        for (index, plugin) in &self.hidden_plugins {
            if plugins.iter().any(|p| p.name == plugin.name) {
                continue;
            }
            plugins.insert((*index).min(plugins.len()), plugin.clone());
        }
        plugins
    }

    /// Removes a module entry, returning it if it was present
    pub fn remove_module(&mut self, name: &str) -> Option<ProjectModuleDescriptor> {
        let index = self.modules.iter().position(|m| m.name == name)?;
        Some(self.modules.remove(index))
    }

    /// Removes a plugin reference, returning it if it was present
    pub fn remove_plugin(&mut self, name: &str) -> Option<PluginDescriptor> {
        let index = self.plugins.iter().position(|p| p.name == name)?;
        Some(self.plugins.remove(index))
    }

    /// Serializes the manifest body as tab-indented JSON with a trailing newline
    ///
    /// Hidden plugin references are included.
    pub fn to_manifest_bytes(&self) -> serde_json::Result<Vec<u8>> {
        if self.hidden_plugins.is_empty() {
            return manifest_bytes(self);
        }
        let mut stored = self.clone();
        stored.plugins = self.stored_plugins();
        stored.hidden_plugins.clear();
        manifest_bytes(&stored)
    }

    /// Parses a manifest body; identity fields are left empty
    pub fn from_manifest_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

fn manifest_bytes(desc: &ProjectFileDescriptor) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    desc.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> ProjectFileDescriptor {
        let mut desc = ProjectFileDescriptor::default();
        desc.set_location(Path::new("/work/Foo"), "Foo.uproject");
        desc
    }

    #[test]
    fn location_sets_identity() {
        let desc = sample();
        assert_eq!(desc.project_name, "Foo");
        assert_eq!(desc.file_name, "Foo.uproject");
        assert!(!desc.is_plugin);
        assert_eq!(desc.manifest_path(), PathBuf::from("/work/Foo/Foo.uproject"));

        let mut plugin = ProjectFileDescriptor::default();
        plugin.set_location(Path::new("/work/Foo/Plugins/Bar"), "Bar.uplugin");
        assert!(plugin.is_plugin);
        assert_eq!(plugin.project_name, "Bar");
    }

    #[test]
    fn module_paths() {
        let desc = sample();
        assert_eq!(desc.sources(), PathBuf::from("/work/Foo/Source"));
        assert_eq!(desc.module_private("Core"), PathBuf::from("/work/Foo/Source/Core/Private"));
        assert_eq!(
            desc.module_build_file("Core"),
            PathBuf::from("/work/Foo/Source/Core/Core.Build.cs")
        );
        assert_eq!(
            desc.module_header("Core"),
            PathBuf::from("/work/Foo/Source/Core/Public/Core.h")
        );
        assert_eq!(desc.plugin_root("Bar"), PathBuf::from("/work/Foo/Plugins/Bar"));
    }

    #[test]
    fn touch_stamps_target_version() {
        let mut desc = sample();
        desc.file_version = 1;
        desc.engine_association = "5.3".to_string();
        desc.touch();
        assert_eq!(desc.file_version, 3);
        assert_eq!(desc.engine_association, "4.27");
    }

    #[test]
    fn identity_is_not_serialized() {
        let mut desc = sample();
        desc.is_plugin = true;
        let json: Value = serde_json::from_slice(&desc.to_manifest_bytes().unwrap()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["EngineAssociation", "FileVersion"]);
    }

    #[test]
    fn manifest_uses_tabs_and_string_enums() {
        let mut desc = sample();
        desc.touch();
        desc.modules.push(ProjectModuleDescriptor::new("Core"));
        let text = String::from_utf8(desc.to_manifest_bytes().unwrap()).unwrap();

        assert!(text.contains("\n\t\"FileVersion\": 3"));
        assert!(text.contains("\"LoadingPhase\": \"Default\""));
        assert!(text.contains("\"Type\": \"Runtime\""));
        assert!(!text.contains("AdditionalDependencies"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let input = br#"{
            "FileVersion": 3,
            "EngineAssociation": "4.27",
            "FriendlyName": "Bar",
            "Modules": [{"Name": "Bar", "Type": "Developer", "LoadingPhase": "Default", "WhitelistPlatforms": ["Win64"]}]
        }"#;
        let desc = ProjectFileDescriptor::from_manifest_slice(input).unwrap();
        assert_eq!(desc.extra.get("FriendlyName"), Some(&Value::from("Bar")));
        assert_eq!(desc.modules[0].module_type, ModuleType::Other("Developer".to_string()));

        let again = ProjectFileDescriptor::from_manifest_slice(&desc.to_manifest_bytes().unwrap())
            .unwrap();
        assert_eq!(again, desc);
    }

    #[test]
    fn empty_manifest_parses() {
        let desc = ProjectFileDescriptor::from_manifest_slice(b"{}").unwrap();
        assert_eq!(desc.file_version, 0);
        assert!(desc.modules.is_empty());
    }

    #[test]
    fn remove_entries() {
        let mut desc = sample();
        desc.modules.push(ProjectModuleDescriptor::new("A"));
        desc.plugins.push(PluginDescriptor::new("P", true));

        assert_eq!(desc.remove_module("A").map(|m| m.name), Some("A".to_string()));
        assert!(desc.remove_module("A").is_none());
        assert!(desc.remove_plugin("P").is_some());
        assert!(!desc.has_plugin("P"));
    }

    fn plugin_names(plugins: &[PluginDescriptor]) -> Vec<&str> {
        plugins.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn hidden_plugins_are_still_written() {
        let mut desc = sample();
        for name in ["A", "B", "C", "D"] {
            desc.plugins.push(PluginDescriptor::new(name, true));
        }

        let hidden = desc.hide_plugins(|p| p.name == "B" || p.name == "D");
        assert_eq!(hidden, 2);
        assert_eq!(plugin_names(&desc.plugins), vec!["B", "D"]);
        assert!(desc.has_plugin("A"));

        desc.plugins.push(PluginDescriptor::new("E", false));
        assert_eq!(plugin_names(&desc.stored_plugins()), vec!["A", "B", "C", "D", "E"]);

        let written =
            ProjectFileDescriptor::from_manifest_slice(&desc.to_manifest_bytes().unwrap())
                .unwrap();
        assert_eq!(plugin_names(&written.plugins), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn removed_plugin_is_not_restored_from_hidden() {
        let mut desc = sample();
        desc.plugins.push(PluginDescriptor::new("A", true));
        desc.hide_plugins(|_| true);
        desc.remove_plugin("A");
        assert!(desc.stored_plugins().is_empty());
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("FooCore"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Foo Core"));
        assert!(!is_valid_name("Foo\tCore"));
    }

    proptest! {
        #[test]
        fn public_dir_is_under_module_sources(name in "[A-Za-z0-9_.-]{1,24}") {
            let desc = sample();
            prop_assert_eq!(desc.module_public(&name), desc.module_sources(&name).join("Public"));
            prop_assert_eq!(desc.module_private(&name), desc.module_sources(&name).join("Private"));
        }

        #[test]
        fn touch_is_idempotent(version in any::<u32>(), engine in "[0-9.]{0,8}") {
            let mut once = sample();
            once.file_version = version;
            once.engine_association = engine;
            once.touch();
            let mut twice = once.clone();
            twice.touch();
            prop_assert_eq!(once, twice);
        }
    }
}
