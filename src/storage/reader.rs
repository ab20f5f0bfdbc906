//! Locating and reading project manifests

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::project::ProjectError;
use crate::domain::{ProjectFileDescriptor, PLUGIN_EXTENSION, PROJECT_EXTENSION};

/// How plugin references are reconciled against `Plugins/` after reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginReconcile {
    /// Drop references whose plugin directory exists
    #[default]
    DropExisting,
    /// Drop references whose plugin directory is missing
    DropMissing,
    /// Leave the plugin list as written
    Keep,
}

/// Options for [`read_project`]
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub reconcile: PluginReconcile,

    /// Stamp the descriptor with the target format version after parsing
    pub stamp_version: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            reconcile: PluginReconcile::default(),
            stamp_version: true,
        }
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == PROJECT_EXTENSION || ext == PLUGIN_EXTENSION)
}

/// Finds the manifest in `dir`
///
/// Only immediate files are considered. Entries are visited in file name
/// order and the first `.uproject` or `.uplugin` wins, so `A.uplugin` is
/// picked over `A.uproject`.
pub fn find_project_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    files
        .into_iter()
        .find(|p| is_manifest(p))
        .ok_or_else(|| ProjectError::NotFound(dir.to_path_buf()).into())
}

/// Reads a manifest from a file, or from the manifest found in a directory
pub fn read_project(path: &Path, options: ReadOptions) -> Result<ProjectFileDescriptor> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to access project path: {}", path.display()))?;

    let manifest_path = if metadata.is_dir() {
        find_project_file(path)?
    } else {
        path.to_path_buf()
    };
    let manifest_path = fs::canonicalize(&manifest_path)
        .with_context(|| format!("Failed to resolve path: {}", manifest_path.display()))?;

    let project_path = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let file_name = manifest_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!(manifest = %manifest_path.display(), "reading project manifest");

    let bytes = fs::read(&manifest_path)
        .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
    let mut desc = ProjectFileDescriptor::from_manifest_slice(&bytes)
        .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;

    desc.set_location(&project_path, &file_name);
    if options.stamp_version {
        desc.touch();
    }

    reconcile_plugins(&mut desc, options.reconcile)?;

    Ok(desc)
}

/// Applies `policy` to the plugin references of `desc`
///
/// Dropped references are only hidden from [`ProjectFileDescriptor::plugins`];
/// they are still written back with the manifest.
pub fn reconcile_plugins(desc: &mut ProjectFileDescriptor, policy: PluginReconcile) -> Result<()> {
    if policy == PluginReconcile::Keep {
        return Ok(());
    }

    let on_disk = read_plugin_dirs(desc)?;
    let dropped = desc.hide_plugins(|plugin| {
        let exists = on_disk.contains(&plugin.name);
        match policy {
            PluginReconcile::DropExisting => !exists,
            PluginReconcile::DropMissing => exists,
            PluginReconcile::Keep => true,
        }
    });

    if dropped > 0 {
        debug!(dropped, ?policy, "reconciled plugin references");
    }
    Ok(())
}

/// Names of the immediate subdirectories of `dir`; empty if `dir` is missing
fn read_folder_names(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read directory: {}", dir.display()))
        }
    };

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        if entry.path().is_dir() {
            folders.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    folders.sort();
    Ok(folders)
}

/// Plugin directories present under `Plugins/`
pub fn read_plugin_dirs(desc: &ProjectFileDescriptor) -> Result<Vec<String>> {
    read_folder_names(&desc.plugins_dir())
}

/// Module directories present under `Source/`
pub fn read_module_dirs(desc: &ProjectFileDescriptor) -> Result<Vec<String>> {
    read_folder_names(&desc.sources())
}
