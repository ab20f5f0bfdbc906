//! Reversible filesystem steps
//!
//! Every mutation the writer makes is an [`Operation`] pushed onto an
//! [`OperationStack`]. Each operation captures what it needs to reverse
//! itself while applying: the top-most directory it had to create, or the
//! bytes a file held before it was overwritten.
//!
//! The stack records the index of every operation that completed. Rolling
//! back undoes exactly those, newest first, so an operation that failed or
//! never ran is never "undone".

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::project::ProjectError;

/// What a file looked like before it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousContent {
    Absent,
    Bytes(Vec<u8>),
}

/// A single reversible filesystem step
#[derive(Debug)]
pub enum Operation {
    /// Create a directory and any missing parents
    CreateDir {
        path: PathBuf,
        /// Top-most directory created by this step, set once applied
        created: Option<PathBuf>,
    },

    /// Replace a file's contents (via temp file and rename)
    WriteFile {
        path: PathBuf,
        contents: Vec<u8>,
        /// Content before the write, set once applied
        previous: Option<PreviousContent>,
    },
}

impl Operation {
    pub fn create_dir(path: impl Into<PathBuf>) -> Self {
        Operation::CreateDir {
            path: path.into(),
            created: None,
        }
    }

    pub fn write_file(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Operation::WriteFile {
            path: path.into(),
            contents: contents.into(),
            previous: None,
        }
    }

    /// The path this operation acts on
    pub fn path(&self) -> &Path {
        match self {
            Operation::CreateDir { path, .. } | Operation::WriteFile { path, .. } => path,
        }
    }

    /// Applies the step
    pub fn apply(&mut self) -> Result<()> {
        match self {
            Operation::CreateDir { path, created } => {
                let missing = first_missing_ancestor(path);
                fs::create_dir_all(&*path)
                    .with_context(|| format!("Failed to create directory: {}", path.display()))?;
                *created = missing;
            }
            Operation::WriteFile {
                path,
                contents,
                previous,
            } => {
                let before = match fs::read(&*path) {
                    Ok(bytes) => PreviousContent::Bytes(bytes),
                    Err(e) if e.kind() == ErrorKind::NotFound => PreviousContent::Absent,
                    Err(e) => {
                        return Err(e)
                            .with_context(|| format!("Failed to read file: {}", path.display()))
                    }
                };
                write_atomic(path, contents)?;
                *previous = Some(before);
            }
        }
        debug!(op = %self, "applied");
        Ok(())
    }

    /// Reverses an applied step; a step that was never applied is left alone
    ///
    /// Failures are logged, not returned: rollback keeps going so as much as
    /// possible is restored.
    pub fn undo(&mut self) {
        match self {
            Operation::CreateDir { created, .. } => {
                if let Some(root) = created.take() {
                    if let Err(e) = fs::remove_dir_all(&root) {
                        warn!(path = %root.display(), error = %e, "failed to remove directory");
                    }
                }
            }
            Operation::WriteFile { path, previous, .. } => match previous.take() {
                Some(PreviousContent::Absent) => {
                    if let Err(e) = fs::remove_file(&*path) {
                        warn!(path = %path.display(), error = %e, "failed to remove file");
                    }
                }
                Some(PreviousContent::Bytes(bytes)) => {
                    if let Err(e) = fs::write(&*path, bytes) {
                        warn!(path = %path.display(), error = %e, "failed to restore file");
                    }
                }
                None => {}
            },
        }
        debug!(op = %self, "undone");
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateDir { path, .. } => write!(f, "create directory {}", path.display()),
            Operation::WriteFile { path, .. } => write!(f, "write file {}", path.display()),
        }
    }
}

/// Returns the top-most ancestor of `path` (itself included) that does not exist
fn first_missing_ancestor(path: &Path) -> Option<PathBuf> {
    let mut missing = None;
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() || ancestor.exists() {
            break;
        }
        missing = Some(ancestor.to_path_buf());
    }
    missing
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{}.tmp", file_name));

    if let Err(e) = fs::write(&temp_path, contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(e)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()));
    }

    // Atomic rename
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        });
    }
    Ok(())
}

/// Ordered list of operations applied as a unit
#[derive(Debug, Default)]
pub struct OperationStack {
    ops: Vec<Operation>,
    committed: Vec<usize>,
    failed_at: Option<usize>,
}

impl OperationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations that have been applied and not rolled back
    pub fn committed(&self) -> impl Iterator<Item = &Operation> {
        self.committed.iter().map(|&i| &self.ops[i])
    }

    /// Index of the operation that failed in the last run
    pub fn failed_at(&self) -> Option<usize> {
        self.failed_at
    }

    /// Applies pending operations in order, stopping at the first failure
    ///
    /// A stack that failed must be rolled back before it can run again.
    pub fn run(&mut self) -> Result<()> {
        if let Some(index) = self.failed_at {
            return Err(ProjectError::AlreadyFailed(index).into());
        }

        for index in 0..self.ops.len() {
            if self.committed.contains(&index) {
                continue;
            }
            if let Err(e) = self.ops[index].apply() {
                self.failed_at = Some(index);
                return Err(e);
            }
            self.committed.push(index);
        }
        Ok(())
    }

    /// Undoes every committed operation, newest first
    pub fn rollback(&mut self) {
        if !self.committed.is_empty() {
            debug!(count = self.committed.len(), "rolling back");
        }
        while let Some(index) = self.committed.pop() {
            self.ops[index].undo();
        }
        self.failed_at = None;
    }

    /// Runs the stack, rolling back before returning the first error
    pub fn try_run(&mut self) -> Result<()> {
        if let Err(e) = self.run() {
            self.rollback();
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_applies_in_order() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let file = nested.join("f.txt");

        let mut stack = OperationStack::new();
        stack.push(Operation::create_dir(&nested));
        stack.push(Operation::write_file(&file, "hello"));
        stack.run().unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "hello");
        assert_eq!(stack.committed().count(), 2);
        assert!(!nested.join("f.txt.tmp").exists());
    }

    #[test]
    fn failure_stops_and_rollback_restores() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("existing.txt");
        fs::write(&existing, "before").unwrap();
        let created = dir.path().join("new").join("deep");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let never = dir.path().join("never.txt");

        let mut stack = OperationStack::new();
        stack.push(Operation::create_dir(&created));
        stack.push(Operation::write_file(&existing, "after"));
        stack.push(Operation::create_dir(blocker.join("sub")));
        stack.push(Operation::write_file(&never, "x"));

        assert!(stack.run().is_err());
        assert_eq!(stack.failed_at(), Some(2));
        assert_eq!(stack.committed().count(), 2);
        assert!(!never.exists());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "after");

        stack.rollback();
        assert!(!dir.path().join("new").exists());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "before");
        assert!(blocker.is_file());
        assert_eq!(stack.committed().count(), 0);
        assert_eq!(stack.failed_at(), None);
    }

    #[test]
    fn failed_stack_refuses_to_rerun() {
        let dir = TempDir::new().unwrap();
        let mut stack = OperationStack::new();
        stack.push(Operation::write_file(dir.path().join("missing").join("f"), "x"));

        assert!(stack.run().is_err());
        let err = stack.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::AlreadyFailed(0))
        ));
    }

    #[test]
    fn try_run_rolls_back_and_returns_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("written.txt");

        let mut stack = OperationStack::new();
        stack.push(Operation::write_file(&file, "x"));
        stack.push(Operation::write_file(dir.path().join("missing").join("f"), "y"));

        let err = stack.try_run().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write temp file"));
        assert!(!file.exists());
        assert_eq!(stack.failed_at(), None);
    }

    #[test]
    fn existing_directory_is_not_removed() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("keep");
        fs::create_dir(&existing).unwrap();

        let mut op = Operation::create_dir(&existing);
        op.apply().unwrap();
        op.undo();
        assert!(existing.is_dir());
    }

    #[test]
    fn created_directory_removes_top_most_new_ancestor() {
        let dir = TempDir::new().unwrap();
        let mut op = Operation::create_dir(dir.path().join("x").join("y").join("z"));
        op.apply().unwrap();
        assert!(dir.path().join("x/y/z").is_dir());

        op.undo();
        assert!(!dir.path().join("x").exists());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn undo_without_apply_is_noop() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "keep").unwrap();

        let mut op = Operation::write_file(&file, "new");
        op.undo();
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep");
    }

    #[test]
    fn undo_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");

        let mut op = Operation::write_file(&file, "new");
        op.apply().unwrap();
        op.undo();
        op.undo();
        assert!(!file.exists());
    }

    #[test]
    fn successful_run_is_not_repeated() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");

        let mut stack = OperationStack::new();
        stack.push(Operation::write_file(&file, "first"));
        stack.run().unwrap();
        fs::write(&file, "edited").unwrap();
        stack.run().unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "edited");
    }
}
