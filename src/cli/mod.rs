//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Plugin | Plugin scaffolding | `plugin create` |
//! | Module | Module scaffolding | `module create`, `module list` |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! module-tool --verbose module create --config module.yaml --project Game
//! ```
//!
//! `RUST_LOG` overrides the log filter when set.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod module_cmd;
mod output;
mod plugin_cmd;

pub use app::{run, Cli, Commands, Env, ReconcileMode};
pub use module_cmd::ModuleCommands;
pub use output::{Output, OutputFormat};
pub use plugin_cmd::PluginCommands;
