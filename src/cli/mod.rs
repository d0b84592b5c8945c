//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init` |
//! | Station | Station registry | `station add`, `station list`, `station remove` |
//! | Line | Line lifecycle | `line create`, `line show`, `line update` |
//! | Section | Chain edits | `section add`, `section remove`, `section list` |
//! | Query | Cached lookups | `search`, `cache status` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr:
//! ```bash
//! subway --verbose section add ln-1 --up st-1 --down st-4 --distance 3
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod cache_cmd;
mod line;
mod output;
mod section;
mod station;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
