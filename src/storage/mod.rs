//! # Storage Layer
//!
//! Persistence layer for subway with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Stations, lines, sections | JSONL (one tagged record per line) | `.subway/network.jsonl` |
//! | Config | TOML | `.subway/config.toml` |
//! | Query cache | SQLite (auto-regenerated) | `.subway/.cache/subway.db` |
//!
//! ## Concurrency Safety
//!
//! - [`NetworkStore`] holds an exclusive `fs2` lock on `.subway/network.lock`
//!   for every read-modify-write cycle
//! - [`Cache`] uses mtime-based invalidation
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .subway/
//! ├── network.jsonl         # Stations, lines and sections
//! ├── network.lock          # Writer lock (ignored)
//! ├── config.toml           # Project configuration
//! ├── .cache/subway.db      # SQLite cache (ignored)
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a subway project
//! - [`Network`] - In-memory registry implementing the repository contract
//! - [`NetworkStore`] - Read/write the network as JSONL
//! - [`Config`] - Project and global configuration

mod cache;
mod config;
mod jsonl;
mod network;
mod project;

pub use cache::{Cache, CacheError, SearchResult, SearchResultType};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use jsonl::NetworkStore;
pub use network::{Network, Record};
pub use project::{Project, ProjectError};
