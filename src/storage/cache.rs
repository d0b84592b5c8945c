//! SQLite cache for fast queries
//!
//! The cache sits in `.subway/.cache/subway.db` and mirrors data from the
//! source-of-truth file (`network.jsonl`). Cache invalidation is based on
//! the file's modification time.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

use super::network::Network;
use crate::service::NetworkRepository;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache not found at {0}")]
    NotFound(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// SQLite cache for fast queries
pub struct Cache {
    /// Path to the SQLite database
    db_path: PathBuf,

    /// Path to network.jsonl (for mtime comparison)
    network_path: PathBuf,

    /// Database connection
    conn: Connection,
}

impl Cache {
    /// Schema version - bump when schema changes to force rebuild
    const SCHEMA_VERSION: i32 = 1;

    /// Creates or opens the cache for a project
    pub fn open(project_root: &Path) -> Result<Self> {
        let subway_dir = project_root.join(".subway");
        let cache_dir = subway_dir.join(".cache");
        let db_path = cache_dir.join("subway.db");
        let network_path = subway_dir.join("network.jsonl");

        fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open cache database: {}", db_path.display()))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut cache = Self {
            db_path,
            network_path,
            conn,
        };

        cache.ensure_schema()?;

        Ok(cache)
    }

    /// Opens an existing cache without creating it
    pub fn open_existing(project_root: &Path) -> Result<Self> {
        let db_path = project_root
            .join(".subway")
            .join(".cache")
            .join("subway.db");
        if !db_path.exists() {
            return Err(CacheError::NotFound(db_path).into());
        }
        Self::open(project_root)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        let current_version = self.get_schema_version()?;

        if current_version != Self::SCHEMA_VERSION {
            debug!(from = current_version, to = Self::SCHEMA_VERSION, "Recreating cache schema");
            self.create_schema()?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<i32> {
        let result: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?;

        Ok(result.unwrap_or(0))
    }

    /// Creates the schema from scratch
    fn create_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            DROP TABLE IF EXISTS sections;
            DROP TABLE IF EXISTS lines;
            DROP TABLE IF EXISTS stations;
            DROP TABLE IF EXISTS stations_fts;
            DROP TABLE IF EXISTS lines_fts;
            DROP TABLE IF EXISTS cache_meta;
            ",
        )?;

        self.conn.execute_batch(
            "
            CREATE TABLE stations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                modified_at TEXT NOT NULL
            );

            CREATE TABLE lines (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                color TEXT NOT NULL,
                first_station TEXT,
                last_station TEXT,
                total_distance INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                modified_at TEXT NOT NULL
            );

            CREATE TABLE sections (
                id TEXT PRIMARY KEY,
                line_id TEXT NOT NULL,
                up_station TEXT NOT NULL,
                down_station TEXT NOT NULL,
                distance INTEGER NOT NULL
            );

            CREATE TABLE cache_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX idx_sections_line ON sections(line_id);
            CREATE INDEX idx_sections_up ON sections(up_station);
            CREATE INDEX idx_sections_down ON sections(down_station);

            -- Full-text search
            CREATE VIRTUAL TABLE stations_fts USING fts5(id, name);
            CREATE VIRTUAL TABLE lines_fts USING fts5(id, name, color);
            ",
        )?;

        self.conn.execute(
            &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
            [],
        )?;

        Ok(())
    }

    /// Checks if the cache needs to be rebuilt
    pub fn is_stale(&self) -> Result<bool> {
        let Some(cache_mtime) = self.get_cache_mtime()? else {
            return Ok(true);
        };

        if self.network_path.exists() {
            let network_mtime = fs::metadata(&self.network_path)?.modified()?;
            if network_mtime > cache_mtime {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Time of the last rebuild, if any
    fn get_cache_mtime(&self) -> Result<Option<SystemTime>> {
        let nanos: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache_meta WHERE key = 'last_rebuild'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(nanos
            .and_then(|s| s.parse::<u64>().ok())
            .map(|n| SystemTime::UNIX_EPOCH + Duration::from_nanos(n)))
    }

    fn update_cache_mtime(&self) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?
            .as_nanos();

        self.conn.execute(
            "INSERT OR REPLACE INTO cache_meta (key, value) VALUES ('last_rebuild', ?1)",
            params![now.to_string()],
        )?;

        Ok(())
    }

    /// Rebuilds the cache from the network
    pub fn rebuild(&mut self, network: &Network) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM sections", [])?;
        tx.execute("DELETE FROM lines", [])?;
        tx.execute("DELETE FROM stations", [])?;
        tx.execute("DELETE FROM stations_fts", [])?;
        tx.execute("DELETE FROM lines_fts", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO stations (id, name, created_at, modified_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut fts = tx.prepare("INSERT INTO stations_fts (id, name) VALUES (?1, ?2)")?;

            for station in network.all_stations() {
                stmt.execute(params![
                    station.id.to_string(),
                    station.name,
                    station.audit.created_at.to_rfc3339(),
                    station.audit.modified_at.to_rfc3339(),
                ])?;
                fts.execute(params![station.id.to_string(), station.name])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO lines (id, name, color, first_station, last_station, total_distance, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut fts =
                tx.prepare("INSERT INTO lines_fts (id, name, color) VALUES (?1, ?2, ?3)")?;

            for line in network.all_lines()? {
                let sections = line.sections();
                stmt.execute(params![
                    line.id.to_string(),
                    line.name,
                    line.color,
                    sections.first_station().map(|s| s.to_string()),
                    sections.last_station().map(|s| s.to_string()),
                    i64::try_from(sections.total_distance()).unwrap_or(i64::MAX),
                    line.audit.created_at.to_rfc3339(),
                    line.audit.modified_at.to_rfc3339(),
                ])?;
                fts.execute(params![line.id.to_string(), line.name, line.color])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sections (id, line_id, up_station, down_station, distance)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for section in network.all_sections() {
                stmt.execute(params![
                    section.id().map(|id| id.to_string()),
                    section.line().map(|id| id.to_string()),
                    section.up_station().to_string(),
                    section.down_station().to_string(),
                    section.distance(),
                ])?;
            }
        }

        tx.commit()?;

        self.update_cache_mtime()?;
        debug!(path = %self.db_path.display(), "Cache rebuilt");

        Ok(())
    }

    /// Query: (stations, lines, sections) counts
    pub fn counts(&self) -> Result<(usize, usize, usize)> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
            Ok(n as usize)
        };

        Ok((count("stations")?, count("lines")?, count("sections")?))
    }

    /// Query: IDs of lines that serve a station
    pub fn lines_serving(&self, station_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT line_id FROM sections
             WHERE up_station = ?1 OR down_station = ?1
             ORDER BY line_id",
        )?;
        let ids: Vec<String> = stmt
            .query_map(params![station_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// Query: Full-text search across stations and lines
    ///
    /// The query is matched as a literal phrase, so hyphens, quotes and
    /// IDs like `st-1` are not read as FTS5 operators.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let mut results = Vec::new();
        if query.trim().is_empty() {
            return Ok(results);
        }
        let phrase = fts_phrase(query);

        {
            let mut stmt = self.conn.prepare(
                "SELECT id, name FROM stations_fts WHERE stations_fts MATCH ?1
                 ORDER BY rank LIMIT 50",
            )?;

            let rows = stmt.query_map(params![phrase], |row| {
                Ok(SearchResult {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    detail: None,
                    result_type: SearchResultType::Station,
                })
            })?;

            for row in rows {
                results.push(row?);
            }
        }

        {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, color FROM lines_fts WHERE lines_fts MATCH ?1
                 ORDER BY rank LIMIT 50",
            )?;

            let rows = stmt.query_map(params![phrase], |row| {
                Ok(SearchResult {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    detail: row.get(2)?,
                    result_type: SearchResultType::Line,
                })
            })?;

            for row in rows {
                results.push(row?);
            }
        }

        Ok(results)
    }

    /// Returns the path to the cache database
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

/// Quotes user input as a single FTS5 phrase
fn fts_phrase(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

/// Result from a search query
#[derive(Debug)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    /// Line color; none for stations
    pub detail: Option<String>,
    pub result_type: SearchResultType,
}

/// Type of search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResultType {
    Station,
    Line,
}

impl SearchResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchResultType::Station => "station",
            SearchResultType::Line => "line",
        }
    }
}
