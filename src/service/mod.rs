//! # Service Layer
//!
//! Orchestrates the domain against a [`NetworkRepository`]: resolves
//! station and line IDs, asks the line aggregate to accept or reject a
//! section change, then persists the outcome.
//!
//! ## Transactions
//!
//! Chain mutations read the whole chain before writing, so each call must
//! run under a single writer. [`transaction`] gives in-memory repositories
//! all-or-nothing semantics; the file store does the same under an
//! exclusive lock (see `storage::NetworkStore::transaction`).

mod dto;
mod error;
mod line_service;
mod repository;

pub use dto::{
    ChangeResponse, LineRequest, LineResponse, SectionRequest, SectionResponse, StationResponse,
};
pub use error::ServiceError;
pub use line_service::LineService;
pub use repository::NetworkRepository;

/// Runs `f` against a copy of `repo`, committing the copy only on success
pub fn transaction<R, T, E, F>(repo: &mut R, f: F) -> Result<T, E>
where
    R: NetworkRepository + Clone,
    F: FnOnce(&mut R) -> Result<T, E>,
{
    let mut working = repo.clone();
    let value = f(&mut working)?;
    *repo = working;
    Ok(value)
}
