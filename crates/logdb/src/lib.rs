//! Embedded, append-only, log-structured entity store with secondary
//! indexes, online compaction, and a self-describing textual log format.
//!
//! Callers implement [`Entity`] for their domain types and talk to a single
//! [`Store`] instance; see `domain` in this workspace for a concrete
//! example over users, courses, lessons, enrolments, and homework.

mod directory;
mod entity;
mod error;
mod id;
mod index;
mod log;
mod parser;
mod store;

pub use entity::{Entity, Indexer};
pub use error::Error;
pub use id::Id;
pub use store::Store;
