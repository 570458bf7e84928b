//! Local SQLite snapshot store.
//!
//! - Database initialization, pragmas and schema
//! - `Repository`, the SQLite implementation of `SnapshotStore`

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
