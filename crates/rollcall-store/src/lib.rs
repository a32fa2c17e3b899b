//! # Rollcall Store
//!
//! Storage collaborators for the token core: durable attendance records
//! (with the `(session_id, holder_id)` uniqueness constraint that makes
//! redemption idempotent), check-in issuance metadata for the expiry
//! sweeper, and the roster eligibility read interface.
//!
//! Two interchangeable persistence backends (Postgres and SQLite)
//! implement the same traits, each bringing its own conflict-detection
//! semantics for the atomic insert. An in-memory backend serves tests and
//! single-process development.

mod error;
mod memory;
mod pg;
mod roster;
mod sqlite;
mod store;

pub use error::StoreError;
pub use memory::MemoryAttendanceStore;
pub use pg::PostgresAttendanceStore;
pub use roster::{PgRoster, Roster, SqliteRoster, StaticRoster};
pub use sqlite::SqliteAttendanceStore;
pub use store::{AttendanceStore, InsertOutcome};
