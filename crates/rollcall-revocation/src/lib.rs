//! # Rollcall Revocation
//!
//! A shared, TTL-capable key-value side-channel recording session tokens
//! invalidated before their natural expiry (logout). Validation stays
//! stateless; the hot path adds one existence check against this store.
//!
//! Records are keyed by a token fingerprint and expire on their own via the
//! store's TTL mechanism, with a configured retention floor so a revoked
//! token can never outlive its record.

mod error;
mod kv;
mod store;

pub use error::RevocationError;
pub use kv::{MemoryTtlStore, RedisTtlStore, TtlStore};
pub use store::{RevocationRecord, RevocationStore};
