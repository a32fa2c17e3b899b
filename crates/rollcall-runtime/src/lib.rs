//! # Rollcall Runtime
//!
//! The protocol flows of the token core, composed from the leaf crates:
//!
//! - [`Authenticator`]: stateless session-token validation plus the
//!   revocation side-channel check, with an explicit policy for store
//!   unavailability.
//! - [`RedemptionCoordinator`]: turns a valid check-in token into at most
//!   one durable attendance record per `(session, holder)` pair.
//! - [`CheckinIssuer`]: mints check-in tokens and records issuance
//!   metadata for the sweeper.
//! - [`ExpirySweeper`]: periodic eviction of stale issuance metadata.
//!
//! All outbound calls (roster, storage, revocation) run under timeouts;
//! a timeout is a retryable infrastructure failure, never a validation
//! rejection.

mod auth;
mod error;
mod issuance;
mod redeem;
mod sweeper;

pub use auth::Authenticator;
pub use error::{AuthError, IssueError, RedeemError};
pub use issuance::{CheckinIssuer, IssuedCheckin};
pub use redeem::{RedemptionCoordinator, RedemptionOutcome};
pub use sweeper::ExpirySweeper;
