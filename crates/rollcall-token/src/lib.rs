//! # Rollcall Token
//!
//! Minting and verification for Rollcall bearer credentials:
//!
//! - **Session tokens**: signed identity claims with an explicit expiry,
//!   validated statelessly on every request.
//! - **Check-in tokens**: short-lived, signed presence credentials bound to
//!   a session context; valid for a fixed window from issuance.
//!
//! Both token kinds are signed with HMAC-SHA256 over their exact payload
//! bytes, keyed with a server-held secret. Verification is constant-time
//! and never panics; malformed input is an error value, not an exception.
//!
//! This crate is pure and CPU-bound: no I/O, no async, no shared mutable
//! state. Expiry checks take `now` as a parameter so callers (and tests)
//! control the clock.

mod checkin;
mod error;
mod session;
mod signer;

pub use checkin::{CheckinClaims, CheckinTokenService};
pub use error::TokenError;
pub use session::{SessionClaims, SessionTokenService};
pub use signer::Signer;
