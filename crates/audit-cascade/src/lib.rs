//! Audit Cascade - dependent selection chains
//!
//! A chain of levels `L0..Ln` where the options of level `k` are computed
//! from the committed values of `L0..Lk-1`:
//! - Committing a value at level `k` synchronously invalidates `k+1..n`
//! - Every fetch carries a per-level sequence number; responses whose
//!   number is no longer the latest issued for that level are dropped
//! - Options are always deduplicated and sorted, whatever the provider
//!   returns
//! - A failed fetch leaves the level's options and every ancestor intact
//!
//! The synchronous half (`commit` → `FetchTicket`, `apply`) can be driven by
//! an event loop that resolves tickets in any order; `select` and
//! `initialize` are the awaited convenience wrappers.

#![warn(unreachable_pub)]

pub mod chain;
pub mod error;
pub mod provider;

pub use chain::{ApplyOutcome, CascadeChain, FetchTicket, LevelSpec, OptionsRequest, SelectionLevel};
pub use error::{ChainError, FetchError};
pub use provider::{fetch_with_timeout, OptionsProvider, StoreOptionsProvider};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
