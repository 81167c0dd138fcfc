//! # peerlink-app
//!
//! Application layer: rule factories and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **host port** the rules talk through:
//!   - `Host`: device and group lookup, log sink
//!   - `Peer`: live state, writes, scheduled changes
//! - Resolve peer names and propagate states (`peers`)
//! - Build rule descriptors, one factory per rule family (`rules`)
//! - Dispatch state changes to subscribed rules (`rule_engine`)
//! - Provide **in-process infrastructure** (change bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `peerlink-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod peers;
pub mod ports;
pub mod rule_engine;
pub mod rules;

#[cfg(test)]
mod testing;
