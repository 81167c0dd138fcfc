//! # peerlink-domain
//!
//! Pure domain model for peerlink rules.
//!
//! ## Responsibilities
//! - Foundational types: device names, states, error conventions, timestamps
//! - Define **State changes** (the record a rule reacts to)
//! - Define **Rule definitions** (synonym, exclusive, main-drives-all,
//!   timed auto-off, cascade, mutual group) and their invariants
//! - Define **Timeout specs** and their normalization to seconds
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! The host engine boundary is expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod event;
pub mod rule;
pub mod state;
