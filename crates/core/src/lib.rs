//! Alice Grocer Core - Shared domain types.
//!
//! This crate provides the types shared by every Alice Grocer component:
//! - `skill` - The voice-assistant webhook and its dialog engine
//! - `cli` - The developer console that stands in for the voice platform
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Phone numbers, prices, ids, tokens and the caller-held account store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
