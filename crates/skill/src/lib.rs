//! Alice Grocer skill library.
//!
//! Voice-assistant webhook that signs users in to a grocery commerce
//! platform, fills their cart from saved shopping lists, and walks them
//! through checkout and payment. Exposed as a library so the router can be
//! exercised in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod alice;
pub mod commerce;
pub mod config;
pub mod dialog;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
