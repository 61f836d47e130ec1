//! Core types for Alice Grocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod credential;
pub mod id;
pub mod phone;
pub mod price;
pub mod workflow;

pub use account::{AccountRecord, AccountStore};
pub use credential::TokenPair;
pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::{CurrencyCode, Price};
pub use workflow::WorkflowHandle;
