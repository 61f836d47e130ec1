//! `ag-cli` subcommands.

pub mod chat;
pub mod say;
