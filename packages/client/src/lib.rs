//! Terminal client for the Hiroba chat relay.

pub mod domain;
pub mod error;
pub mod formatter;
mod runner;
mod session;
mod ui;
pub mod view;

pub use runner::run_client;
