//! Single-room real-time chat relay.
//!
//! Clients connect over WebSocket, register a display name, exchange short
//! text messages and typing signals, and see a live roster of present users.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
