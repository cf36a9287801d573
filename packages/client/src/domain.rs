//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::time::{Duration, Instant};

use hiroba_server::domain::UserName;

use crate::error::ClientError;

/// 最後のキー入力からこの時間が経つと入力終了を通知する
pub const TYPING_IDLE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Edge-triggered typing state for the local user.
///
/// `typing{true}` is due on the first keystroke of a burst and
/// `typing{false}` once the input has been idle for [`TYPING_IDLE_TIMEOUT`].
#[derive(Debug, Default)]
pub struct TypingTracker {
    last_activity: Option<Instant>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke.
    ///
    /// # Returns
    ///
    /// `true` when this keystroke starts a burst and `typing{true}` must be sent
    pub fn on_activity(&mut self, now: Instant) -> bool {
        self.last_activity.replace(now).is_none()
    }

    /// When the current burst is considered finished, if one is in progress
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.last_activity.map(|at| at + TYPING_IDLE_TIMEOUT)
    }

    /// Check the idle deadline.
    ///
    /// # Returns
    ///
    /// `true` when the burst has just ended and `typing{false}` must be sent
    pub fn on_idle(&mut self, now: Instant) -> bool {
        match self.idle_deadline() {
            Some(deadline) if now >= deadline => {
                self.last_activity = None;
                true
            }
            _ => false,
        }
    }
}

/// Validate the display name before connecting.
///
/// Applies the same rule as the server (1-20 characters after trimming) so an
/// obviously bad name never costs a round trip.
///
/// # Returns
///
/// The trimmed name on success
pub fn validate_user_name(raw: &str) -> Result<String, ClientError> {
    UserName::parse(raw)
        .map(|name| name.as_str().to_string())
        .map_err(|e| ClientError::InvalidName(e.to_string()))
}

/// Check if the client should exit immediately based on the error type.
///
/// # Returns
///
/// `true` if the error requires immediate exit (e.g., InvalidName),
/// `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidName(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
