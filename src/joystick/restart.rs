//! # Restart Trigger
//!
//! Presses the game's restart button for a short, fixed hold time.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use super::sink::VirtualJoystick;

/// Default restart button (first joystick button).
pub const DEFAULT_RESTART_BUTTON: u16 = 1;

/// Default press duration.
pub const DEFAULT_RESTART_HOLD: Duration = Duration::from_millis(100);

/// Momentary button pulse: press, hold, release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartTrigger {
    button: u16,
    hold: Duration,
}

impl Default for RestartTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_RESTART_BUTTON, DEFAULT_RESTART_HOLD)
    }
}

impl RestartTrigger {
    #[must_use]
    pub fn new(button: u16, hold: Duration) -> Self {
        Self { button, hold }
    }

    #[must_use]
    pub fn button(&self) -> u16 {
        self.button
    }

    #[must_use]
    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Press the button, wait for the hold time, release it.
    ///
    /// The caller awaits the whole pulse, so no other packet is handled
    /// during the hold. Write failures are logged and the release is still
    /// attempted.
    pub async fn pulse<S: VirtualJoystick + ?Sized>(&self, sink: &mut S) {
        info!(">>> RESTART command received! Pulsing button {}", self.button);

        if let Err(e) = sink.set_button(self.button, true) {
            warn!("Failed to press restart button {}: {}", self.button, e);
        }

        sleep(self.hold).await;

        if let Err(e) = sink.set_button(self.button, false) {
            warn!("Failed to release restart button {}: {}", self.button, e);
        }
    }
}
