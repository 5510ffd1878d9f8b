//! Trait abstraction for the virtual joystick to enable testing

use crate::error::Result;

/// Joystick axes driven by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Steering
    X,
    /// Combined pedals, or accelerate in pass-through mode
    Y,
    /// Brake in pass-through mode
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Write-only virtual joystick.
///
/// The bridge never reads device state back; the last write wins.
#[cfg_attr(test, mockall::automock)]
pub trait VirtualJoystick {
    /// Set an axis position (nominally 0..=32768)
    fn set_axis(&mut self, axis: Axis, value: i32) -> Result<()>;

    /// Press or release a 1-based joystick button
    fn set_button(&mut self, button: u16, pressed: bool) -> Result<()>;
}
