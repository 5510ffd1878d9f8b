//! # Wire Protocol Constants and Types
//!
//! One UTF-8 text message per datagram, in one of two shapes:
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | `RESTART` | `restart` | Pulse the restart button (case-insensitive) |
//! | `<roll>,<accelerate>,<brake>` | `-12,32767,0` | One sensor frame |

use thiserror::Error;

/// Reserved command literal, compared ignoring ASCII case after trimming.
pub const RESTART_COMMAND: &str = "RESTART";

/// Separator between the fields of a sensor frame.
pub const FIELD_SEPARATOR: char = ',';

/// Number of comma-separated fields in a sensor frame.
pub const FRAME_FIELD_COUNT: usize = 3;

/// Field names in wire order, used in diagnostics.
pub const FRAME_FIELD_NAMES: [&str; FRAME_FIELD_COUNT] = ["roll", "accelerate", "brake"];

/// One sensor reading decoded from a single datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    /// Phone roll in degrees, roughly -90..90.
    pub roll: i32,

    /// Accelerate pedal pressure. Greater than zero means pressed.
    pub accelerate: i32,

    /// Brake pedal pressure. Greater than zero means pressed.
    pub brake: i32,
}

impl SensorFrame {
    #[must_use]
    pub fn new(roll: i32, accelerate: i32, brake: i32) -> Self {
        Self {
            roll,
            accelerate,
            brake,
        }
    }
}

/// A decoded datagram. Exactly one variant per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Momentary restart button pulse
    Restart,

    /// Sensor reading to map onto the joystick axes
    Frame(SensorFrame),
}

/// Why a datagram was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Payload is not valid UTF-8
    #[error("payload is not valid UTF-8 ({len} bytes)")]
    InvalidEncoding { len: usize },

    /// Wrong number of comma-separated fields
    #[error("expected {expected} comma-separated fields, found {found} in {text:?}", expected = FRAME_FIELD_COUNT)]
    FieldCount { found: usize, text: String },

    /// A field is not a decimal integer
    #[error("{field} is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
}
