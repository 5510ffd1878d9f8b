//! # Axis Mapper Module
//!
//! Maps decoded sensor frames to virtual joystick axis values.
//!
//! ## Profiles
//!
//! | Profile | Roll clamp | X | Y | Z |
//! |---------|------------|---|---|---|
//! | `combined` | ±45° | inverted roll | pedals combined (0 / 16384 / 32768) | - |
//! | `pass_through` | ±90° | inverted roll | accelerate, unmapped | brake, unmapped |
//!
//! ## Value Ranges
//!
//! - Roll mapping domain: -45..45 degrees
//! - Axis output: 0-32768, 16384 = centre
//!
//! The `pass_through` profile clamps roll to ±90° but maps over ±45°, so rolls
//! beyond 45° land outside 0-32768. That output is forwarded unchanged.
//!
//! ## Usage
//!
//! ```
//! use powersteer_bridge::frame::protocol::SensorFrame;
//! use powersteer_bridge::joystick::axis_mapper::{AxisMapper, MappingProfile};
//!
//! let mapper = AxisMapper::for_profile(MappingProfile::Combined);
//! let axes = mapper.map_frame(&SensorFrame::new(0, 1, 0));
//!
//! assert_eq!(axes.x, 16384);
//! assert_eq!(axes.y, 0);
//! assert_eq!(axes.z, None);
//! ```

use serde::Deserialize;

use super::sink::Axis;
use crate::frame::protocol::SensorFrame;

/// Minimum nominal axis value.
pub const AXIS_MIN: i32 = 0;
/// Maximum nominal axis value.
pub const AXIS_MAX: i32 = 32768;
/// Axis centre (neutral).
pub const AXIS_CENTER: i32 = 16384;

/// Half-width in degrees of the roll interval mapped onto the full axis.
pub const ROLL_DOMAIN_DEGREES: i32 = 45;

/// How the accelerate and brake fields drive the joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedalMode {
    /// Both pedals share the Y axis via [`compute_y_axis`]
    Combined,
    /// Accelerate on Y, brake on Z, values forwarded unmapped
    PassThrough,
}

/// Named mapping configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingProfile {
    /// ±45° clamp, inverted roll, combined pedals on Y
    Combined,
    /// ±90° clamp, inverted roll, accelerate on Y and brake on Z
    PassThrough,
}

impl MappingProfile {
    /// Roll clamp half-width in degrees.
    #[must_use]
    pub fn clamp_range(self) -> u8 {
        match self {
            MappingProfile::Combined => 45,
            MappingProfile::PassThrough => 90,
        }
    }

    #[must_use]
    pub fn pedal_mode(self) -> PedalMode {
        match self {
            MappingProfile::Combined => PedalMode::Combined,
            MappingProfile::PassThrough => PedalMode::PassThrough,
        }
    }

    /// Both profiles invert roll for correct left/right steering.
    #[must_use]
    pub fn invert_roll(self) -> bool {
        true
    }
}

impl std::fmt::Display for MappingProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingProfile::Combined => f.write_str("combined"),
            MappingProfile::PassThrough => f.write_str("pass_through"),
        }
    }
}

/// Map a roll angle to an axis value.
///
/// Clamps `roll` to `[-clamp_range, clamp_range]`, negates it when `invert`
/// is set, then maps -45..45 onto 0..32768, truncating toward zero. The
/// result is not clamped again.
///
/// # Examples
///
/// ```
/// use powersteer_bridge::joystick::axis_mapper::map_roll_to_axis;
///
/// assert_eq!(map_roll_to_axis(-45, 45, true), 32768);
/// assert_eq!(map_roll_to_axis(10, 45, true), 12743);
/// assert_eq!(map_roll_to_axis(-90, 90, true), 49152);
/// ```
#[must_use]
pub fn map_roll_to_axis(roll: i32, clamp_range: u8, invert: bool) -> i32 {
    // Clamp before negating; the range is symmetric and i32::MIN has no negation
    let limit = i32::from(clamp_range);
    let clamped = roll.clamp(-limit, limit);
    let oriented = if invert { -clamped } else { clamped };

    // |oriented| <= 255, so the product stays well inside i32
    (oriented + ROLL_DOMAIN_DEGREES) * AXIS_MAX / (2 * ROLL_DOMAIN_DEGREES)
}

/// Combine the two pedals into a single Y axis value.
///
/// | Brake | Accelerate | Y |
/// |-------|------------|---|
/// | pressed | released | 32768 |
/// | released | pressed | 0 |
/// | anything else | | 16384 |
///
/// # Examples
///
/// ```
/// use powersteer_bridge::joystick::axis_mapper::compute_y_axis;
///
/// assert_eq!(compute_y_axis(1, 0), 0);
/// assert_eq!(compute_y_axis(0, 1), 32768);
/// assert_eq!(compute_y_axis(1, 1), 16384);
/// ```
#[must_use]
pub fn compute_y_axis(accelerate: i32, brake: i32) -> i32 {
    let accelerating = accelerate > 0;
    let braking = brake > 0;

    match (accelerating, braking) {
        (false, true) => AXIS_MAX,
        (true, false) => AXIS_MIN,
        _ => AXIS_CENTER,
    }
}

/// Axis values produced for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedAxes {
    pub x: i32,
    pub y: i32,
    /// Only written in pass-through mode
    pub z: Option<i32>,
}

impl MappedAxes {
    /// Axis writes in the order they are sent to the device.
    pub fn writes(&self) -> impl Iterator<Item = (Axis, i32)> {
        [(Axis::X, self.x), (Axis::Y, self.y)]
            .into_iter()
            .chain(self.z.map(|z| (Axis::Z, z)))
    }
}

impl std::fmt::Display for MappedAxes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X: {}, Y: {}", self.x, self.y)?;
        if let Some(z) = self.z {
            write!(f, ", Z: {}", z)?;
        }
        Ok(())
    }
}

/// Maps sensor frames to joystick axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMapper {
    clamp_range: u8,
    invert_roll: bool,
    pedal_mode: PedalMode,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::for_profile(MappingProfile::Combined)
    }
}

impl AxisMapper {
    /// Creates a mapper with explicit settings.
    #[must_use]
    pub fn new(clamp_range: u8, invert_roll: bool, pedal_mode: PedalMode) -> Self {
        Self {
            clamp_range,
            invert_roll,
            pedal_mode,
        }
    }

    /// Creates a mapper with a profile's settings.
    #[must_use]
    pub fn for_profile(profile: MappingProfile) -> Self {
        Self::new(profile.clamp_range(), profile.invert_roll(), profile.pedal_mode())
    }

    /// Creates a mapper from the `[mapping]` configuration section.
    ///
    /// Optional overrides replace the profile's clamp range and roll inversion.
    #[must_use]
    pub fn from_config(config: &crate::config::MappingConfig) -> Self {
        let profile = config.profile;
        Self::new(
            config.clamp_range.unwrap_or_else(|| profile.clamp_range()),
            config.invert_roll.unwrap_or_else(|| profile.invert_roll()),
            profile.pedal_mode(),
        )
    }

    #[must_use]
    pub fn clamp_range(&self) -> u8 {
        self.clamp_range
    }

    #[must_use]
    pub fn invert_roll(&self) -> bool {
        self.invert_roll
    }

    #[must_use]
    pub fn pedal_mode(&self) -> PedalMode {
        self.pedal_mode
    }

    /// Maps one sensor frame to axis values.
    #[must_use]
    pub fn map_frame(&self, frame: &SensorFrame) -> MappedAxes {
        let x = map_roll_to_axis(frame.roll, self.clamp_range, self.invert_roll);

        match self.pedal_mode {
            PedalMode::Combined => MappedAxes {
                x,
                y: compute_y_axis(frame.accelerate, frame.brake),
                z: None,
            },
            PedalMode::PassThrough => MappedAxes {
                x,
                y: frame.accelerate,
                z: Some(frame.brake),
            },
        }
    }
}
