//! # Uinput Joystick Module
//!
//! Creates a virtual joystick through the Linux uinput interface using evdev.
//!
//! ## Device Layout
//!
//! | Output | evdev Code | Range |
//! |--------|------------|-------|
//! | Steering | ABS_X | 0-32768 |
//! | Pedals / accelerate | ABS_Y | 0-32768 |
//! | Brake | ABS_Z | 0-32768 |
//! | Buttons 1-16 | BTN_TRIGGER.. | 0/1 |
//!
//! Requires write access to `/dev/uinput`.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::{debug, info};

use super::axis_mapper::{AXIS_CENTER, AXIS_MAX, AXIS_MIN};
use super::sink::{Axis, VirtualJoystick};
use crate::error::{BridgeError, Result};

/// Number of buttons exposed by the virtual joystick.
pub const BUTTON_COUNT: u16 = 16;

/// Joystick buttons in numbering order (button 1 = BTN_TRIGGER).
const BUTTON_KEYS: [Key; BUTTON_COUNT as usize] = [
    Key::BTN_TRIGGER,
    Key::BTN_THUMB,
    Key::BTN_THUMB2,
    Key::BTN_TOP,
    Key::BTN_TOP2,
    Key::BTN_PINKIE,
    Key::BTN_BASE,
    Key::BTN_BASE2,
    Key::BTN_BASE3,
    Key::BTN_BASE4,
    Key::BTN_BASE5,
    Key::BTN_BASE6,
    Key::BTN_DEAD,
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_C,
];

/// evdev axis code for a joystick axis.
fn axis_code(axis: Axis) -> AbsoluteAxisType {
    match axis {
        Axis::X => AbsoluteAxisType::ABS_X,
        Axis::Y => AbsoluteAxisType::ABS_Y,
        Axis::Z => AbsoluteAxisType::ABS_Z,
    }
}

/// evdev key for a 1-based button number.
fn button_key(button: u16) -> Option<Key> {
    button
        .checked_sub(1)
        .and_then(|index| BUTTON_KEYS.get(usize::from(index)))
        .copied()
}

/// Virtual joystick backed by a uinput device.
///
/// The kernel device is destroyed when this value is dropped.
pub struct UinputJoystick {
    device: VirtualDevice,
    name: String,
}

impl std::fmt::Debug for UinputJoystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputJoystick")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UinputJoystick {
    /// Create the virtual joystick
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown to games (e.g., "PowerSteer Virtual Joystick")
    ///
    /// # Errors
    ///
    /// Returns `Device` error if `/dev/uinput` cannot be opened or the device
    /// cannot be created (usually missing permissions or the uinput module).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use powersteer_bridge::joystick::uinput::UinputJoystick;
    ///
    /// let joystick = UinputJoystick::create("PowerSteer Virtual Joystick")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(name: &str) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for key in BUTTON_KEYS {
            keys.insert(key);
        }

        let device_error = |e: std::io::Error| {
            BridgeError::Device(format!("Failed to create uinput device {:?}: {}", name, e))
        };

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(device_error)?
            .name(name)
            .with_keys(&keys)
            .map_err(device_error)?;

        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let setup = UinputAbsSetup::new(
                axis_code(axis),
                AbsInfo::new(AXIS_CENTER, AXIS_MIN, AXIS_MAX, 0, 0, 0),
            );
            builder = builder.with_absolute_axis(&setup).map_err(device_error)?;
        }

        let device = builder.build().map_err(device_error)?;
        info!("Created virtual joystick {:?}", name);

        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Device name the joystick was created with
    pub fn name(&self) -> &str {
        &self.name
    }

    fn emit(&mut self, event: InputEvent) -> Result<()> {
        // emit() appends the SYN_REPORT
        self.device
            .emit(&[event])
            .map_err(|e| BridgeError::Device(format!("Failed to write event: {}", e)))
    }
}

impl VirtualJoystick for UinputJoystick {
    fn set_axis(&mut self, axis: Axis, value: i32) -> Result<()> {
        debug!("Axis {} <- {}", axis, value);
        self.emit(InputEvent::new(EventType::ABSOLUTE, axis_code(axis).0, value))
    }

    fn set_button(&mut self, button: u16, pressed: bool) -> Result<()> {
        let key = button_key(button).ok_or_else(|| {
            BridgeError::Device(format!(
                "Button {} out of range (1-{})",
                button, BUTTON_COUNT
            ))
        })?;

        debug!("Button {} <- {}", button, pressed);
        self.emit(InputEvent::new(EventType::KEY, key.code(), i32::from(pressed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_codes() {
        assert_eq!(axis_code(Axis::X), AbsoluteAxisType::ABS_X);
        assert_eq!(axis_code(Axis::Y), AbsoluteAxisType::ABS_Y);
        assert_eq!(axis_code(Axis::Z), AbsoluteAxisType::ABS_Z);
    }

    #[test]
    fn test_button_numbering() {
        assert_eq!(button_key(1), Some(Key::BTN_TRIGGER));
        assert_eq!(button_key(2), Some(Key::BTN_THUMB));
        assert_eq!(button_key(BUTTON_COUNT), Some(Key::BTN_C));
    }

    #[test]
    fn test_button_out_of_range() {
        assert_eq!(button_key(0), None);
        assert_eq!(button_key(BUTTON_COUNT + 1), None);
    }

    #[test]
    fn test_button_keys_unique() {
        let mut codes: Vec<u16> = BUTTON_KEYS.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), BUTTON_COUNT as usize);
    }

    // Integration test - needs write access to /dev/uinput
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_create_with_real_uinput() {
        let mut joystick = UinputJoystick::create("PowerSteer Test Joystick")
            .expect("uinput not available");

        assert_eq!(joystick.name(), "PowerSteer Test Joystick");
        assert!(joystick.set_axis(Axis::X, AXIS_CENTER).is_ok());
        assert!(joystick.set_button(1, true).is_ok());
        assert!(joystick.set_button(1, false).is_ok());
        assert!(joystick.set_button(99, true).is_err());
    }
}
