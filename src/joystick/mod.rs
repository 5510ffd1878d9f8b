//! # Joystick Module
//!
//! Virtual joystick output for the racing game.
//!
//! This module handles:
//! - Mapping sensor frames onto axis values (two named profiles)
//! - The virtual joystick sink abstraction
//! - Linux uinput joystick device via evdev
//! - Momentary restart button pulses

pub mod axis_mapper;
pub mod restart;
pub mod sink;
pub mod uinput;
