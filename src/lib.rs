//! # PowerSteer Bridge Library
//!
//! Steer racing games with your phone.
//!
//! This library provides the core functionality for receiving motion-sensor
//! frames (roll, accelerate, brake) over UDP and translating them into
//! virtual joystick axis and button writes.

pub mod bridge;
pub mod config;
pub mod error;
pub mod frame;
pub mod joystick;
pub mod udp;
