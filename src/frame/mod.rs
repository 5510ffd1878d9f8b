//! # Frame Module
//!
//! Text wire format sent by the PowerSteer phone app.
//!
//! This module handles:
//! - Message and sensor frame types
//! - Decoding raw datagrams into messages
//! - Classifying malformed packets into named parse errors

pub mod protocol;
pub mod decoder;
