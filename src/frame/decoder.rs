//! # Datagram Decoder
//!
//! Decodes raw datagram payloads into [`Message`]s.

use super::protocol::*;

/// Decode one datagram payload
///
/// # Arguments
///
/// * `payload` - Raw bytes as received from the socket (possibly truncated)
///
/// # Returns
///
/// * `Result<Message, ParseError>` - Restart command or sensor frame
///
/// # Errors
///
/// Returns error if:
/// - Payload is not valid UTF-8
/// - Payload does not contain exactly three comma-separated fields
/// - A field is not a decimal integer that fits in `i32`
///
/// # Examples
///
/// ```
/// use powersteer_bridge::frame::decoder::decode;
/// use powersteer_bridge::frame::protocol::{Message, SensorFrame};
///
/// assert_eq!(decode(b" Restart \n"), Ok(Message::Restart));
/// assert_eq!(
///     decode(b"-12,32767,0"),
///     Ok(Message::Frame(SensorFrame::new(-12, 32767, 0)))
/// );
/// ```
pub fn decode(payload: &[u8]) -> Result<Message, ParseError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| ParseError::InvalidEncoding { len: payload.len() })?
        .trim();

    if text.eq_ignore_ascii_case(RESTART_COMMAND) {
        return Ok(Message::Restart);
    }

    decode_frame(text).map(Message::Frame)
}

/// Parse trimmed text as `<roll>,<accelerate>,<brake>`
fn decode_frame(text: &str) -> Result<SensorFrame, ParseError> {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if fields.len() != FRAME_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            found: fields.len(),
            text: text.to_string(),
        });
    }

    let mut values = [0i32; FRAME_FIELD_COUNT];
    for ((slot, raw), name) in values.iter_mut().zip(&fields).zip(FRAME_FIELD_NAMES) {
        *slot = parse_field(name, raw)?;
    }

    Ok(SensorFrame::new(values[0], values[1], values[2]))
}

fn parse_field(field: &'static str, raw: &str) -> Result<i32, ParseError> {
    raw.trim().parse::<i32>().map_err(|_| ParseError::InvalidInteger {
        field,
        value: raw.to_string(),
    })
}
