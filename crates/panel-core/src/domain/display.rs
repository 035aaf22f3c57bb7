//! Fixed-width display slot encoding.
//!
//! The remote panel exposes a row of 16 character slots as sequential 16-bit
//! registers.  Staging an update means writing one character code per slot;
//! the staged row only becomes visible once the driver issues the separate
//! strobe write (see `panel-display`).
//!
//! This module owns the pure half of that contract: turning a text string
//! into the exact slot values, left-justified and space-padded to the full
//! panel width.

use thiserror::Error;

/// Number of character slots on the panel.
pub const DISPLAY_WIDTH: usize = 16;

/// Errors produced while encoding text into display slots.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayEncodeError {
    /// The text has more characters than the panel has slots.
    #[error("text is {len} characters but the panel has only {DISPLAY_WIDTH} slots")]
    TooLong { len: usize },

    /// A character's code point does not fit in a 16-bit register.
    #[error("character {ch:?} (U+{code:04X}) does not fit in a 16-bit slot")]
    Unencodable { ch: char, code: u32 },
}

/// Encodes `text` into the panel's slot values.
///
/// The string is laid out left-justified starting at slot 0; remaining slots
/// are filled with the space character.  Each slot holds the character's
/// Unicode code point, which must fit in 16 bits.
///
/// # Errors
///
/// Returns [`DisplayEncodeError::TooLong`] if the text exceeds
/// [`DISPLAY_WIDTH`] characters, or [`DisplayEncodeError::Unencodable`] for
/// characters outside the Basic Multilingual Plane.
///
/// # Examples
///
/// ```rust
/// use panel_core::{encode_display_text, DISPLAY_WIDTH};
///
/// let slots = encode_display_text("Current: 10").unwrap();
/// assert_eq!(slots.len(), DISPLAY_WIDTH);
/// assert_eq!(slots[0], u16::from(b'C'));
/// assert_eq!(slots[11], u16::from(b' '));
/// ```
pub fn encode_display_text(text: &str) -> Result<[u16; DISPLAY_WIDTH], DisplayEncodeError> {
    let len = text.chars().count();
    if len > DISPLAY_WIDTH {
        return Err(DisplayEncodeError::TooLong { len });
    }

    let mut slots = [u16::from(b' '); DISPLAY_WIDTH];
    for (i, ch) in text.chars().enumerate() {
        let code = u32::from(ch);
        slots[i] = u16::try_from(code).map_err(|_| DisplayEncodeError::Unencodable { ch, code })?;
    }
    Ok(slots)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_short_text_with_spaces() {
        let slots = encode_display_text("AB").expect("encode");
        assert_eq!(slots[0], u16::from(b'A'));
        assert_eq!(slots[1], u16::from(b'B'));
        for slot in &slots[2..] {
            assert_eq!(*slot, u16::from(b' '));
        }
    }

    #[test]
    fn test_encode_full_width_text_uses_every_slot() {
        let slots = encode_display_text("0123456789ABCDEF").expect("encode");
        assert_eq!(slots[0], u16::from(b'0'));
        assert_eq!(slots[15], u16::from(b'F'));
    }

    #[test]
    fn test_encode_empty_text_is_all_spaces() {
        let slots = encode_display_text("").expect("encode");
        assert_eq!(slots, [u16::from(b' '); DISPLAY_WIDTH]);
    }

    #[test]
    fn test_encode_rejects_overlong_text() {
        let result = encode_display_text("0123456789ABCDEFG");
        assert_eq!(result, Err(DisplayEncodeError::TooLong { len: 17 }));
    }

    #[test]
    fn test_encode_accepts_bmp_characters() {
        // 'Ω' is U+03A9 and fits comfortably in a 16-bit slot.
        let slots = encode_display_text("Ω").expect("encode");
        assert_eq!(slots[0], 0x03A9);
    }

    #[test]
    fn test_encode_rejects_characters_beyond_u16() {
        // '🦀' is U+1F980, outside the 16-bit register range.
        let result = encode_display_text("🦀");
        assert!(matches!(
            result,
            Err(DisplayEncodeError::Unencodable { code: 0x1F980, .. })
        ));
    }

    #[test]
    fn test_length_limit_counts_chars_not_bytes() {
        // 16 two-byte characters must still fit: the panel is addressed in
        // characters, not UTF-8 bytes.
        let text: String = std::iter::repeat('é').take(16).collect();
        assert!(encode_display_text(&text).is_ok());
    }
}
