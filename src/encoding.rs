//! The provided [IEncoding] instantiations.

use crate::IEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// UTF-8 input over `u8` code units.
pub struct Utf8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// UTF-16 input over `u16` code units.
pub struct Utf16;

/// The platform default text encoding; rust source and [String] are UTF-8.
pub type DefaultEncoding = Utf8;

impl IEncoding for Utf8 {
    type Unit = u8;

    fn decode(units: &[u8]) -> Option<(char, usize)> {
        let first = *units.first()?;
        let width = match first {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Some((char::REPLACEMENT_CHARACTER, 1)),
        };
        if units.len() < width {
            return Some((char::REPLACEMENT_CHARACTER, 1));
        }
        match std::str::from_utf8(&units[..width]) {
            Ok(text) => text.chars().next().map(|codepoint| (codepoint, width)),
            Err(_) => Some((char::REPLACEMENT_CHARACTER, 1)),
        }
    }

    fn encode_codepoint(codepoint: char, out: &mut Vec<u8>) {
        let mut buffer = [0u8; 4];
        out.extend_from_slice(codepoint.encode_utf8(&mut buffer).as_bytes());
    }
}

impl IEncoding for Utf16 {
    type Unit = u16;

    fn decode(units: &[u16]) -> Option<(char, usize)> {
        let first = *units.first()?;
        if (0xd800..=0xdbff).contains(&first) {
            if let Some(&second) = units.get(1) {
                if (0xdc00..=0xdfff).contains(&second) {
                    let value =
                        0x10000 + ((u32::from(first) - 0xd800) << 10) + (u32::from(second) - 0xdc00);
                    if let Some(codepoint) = char::from_u32(value) {
                        return Some((codepoint, 2));
                    }
                }
            }
            return Some((char::REPLACEMENT_CHARACTER, 1));
        }
        match char::from_u32(u32::from(first)) {
            Some(codepoint) => Some((codepoint, 1)),
            None => Some((char::REPLACEMENT_CHARACTER, 1)),
        }
    }

    fn encode_codepoint(codepoint: char, out: &mut Vec<u16>) {
        let mut buffer = [0u16; 2];
        out.extend_from_slice(codepoint.encode_utf16(&mut buffer));
    }
}

/// Re-encode a unit slice from one encoding into another, appending to `out`.
pub fn transcode<Source: IEncoding, Target: IEncoding>(
    units: &[Source::Unit],
    out: &mut Vec<Target::Unit>,
) {
    let mut cursor = 0;
    while let Some((codepoint, consumed)) = Source::decode(&units[cursor..]) {
        Target::encode_codepoint(codepoint, out);
        cursor += consumed;
    }
}
