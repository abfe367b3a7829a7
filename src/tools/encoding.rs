use encoding::all::{ISO_8859_1, UTF_16BE, UTF_16LE, UTF_8};
use encoding::{DecoderTrap, Encoding};

// latin-1 has a byte for every code point in 0x00..=0xFF, so this cannot fail
pub fn decode_iso_8859_1(input: &[u8]) -> String {
    ISO_8859_1
        .decode(input, DecoderTrap::Replace)
        .unwrap_or_default()
}

pub fn decode_utf8(input: &[u8]) -> Result<String, String> {
    UTF_8
        .decode(input, DecoderTrap::Strict)
        .map_err(|e| format!("invalid UTF-8 ({})", e))
}

/// Decodes one UTF-16 string. A leading BOM picks the byte order, otherwise
/// `big_endian` is used. Returns the byte order that was actually used so the
/// next value in the same frame can inherit it.
pub fn decode_utf16(input: &[u8], big_endian: bool) -> Result<(String, bool), String> {
    let (text, big_endian) = match input {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (input, big_endian),
    };

    let decoded = if big_endian {
        UTF_16BE.decode(text, DecoderTrap::Strict)
    } else {
        UTF_16LE.decode(text, DecoderTrap::Strict)
    };

    decoded
        .map(|s| (s, big_endian))
        .map_err(|e| format!("invalid UTF-16 ({})", e))
}
