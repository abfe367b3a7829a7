//! Text frame payloads: the encoding marker byte followed by one or more
//! null separated strings.

use thiserror::Error;

use crate::tools::encoding::{decode_iso_8859_1, decode_utf16, decode_utf8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// `$00`, also what legacy encodings are written as
    Latin1,
    /// `$01`, each string starts with a byte order mark
    Utf16,
    /// `$02`, v2.4 only
    Utf16Be,
    /// `$03`, v2.4 only
    Utf8,
}

impl TextEncoding {
    pub fn from_marker(marker: u8) -> Result<TextEncoding, DecodeError> {
        match marker {
            0x00 => Ok(TextEncoding::Latin1),
            0x01 => Ok(TextEncoding::Utf16),
            0x02 => Ok(TextEncoding::Utf16Be),
            0x03 => Ok(TextEncoding::Utf8),
            x => Err(DecodeError::InvalidTextEncoding(x)),
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            TextEncoding::Latin1 => 0x00,
            TextEncoding::Utf16 => 0x01,
            TextEncoding::Utf16Be => 0x02,
            TextEncoding::Utf8 => 0x03,
        }
    }

    pub fn is_unicode(self) -> bool {
        self != TextEncoding::Latin1
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid text encoding marker {0:#04X}")]
    InvalidTextEncoding(u8),
    #[error("truncated text: {0}")]
    TruncatedText(String),
}

/// The decoded content of a text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue {
    pub encoding: TextEncoding,
    pub values: Vec<String>,
}

impl TextValue {
    /// All values on one line, for display.
    pub fn joined(&self) -> String {
        self.values.join(" / ")
    }
}

/// How many raw bytes sit between the encoding marker and the text of a
/// frame, or `None` if the frame does not hold text at all.
pub fn prefix_len(id: &str) -> Option<usize> {
    match id {
        // language code
        "COMM" | "USLT" => Some(3),
        _ if id.starts_with('T') => Some(0),
        _ => None,
    }
}

pub fn decode(payload: &[u8]) -> Result<TextValue, DecodeError> {
    decode_prefixed(payload, 0).map(|(_, value)| value)
}

/// Decodes a text payload that carries `prefix_len` raw bytes after the
/// encoding marker; returns those bytes along with the text.
pub fn decode_prefixed(
    payload: &[u8],
    prefix_len: usize,
) -> Result<(Vec<u8>, TextValue), DecodeError> {
    let (&marker, rest) = payload
        .split_first()
        .ok_or_else(|| DecodeError::TruncatedText("empty payload".to_string()))?;
    let encoding = TextEncoding::from_marker(marker)?;

    if rest.len() < prefix_len {
        return Err(DecodeError::TruncatedText(format!(
            "expected {} bytes before the text, found {}",
            prefix_len,
            rest.len()
        )));
    }
    let (prefix, text) = rest.split_at(prefix_len);

    let values = match encoding {
        TextEncoding::Latin1 => split_single(text)
            .into_iter()
            .map(decode_iso_8859_1)
            .collect(),
        TextEncoding::Utf8 => split_single(text)
            .into_iter()
            .map(decode_utf8)
            .collect::<Result<_, _>>()
            .map_err(DecodeError::TruncatedText)?,
        TextEncoding::Utf16 | TextEncoding::Utf16Be => {
            if text.len() % 2 != 0 {
                return Err(DecodeError::TruncatedText(format!(
                    "odd number of bytes ({}) in UTF-16 text",
                    text.len()
                )));
            }
            // without a BOM, assume big endian
            let mut big_endian = true;
            let mut values = Vec::new();
            for s in split_double(text) {
                let (value, order) = if encoding == TextEncoding::Utf16Be {
                    // a BOM has no business here, but don't choke on one
                    decode_utf16(s.strip_prefix(b"\xFE\xFF").unwrap_or(s), true)
                } else {
                    decode_utf16(s, big_endian)
                }
                .map_err(DecodeError::TruncatedText)?;
                big_endian = order;
                values.push(value);
            }
            values
        }
    };

    Ok((prefix.to_vec(), TextValue { encoding, values }))
}

// split on single 0x00 bytes, ignoring the terminator(s) at the end
fn split_single(text: &[u8]) -> Vec<&[u8]> {
    let end = text.iter().rposition(|&b| b != 0x00).map_or(0, |i| i + 1);
    text[..end].split(|&b| b == 0x00).collect()
}

// split on aligned 0x00 0x00 pairs, ignoring the terminator(s) at the end
fn split_double(text: &[u8]) -> Vec<&[u8]> {
    let mut end = text.len();
    while end >= 2 && text[end - 2..end] == [0x00, 0x00] {
        end -= 2;
    }

    let mut values = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < end {
        if text[i] == 0x00 && text[i + 1] == 0x00 {
            values.push(&text[start..i]);
            start = i + 2;
        }
        i += 2;
    }
    values.push(&text[start..end]);
    values
}
