//! Unicode to legacy encoding mapping.
//!
//! The tables are the `encoding` crate's static indexes, so there is nothing
//! to build or share: every lookup is a pure function of the code point.

use std::fmt;
use std::str::FromStr;

use encoding::all::{ISO_8859_1, WINDOWS_31J};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegacyEncoding {
    /// Shift-JIS as Windows writes it (code page 932)
    #[serde(rename = "shift-jis", alias = "shift_jis", alias = "sjis")]
    ShiftJis,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl LegacyEncoding {
    pub const ALL: [LegacyEncoding; 2] = [LegacyEncoding::ShiftJis, LegacyEncoding::Latin1];

    pub fn name(self) -> &'static str {
        match self {
            LegacyEncoding::ShiftJis => "Shift-JIS",
            LegacyEncoding::Latin1 => "ISO-8859-1",
        }
    }

    fn codec(self) -> EncodingRef {
        match self {
            LegacyEncoding::ShiftJis => WINDOWS_31J,
            LegacyEncoding::Latin1 => ISO_8859_1,
        }
    }

    /// The bytes for `c` in this encoding, or `None` if it has none.
    /// ASCII always maps to itself.
    pub fn map(self, c: char) -> Option<Vec<u8>> {
        if c.is_ascii() {
            return Some(vec![c as u8]);
        }
        let mut buf = [0; 4];
        self.codec()
            .encode(c.encode_utf8(&mut buf), EncoderTrap::Strict)
            .ok()
    }

    /// All or nothing: `None` if any character of `s` is unmappable.
    pub fn encode(self, s: &str) -> Option<Vec<u8>> {
        let mut result = Vec::with_capacity(s.len());
        for c in s.chars() {
            result.append(&mut self.map(c)?);
        }
        Some(result)
    }

    pub fn decode(self, input: &[u8]) -> String {
        self.codec()
            .decode(input, DecoderTrap::Replace)
            .unwrap_or_default()
    }
}

impl fmt::Display for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LegacyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "shift-jis" | "sjis" | "cp932" | "windows-31j" => Ok(LegacyEncoding::ShiftJis),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(LegacyEncoding::Latin1),
            _ => Err(format!(
                "unknown encoding \"{}\" (supported: shift-jis, latin-1)",
                s
            )),
        }
    }
}
