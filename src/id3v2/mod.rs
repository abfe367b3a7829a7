//! ID3v2.3 / ID3v2.4 tag container: header, frames and padding.
//!
//! Parsing normalises the container (unsynchronisation undone, extended
//! header and footer dropped, v2.4 data length indicators stripped), so a
//! parsed [`Tag`] always serializes to a plain tag of the same version.

use thiserror::Error;

mod read;
mod regex;
mod structure;
mod tools;
mod write;

pub use self::regex::is_frame_id;
pub use self::structure::{ExtendedHeader, Frame, Header, Tag};
pub use self::structure::{FRAME_HEADER_LEN, HEADER_LEN};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("ID3v2 header not found")]
    NotFound,
    #[error("malformed ID3v2 header: {0}")]
    MalformedHeader(String),
    #[error("ID3v2.{0} is not supported")]
    UnsupportedVersion(u8),
    #[error("input is truncated: the tag needs {needed} bytes, only {available} are present")]
    TruncatedInput { needed: usize, available: usize },
    #[error("malformed frame at offset {offset:#X}: {reason}")]
    MalformedFrame { offset: usize, reason: String },
    #[error("{what} of {size} bytes is too large for an ID3v2 size field")]
    Oversized { what: &'static str, size: usize },
}

/// Reads only the 10 byte tag header at the start of `input`.
pub fn header(input: &[u8]) -> Result<Header, TagError> {
    read::header(input)
}

/// Parses the tag at the start of `input`. Bytes after the tag are ignored.
pub fn parse(input: &[u8]) -> Result<Tag, TagError> {
    read::tag(input).map(|(_, tag)| tag)
}

/// Like [`parse`], but also returns the header as found in the input,
/// extended header included.
pub fn parse_with_header(input: &[u8]) -> Result<(Header, Tag), TagError> {
    read::tag(input)
}

pub fn serialize(tag: &Tag) -> Result<Vec<u8>, TagError> {
    write::tag(tag)
}

#[cfg(test)]
mod tests;
