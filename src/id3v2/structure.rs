pub const HEADER_LEN: usize = 10;
pub const FOOTER_LEN: usize = 10;
pub const FRAME_HEADER_LEN: usize = 10;

// second frame flag byte, ID3v2.3: %ijk00000
pub const V3_COMPRESSION: u8 = 0b1000_0000;
pub const V3_ENCRYPTION: u8 = 0b0100_0000;
pub const V3_GROUPING: u8 = 0b0010_0000;

// second frame flag byte, ID3v2.4: %0h00kmnp
pub const V4_GROUPING: u8 = 0b0100_0000;
pub const V4_COMPRESSION: u8 = 0b0000_1000;
pub const V4_ENCRYPTION: u8 = 0b0000_0100;
pub const V4_UNSYNCHRONIZED: u8 = 0b0000_0010;
pub const V4_DATA_LENGTH: u8 = 0b0000_0001;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header {
    // footer is essentially the same as the header
    pub version: u8,
    pub revision: u8,
    pub size: u32, // in bytes, goes up to 256 mb

    pub is_unsynchronized: bool,
    pub has_extended_header: bool,
    pub is_experimental: bool,
    pub has_footer: bool,

    pub extended_header: Option<ExtendedHeader>,
}

impl Header {
    /// Number of bytes the whole tag occupies at the start of the file,
    /// i.e. where the audio data begins.
    pub fn tag_len(&self) -> usize {
        HEADER_LEN + self.size as usize + if self.has_footer { FOOTER_LEN } else { 0 }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtendedHeader {
    // bytes taken up by the extended header, size field included
    pub size: u32,
    pub tag_is_update: bool,
    pub crc32: Option<u32>,
    pub restrictions: Option<u8>,
    // v2.3 only
    pub padding: Option<u32>,
}

/// A single frame: four character id, the two raw flag bytes and the payload
/// exactly as the frame declared it (after unsynchronisation is undone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: String,
    pub flags: [u8; 2],
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(id: &str, payload: Vec<u8>) -> Frame {
        Frame {
            id: id.to_string(),
            flags: [0x00, 0x00],
            payload,
        }
    }

    /// Bytes taken by this frame in a serialized tag, header included.
    pub fn size(&self) -> usize {
        FRAME_HEADER_LEN + self.payload.len()
    }

    /// Compressed, encrypted or grouped frames can't be read as plain text;
    /// they only ever get passed through.
    pub fn is_opaque(&self, version: u8) -> bool {
        let mask = match version {
            3 => V3_COMPRESSION | V3_ENCRYPTION | V3_GROUPING,
            _ => V4_COMPRESSION | V4_ENCRYPTION | V4_GROUPING,
        };
        self.flags[1] & mask != 0
    }

    /// The same frame with its format flags (second flag byte) cleared,
    /// keeping the status flags.
    pub fn with_payload(&self, payload: Vec<u8>) -> Frame {
        Frame {
            id: self.id.clone(),
            flags: [self.flags[0], 0x00],
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub version: u8,
    pub revision: u8,
    pub is_experimental: bool,
    pub frames: Vec<Frame>,
    pub padding: usize,
}

impl Tag {
    pub fn new(version: u8) -> Tag {
        Tag {
            version,
            revision: 0,
            is_experimental: false,
            frames: Vec::new(),
            padding: 0,
        }
    }

    /// The size the tag header declares: every frame with its header, plus padding.
    pub fn size(&self) -> usize {
        self.frames.iter().map(Frame::size).sum::<usize>() + self.padding
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.id.as_str()).collect()
    }
}
