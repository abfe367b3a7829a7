pub mod encoding;

// flat (non-synchsafe) big endian integers, as used by ID3v2.3 frame sizes
pub fn decode_int_be_u32(input: &[u8]) -> u32 {
    input
        .iter()
        .take(4)
        .fold(0, |result, b| (result << 8) | *b as u32)
}

pub fn encode_int_be_u32(input: u32) -> Vec<u8> {
    input.to_be_bytes().to_vec()
}
