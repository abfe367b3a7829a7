use crate::id3v2::regex::is_frame_id;

// remove the 0x00 inserted after every 0xFF by the unsynchronisation scheme
pub fn undo_unsynch(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut previous = 0x00;
    for &b in input {
        if !(previous == 0xFF && b == 0x00) {
            result.push(b);
        }
        previous = b;
    }
    result
}

pub fn decode_synch_int(input: &[u8]) -> Result<u32, String> {
    if input.len() > 5 {
        return Err("Synchsafe ints are limited to 32 bits".to_string());
    }
    let mut result: u32 = 0;
    for (i, b) in input.iter().enumerate() {
        // verify that this is a valid synchsafe int
        // (by checking that the msb of each byte is zero)
        if b & 0x80 != 0 {
            return Err(format!("Invalid synch-safe byte at position {}", i));
        }
        // if so, transform to proper uint by
        // moving the 7 bit parts to proper places
        // (0000 0001 0111 1111 => 1111 1111)
        result |= (*b as u32) << (7 * (input.len() - 1 - i));
    }
    Ok(result)
}

pub fn encode_synch_int(input: u32, use_fifth_bit: bool) -> Result<Vec<u8>, String> {
    // request >28 bit explicitly
    if input > 0x0FFFFFFF && !use_fifth_bit {
        return Err(format!(
            "{} uses more than 28 bits, but use fifth bit option is not enabled",
            input
        ));
    }

    let mut result = Vec::with_capacity(5);
    if use_fifth_bit {
        result.push((input >> 28) as u8);
    }
    for i in 0..4 {
        result.push(((input >> (7 * (3 - i))) & 0x7F) as u8);
    }
    Ok(result)
}

pub fn decode_frame_id(input: &[u8]) -> Result<String, String> {
    let s: String = input.iter().map(|&c| c as char).collect();
    if is_frame_id(&s) {
        Ok(s)
    } else {
        Err(format!(
            "Cannot decode {:X?}: Invalid frame ID (contains characters that are not A-Z or 0-9)",
            input
        ))
    }
}

pub fn encode_frame_id(input: &str) -> Result<Vec<u8>, String> {
    if is_frame_id(input) {
        Ok(input.as_bytes().to_vec())
    } else {
        Err(format!(
            "Cannot encode \"{}\": Invalid frame ID (must be four of A-Z or 0-9)",
            input
        ))
    }
}
