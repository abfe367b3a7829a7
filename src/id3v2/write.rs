use std::convert::TryFrom;

use crate::id3v2::structure::*;
use crate::id3v2::tools::*;
use crate::id3v2::TagError;
use crate::tools::encode_int_be_u32;

fn frame(vec: &mut Vec<u8>, frame: &Frame, version: u8) -> Result<(), TagError> {
    let offset = vec.len();

    // frame id
    let mut id = encode_frame_id(&frame.id)
        .map_err(|reason| TagError::MalformedFrame { offset, reason })?;
    vec.append(&mut id);

    // size, synchsafe in 2.4 and flat in 2.3
    let oversized = || TagError::Oversized {
        what: "frame",
        size: frame.payload.len(),
    };
    let size = u32::try_from(frame.payload.len()).map_err(|_| oversized())?;
    let mut size = match version {
        3 => encode_int_be_u32(size),
        _ => encode_synch_int(size, false).map_err(|_| oversized())?,
    };
    vec.append(&mut size);

    vec.extend_from_slice(&frame.flags);
    vec.extend_from_slice(&frame.payload);
    Ok(())
}

pub fn tag(tag: &Tag) -> Result<Vec<u8>, TagError> {
    if tag.version != 3 && tag.version != 4 {
        return Err(TagError::UnsupportedVersion(tag.version));
    }

    let mut vec: Vec<u8> = Vec::with_capacity(HEADER_LEN + tag.size());
    vec.extend_from_slice(b"ID3");
    vec.push(tag.version);
    vec.push(tag.revision);
    // never unsynchronized, no extended header, no footer
    vec.push(if tag.is_experimental { 0b0010_0000 } else { 0x00 });
    vec.extend_from_slice(b"\x00\x00\x00\x00"); // [6..10] - reserve for size

    for f in &tag.frames {
        frame(&mut vec, f, tag.version)?;
    }

    vec.resize(vec.len() + tag.padding, 0x00);

    // calculate final size
    let body = vec.len() - HEADER_LEN;
    let size = u32::try_from(body)
        .ok()
        .and_then(|size| encode_synch_int(size, false).ok())
        .ok_or(TagError::Oversized {
            what: "tag",
            size: body,
        })?;
    vec[6..10].copy_from_slice(&size);

    Ok(vec)
}
