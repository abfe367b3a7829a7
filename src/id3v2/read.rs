use std::borrow::Cow;

use log::{debug, warn};

use crate::id3v2::structure::*;
use crate::id3v2::tools::*;
use crate::id3v2::TagError;
use crate::tools::decode_int_be_u32;

pub fn header(input: &[u8]) -> Result<Header, TagError> {
    if input.len() < HEADER_LEN {
        // not even room for the identifier; call it missing rather than cut
        if input.len() < 3 || &input[0..3] != b"ID3" {
            return Err(TagError::NotFound);
        }
        return Err(TagError::TruncatedInput {
            needed: HEADER_LEN,
            available: input.len(),
        });
    }

    // ID3v2/file identifier      "ID3"
    if &input[0..3] != b"ID3" {
        return Err(TagError::NotFound);
    }

    // ID3v2 version              $0X 00
    let mut header = Header {
        version: input[3],
        revision: input[4],
        ..Default::default()
    };

    if header.version != 3 && header.version != 4 {
        return Err(TagError::UnsupportedVersion(header.version));
    }

    // ID3v2 flags                %abcd0000
    let flags = input[5];

    header.is_unsynchronized = flags & 0b1000_0000 != 0;
    header.has_extended_header = flags & 0b0100_0000 != 0;
    header.is_experimental = flags & 0b0010_0000 != 0;
    header.has_footer = header.version == 4 && flags & 0b0001_0000 != 0;

    if flags & 0x0F != 0 {
        return Err(TagError::MalformedHeader(format!(
            "unknown flags {:#010b} in ID3 header",
            flags
        )));
    }

    // ID3v2 size             4 * %0xxxxxxx
    header.size = decode_synch_int(&input[6..10]).map_err(TagError::MalformedHeader)?;

    Ok(header)
}

// returns the extended header and the number of body bytes it took
fn extended_header(body: &[u8], version: u8) -> Result<(ExtendedHeader, usize), TagError> {
    let truncated = || TagError::MalformedHeader("extended header is truncated".to_string());

    if body.len() < 6 {
        return Err(truncated());
    }

    let mut ext = ExtendedHeader::default();

    if version == 3 {
        // size excludes the size field itself: 6, or 10 with a CRC
        let size = decode_int_be_u32(&body[0..4]) as usize + 4;
        if size < 10 || body.len() < size {
            return Err(truncated());
        }
        let has_crc = body[4] & 0b1000_0000 != 0;
        ext.padding = Some(decode_int_be_u32(&body[6..10]));
        if has_crc {
            if size < 14 {
                return Err(truncated());
            }
            ext.crc32 = Some(decode_int_be_u32(&body[10..14]));
        }
        ext.size = size as u32;
        return Ok((ext, size));
    }

    // v2.4: synchsafe size includes the size field
    let size = decode_synch_int(&body[0..4]).map_err(TagError::MalformedHeader)? as usize;
    if size < 6 || body.len() < size {
        return Err(truncated());
    }
    let flag_bytes = body[4] as usize;
    if flag_bytes != 1 {
        return Err(TagError::MalformedHeader(format!(
            "extended header claims {} flag bytes",
            flag_bytes
        )));
    }
    let flags = body[5];
    ext.size = size as u32;

    // flag data follows in flag order, each prefixed with its length
    let mut pos = 6;
    if flags & 0b0100_0000 != 0 {
        flag_data(&body[..size], &mut pos, 0)?;
        ext.tag_is_update = true;
    }
    if flags & 0b0010_0000 != 0 {
        let crc = flag_data(&body[..size], &mut pos, 5)?;
        ext.crc32 = Some(decode_synch_int(crc).map_err(TagError::MalformedHeader)?);
    }
    if flags & 0b0001_0000 != 0 {
        ext.restrictions = Some(flag_data(&body[..size], &mut pos, 1)?[0]);
    }

    Ok((ext, size))
}

fn flag_data<'a>(ext: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], TagError> {
    let start = *pos + 1;
    if start > ext.len() || ext[*pos] as usize != len || start + len > ext.len() {
        return Err(TagError::MalformedHeader(format!(
            "extended header flag data at {} is not {} bytes",
            *pos, len
        )));
    }
    *pos = start + len;
    Ok(&ext[start..start + len])
}

fn verify_crc(ext: &ExtendedHeader, rest: &[u8], version: u8) {
    let expected = match ext.crc32 {
        Some(crc) => crc,
        None => return,
    };

    // v2.3 checksums the frames only, v2.4 the padding as well
    let data = match (version, ext.padding) {
        (3, Some(padding)) if padding as usize <= rest.len() => {
            &rest[..rest.len() - padding as usize]
        }
        (3, _) => {
            warn!("extended header padding exceeds tag size; not verifying CRC");
            return;
        }
        _ => rest,
    };

    let actual = crc::crc32::checksum_ieee(data);
    if actual != expected {
        warn!(
            "ID3v2 CRC mismatch: header says {:#010X}, tag data gives {:#010X}",
            expected, actual
        );
    }
}

// reads the frame at body[pos..]; None means padding starts here
fn frame(
    body: &[u8],
    pos: usize,
    version: u8,
    unsynch_all: bool,
    available: usize,
) -> Result<Option<(Frame, usize)>, TagError> {
    if body[pos] == 0x00 {
        return Ok(None);
    }

    let offset = HEADER_LEN + pos;
    let malformed = |reason: String| TagError::MalformedFrame { offset, reason };

    // 4: Frame ID      $xx xx xx xx  (four characters)
    // 4: Size      4 * %0xxxxxxx in 2.4 / $xx in 2.3
    // 2: Flags         $xx xx
    if body.len() - pos < FRAME_HEADER_LEN {
        if pos + FRAME_HEADER_LEN > available {
            return Err(TagError::TruncatedInput {
                needed: HEADER_LEN + pos + FRAME_HEADER_LEN,
                available: HEADER_LEN + available,
            });
        }
        return Err(malformed(format!(
            "only {} bytes left for a {} byte frame header",
            body.len() - pos,
            FRAME_HEADER_LEN
        )));
    }
    let arr = &body[pos..pos + FRAME_HEADER_LEN];

    let id = decode_frame_id(&arr[0..4]).map_err(malformed)?;
    let size = match version {
        3 => decode_int_be_u32(&arr[4..8]),
        _ => decode_synch_int(&arr[4..8]).map_err(malformed)?,
    } as usize;
    let mut flags = [arr[8], arr[9]];

    let start = pos + FRAME_HEADER_LEN;
    let end = start + size;
    if end > body.len() {
        if end > available {
            return Err(TagError::TruncatedInput {
                needed: HEADER_LEN + end,
                available: HEADER_LEN + available,
            });
        }
        return Err(malformed(format!(
            "{} declares {} bytes but the tag ends {} bytes in",
            id,
            size,
            body.len() - start
        )));
    }

    let mut payload = body[start..end].to_vec();

    if version == 4 {
        if unsynch_all || flags[1] & V4_UNSYNCHRONIZED != 0 {
            payload = undo_unsynch(&payload);
            flags[1] &= !V4_UNSYNCHRONIZED;
        }

        let mut frame = Frame { id, flags, payload };

        // compressed frames need their data length indicator, leave them be
        if !frame.is_opaque(version) && frame.flags[1] & V4_DATA_LENGTH != 0 {
            if frame.payload.len() < 4 {
                return Err(malformed(format!(
                    "{} has a data length indicator but only {} bytes",
                    frame.id,
                    frame.payload.len()
                )));
            }
            frame.payload.drain(..4);
            frame.flags[1] &= !V4_DATA_LENGTH;
        }

        return Ok(Some((frame, end)));
    }

    Ok(Some((Frame { id, flags, payload }, end)))
}

pub fn tag(input: &[u8]) -> Result<(Header, Tag), TagError> {
    let mut header = header(input)?;

    let declared = header.size as usize;
    let available = input.len() - HEADER_LEN;
    let raw = &input[HEADER_LEN..HEADER_LEN + declared.min(available)];

    // with older id3 versions, run unsynch on the whole tag
    let body: Cow<[u8]> = if header.is_unsynchronized && header.version == 3 {
        Cow::Owned(undo_unsynch(raw))
    } else {
        Cow::Borrowed(raw)
    };

    let mut pos = 0;
    if header.has_extended_header {
        let (ext, used) = extended_header(&body, header.version)?;
        verify_crc(&ext, &body[used..], header.version);
        header.extended_header = Some(ext);
        pos = used;
    }

    let unsynch_all = header.is_unsynchronized && header.version == 4;
    let mut frames = Vec::new();
    while pos < body.len() {
        match frame(&body, pos, header.version, unsynch_all, available)? {
            Some((frame, next)) => {
                debug!(
                    "{} @ {:#X}: {} bytes, flags {:02X?}",
                    frame.id,
                    HEADER_LEN + pos,
                    frame.payload.len(),
                    frame.flags
                );
                frames.push(frame);
                pos = next;
            }
            None => break,
        }
    }

    if available < declared {
        return Err(TagError::TruncatedInput {
            needed: HEADER_LEN + declared,
            available: input.len(),
        });
    }

    let tag = Tag {
        version: header.version,
        revision: header.revision,
        is_experimental: header.is_experimental,
        frames,
        padding: body.len() - pos,
    };

    Ok((header, tag))
}
