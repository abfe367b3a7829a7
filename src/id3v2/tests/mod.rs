
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::id3v2::tools::encode_synch_int;
use crate::id3v2::{Frame, Tag, TagError};

fn v3_frame(id: &str, payload: &[u8]) -> Vec<u8> {
    let mut vec = id.as_bytes().to_vec();
    vec.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    vec.extend_from_slice(b"\x00\x00");
    vec.extend_from_slice(payload);
    vec
}

fn v4_frame(id: &str, flags: [u8; 2], payload: &[u8]) -> Vec<u8> {
    let mut vec = id.as_bytes().to_vec();
    vec.append(&mut encode_synch_int(payload.len() as u32, false).unwrap());
    vec.extend_from_slice(&flags);
    vec.extend_from_slice(payload);
    vec
}

fn tag_bytes(version: u8, flags: u8, body: &[u8]) -> Vec<u8> {
    let mut vec = vec![b'I', b'D', b'3', version, 0x00, flags];
    vec.append(&mut encode_synch_int(body.len() as u32, false).unwrap());
    vec.extend_from_slice(body);
    vec
}

#[test]
fn parse_v23_test() {
    let mut body = v3_frame("TIT2", b"\x00Title\x00");
    body.append(&mut v3_frame("TPE1", b"\x00Artist\x00"));
    body.extend_from_slice(&[0; 16]);
    let mut input = tag_bytes(3, 0x00, &body);
    input.extend_from_slice(b"\xFF\xFBaudio");

    let tag = super::parse(&input).unwrap();

    assert_eq!(tag.version, 3);
    assert_eq!(tag.ids(), vec!["TIT2", "TPE1"]);
    assert_eq!(tag.frame("TIT2").unwrap().payload, b"\x00Title\x00".to_vec());
    assert_eq!(tag.padding, 16);
    assert_eq!(tag.size(), body.len());
}

#[test]
fn parse_v24_synchsafe_size_test() {
    let payload = vec![b'a'; 200];
    let frame = v4_frame("TALB", [0x00, 0x00], &payload);
    // 200 = 1 * 128 + 72
    assert_eq!(&frame[4..8], &[0x00, 0x00, 0x01, 0x48]);

    let tag = super::parse(&tag_bytes(4, 0x00, &frame)).unwrap();
    assert_eq!(tag.frames, vec![Frame::new("TALB", payload)]);
    assert_eq!(tag.padding, 0);
}

#[test]
fn unsupported_version_test() {
    let body = v3_frame("TIT2", b"\x00x");
    assert_eq!(
        super::parse(&tag_bytes(2, 0x00, &body)),
        Err(TagError::UnsupportedVersion(2))
    );
    assert_eq!(
        super::parse(&tag_bytes(5, 0x00, &body)),
        Err(TagError::UnsupportedVersion(5))
    );
}

#[test]
fn not_found_test() {
    assert_eq!(super::parse(b"\xFF\xFB\x90\x00 no tag here"), Err(TagError::NotFound));
    assert_eq!(super::parse(b""), Err(TagError::NotFound));
    assert_eq!(
        super::parse(b"ID3\x03"),
        Err(TagError::TruncatedInput {
            needed: 10,
            available: 4
        })
    );
}

#[test]
fn frame_longer_than_input_test() {
    // frame claims 100 bytes, file ends after 6
    let mut body = b"TIT2\x00\x00\x00\x64\x00\x00".to_vec();
    body.extend_from_slice(b"\x00short");
    let input = tag_bytes(3, 0x00, &body);

    match super::parse(&input) {
        Err(TagError::TruncatedInput { .. }) => (),
        x => panic!("expected TruncatedInput, got {:?}", x),
    }
}

#[test]
fn frame_longer_than_tag_test() {
    let mut body = b"TIT2\x00\x00\x00\x64\x00\x00".to_vec();
    body.extend_from_slice(b"\x00short");
    let mut input = tag_bytes(3, 0x00, &body);
    // the audio data is there, the frame just runs into it
    input.extend_from_slice(&[0xAA; 200]);

    match super::parse(&input) {
        Err(TagError::MalformedFrame { offset, .. }) => assert_eq!(offset, 10),
        x => panic!("expected MalformedFrame, got {:?}", x),
    }
}

#[test]
fn header_longer_than_input_test() {
    let body = v3_frame("TIT2", b"\x00Title");
    let mut input = tag_bytes(3, 0x00, &body);
    // claim 50 more bytes of padding than there are
    let size = encode_synch_int(body.len() as u32 + 50, false).unwrap();
    input[6..10].copy_from_slice(&size);

    match super::parse(&input) {
        Err(TagError::TruncatedInput { .. }) => (),
        x => panic!("expected TruncatedInput, got {:?}", x),
    }
}

#[test]
fn bad_frame_id_test() {
    let body = v3_frame("tit2", b"\x00Title");
    match super::parse(&tag_bytes(3, 0x00, &body)) {
        Err(TagError::MalformedFrame { .. }) => (),
        x => panic!("expected MalformedFrame, got {:?}", x),
    }
}

#[test]
fn frame_header_cut_short_test() {
    let mut body = v3_frame("TIT2", b"\x00Title");
    body.extend_from_slice(b"TPE");
    let mut input = tag_bytes(3, 0x00, &body);
    input.extend_from_slice(&[0xAA; 32]);

    match super::parse(&input) {
        Err(TagError::MalformedFrame { .. }) => (),
        x => panic!("expected MalformedFrame, got {:?}", x),
    }
}

#[test]
fn v23_unsynchronized_test() {
    // logical payload 00 FF E0, stored as 00 FF 00 E0
    let mut body = b"TALB\x00\x00\x00\x03\x00\x00".to_vec();
    body.extend_from_slice(b"\x00\xFF\x00\xE0");
    let tag = super::parse(&tag_bytes(3, 0b1000_0000, &body)).unwrap();

    assert_eq!(tag.frames, vec![Frame::new("TALB", b"\x00\xFF\xE0".to_vec())]);
    assert_eq!(tag.padding, 0);
}

#[test]
fn v24_unsynchronized_data_length_test() {
    let mut raw = encode_synch_int(3, false).unwrap();
    raw.extend_from_slice(b"\x00\xFF\x00\xE0");
    let body = v4_frame("TALB", [0x40, 0b0000_0011], &raw);
    let tag = super::parse(&tag_bytes(4, 0x00, &body)).unwrap();

    assert_eq!(
        tag.frames,
        vec![Frame {
            id: "TALB".to_string(),
            flags: [0x40, 0x00],
            payload: b"\x00\xFF\xE0".to_vec(),
        }]
    );
}

#[test]
fn v24_compressed_frame_left_alone_test() {
    let mut raw = encode_synch_int(64, false).unwrap();
    raw.extend_from_slice(b"zlib data");
    let body = v4_frame("TIT2", [0x00, 0b0000_1001], &raw);
    let tag = super::parse(&tag_bytes(4, 0x00, &body)).unwrap();

    let frame = &tag.frames[0];
    assert_eq!(frame.payload, raw);
    assert_eq!(frame.flags, [0x00, 0b0000_1001]);
    assert!(frame.is_opaque(4));
}

#[test]
fn v23_extended_header_crc_test() {
    let frames = v3_frame("TIT2", b"\x00Title\x00");
    let crc = crc::crc32::checksum_ieee(&frames);

    let mut body = b"\x00\x00\x00\x0A\x80\x00\x00\x00\x00\x04".to_vec();
    body.extend_from_slice(&crc.to_be_bytes());
    body.extend_from_slice(&frames);
    body.extend_from_slice(&[0; 4]);

    let (header, tag) = super::parse_with_header(&tag_bytes(3, 0b0100_0000, &body)).unwrap();
    let ext = header.extended_header.unwrap();

    assert_eq!(ext.crc32, Some(crc));
    assert_eq!(ext.padding, Some(4));
    assert_eq!(ext.size, 14);
    assert_eq!(tag.ids(), vec!["TIT2"]);
    assert_eq!(tag.padding, 4);
}

#[test]
fn v24_extended_header_test() {
    // update flag (no data) and restrictions (one byte)
    let mut body = b"\x00\x00\x00\x09\x01\x50\x00\x01\x04".to_vec();
    body.append(&mut v4_frame("TPE1", [0x00, 0x00], b"\x03Artist"));

    let (header, tag) = super::parse_with_header(&tag_bytes(4, 0b0100_0000, &body)).unwrap();
    let ext = header.extended_header.unwrap();

    assert!(ext.tag_is_update);
    assert_eq!(ext.restrictions, Some(0x04));
    assert_eq!(ext.crc32, None);
    assert_eq!(tag.ids(), vec!["TPE1"]);
}

#[test]
fn footer_tag_len_test() {
    let body = v4_frame("TPE1", [0x00, 0x00], b"\x03Artist");
    let mut input = tag_bytes(4, 0b0001_0000, &body);
    input.extend_from_slice(b"3DI\x04\x00\x10");
    let size = input[6..10].to_vec();
    input.extend_from_slice(&size);

    let header = super::header(&input).unwrap();
    assert!(header.has_footer);
    assert_eq!(header.tag_len(), 10 + body.len() + 10);
    assert_eq!(header.tag_len(), input.len());
}

#[test]
fn unknown_header_flags_test() {
    let body = v3_frame("TIT2", b"\x00x");
    match super::parse(&tag_bytes(3, 0b0000_0001, &body)) {
        Err(TagError::MalformedHeader(_)) => (),
        x => panic!("expected MalformedHeader, got {:?}", x),
    }
}

#[test]
fn serialize_size_fields_test() {
    let payload = vec![b'a'; 200];

    let mut tag = Tag::new(3);
    tag.frames.push(Frame::new("TALB", payload.clone()));
    tag.padding = 32;
    let v3 = super::serialize(&tag).unwrap();
    assert_eq!(&v3[0..6], b"ID3\x03\x00\x00");
    assert_eq!(&v3[6..10], &encode_synch_int(210 + 32, false).unwrap()[..]);
    assert_eq!(&v3[14..18], &[0x00, 0x00, 0x00, 0xC8]);
    assert_eq!(v3.len(), 10 + 210 + 32);

    tag.version = 4;
    let v4 = super::serialize(&tag).unwrap();
    assert_eq!(&v4[14..18], &[0x00, 0x00, 0x01, 0x48]);
}

#[test]
fn serialize_round_trip_test() {
    let tag = Tag {
        version: 4,
        revision: 0,
        is_experimental: true,
        frames: vec![
            Frame::new("TIT2", b"\x01\xFF\xFEa\x00".to_vec()),
            Frame {
                id: "APIC".to_string(),
                flags: [0x60, 0x00],
                payload: vec![0xFF; 300],
            },
            Frame::new("TCON", Vec::new()),
        ],
        padding: 7,
    };

    let bytes = super::serialize(&tag).unwrap();
    assert_eq!(super::parse(&bytes), Ok(tag));
}

#[test]
fn serialize_rejects_bad_ids_test() {
    let mut tag = Tag::new(3);
    tag.frames.push(Frame::new("tit2", b"\x00x".to_vec()));
    match super::serialize(&tag) {
        Err(TagError::MalformedFrame { .. }) => (),
        x => panic!("expected MalformedFrame, got {:?}", x),
    }

    assert_eq!(
        super::serialize(&Tag::new(2)),
        Err(TagError::UnsupportedVersion(2))
    );
}

fn arb_frame() -> impl Strategy<Value = Frame> {
    (
        "[A-Z][A-Z0-9]{3}",
        any::<u8>(),
        proptest::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(id, status, payload)| Frame {
            id,
            flags: [status, 0x00],
            payload,
        })
}

fn arb_tag() -> impl Strategy<Value = Tag> {
    (
        3u8..=4,
        any::<u8>(),
        any::<bool>(),
        proptest::collection::vec(arb_frame(), 0..8),
        0usize..64,
    )
        .prop_map(|(version, revision, is_experimental, frames, padding)| Tag {
            version,
            revision,
            is_experimental,
            frames,
            padding,
        })
}

proptest! {
    #[test]
    fn round_trip_property(tag in arb_tag()) {
        let bytes = super::serialize(&tag).unwrap();
        let header = super::header(&bytes).unwrap();
        prop_assert_eq!(header.tag_len(), bytes.len());
        prop_assert_eq!(super::parse(&bytes), Ok(tag));
    }
}
