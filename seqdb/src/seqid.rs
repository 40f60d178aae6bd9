//! Sequence-identifier variant table and decoding.

use crate::tlv::{self, Class, Tag};

/// The 20 well-known sequence-identifier categories, indexed by their
/// choice-tag number. Built once as a `const` array, not a runtime global.
pub const SEQID_TYPE_NAMES: [&str; 20] = [
    "local",
    "gibbsq",
    "gibbmt",
    "giim",
    "genbank",
    "embl",
    "pir",
    "swissprot",
    "patent",
    "other",
    "general",
    "gi",
    "ddbj",
    "prf",
    "pdb",
    "tpg",
    "tpe",
    "tpd",
    "gpipe",
    "named-annot-track",
];

pub const PDB_TAG_NUMBER: u32 = 14;

/// Look up the type name for a choice-tag number, falling back to
/// `unknown-{number}` for anything outside the known 20.
pub fn seqid_type_name(number: u32) -> String {
    match SEQID_TYPE_NAMES.get(number as usize) {
        Some(name) => name.to_string(),
        None => format!("unknown-{number}"),
    }
}

/// A decoded sequence identifier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SeqId {
    /// One of the 20 well-known type names, or `unknown-{n}`.
    pub r#type: String,
    /// For `pdb`, the molecule name. For purely-integer variants, the
    /// decimal form of the integer. Otherwise the identifier's accession-like
    /// value.
    pub value: String,
    /// For `pdb`, the chain number. For other variants, a version number if
    /// present.
    pub version: Option<i64>,
}

/// Big-endian two's-complement integer decode. Zero-length is an error.
pub fn decode_integer(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() {
        return None;
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut value: i64 = if negative { -1 } else { 0 };
    for &b in bytes {
        value = (value << 8) | b as i64;
    }
    Some(value)
}

/// Longest run of `[A-Za-z0-9_.]` bytes, used as last-resort value recovery.
pub fn longest_identifier_run(bytes: &[u8]) -> String {
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'.';

    let mut best_start = 0;
    let mut best_len = 0;
    let mut cur_start = 0;
    let mut cur_len = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if is_ident(b) {
            if cur_len == 0 {
                cur_start = i;
            }
            cur_len += 1;
            if cur_len > best_len {
                best_len = cur_len;
                best_start = cur_start;
            }
        } else {
            cur_len = 0;
        }
    }
    String::from_utf8_lossy(&bytes[best_start..best_start + best_len]).into_owned()
}

/// Decode one sequence-identifier element given its choice tag and content
/// octets (as already captured by [`tlv::read_element`]).
pub fn parse_seqid(tag: &Tag, payload: &[u8]) -> SeqId {
    let type_name = seqid_type_name(tag.number);

    let mut value = String::new();
    let mut version = None;

    if !tag.constructed {
        // Implicit tagging: the content octets ARE the integer.
        if let Some(n) = decode_integer(payload) {
            value = n.to_string();
        }
    } else if tag.number == PDB_TAG_NUMBER {
        parse_pdb_body(payload, &mut value, &mut version);
    } else {
        parse_text_style_body(payload, &mut value, &mut version);
    }

    if value.is_empty() {
        value = longest_identifier_run(payload);
    }

    SeqId {
        r#type: type_name,
        value,
        version,
    }
}

/// pdb variant: body is a universal sequence; first universal-26 string is
/// the molecule name, first universal-2 integer is the chain number.
fn parse_pdb_body(payload: &[u8], value: &mut String, version: &mut Option<i64>) {
    let mut cur = crate::cursor::Cursor::new(payload);
    let Ok((seq_tag, seq_body)) = tlv::read_element(&mut cur) else {
        return;
    };
    if !seq_tag.is_universal(16) {
        return;
    }

    let mut body_cur = crate::cursor::Cursor::new(&seq_body);
    while !body_cur.is_empty() {
        let before = body_cur.position();
        let Ok((elem_tag, elem_bytes)) = tlv::read_element(&mut body_cur) else {
            break;
        };
        if body_cur.position() <= before {
            break;
        }
        if value.is_empty() && elem_tag.is_universal(26) {
            *value = String::from_utf8_lossy(&elem_bytes).into_owned();
        } else if version.is_none() && elem_tag.is_universal(2) {
            *version = decode_integer(&elem_bytes);
        }
    }
}

/// Any other constructed variant: body is context-specific fields, tag 0 or 1
/// gives the value (prefer 1), tag 3 gives the version.
fn parse_text_style_body(payload: &[u8], value: &mut String, version: &mut Option<i64>) {
    let mut cur = crate::cursor::Cursor::new(payload);
    let mut tag0_value: Option<String> = None;

    while !cur.is_empty() {
        let before = cur.position();
        let Ok((field_tag, field_bytes)) = tlv::read_element(&mut cur) else {
            break;
        };
        if cur.position() <= before {
            break;
        }
        if field_tag.class != Class::ContextSpecific {
            continue;
        }
        match field_tag.number {
            0 => {
                tag0_value = Some(string_from_bytes_like(&field_tag, &field_bytes));
            }
            1 => {
                *value = string_from_bytes_like(&field_tag, &field_bytes);
            }
            3 => {
                *version = decode_integer(&field_bytes).or_else(|| {
                    // field 3 may itself be a simple explicit wrapper around
                    // a universal integer.
                    let mut inner = crate::cursor::Cursor::new(&field_bytes);
                    tlv::read_element(&mut inner)
                        .ok()
                        .and_then(|(_, b)| decode_integer(&b))
                });
            }
            _ => {}
        }
    }

    if value.is_empty() {
        if let Some(v) = tag0_value {
            *value = v;
        }
    }
}

/// Best-effort conversion of a field's content bytes to a string: if the
/// bytes themselves look like raw text, use them directly; this covers both
/// implicitly-tagged text fields and those that wrap a nested string element.
fn string_from_bytes_like(_tag: &Tag, bytes: &[u8]) -> String {
    // Try treating the bytes as a nested TLV string element first (some
    // volumes wrap these explicitly); fall back to raw bytes.
    let mut cur = crate::cursor::Cursor::new(bytes);
    if let Ok((inner_tag, inner_bytes)) = tlv::read_element(&mut cur) {
        if tlv::is_string_like(&inner_tag) && cur.is_empty() {
            return String::from_utf8_lossy(&inner_bytes).into_owned();
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::read_element;

    #[test]
    fn test_seqid_type_name_known() {
        assert_eq!(seqid_type_name(11), "gi");
        assert_eq!(seqid_type_name(14), "pdb");
    }

    #[test]
    fn test_seqid_type_name_unknown() {
        assert_eq!(seqid_type_name(99), "unknown-99");
    }

    #[test]
    fn test_decode_integer_positive() {
        assert_eq!(decode_integer(&[0x00, 0x00, 0x12, 0x34]), Some(4660));
    }

    #[test]
    fn test_decode_integer_negative_sign_extends() {
        assert_eq!(decode_integer(&[0xFF]), Some(-1));
        assert_eq!(decode_integer(&[0x80]), Some(-128));
    }

    #[test]
    fn test_decode_integer_empty_fails() {
        assert_eq!(decode_integer(&[]), None);
    }

    #[test]
    fn test_parse_seqid_gi_primitive() {
        // Context-specific primitive tag 11, body 00 00 12 34.
        let data = [0x8B, 0x04, 0x00, 0x00, 0x12, 0x34];
        let mut cur = crate::cursor::Cursor::new(&data);
        let (tag, payload) = read_element(&mut cur).unwrap();
        let seqid = parse_seqid(&tag, &payload);
        assert_eq!(seqid.r#type, "gi");
        assert_eq!(seqid.value, "4660");
        assert_eq!(seqid.version, None);
    }

    #[test]
    fn test_parse_seqid_pdb() {
        // Context tag 14 constructed, body = universal sequence { universal-26
        // "2HBS", universal-2 integer 5 }.
        let inner_seq = [
            0x1A, 0x04, b'2', b'H', b'B', b'S', // universal-26 string
            0x02, 0x01, 0x05, // universal-2 integer = 5
        ];
        let mut body = vec![0x30, inner_seq.len() as u8];
        body.extend_from_slice(&inner_seq);
        let mut outer = vec![0xAE, body.len() as u8];
        outer.extend_from_slice(&body);

        let mut cur = crate::cursor::Cursor::new(&outer);
        let (tag, payload) = read_element(&mut cur).unwrap();
        let seqid = parse_seqid(&tag, &payload);
        assert_eq!(seqid.r#type, "pdb");
        assert_eq!(seqid.value, "2HBS");
        assert_eq!(seqid.version, Some(5));
    }

    #[test]
    fn test_parse_seqid_text_style() {
        // Some other constructed tag (e.g. swissprot = 7), body = context
        // tag1 "NP_000001", context tag3 integer 2.
        let mut body = Vec::new();
        body.extend_from_slice(&[0x81, 0x09]);
        body.extend_from_slice(b"NP_000001");
        body.extend_from_slice(&[0x83, 0x01, 0x02]);

        let mut outer = vec![0xA7, body.len() as u8];
        outer.extend_from_slice(&body);

        let mut cur = crate::cursor::Cursor::new(&outer);
        let (tag, payload) = read_element(&mut cur).unwrap();
        let seqid = parse_seqid(&tag, &payload);
        assert_eq!(seqid.r#type, "swissprot");
        assert_eq!(seqid.value, "NP_000001");
        assert_eq!(seqid.version, Some(2));
    }

    #[test]
    fn test_last_resort_value_recovery() {
        // A malformed text-style identifier with no recognizable fields, but
        // containing an accession-like run of bytes.
        let body = b"\x00garbage\x00NP_123456.1\x00";
        let mut outer = vec![0xA9, body.len() as u8]; // tag 9 = "other", constructed
        outer.extend_from_slice(body);
        let mut cur = crate::cursor::Cursor::new(&outer);
        let (tag, payload) = read_element(&mut cur).unwrap();
        let seqid = parse_seqid(&tag, &payload);
        assert_eq!(seqid.value, "NP_123456.1");
    }

    #[test]
    fn test_longest_identifier_run() {
        assert_eq!(longest_identifier_run(b"!!abc.def_123!!"), "abc.def_123");
        assert_eq!(longest_identifier_run(b"###"), "");
    }
}
