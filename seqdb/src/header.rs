//! Header-blob decoder: walks the TLV stream inside one record's
//! header blob and extracts definition lines, tolerating malformed input by
//! recovering whatever partial results it can instead of aborting.

use crate::cursor::Cursor;
use crate::seqid::{parse_seqid, SeqId};
use crate::tlv::{self, is_string_like, Class, Tag};

/// A single definition line: a title, its cross-referenced identifiers, and
/// an optional taxonomy id.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct DefinitionLine {
    pub title: String,
    pub seqids: Vec<SeqId>,
    pub taxid: Option<i64>,
}

/// Decode the full header blob for one record. Never fails: a malformed blob
/// simply yields fewer/partial definition lines plus warnings describing
/// what went wrong.
pub fn decode_header_blob(bytes: &[u8]) -> (Vec<DefinitionLine>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut lines = Vec::new();

    let mut cur = Cursor::new(bytes);
    let (outer_tag, outer_payload) = match tlv::read_element(&mut cur) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(format!("header blob: {e}"));
            return (lines, warnings);
        }
    };
    if !outer_tag.is_universal(16) {
        warnings.push(format!(
            "header blob: expected universal SEQUENCE (tag 16), got {outer_tag:?}"
        ));
    }

    let mut body = Cursor::new(&outer_payload);
    while !body.is_empty() {
        let before = body.position();
        let (line_tag, line_payload) = match tlv::read_element(&mut body) {
            Ok(v) => v,
            Err(e) => {
                warnings.push(format!("header blob: {e}"));
                break;
            }
        };
        if body.position() <= before {
            warnings.push("header blob: no forward progress".to_string());
            break;
        }
        if !line_tag.is_universal(16) {
            warnings.push(format!(
                "definition line: expected universal SEQUENCE (tag 16), got {line_tag:?}"
            ));
        }
        let (line, line_warnings) = decode_definition_line(&line_payload);
        warnings.extend(line_warnings);
        lines.push(line);
    }

    (lines, warnings)
}

/// Decode the fields of one definition line's already-bounded payload.
/// Recovers partial results: a failure on any one field stops processing the
/// rest of *this* line but does not discard fields already decoded.
fn decode_definition_line(payload: &[u8]) -> (DefinitionLine, Vec<String>) {
    let mut line = DefinitionLine::default();
    let mut warnings = Vec::new();

    let mut cur = Cursor::new(payload);
    while !cur.is_empty() {
        let before = cur.position();
        let (field_tag, field_bytes) = match tlv::read_element(&mut cur) {
            Ok(v) => v,
            Err(e) => {
                warnings.push(format!("definition line: {e}"));
                break;
            }
        };
        if cur.position() <= before {
            warnings.push("definition line: no forward progress".to_string());
            break;
        }
        if field_tag.class != Class::ContextSpecific {
            continue;
        }
        match field_tag.number {
            0 => {
                if let Some(title) = decode_title_wrapper(&field_bytes) {
                    line.title = title;
                }
            }
            1 => {
                line.seqids = decode_seqid_list(&field_bytes);
            }
            2 => {
                line.taxid = decode_taxid_wrapper(&field_bytes);
            }
            _ => {}
        }
    }

    (line, warnings)
}

/// Explicit-wrapper title: find the first string-like element in the
/// wrapper's body, skipping anything else. Handles both the canonical case
/// (the first element is already string-like) and the fallback permissive
/// scan (the first element isn't, but a later one is) with the same loop.
fn decode_title_wrapper(wrapper_payload: &[u8]) -> Option<String> {
    let mut cur = Cursor::new(wrapper_payload);
    while !cur.is_empty() {
        let before = cur.position();
        let Ok((tag, bytes)) = tlv::read_element(&mut cur) else {
            break;
        };
        if cur.position() <= before {
            break;
        }
        if is_string_like(&tag) {
            return Some(decode_string_like(&tag, &bytes));
        }
    }
    None
}

/// Explicit-wrapper taxid: find the first universal INTEGER in the wrapper's
/// body.
fn decode_taxid_wrapper(wrapper_payload: &[u8]) -> Option<i64> {
    let mut cur = Cursor::new(wrapper_payload);
    while !cur.is_empty() {
        let before = cur.position();
        let Ok((tag, bytes)) = tlv::read_element(&mut cur) else {
            break;
        };
        if cur.position() <= before {
            break;
        }
        if tag.is_universal(2) {
            return crate::seqid::decode_integer(&bytes);
        }
    }
    None
}

/// Concatenate the primitive chunks of a (possibly constructed) string-like
/// element, skipping any non-string-like children.
fn decode_string_like(tag: &Tag, bytes: &[u8]) -> String {
    if !tag.constructed {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let mut out = String::new();
    let mut cur = Cursor::new(bytes);
    while !cur.is_empty() {
        let before = cur.position();
        let Ok((child_tag, child_bytes)) = tlv::read_element(&mut cur) else {
            break;
        };
        if cur.position() <= before {
            break;
        }
        if is_string_like(&child_tag) {
            out.push_str(&decode_string_like(&child_tag, &child_bytes));
        }
    }
    out
}

/// seqid-list field: concatenated sequence-identifier choice elements
/// directly in the field's body (no extra universal SEQUENCE layer).
fn decode_seqid_list(list_payload: &[u8]) -> Vec<SeqId> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(list_payload);
    while !cur.is_empty() {
        let before = cur.position();
        let Ok((tag, bytes)) = tlv::read_element(&mut cur) else {
            break;
        };
        if cur.position() <= before {
            break;
        }
        if tag.class == Class::ContextSpecific {
            out.push(parse_seqid(&tag, &bytes));
        }
    }
    out
}
