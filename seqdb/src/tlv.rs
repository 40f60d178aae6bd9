//! Low-level tag-length-value reader for the header-blob encoding.
//!
//! Every element is read through [`read_element`], which normalizes both
//! definite- and indefinite-length framing into an owned byte slice. Once an
//! element has been captured this way, callers never have to reason about
//! indefinite lengths again — they just index into the returned bytes.

use crate::cursor::Cursor;
use crate::error::{DbError, Result};

/// Maximum nesting depth for indefinite-length element scanning. Bounds
/// recursion so a hostile or corrupt blob cannot exhaust the stack.
const MAX_NESTING_DEPTH: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: Class,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub fn is_universal(&self, number: u32) -> bool {
        self.class == Class::Universal && self.number == number
    }

    pub fn is_context(&self, number: u32) -> bool {
        self.class == Class::ContextSpecific && self.number == number
    }
}

/// Universal tag numbers this decoder treats as "string-like".
pub const STRING_LIKE_TAGS: &[u32] = &[12, 18, 19, 20, 21, 22, 25, 26, 27, 28, 29, 30];

pub fn is_string_like(tag: &Tag) -> bool {
    tag.class == Class::Universal && STRING_LIKE_TAGS.contains(&tag.number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

/// Read a single tag octet (plus any multi-byte number continuation).
pub fn read_tag(cur: &mut Cursor) -> Result<Tag> {
    let start = cur.position();
    let first = cur.read_u8()?;

    let class = match first >> 6 {
        0b00 => Class::Universal,
        0b01 => Class::Application,
        0b10 => Class::ContextSpecific,
        _ => Class::Private,
    };
    let constructed = first & 0x20 != 0;
    let low5 = first & 0x1F;

    let number = if low5 == 0x1F {
        let mut value: u32 = 0;
        loop {
            let b = cur.read_u8()?;
            value = value
                .checked_shl(7)
                .ok_or(DbError::BadFormat {
                    offset: start,
                    reason: "tag number overflow",
                })?
                | (b & 0x7F) as u32;
            if b & 0x80 == 0 {
                break;
            }
        }
        value
    } else {
        low5 as u32
    };

    Ok(Tag {
        class,
        constructed,
        number,
    })
}

/// Read a length octet (and any trailing long-form bytes).
pub fn read_length(cur: &mut Cursor) -> Result<Length> {
    let start = cur.position();
    let first = cur.read_u8()?;

    if first == 0x80 {
        return Ok(Length::Indefinite);
    }
    if first & 0x80 == 0 {
        return Ok(Length::Definite(first as usize));
    }

    let k = (first & 0x7F) as usize;
    if k == 0 || k > 8 {
        return Err(DbError::BadFormat {
            offset: start,
            reason: "length byte count out of range",
        });
    }
    let bytes = cur.take(k)?;
    let mut value: u64 = 0;
    for &b in bytes {
        value = (value << 8) | b as u64;
    }
    Ok(Length::Definite(value as usize))
}

/// True if the next two bytes are the end-of-contents marker `00 00`
/// (peeking only; does not consume).
pub fn at_eoc(cur: &Cursor) -> bool {
    matches!(cur.peek(2), Ok([0x00, 0x00]))
}

/// Read and discard one element (definite or indefinite, recursively for
/// constructed children), never looping on malformed input.
pub fn skip_element(cur: &mut Cursor) -> Result<()> {
    skip_element_depth(cur, 0)
}

fn skip_element_depth(cur: &mut Cursor, depth: u32) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(DbError::BadFormat {
            offset: cur.position(),
            reason: "nesting depth exceeded",
        });
    }

    let tag = read_tag(cur)?;
    let length = read_length(cur)?;

    match length {
        Length::Definite(n) => {
            cur.advance(n)?;
        }
        Length::Indefinite => {
            if !tag.constructed {
                return Err(DbError::BadFormat {
                    offset: cur.position(),
                    reason: "indefinite length on primitive element",
                });
            }
            loop {
                if at_eoc(cur) {
                    cur.advance(2)?;
                    break;
                }
                let before = cur.position();
                skip_element_depth(cur, depth + 1)?;
                if cur.position() <= before {
                    return Err(DbError::BadFormat {
                        offset: before,
                        reason: "no forward progress while scanning indefinite element",
                    });
                }
            }
        }
    }
    Ok(())
}

/// Read one element, returning its tag and an owned copy of its content
/// octets. Definite-length elements are sliced directly. Indefinite-length
/// elements are walked (recursively, depth-bounded) to find their own
/// end-of-contents marker, which is consumed as part of the element but
/// excluded from the returned bytes.
pub fn read_element(cur: &mut Cursor) -> Result<(Tag, Vec<u8>)> {
    read_element_depth(cur, 0)
}

fn read_element_depth(cur: &mut Cursor, depth: u32) -> Result<(Tag, Vec<u8>)> {
    if depth > MAX_NESTING_DEPTH {
        return Err(DbError::BadFormat {
            offset: cur.position(),
            reason: "nesting depth exceeded",
        });
    }

    let tag = read_tag(cur)?;
    let length = read_length(cur)?;

    match length {
        Length::Definite(n) => {
            let bytes = cur.take(n)?.to_vec();
            Ok((tag, bytes))
        }
        Length::Indefinite => {
            if !tag.constructed {
                return Err(DbError::BadFormat {
                    offset: cur.position(),
                    reason: "indefinite length on primitive element",
                });
            }
            let content_start = cur.position();
            loop {
                if at_eoc(cur) {
                    let content_end = cur.position();
                    let span = content_end - content_start;
                    let full = cur_slice_from(cur, content_start, span);
                    cur.advance(2)?;
                    return Ok((tag, full));
                }
                let before = cur.position();
                skip_element_depth(cur, depth + 1)?;
                if cur.position() <= before {
                    return Err(DbError::BadFormat {
                        offset: before,
                        reason: "no forward progress while scanning indefinite element",
                    });
                }
            }
        }
    }
}

/// Helper: recover a byte span that has already been scanned by rewinding a
/// temporary read over the cursor's underlying buffer. `Cursor` does not
/// expose its buffer directly, so this takes the bytes via `peek` from a
/// cursor manually re-positioned to `start`.
fn cur_slice_from(cur: &Cursor, start: usize, len: usize) -> Vec<u8> {
    let mut rewound = *cur;
    rewound.set_position(start);
    rewound.peek(len).map(|s| s.to_vec()).unwrap_or_default()
}
