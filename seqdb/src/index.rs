//! Index-file parser and header-file slicer.

use crate::cursor::Cursor;
use crate::error::{DbError, Result};

/// Parsed contents of the index file, including both of its parallel
/// offset tables (and a third when the database holds nucleotide data).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct IndexRecord {
    pub version: u32,
    pub is_protein: bool,
    pub volume_number: Option<u32>,
    pub title: String,
    pub lmdb_name: Option<String>,
    pub creation_date: String,
    pub num_records: u32,
    pub total_residues: u64,
    pub max_length: u32,
    pub header_offsets: Vec<u32>,
    pub sequence_offsets: Vec<u32>,
    pub ambiguity_offsets: Option<Vec<u32>>,
}

/// Parse the full index file. Trailing bytes after the last offset table
/// are tolerated and surfaced as a warning rather than an error.
pub fn parse_index(bytes: &[u8]) -> Result<(IndexRecord, Vec<String>)> {
    let mut cur = Cursor::new(bytes);

    let version = cur.read_u32_be()?;
    if version != 4 && version != 5 {
        return Err(DbError::UnsupportedVersion { version });
    }

    let sequence_type_flag = cur.read_u32_be()?;
    let is_protein = sequence_type_flag == 1;

    let volume_number = if version == 5 {
        Some(cur.read_u32_be()?)
    } else {
        None
    };

    let title = cur.read_length_prefixed_string()?;

    let lmdb_name = if version == 5 {
        Some(cur.read_length_prefixed_string()?)
    } else {
        None
    };

    let creation_date = cur.read_length_prefixed_string()?;

    let num_records = cur.read_u32_be()?;
    let total_residues = cur.read_u64_mixed()?;
    let max_length = cur.read_u32_be()?;

    let table_len = num_records as usize + 1;
    let header_offsets = cur.read_offset_table(table_len)?;
    let sequence_offsets = cur.read_offset_table(table_len)?;
    let ambiguity_offsets = if is_protein {
        None
    } else {
        Some(cur.read_offset_table(table_len)?)
    };

    validate_offset_table(&header_offsets, num_records)?;
    validate_offset_table(&sequence_offsets, num_records)?;
    if let Some(ref t) = ambiguity_offsets {
        validate_offset_table(t, num_records)?;
    }
    if num_records > 0 {
        if sequence_offsets[0] >= sequence_offsets[num_records as usize] {
            return Err(DbError::CorruptIndex {
                reason: format!(
                    "sequence_offsets[0] ({}) >= sequence_offsets[{}] ({})",
                    sequence_offsets[0], num_records, sequence_offsets[num_records as usize]
                ),
            });
        }
    }

    let mut warnings = Vec::new();
    if !cur.is_empty() {
        let msg = format!(
            "index file: {} trailing byte(s) after offset tables",
            cur.remaining()
        );
        log::warn!("{msg}");
        warnings.push(msg);
    }

    Ok((
        IndexRecord {
            version,
            is_protein,
            volume_number,
            title,
            lmdb_name,
            creation_date,
            num_records,
            total_residues,
            max_length,
            header_offsets,
            sequence_offsets,
            ambiguity_offsets,
        },
        warnings,
    ))
}

fn validate_offset_table(table: &[u32], num_records: u32) -> Result<()> {
    if table.len() != num_records as usize + 1 {
        return Err(DbError::CorruptIndex {
            reason: format!(
                "offset table has {} entries, expected {}",
                table.len(),
                num_records + 1
            ),
        });
    }
    for pair in table.windows(2) {
        if pair[0] > pair[1] {
            return Err(DbError::CorruptIndex {
                reason: format!("offset table not monotonically non-decreasing: {pair:?}"),
            });
        }
    }
    Ok(())
}

/// Extract the raw header blob for record `i` from the header file's bytes.
pub fn slice_header<'a>(index: &IndexRecord, header_bytes: &'a [u8], i: usize) -> Result<&'a [u8]> {
    slice_range(&index.header_offsets, header_bytes, i)
}

/// Extract the raw sequence byte range for record `i` from the sequence
/// file's bytes.
pub fn slice_sequence<'a>(
    index: &IndexRecord,
    sequence_bytes: &'a [u8],
    i: usize,
) -> Result<&'a [u8]> {
    slice_range(&index.sequence_offsets, sequence_bytes, i)
}

fn slice_range<'a>(offsets: &[u32], file_bytes: &'a [u8], i: usize) -> Result<&'a [u8]> {
    let start = *offsets.get(i).ok_or_else(|| DbError::CorruptIndex {
        reason: format!("record {i} has no offset-table entry"),
    })? as usize;
    let end = *offsets.get(i + 1).ok_or_else(|| DbError::CorruptIndex {
        reason: format!("record {i} has no end offset-table entry"),
    })? as usize;

    if start > end {
        return Err(DbError::CorruptIndex {
            reason: format!("record {i}: inverted range [{start}, {end})"),
        });
    }
    if end > file_bytes.len() {
        return Err(DbError::CorruptIndex {
            reason: format!(
                "record {i}: range end {end} exceeds file length {}",
                file_bytes.len()
            ),
        });
    }
    Ok(&file_bytes[start..end])
}
