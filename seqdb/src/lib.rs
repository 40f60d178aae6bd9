//! Parser library for a legacy on-disk biological-sequence database: an
//! index file, a header-metadata file, and a raw-sequence file, read
//! together into fully reconstructed records.

pub mod cursor;
pub mod error;
pub mod header;
pub mod index;
pub mod residue;
pub mod seqid;
pub mod tlv;
pub mod version;

pub use error::{DbError, Result};
pub use header::DefinitionLine;
pub use index::IndexRecord;
pub use seqid::SeqId;

/// One fully reconstructed record: its decoded definition lines and, for
/// protein databases, its decoded residue sequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Record {
    pub oid: usize,
    pub definitions: Vec<DefinitionLine>,
    pub sequence: Option<String>,
    pub warnings: Vec<String>,
}

/// The three companion files that make up one database volume, already
/// loaded into memory.
pub struct Database<'a> {
    pub index: IndexRecord,
    pub header_bytes: &'a [u8],
    pub sequence_bytes: &'a [u8],
}

impl<'a> Database<'a> {
    /// Parse the index file and pair it with the already-loaded header and
    /// sequence file bytes. Trailing-byte warnings from the index parse are
    /// attached to the caller's own warning collection, not silently
    /// dropped.
    pub fn open(
        index_bytes: &[u8],
        header_bytes: &'a [u8],
        sequence_bytes: &'a [u8],
    ) -> Result<(Self, Vec<String>)> {
        let (index, warnings) = index::parse_index(index_bytes)?;
        Ok((
            Database {
                index,
                header_bytes,
                sequence_bytes,
            },
            warnings,
        ))
    }

    pub fn num_records(&self) -> usize {
        self.index.num_records as usize
    }

    /// Decode a single record by its ordinal index.
    pub fn decode_record(&self, oid: usize) -> Result<Record> {
        let header_blob = index::slice_header(&self.index, self.header_bytes, oid)?;
        let (definitions, mut warnings) = header::decode_header_blob(header_blob);

        let sequence = if self.index.is_protein {
            let range = index::slice_sequence(&self.index, self.sequence_bytes, oid)?;
            match residue::decode_protein_sequence(
                range,
                0,
                (range.len()) as u32,
            ) {
                Ok(s) => Some(s),
                Err(e) => {
                    let msg = format!("record {oid}: sequence decode failed: {e}");
                    log::warn!("{msg}");
                    warnings.push(msg);
                    None
                }
            }
        } else {
            None
        };

        for w in &warnings {
            log::warn!("record {oid}: {w}");
        }

        Ok(Record {
            oid,
            definitions,
            sequence,
            warnings,
        })
    }

    /// Decode every record in the database, in on-disk order.
    pub fn decode_all(&self) -> Result<Vec<Record>> {
        (0..self.num_records()).map(|i| self.decode_record(i)).collect()
    }

    /// Decode every record using one thread per available core, chunked by
    /// record index. Independent records share no mutable state, so this is
    /// safe without any synchronization beyond the join at the end of the
    /// scope. Results are reassembled in on-disk order.
    pub fn decode_all_parallel(&self) -> Result<Vec<Record>> {
        let n = self.num_records();
        if n == 0 {
            return Ok(Vec::new());
        }

        let num_threads = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
            .min(n);
        let chunk_size = n.div_ceil(num_threads);

        std::thread::scope(|scope| {
            let mut handles = Vec::new();
            for chunk_start in (0..n).step_by(chunk_size) {
                let chunk_end = (chunk_start + chunk_size).min(n);
                let db = &self;
                handles.push(scope.spawn(move || -> Result<Vec<Record>> {
                    (chunk_start..chunk_end).map(|i| db.decode_record(i)).collect()
                }));
            }

            let mut out = Vec::with_capacity(n);
            for h in handles {
                let chunk = h.join().map_err(|e| {
                    let msg = e
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| e.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic payload".to_string());
                    DbError::WorkerPanicked(msg)
                })??;
                out.extend(chunk);
            }
            Ok(out)
        })
    }
}
