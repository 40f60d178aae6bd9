use seqdb::Database;

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn push_string(buf: &mut Vec<u8>, s: &str) {
    push_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

fn wrap_definite(tag_byte: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag_byte, content.len() as u8];
    out.extend_from_slice(content);
    out
}

/// Build a minimal valid version-4 protein database with three records: one
/// clean record with a title and a gi seqid, one with a PDB identifier and a
/// taxid, and one with a deliberately malformed second definition line to
/// exercise the per-record recovery path end to end.
fn build_database() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    // Record 0: title "Reference protein", gi seqid 99, taxid 9606.
    let title0 = wrap_definite(0xA0, &wrap_definite(0x1A, b"Reference protein"));
    let gi = wrap_definite(0x8B, &[0, 0, 0, 99]);
    let seqid0 = wrap_definite(0xA1, &gi);
    let taxid_inner = wrap_definite(0x02, &[0x25, 0x86]); // 9606 big-endian
    let taxid0 = wrap_definite(0xA2, &taxid_inner);
    let mut line0_body = title0;
    line0_body.extend_from_slice(&seqid0);
    line0_body.extend_from_slice(&taxid0);
    let line0 = wrap_definite(0x30, &line0_body);
    let blob0 = wrap_definite(0x30, &line0);

    // Record 1: title "Crystal structure", PDB identifier.
    let title1 = wrap_definite(0xA0, &wrap_definite(0x1A, b"Crystal structure"));
    let pdb_inner_seq = {
        let mut s = wrap_definite(0x1A, b"1ABC");
        s.extend_from_slice(&wrap_definite(0x02, &[3]));
        wrap_definite(0x30, &s)
    };
    let pdb = wrap_definite(0xAE, &pdb_inner_seq);
    let seqid1 = wrap_definite(0xA1, &pdb);
    let mut line1_body = title1;
    line1_body.extend_from_slice(&seqid1);
    let line1 = wrap_definite(0x30, &line1_body);
    let blob1 = wrap_definite(0x30, &line1);

    // Record 2: two definition lines, the second with a truncated taxid field
    // so one full line and one partial line are recovered together.
    let good_title = wrap_definite(0xA0, &wrap_definite(0x1A, b"Partial record"));
    let good_line = wrap_definite(0x30, &good_title);
    let bad_taxid_field = vec![0xA2, 0x05, 0x02, 0x0A]; // declares length 5, only 2 present
    let bad_line = wrap_definite(0x30, &bad_taxid_field);
    let mut blob2_body = good_line;
    blob2_body.extend_from_slice(&bad_line);
    let blob2 = wrap_definite(0x30, &blob2_body);

    let mut header_bytes = Vec::new();
    header_bytes.extend_from_slice(&blob0);
    header_bytes.extend_from_slice(&blob1);
    header_bytes.extend_from_slice(&blob2);

    // Sequence bytes: record 0 "MAK" (12,1,10), record 1 "ED" (5,3), record 2 "G" (7).
    let sequence_bytes: Vec<u8> = vec![12, 1, 10, 5, 3, 7];

    let mut index_bytes = Vec::new();
    push_u32(&mut index_bytes, 4);
    push_u32(&mut index_bytes, 1); // protein
    push_string(&mut index_bytes, "integration-test-db");
    push_string(&mut index_bytes, "2026-01-01");
    push_u32(&mut index_bytes, 3); // num_records
    index_bytes.extend_from_slice(&[0; 8]); // total_residues (unused here)
    push_u32(&mut index_bytes, 18); // max_length

    let h0 = 0u32;
    let h1 = blob0.len() as u32;
    let h2 = h1 + blob1.len() as u32;
    let h3 = h2 + blob2.len() as u32;
    for off in [h0, h1, h2, h3] {
        push_u32(&mut index_bytes, off);
    }
    for off in [0u32, 3, 5, 6] {
        push_u32(&mut index_bytes, off);
    }

    (index_bytes, header_bytes, sequence_bytes)
}

#[test]
fn test_end_to_end_decode() {
    let (index_bytes, header_bytes, sequence_bytes) = build_database();
    let (db, index_warnings) = Database::open(&index_bytes, &header_bytes, &sequence_bytes)
        .expect("index should parse");
    assert!(index_warnings.is_empty());
    assert_eq!(db.num_records(), 3);

    let records = db.decode_all().expect("all records should decode");
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].definitions[0].title, "Reference protein");
    assert_eq!(records[0].definitions[0].seqids[0].r#type, "gi");
    assert_eq!(records[0].definitions[0].seqids[0].value, "99");
    assert_eq!(records[0].definitions[0].taxid, Some(9606));
    assert_eq!(records[0].sequence.as_deref(), Some("MAK"));

    assert_eq!(records[1].definitions[0].title, "Crystal structure");
    assert_eq!(records[1].definitions[0].seqids[0].r#type, "pdb");
    assert_eq!(records[1].definitions[0].seqids[0].value, "1ABC");
    assert_eq!(records[1].definitions[0].seqids[0].version, Some(3));
    assert_eq!(records[1].sequence.as_deref(), Some("ED"));

    assert_eq!(records[2].definitions.len(), 2);
    assert_eq!(records[2].definitions[0].title, "Partial record");
    assert_eq!(records[2].definitions[1].title, "");
    assert!(!records[2].warnings.is_empty());
    assert_eq!(records[2].sequence.as_deref(), Some("G"));
}

#[test]
fn test_parallel_matches_sequential_end_to_end() {
    let (index_bytes, header_bytes, sequence_bytes) = build_database();
    let (db, _) = Database::open(&index_bytes, &header_bytes, &sequence_bytes).unwrap();

    let sequential = db.decode_all().unwrap();
    let parallel = db.decode_all_parallel().unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_unsupported_version_is_fatal() {
    let mut index_bytes = Vec::new();
    push_u32(&mut index_bytes, 7);
    let result = Database::open(&index_bytes, &[], &[]);
    assert!(result.is_err());
}

#[test]
fn test_decode_is_repeatable_across_separate_opens() {
    let (index_bytes, header_bytes, sequence_bytes) = build_database();
    let (db1, _) = Database::open(&index_bytes, &header_bytes, &sequence_bytes).unwrap();
    let (db2, _) = Database::open(&index_bytes, &header_bytes, &sequence_bytes).unwrap();
    assert_eq!(db1.decode_all().unwrap(), db2.decode_all().unwrap());
}
