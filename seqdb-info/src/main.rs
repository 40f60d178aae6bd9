use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use seqdb::Database;

#[derive(Parser)]
#[command(name = "seqdb-info", about = "Inspect a legacy sequence-database index/header/sequence trio")]
struct Args {
    /// Path to the database's index file (companion header/sequence files are
    /// derived by extension convention: .pin -> .phr/.psq, .nin -> .nhr/.nsq)
    #[arg(required_unless_present_any = ["schema", "version"])]
    index_file: Option<PathBuf>,

    /// Directory to write per-record raw header blobs (header_<i>.bin)
    output_dir: Option<PathBuf>,

    /// Dump the decoded database as JSON
    #[arg(long)]
    json: bool,

    /// Print the JSON schema for the decoded record type and exit
    #[arg(long)]
    schema: bool,

    /// Display version and quit
    #[arg(long)]
    version: bool,
}

/// Derive the header- and sequence-file paths from the index-file path by
/// swapping its extension's middle and last letters: `.pin`/`.nin` ->
/// `.phr`/`.nhr` and `.psq`/`.nsq`.
fn companion_paths(index_file: &Path) -> (PathBuf, PathBuf) {
    let ext = index_file.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut chars: Vec<char> = ext.chars().collect();
    if chars.len() != 3 {
        return (index_file.with_extension("phr"), index_file.with_extension("psq"));
    }
    chars[1] = 'h';
    chars[2] = 'r';
    let header_ext: String = chars.iter().collect();
    chars[1] = 's';
    chars[2] = 'q';
    let sequence_ext: String = chars.iter().collect();
    (index_file.with_extension(header_ext), index_file.with_extension(sequence_ext))
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.version {
        seqdb::version::print_cli_version_banner(
            "seqdb-info",
            env!("CARGO_PKG_VERSION"),
            env!("RELEASE_VERSION"),
            env!("GIT_COMMIT"),
        );
        return Ok(());
    }

    if args.schema {
        let schema = schemars::schema_for!(seqdb::Record);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let index_file = args
        .index_file
        .ok_or("INDEX_FILE is required unless --version or --schema is specified")?;
    let (header_path, sequence_path) = companion_paths(&index_file);

    let index_bytes = fs::read(&index_file)
        .map_err(|e| format!("reading index file '{}': {e}", index_file.display()))?;
    let header_bytes = fs::read(&header_path)
        .map_err(|e| format!("reading header file '{}': {e}", header_path.display()))?;
    let sequence_bytes = fs::read(&sequence_path)
        .map_err(|e| format!("reading sequence file '{}': {e}", sequence_path.display()))?;

    let (db, index_warnings) = Database::open(&index_bytes, &header_bytes, &sequence_bytes)?;
    for w in &index_warnings {
        log::warn!("{w}");
    }

    let records = db.decode_all()?;

    if args.json {
        println!("{}", serde_json::to_string(&records)?);
        return Ok(());
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .map_err(|e| format!("creating output directory '{}': {e}", dir.display()))?;
        for i in 0..db.num_records() {
            let blob = seqdb::index::slice_header(&db.index, &header_bytes, i)?;
            let path = dir.join(format!("header_{i}.bin"));
            fs::write(&path, blob).map_err(|e| format!("writing '{}': {e}", path.display()))?;
        }
    }

    println!(
        "{} ({}), {} record(s), max length {}",
        db.index.title,
        if db.index.is_protein { "protein" } else { "nucleotide" },
        db.index.num_records,
        db.index.max_length,
    );
    for record in &records {
        let title = record
            .definitions
            .first()
            .map(|d| d.title.as_str())
            .unwrap_or("");
        let seq_len = record.sequence.as_ref().map(|s| s.len()).unwrap_or(0);
        println!("  [{}] {} ({} residues)", record.oid, title, seq_len);
        for w in &record.warnings {
            println!("      warning: {w}");
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(2);
    }
}
