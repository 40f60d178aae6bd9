use std::fs;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "seqdb-alias", about = "Print the title and constituent volumes named by a database alias file")]
struct Args {
    /// Path to the alias file
    alias_file: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let text = match fs::read_to_string(&args.alias_file) {
        Ok(t) => t,
        Err(e) => {
            log::error!("reading '{}': {e}", args.alias_file.display());
            std::process::exit(2);
        }
    };

    let alias = seqdb_alias::parse_alias_file(&text);
    println!("title: {}", alias.title.as_deref().unwrap_or("(none)"));
    println!("volumes:");
    for v in &alias.volumes {
        println!("  {v}");
    }
}
