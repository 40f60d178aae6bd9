use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated input at offset {offset}: needed {needed} bytes, had {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("bad format at offset {offset}: {reason}")]
    BadFormat { offset: usize, reason: &'static str },

    #[error("unsupported index version {version}: expected 4 or 5")]
    UnsupportedVersion { version: u32 },

    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    #[error("database is {actual}, but this operation only supports protein databases")]
    UnsupportedDatabase { actual: &'static str },

    #[error("a record-decode thread panicked: {0}")]
    WorkerPanicked(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
