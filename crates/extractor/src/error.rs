use thiserror::Error;

/// Errors raised while decoding a chunk or writing its mesh.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("stream ended reading {wanted} bytes at 0x{offset:X}")]
    TruncatedRead { offset: u64, wanted: usize },
    #[error("no terminal tripart within {limit} records starting at 0x{offset:X}")]
    UnterminatedTripartStream { offset: u64, limit: usize },
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("virtual offset 0x{offset:X} resolves outside section '{section}'")]
    AddressOutOfRange { section: String, offset: i64 },
    #[error("texture index {index} outside material list of {count} entries")]
    MissingMaterial { index: usize, count: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ExtractResult<T> = Result<T, ExtractError>;
