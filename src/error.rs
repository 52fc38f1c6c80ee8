use thiserror::Error;

/// Errors that abort a controller operation.
///
/// Rejected mutations, parse anomalies and unresolved references are not
/// errors: they surface as `Ok(false)`, a `tracing` warning, or a missing
/// entry respectively.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot find arcconf binary '{0}'")]
    BinaryNotFound(String),

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("query `{command}` failed with code {code}")]
    Query { command: String, code: i32 },

    #[error("`{command}` returned undocumented code {code}")]
    UnexpectedCode { command: String, code: i32 },
}

pub type Result<T> = std::result::Result<T, Error>;
