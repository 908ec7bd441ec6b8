// src/error.rs
//
// Errors surfaced by the I/O edges of the converter. Conversion itself never
// fails: malformed markup and unknown entities are recovered in place.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read standard input")]
    ReadStdin(#[source] io::Error),

    #[error("failed to write output")]
    WriteOutput(#[source] io::Error),
}
