use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors produced while splitting a story
#[derive(Debug, Error)]
pub enum Error {
    /// Content was found before the first passage header in strict mode.
    /// `line` is 1-based
    #[error("line {line} does not belong to any passage: {text:?}")]
    Structure { line: usize, text: String },

    /// Reading the story, creating a directory, or writing a file failed
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be used
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
