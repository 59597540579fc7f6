use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The magic cookie or its AudioSpecificConfig could not be used.
    #[error(transparent)]
    Codec(#[from] m4akit_esds::Error),

    /// The byte sink failed mid-stream. The output is unusable.
    #[error("write error: {0}")]
    SinkWrite(#[source] io::Error),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
