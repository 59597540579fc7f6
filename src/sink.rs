use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Destination for encoded bytes.
///
/// Every [`Write`] is a sink, so files, stdout and `Vec<u8>` all qualify.
pub trait ByteSink {
    /// Writes all of `bytes` or fails.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush_bytes(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> ByteSink for W {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    fn flush_bytes(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Where an output stream goes. `-` means standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    /// Opens the target for writing, truncating an existing file.
    pub fn open(&self) -> Result<OutputSink> {
        match self {
            SinkTarget::Stdout => {
                debug!("writing to stdout");
                Ok(OutputSink::Stdout(io::stdout()))
            }
            SinkTarget::File(path) => {
                let file = File::create(path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), "writing to file");
                Ok(OutputSink::File(BufWriter::new(file)))
            }
        }
    }
}

impl FromStr for SinkTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(Error::Config("empty output path".to_string())),
            "-" => Ok(SinkTarget::Stdout),
            path => Ok(SinkTarget::File(PathBuf::from(path))),
        }
    }
}

impl From<&Path> for SinkTarget {
    fn from(path: &Path) -> Self {
        if path == Path::new("-") {
            SinkTarget::Stdout
        } else {
            SinkTarget::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkTarget::Stdout => write!(f, "-"),
            SinkTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An opened [`SinkTarget`].
pub enum OutputSink {
    Stdout(Stdout),
    File(BufWriter<File>),
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Stdout(out) => out.write(buf),
            OutputSink::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout(out) => out.flush(),
            OutputSink::File(file) => file.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdout() {
        assert_eq!("-".parse::<SinkTarget>().unwrap(), SinkTarget::Stdout);
        assert_eq!(SinkTarget::from(Path::new("-")), SinkTarget::Stdout);
        assert_eq!(
            "out.aac".parse::<SinkTarget>().unwrap(),
            SinkTarget::File(PathBuf::from("out.aac"))
        );
        assert!("".parse::<SinkTarget>().is_err());
        assert_eq!(SinkTarget::Stdout.to_string(), "-");
    }

    #[test]
    fn vec_is_a_sink() {
        let mut out: Vec<u8> = Vec::new();
        out.write_bytes(&[1, 2, 3]).unwrap();
        out.flush_bytes().unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn file_target_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"stale contents").unwrap();

        let mut sink = SinkTarget::File(path.clone()).open().unwrap();
        sink.write_bytes(b"new").unwrap();
        sink.flush_bytes().unwrap();
        drop(sink);

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn missing_directory_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = SinkTarget::File(dir.path().join("missing").join("out.bin"));
        assert!(matches!(target.open(), Err(Error::Open { .. })));
    }
}
