use super::locator::LogFileRef;
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub struct LogReader;

impl LogReader {
    /// Open a log file as a stream of lines, decompressing gzip on the fly.
    ///
    /// The file handle is owned by the returned iterator and closed when it
    /// is dropped.
    pub fn open(log_file: &LogFileRef) -> Result<LogLines> {
        tracing::debug!(
            "Opening {} (compressed: {})",
            log_file.path.display(),
            log_file.compressed
        );

        let file = File::open(&log_file.path).map_err(|e| Error::io(&log_file.path, e))?;
        let inner: Box<dyn BufRead> = if log_file.compressed {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(LogLines {
            path: log_file.path.clone(),
            inner,
            buf: Vec::new(),
        })
    }
}

/// Line iterator over a plain or decompressed log.
///
/// Invalid UTF-8 is replaced rather than treated as an error; the line
/// parser decides whether the result is usable.
pub struct LogLines {
    path: PathBuf,
    inner: Box<dyn BufRead>,
    buf: Vec<u8>,
}

impl Iterator for LogLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(Error::io(&self.path, e))),
        }
    }
}
