//! Opening text inputs and outputs, transparently handling gzip.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, StdoutLock, Write};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::core::error::{ReconcileError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a text file for buffered line reading.
///
/// Gzip and BGZF inputs are recognized by their magic bytes, regardless of
/// the file extension.
///
/// # Errors
///
/// Returns `ReconcileError::Io` if the file cannot be opened or read.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| ReconcileError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let is_gzip = reader
        .fill_buf()
        .map_err(|e| ReconcileError::io(path, e))?
        .starts_with(&GZIP_MAGIC);

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Destination of a run's output records
pub enum OutputWriter {
    Stdout(BufWriter<StdoutLock<'static>>),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputWriter {
    /// Flush everything and, for gzip, write the final block and trailer.
    ///
    /// Dropping the writer instead discards any error from those last writes.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut out) => out.flush(),
            Self::Plain(mut out) => out.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::Plain(out) => out.write(buf),
            Self::Gzip(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::Plain(out) => out.flush(),
            Self::Gzip(out) => out.flush(),
        }
    }
}

/// Create an output writer. `-` writes to stdout; a `.gz` suffix compresses.
///
/// Call [`OutputWriter::finish`] once all records are written.
///
/// # Errors
///
/// Returns `ReconcileError::Io` if the file cannot be created.
pub fn create_output(path: &Path) -> Result<OutputWriter> {
    if path.as_os_str() == "-" {
        return Ok(OutputWriter::Stdout(BufWriter::new(io::stdout().lock())));
    }

    let file = File::create(path).map_err(|e| ReconcileError::io(path, e))?;
    let is_gz = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    if is_gz {
        Ok(OutputWriter::Gzip(GzEncoder::new(
            BufWriter::new(file),
            Compression::default(),
        )))
    } else {
        Ok(OutputWriter::Plain(BufWriter::new(file)))
    }
}
