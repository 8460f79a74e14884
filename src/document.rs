//! Module for handling complete documents of any of the supported formats.

use crate::error::{BvError, Result};
use crate::header::Header;
use crate::util::read_text;
use crate::writer::WriterOptions;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Warn when a header counter disagrees with the number of records parsed.
pub(crate) fn check_counter(header: &Header, key: &str, records: usize) {
    if let Some(n) = header.get_int(key) {
        if n != records as i64 {
            warn!("header says {} = {}, but {} records were read", key, n, records);
        }
    }
}

/// Trait type for all documents: a header followed by an ordered list of
/// records, stored in one plain-text format.
///
/// Implementors provide the text codec; reading from and writing to files is
/// shared.
///
/// # Example
///
/// ```no_run
/// use brainvoyager::{Document, StimulationProtocol};
/// # use brainvoyager::Result;
///
/// # fn run() -> Result<()> {
/// let mut prt = StimulationProtocol::from_file("run1.prt")?;
/// prt.convert_to_msec(2000.);
/// let written = prt.save("run1_msec")?;
/// assert_eq!(written.extension().unwrap(), "prt");
/// # Ok(())
/// # }
/// ```
pub trait Document: Sized {
    /// Canonical file extension, without the leading dot.
    const EXTENSION: &'static str;

    /// Obtain a reference to the document's header.
    fn header(&self) -> &Header;

    /// Parse a document from its text representation.
    fn from_text(text: &str) -> Result<Self>;

    /// Render the document in its text representation.
    fn to_text(&self) -> String;

    /// Read a document from a file. Files ending in ".gz" are decompressed.
    ///
    /// # Errors
    ///
    /// - `BvError::Io` if the file cannot be read.
    /// - `BvError::Read` naming the file if its content is not a valid
    ///   document.
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let doc =
            Self::from_text(&text).map_err(|e| BvError::Read(path.to_path_buf(), Box::new(e)))?;
        debug!("read .{} document from {}", Self::EXTENSION, path.display());
        Ok(doc)
    }

    /// Replace the whole document with the one stored in the file.
    ///
    /// The document is left untouched if reading fails.
    fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = Self::from_file(path)?;
        Ok(())
    }

    /// Write the document to a file, appending the canonical extension if
    /// the path lacks it. Returns the path actually written.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        WriterOptions::new(path).write(self)
    }
}
