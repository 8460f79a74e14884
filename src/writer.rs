//! Options for writing documents to files.

use crate::document::Document;
use crate::error::Result;
use crate::util::{is_gz_file, with_extension, write_text};
use log::debug;
use std::path::{Path, PathBuf};

/// Options and flags which can be used to configure how a document is
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Where to write the document.
    path: PathBuf,
    /// Whether to gzip the output; by default, when the path ends in ".gz".
    compress: Option<bool>,
    /// Whether to append the canonical extension when it is missing.
    fix_extension: bool,
}

impl WriterOptions {
    /// Creates a blank new set of options ready for configuration.
    pub fn new<P: AsRef<Path>>(path: P) -> WriterOptions {
        WriterOptions {
            path: path.as_ref().to_path_buf(),
            compress: None,
            fix_extension: true,
        }
    }

    /// Force or prevent gzip compression, regardless of the file name.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    /// Whether to append the format's extension when the path lacks it
    /// (default `true`).
    pub fn fix_extension(mut self, fix_extension: bool) -> Self {
        self.fix_extension = fix_extension;
        self
    }

    /// Write the document, returning the path actually written.
    pub fn write<D: Document>(&self, document: &D) -> Result<PathBuf> {
        let path = if self.fix_extension {
            with_extension(&self.path, D::EXTENSION)
        } else {
            self.path.clone()
        };
        let compress = self.compress.unwrap_or_else(|| is_gz_file(&path));
        write_text(&path, &document.to_text(), compress)?;
        debug!("wrote .{} document to {}", D::EXTENSION, path.display());
        Ok(path)
    }
}
