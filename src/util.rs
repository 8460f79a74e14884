//! Private utility module
use crate::error::{BvError, Result};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Check whether the file name ends with ".gz".
pub fn is_gz_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Ensure the path carries the given extension (without the leading dot),
/// compared case-insensitively. A trailing ".gz" is kept last.
pub fn with_extension<P: AsRef<Path>>(path: P, ext: &str) -> PathBuf {
    let path = path.as_ref();
    let gz = is_gz_file(path);
    let base = if gz { path.with_extension("") } else { path.to_path_buf() };

    let has_ext = base
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false);
    if has_ext {
        return path.to_path_buf();
    }

    let mut name: OsString = base.into_os_string();
    name.push(".");
    name.push(ext);
    if gz {
        name.push(".gz");
    }
    PathBuf::from(name)
}

/// Read the whole file into a string, decoding it if it is gzipped.
pub fn read_text(path: &Path) -> Result<String> {
    let io_err = |e| BvError::Io(path.to_path_buf(), e);
    let file = BufReader::new(File::open(path).map_err(io_err)?);
    let mut text = String::new();
    if is_gz_file(path) {
        let _ = GzDecoder::new(file).read_to_string(&mut text).map_err(io_err)?;
    } else {
        let mut file = file;
        let _ = file.read_to_string(&mut text).map_err(io_err)?;
    }
    Ok(text)
}

/// Write the text to a file, optionally gzip-compressed.
pub fn write_text(path: &Path, text: &str, compress: bool) -> Result<()> {
    let io_err = |e| BvError::Io(path.to_path_buf(), e);
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    if compress {
        let mut e = GzEncoder::new(writer, Compression::default());
        e.write_all(text.as_bytes()).map_err(io_err)?;
        e.finish().map_err(io_err)?.flush().map_err(io_err)?;
    } else {
        writer.write_all(text.as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn gz_detection() {
        assert!(is_gz_file("/data/run1.prt.gz"));
        assert!(!is_gz_file("/data/run1.prt"));
        assert!(!is_gz_file("/data/gz"));
    }

    #[test]
    fn extension_fixing() {
        assert_eq!(with_extension("run1", "prt"), PathBuf::from("run1.prt"));
        assert_eq!(with_extension("run1.prt", "prt"), PathBuf::from("run1.prt"));
        assert_eq!(with_extension("run1.PRT", "prt"), PathBuf::from("run1.PRT"));
        assert_eq!(with_extension("run1.txt", "prt"), PathBuf::from("run1.txt.prt"));
        assert_eq!(with_extension("run.1", "sdm"), PathBuf::from("run.1.sdm"));
        assert_eq!(with_extension("run1.gz", "prt"), PathBuf::from("run1.prt.gz"));
        assert_eq!(with_extension("run1.prt.gz", "prt"), PathBuf::from("run1.prt.gz"));
    }

    #[test]
    fn text_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["plain.txt", "packed.txt.gz"] {
            let path = dir.path().join(name);
            write_text(&path, "a\nb", is_gz_file(&path)).unwrap();
            assert_eq!(read_text(&path).unwrap(), "a\nb");
        }
        assert!(read_text(&dir.path().join("missing.txt")).is_err());
    }
}
