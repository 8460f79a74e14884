//! Types for error handling go here.
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum BvError {
        /// The line marking the end of the header was never found
        MissingSentinel(what: &'static str) {
            display("Invalid document: missing {}", what)
        }
        /// A self-describing block ended before its declared number of rows
        TruncatedBlock(record: String, expected: usize, found: usize) {
            display("Block `{}` declares {} rows, but only {} are present", record, expected, found)
        }
        /// The document ended in the middle of a record
        UnexpectedEof(what: String) {
            display("Unexpected end of document while reading {}", what)
        }
        /// A token that should be a number could not be parsed
        InvalidNumber(line: usize, token: String) {
            display("Invalid number `{}` on line {}", token, line)
        }
        /// A line does not have the shape expected at its position
        MalformedLine(line: usize, reason: &'static str) {
            display("Malformed line {}: {}", line, reason)
        }
        /// A colour is not made of three integers
        InvalidColour(colour: String) {
            display("Invalid colour `{}`: expected three integers", colour)
        }
        /// A record does not have the length shared by its siblings
        LengthMismatch(record: &'static str, got: usize, expected: usize) {
            display("{} has {} data points, but the document has {}", record, got, expected)
        }
        /// Functional data of different kinds was mixed in one document
        MixedDataType(got: &'static str, expected: String) {
            display("Data is {}, but design matrix contains {} data", got, expected)
        }
        /// Time units other than `Volumes` and `msec`
        InvalidTimeUnits(units: String) {
            display("Invalid time units `{}`: expected `Volumes` or `msec`", units)
        }
        /// The requested operation needs a different time resolution
        UnsupportedTimeUnits(units: String) {
            display("Operation not supported for protocols in `{}`", units)
        }
        /// Transformations other than `psc` and `z`
        InvalidTransformation(name: String) {
            display("Invalid transformation `{}`: expected `psc` or `z`", name)
        }
        /// A study does not reference one or two functional data files
        InvalidStudy(files: usize) {
            display("A study needs one or two functional data files, got {}", files)
        }
        /// The operation needs a document that already holds data points
        NoDataPoints {
            display("Design matrix has no data points yet")
        }
        /// Failed to parse the document stored at the given path
        Read(path: PathBuf, err: Box<BvError>) {
            display("Could not read {}: {}", path.display(), err)
            source(err)
        }
        /// I/O Error while accessing the given path
        Io(path: PathBuf, err: IOError) {
            display("I/O error on {}: {}", path.display(), err)
            source(err)
        }
    }
}

impl BvError {
    /// Whether this error stems from text that does not follow the format.
    pub fn is_structural(&self) -> bool {
        match self {
            BvError::MissingSentinel(..)
            | BvError::TruncatedBlock(..)
            | BvError::UnexpectedEof(..)
            | BvError::InvalidNumber(..)
            | BvError::MalformedLine(..)
            | BvError::InvalidColour(..) => true,
            BvError::Read(_, err) => err.is_structural(),
            _ => false,
        }
    }

    /// Whether this error was raised to protect a document invariant.
    pub fn is_invariant(&self) -> bool {
        matches!(
            self,
            BvError::LengthMismatch(..)
                | BvError::MixedDataType(..)
                | BvError::InvalidTimeUnits(..)
                | BvError::UnsupportedTimeUnits(..)
                | BvError::InvalidTransformation(..)
                | BvError::InvalidStudy(..)
                | BvError::NoDataPoints
        )
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, BvError>;
