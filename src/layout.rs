//! Layout descriptors shared by all text formats.
//!
//! Every format starts with a block of `Key: value` lines. What differs from
//! one format to the next is where the key column ends, which line closes the
//! header, and where blank lines are placed when the header is written back.
//! These differences are captured by [`HeaderLayout`], so that a single codec
//! in the [`header`](../header/index.html) module serves all five formats.

use crate::header::Header;

/// How a header line is split into its key and its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySplit {
    /// Split at a fixed character column. The key is everything before the
    /// column, stripped of colons and whitespace.
    Column(usize),
    /// Split right after the first colon.
    Colon,
}

/// The condition marking the first line after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// The first line starting with a double quote (a list of names or paths).
    Quote,
    /// The first line starting with the given key.
    Key(&'static str),
}

impl Sentinel {
    /// Whether the given line closes the header.
    pub fn matches(&self, line: &str) -> bool {
        match *self {
            Sentinel::Quote => line.starts_with('"'),
            Sentinel::Key(key) => line.starts_with(key),
        }
    }

    /// Human readable description, used in error messages.
    pub fn describe(&self) -> &'static str {
        match *self {
            Sentinel::Quote => "line of quoted names",
            Sentinel::Key(key) => key,
        }
    }
}

/// Hook deciding whether a header entry is written out.
pub type OmitFn = fn(&Header, &str) -> bool;

/// Header layout of one file format.
#[derive(Clone, Copy)]
pub struct HeaderLayout {
    /// How lines are split when parsing.
    pub key_split: KeySplit,
    /// Width the `Key:` part is padded to when rendering.
    pub key_width: usize,
    /// The line closing the header.
    pub sentinel: Sentinel,
    /// Number of body lines sitting right before the sentinel, which are not
    /// part of the header.
    pub lines_before_sentinel: usize,
    /// Keys preceded by a blank line when rendering.
    pub blank_before: &'static [&'static str],
    /// Keys followed by a blank line when rendering.
    pub blank_after: &'static [&'static str],
    /// Entries for which this returns `true` are not rendered.
    pub omit: Option<OmitFn>,
}

impl std::fmt::Debug for HeaderLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderLayout")
            .field("key_split", &self.key_split)
            .field("key_width", &self.key_width)
            .field("sentinel", &self.sentinel)
            .field("lines_before_sentinel", &self.lines_before_sentinel)
            .field("blank_before", &self.blank_before)
            .field("blank_after", &self.blank_after)
            .field("omit", &self.omit.is_some())
            .finish()
    }
}

impl HeaderLayout {
    /// Whether the entry with the given key is rendered.
    pub fn is_visible(&self, header: &Header, key: &str) -> bool {
        self.omit.map_or(true, |omit| !omit(header, key))
    }
}

#[cfg(test)]
mod tests {
    use super::Sentinel;

    #[test]
    fn sentinel_matching() {
        assert!(Sentinel::Quote.matches("\"Constant\""));
        assert!(!Sentinel::Quote.matches("NrOfPredictors: 1"));
        assert!(Sentinel::Key("NrOfConditions").matches("NrOfConditions:     2"));
        assert!(!Sentinel::Key("NrOfConditions").matches("Experiment: x"));
    }
}
