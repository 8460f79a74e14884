//! This module defines the `Header` type, the ordered block of
//! `Key: value` lines found at the top of every document.

use crate::error::{BvError, Result};
use crate::layout::{HeaderLayout, KeySplit};
use crate::text::Line;
use std::fmt;
use std::iter::FromIterator;

/// A typed header value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single integer
    Int(i64),
    /// A floating point number
    Float(f64),
    /// Free text
    Text(String),
    /// A short list of integers, such as a colour triple
    IntList(Vec<i64>),
}

type Attempt = fn(&str) -> Option<Value>;

fn attempt_int(raw: &str) -> Option<Value> {
    raw.parse().ok().map(Value::Int)
}

fn attempt_int_list(raw: &str) -> Option<Value> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    tokens
        .iter()
        .map(|t| t.parse().ok())
        .collect::<Option<Vec<i64>>>()
        .map(Value::IntList)
}

/// Value typing attempts, in order. Text is the fallback.
const ATTEMPTS: [Attempt; 2] = [attempt_int, attempt_int_list];

impl Value {
    /// Infer the type of a raw header value: an integer if possible, then a
    /// list of integers if the value has several tokens, then text.
    pub fn parse(raw: &str) -> Value {
        let raw = raw.trim();
        ATTEMPTS
            .iter()
            .find_map(|attempt| attempt(raw))
            .unwrap_or_else(|| Value::Text(raw.to_string()))
    }

    /// Get the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a list of integers, if it is one.
    pub fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            Value::IntList(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => f.write_str(s),
            Value::IntList(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}

impl From<[i64; 3]> for Value {
    fn from(v: [i64; 3]) -> Self {
        Value::IntList(v.to_vec())
    }
}

impl From<[i32; 3]> for Value {
    fn from(v: [i32; 3]) -> Self {
        Value::IntList(v.iter().map(|&x| x.into()).collect())
    }
}

/// An ordered mapping from field names to typed values.
///
/// The order of the entries is the order in which they are written. Setting
/// an existing key keeps its position, new keys are appended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    entries: Vec<(String, Value)>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Header::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the header has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the value of an entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the value of an integer entry.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// Get the value of a text entry.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// Get an integer entry, or zero when it is missing or not an integer.
    pub(crate) fn int_or_zero(&self, key: &str) -> i64 {
        self.get_int(key).unwrap_or(0)
    }

    /// Set the value of an entry, keeping its position when it exists.
    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Increase an integer entry by one.
    pub(crate) fn increment(&mut self, key: &str) {
        let v = self.int_or_zero(key);
        self.set(key, v + 1);
    }

    /// Move an entry to the last position.
    pub(crate) fn move_to_end(&mut self, key: &str) {
        if let Some(i) = self.entries.iter().position(|(k, _)| k == key) {
            let entry = self.entries.remove(i);
            self.entries.push(entry);
        }
    }

    /// Set every entry of `other` on this header, in order.
    pub fn merge(&mut self, other: Header) {
        for (k, v) in other.entries {
            self.set(&k, v);
        }
    }

    /// Iterate over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parse the header lines at the start of a document.
    ///
    /// Lines are read until the layout's sentinel is met, leaving out the
    /// body lines the layout places right before it. Blank lines are skipped.
    /// Returns the parsed entries and the index of the sentinel line.
    pub fn parse(lines: &[Line<'_>], layout: &HeaderLayout) -> Result<(Header, usize)> {
        let end = lines
            .iter()
            .position(|l| layout.sentinel.matches(l.text))
            .ok_or_else(|| BvError::MissingSentinel(layout.sentinel.describe()))?;
        let header_end = end.saturating_sub(layout.lines_before_sentinel);
        let header = Header::parse_lines(&lines[..header_end], layout.key_split)?;
        Ok((header, end))
    }

    /// Parse every non-blank line as a header entry.
    pub fn parse_lines(lines: &[Line<'_>], split: KeySplit) -> Result<Header> {
        lines
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| parse_line(*l, split))
            .collect()
    }

    /// Render the header with the given layout. The result has no trailing
    /// line break.
    pub fn render(&self, layout: &HeaderLayout) -> String {
        let visible: Vec<&(String, Value)> = self
            .entries
            .iter()
            .filter(|(k, _)| layout.is_visible(self, k))
            .collect();
        let mut out = String::new();
        for (i, (key, value)) in visible.iter().enumerate() {
            if layout.blank_before.contains(&key.as_str()) {
                out.push('\n');
            }
            let label = format!("{}:", key);
            out.push_str(&format!("{:<width$}{}", label, value, width = layout.key_width));
            if i + 1 < visible.len() {
                out.push('\n');
            }
            if layout.blank_after.contains(&key.as_str()) {
                out.push('\n');
            }
        }
        out
    }
}

impl FromIterator<(String, Value)> for Header {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (k, v) in iter {
            header.set(&k, v);
        }
        header
    }
}

/// Byte index of the character at position `col`, or the end of the text.
fn char_offset(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or_else(|| text.len())
}

/// Split one header line into its key and typed value.
fn parse_line(line: Line<'_>, split: KeySplit) -> Result<(String, Value)> {
    let text = line.text.trim_end();
    let at = match split {
        KeySplit::Colon => text
            .find(':')
            .map(|i| i + 1)
            .ok_or(BvError::MalformedLine(line.number, "header line without a colon"))?,
        KeySplit::Column(col) => {
            let at = char_offset(text, col);
            // values written without padding start before the column
            match text.find(':') {
                Some(c) if c < at && !text[c + 1..at].trim().is_empty() => c + 1,
                _ => at,
            }
        }
    };
    let key = text[..at].trim().trim_end_matches(':').trim();
    if key.is_empty() {
        return Err(BvError::MalformedLine(line.number, "header line without a key"));
    }
    Ok((key.to_string(), Value::parse(&text[at..])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Sentinel;
    use crate::text::lines;
    use pretty_assertions::assert_eq;

    const LAYOUT: HeaderLayout = HeaderLayout {
        key_split: KeySplit::Column(20),
        key_width: 20,
        sentinel: Sentinel::Key("NrOfConditions"),
        lines_before_sentinel: 0,
        blank_before: &[],
        blank_after: &["FileVersion"],
        omit: None,
    };

    #[test]
    fn value_typing() {
        assert_eq!(Value::parse(" 42 "), Value::Int(42));
        assert_eq!(Value::parse("0 0 80"), Value::IntList(vec![0, 0, 80]));
        assert_eq!(Value::parse("Volumes"), Value::Text("Volumes".into()));
        assert_eq!(Value::parse("my  experiment 2"), Value::Text("my  experiment 2".into()));
        assert_eq!(Value::parse("1.5"), Value::Text("1.5".into()));
        assert_eq!(Value::parse(""), Value::Text(String::new()));
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::IntList(vec![255, 255, 255]).to_string(), "255 255 255");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Int(-3).to_string(), "-3");
    }

    #[test]
    fn set_keeps_order() {
        let mut h = Header::new();
        h.set("A", 1);
        h.set("B", "x");
        h.set("A", 2);
        h.increment("C");
        assert_eq!(h.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(h.get_int("A"), Some(2));
        assert_eq!(h.get_text("B"), Some("x"));
        assert_eq!(h.get_int("C"), Some(1));
    }

    #[test]
    fn parse_until_sentinel() {
        let text = concat!(
            "\nFileVersion:        2\n\nTextColor:          255 255 255\n",
            "Experiment:         a b\nNrOfConditions:     2\nA\n",
        );
        let l = lines(text);
        let (h, end) = Header::parse(&l, &LAYOUT).unwrap();
        assert_eq!(end, 5);
        assert_eq!(h.len(), 3);
        assert_eq!(h.get_int("FileVersion"), Some(2));
        assert_eq!(h.get("TextColor"), Some(&Value::IntList(vec![255, 255, 255])));
        assert_eq!(h.get_text("Experiment"), Some("a b"));
    }

    #[test]
    fn parse_without_padding() {
        let l = lines("FileVersion: 2\nNrOfConditions: 0");
        let (h, _) = Header::parse(&l, &LAYOUT).unwrap();
        assert_eq!(h.get_int("FileVersion"), Some(2));
    }

    #[test]
    fn missing_sentinel() {
        let l = lines("FileVersion: 2\n");
        let err = Header::parse(&l, &LAYOUT).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn render_aligned() {
        let mut h = Header::new();
        h.set("FileVersion", 2);
        h.set("TextColor", [255, 255, 255]);
        assert_eq!(
            h.render(&LAYOUT),
            "FileVersion:        2\n\nTextColor:          255 255 255"
        );
    }
}
