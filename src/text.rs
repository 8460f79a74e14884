//! Record codec primitives.
//!
//! The five formats only use two idioms for their bodies: a line of quoted
//! names followed by a fixed-width numeric grid, and self-describing blocks
//! carrying their own row count. The helpers in this module implement the
//! pieces of both, keeping track of line numbers for error reporting.

use crate::error::{BvError, Result};
use std::str::FromStr;

/// A line of input along with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Line number in the original text, starting at 1.
    pub number: usize,
    /// Line content, without the line terminator.
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Whether the line holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split text into numbered lines. Both `\n` and `\r\n` terminators are
/// accepted.
pub fn lines(text: &str) -> Vec<Line<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(i, l)| Line {
            number: i + 1,
            text: l.strip_suffix('\r').unwrap_or(l),
        })
        .collect()
}

/// Collapse runs of identical consecutive lines into a single line.
///
/// Some producers emit trailing duplicates, which would otherwise be
/// mistaken for records.
pub fn collapse_duplicates(mut lines: Vec<Line<'_>>) -> Vec<Line<'_>> {
    lines.dedup_by(|b, a| a.text == b.text);
    lines
}

/// A forward-only reader over numbered lines.
#[derive(Debug, Clone)]
pub struct Cursor<'a, 'b> {
    lines: &'b [Line<'a>],
    pos: usize,
}

impl<'a, 'b> Cursor<'a, 'b> {
    /// Start reading at the first of the given lines.
    pub fn new(lines: &'b [Line<'a>]) -> Self {
        Cursor { lines, pos: 0 }
    }

    /// Look at the next non-blank line without consuming it.
    pub fn peek_nonblank(&self) -> Option<Line<'a>> {
        self.lines[self.pos..].iter().find(|l| !l.is_blank()).copied()
    }

    /// Consume and return the next non-blank line.
    pub fn next_nonblank(&mut self) -> Option<Line<'a>> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            if !line.is_blank() {
                return Some(line);
            }
        }
        None
    }

    /// Consume the next non-blank line, which must exist.
    pub fn expect(&mut self, what: &str) -> Result<Line<'a>> {
        self.next_nonblank()
            .ok_or_else(|| BvError::UnexpectedEof(what.to_string()))
    }

    /// Consume exactly `count` non-blank rows belonging to the named record.
    pub fn rows(&mut self, record: &str, count: usize) -> Result<Vec<Line<'a>>> {
        let mut rows = Vec::with_capacity(count);
        while rows.len() < count {
            match self.next_nonblank() {
                Some(line) => rows.push(line),
                None => {
                    return Err(BvError::TruncatedBlock(
                        record.to_string(),
                        count,
                        rows.len(),
                    ))
                }
            }
        }
        Ok(rows)
    }
}

/// Parse a single numeric token found on the given line.
pub fn parse_number<T: FromStr>(line: Line<'_>, token: &str) -> Result<T> {
    token
        .trim()
        .parse()
        .map_err(|_| BvError::InvalidNumber(line.number, token.trim().to_string()))
}

/// Return the value of a `Key: value` line, failing when the line does not
/// start with the key.
pub fn keyed_value<'a>(line: Line<'a>, key: &'static str) -> Result<&'a str> {
    let text = line.text.trim_start();
    if !text.starts_with(key) {
        return Err(BvError::MalformedLine(line.number, key));
    }
    Ok(text[key.len()..].trim_start_matches(':').trim())
}

/// Parse the count of a `Key: count` line.
pub fn keyed_count(line: Line<'_>, key: &'static str) -> Result<usize> {
    let value = keyed_value(line, key)?;
    parse_number(line, value)
}

/// Extract every double-quoted token of a line, in order.
///
/// Text between tokens is ignored; an unterminated quote is an error.
pub fn quoted_tokens(line: Line<'_>) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut rest = line.text;
    while let Some(start) = rest.find('"') {
        let after = &rest[start + 1..];
        let end = after
            .find('"')
            .ok_or(BvError::MalformedLine(line.number, "unterminated quote"))?;
        tokens.push(after[..end].to_string());
        rest = &after[end + 1..];
    }
    Ok(tokens)
}

/// Parse a line of quoted record names. A lone pair of quotes (`""`)
/// stands for an empty list.
pub fn parse_names(line: Line<'_>) -> Result<Vec<String>> {
    let tokens = quoted_tokens(line)?;
    if tokens.len() == 1 && tokens[0].is_empty() {
        Ok(Vec::new())
    } else {
        Ok(tokens)
    }
}

/// Render names as a line of space separated quoted tokens.
pub fn render_names<'n, I>(names: I) -> String
where
    I: IntoIterator<Item = &'n str>,
{
    let quoted: Vec<String> = names.into_iter().map(|n| format!("\"{}\"", n)).collect();
    if quoted.is_empty() {
        "\"\"".to_string()
    } else {
        quoted.join(" ")
    }
}

/// Slice a line into fields of `width` characters. Trailing fields made of
/// whitespace only are dropped.
pub fn fixed_width_fields(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut fields: Vec<String> = chars
        .chunks(width.max(1))
        .map(|c| c.iter().collect())
        .collect();
    while fields.last().map_or(false, |f| f.trim().is_empty()) {
        let _ = fields.pop();
    }
    fields
}

/// Parse a fixed-width grid of `columns` numbers per row.
///
/// Blank lines are skipped. Every other line must hold exactly `columns`
/// fields of `width` characters.
pub fn parse_grid<T: FromStr>(
    rows: &[Line<'_>],
    width: usize,
    columns: usize,
) -> Result<Vec<Vec<T>>> {
    rows.iter()
        .filter(|l| !l.is_blank())
        .map(|line| {
            let fields = fixed_width_fields(line.text, width);
            if fields.len() != columns {
                return Err(BvError::MalformedLine(
                    line.number,
                    "number of columns does not match the number of names",
                ));
            }
            fields.iter().map(|f| parse_number(*line, f)).collect()
        })
        .collect()
}

/// Turn a list of rows into a list of columns.
pub fn transpose<T: Clone>(rows: &[Vec<T>], columns: usize) -> Vec<Vec<T>> {
    (0..columns)
        .map(|c| rows.iter().map(|row| row[c].clone()).collect())
        .collect()
}
