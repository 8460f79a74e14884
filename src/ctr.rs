//! Contrast definitions (`.ctr`).
//!
//! A contrasts definition holds named contrast vectors, all of the same
//! length. In the file, the names form a line of quoted tokens and the values
//! a grid of 4-character columns, one column per contrast.

use crate::document::{check_counter, Document};
use crate::error::{BvError, Result};
use crate::header::Header;
use crate::layout::{HeaderLayout, KeySplit, Sentinel};
use crate::text::{lines, parse_grid, parse_names, render_names, transpose};

/// Header layout of `.ctr` files.
pub const LAYOUT: HeaderLayout = HeaderLayout {
    key_split: KeySplit::Column(16),
    key_width: 22,
    sentinel: Sentinel::Quote,
    lines_before_sentinel: 0,
    blank_before: &[],
    blank_after: &[],
    omit: None,
};

/// Width of a value column in the grid.
const COLUMN_WIDTH: usize = 4;

/// A named contrast vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Contrast {
    /// Name of the contrast
    pub name: String,
    /// One weight per predictor
    pub data: Vec<i64>,
}

impl Contrast {
    /// Create a contrast.
    pub fn new<S: Into<String>>(name: S, data: Vec<i64>) -> Self {
        Contrast {
            name: name.into(),
            data,
        }
    }
}

/// A set of contrasts of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastsDefinition {
    header: Header,
    contrasts: Vec<Contrast>,
}

impl Default for ContrastsDefinition {
    fn default() -> Self {
        let mut header = Header::new();
        header.set("FileVersion", 1);
        header.set("NrOfContrasts", 0);
        header.set("NrOfValues", 0);
        ContrastsDefinition {
            header,
            contrasts: Vec::new(),
        }
    }
}

impl ContrastsDefinition {
    /// Create an empty contrasts definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// The contrasts, in order.
    pub fn contrasts(&self) -> &[Contrast] {
        &self.contrasts
    }

    /// The contrast names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.contrasts.iter().map(|c| c.name.as_str()).collect()
    }

    /// The values as rows, one column per contrast.
    pub fn data(&self) -> Vec<Vec<i64>> {
        let n = self.contrasts.first().map_or(0, |c| c.data.len());
        (0..n)
            .map(|i| self.contrasts.iter().map(|c| c.data[i]).collect())
            .collect()
    }

    /// Add a contrast.
    ///
    /// The first contrast sets `NrOfValues`; every other contrast must have
    /// as many values as the contrasts already present.
    ///
    /// # Errors
    ///
    /// - `BvError::LengthMismatch` if the length differs from the other
    ///   contrasts.
    pub fn add_contrast(&mut self, contrast: Contrast) -> Result<()> {
        match self.contrasts.first() {
            Some(first) if first.data.len() != contrast.data.len() => {
                return Err(BvError::LengthMismatch(
                    "Contrast",
                    contrast.data.len(),
                    first.data.len(),
                ));
            }
            Some(_) => {}
            None => self.header.set("NrOfValues", contrast.data.len() as i64),
        }
        self.contrasts.push(contrast);
        self.header.increment("NrOfContrasts");
        Ok(())
    }

    /// Remove all contrasts and reset the header.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Document for ContrastsDefinition {
    const EXTENSION: &'static str = "ctr";

    fn header(&self) -> &Header {
        &self.header
    }

    fn from_text(text: &str) -> Result<Self> {
        let lines = lines(text);
        let (parsed, end) = Header::parse(&lines, &LAYOUT)?;
        let names = parse_names(lines[end])?;
        let rows: Vec<Vec<i64>> = parse_grid(&lines[end + 1..], COLUMN_WIDTH, names.len())?;
        let columns = transpose(&rows, names.len());

        let mut doc = Self::default();
        doc.header.merge(parsed);
        doc.contrasts = names
            .into_iter()
            .zip(columns)
            .map(|(name, data)| Contrast::new(name, data))
            .collect();
        check_counter(&doc.header, "NrOfContrasts", doc.contrasts.len());
        check_counter(&doc.header, "NrOfValues", rows.len());
        doc.header.set("NrOfContrasts", doc.contrasts.len() as i64);
        if !doc.contrasts.is_empty() {
            doc.header.set("NrOfValues", rows.len() as i64);
        }
        Ok(doc)
    }

    fn to_text(&self) -> String {
        let rows: Vec<String> = self
            .data()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| format!("{:>3}", v))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        format!(
            "\n{}\n\n{}\n{}",
            self.header.render(&LAYOUT),
            render_names(self.names()),
            rows.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_sets_and_checks_length() {
        let mut ctr = ContrastsDefinition::new();
        ctr.add_contrast(Contrast::new("A>B", vec![1, -1, 0])).unwrap();
        assert_eq!(ctr.header().get_int("NrOfValues"), Some(3));
        assert_eq!(ctr.header().get_int("NrOfContrasts"), Some(1));

        let err = ctr.add_contrast(Contrast::new("bad", vec![1, 0])).unwrap_err();
        assert!(err.is_invariant());
        assert_eq!(ctr.contrasts().len(), 1);
        assert_eq!(ctr.header().get_int("NrOfContrasts"), Some(1));
    }

    #[test]
    fn layout() {
        let mut ctr = ContrastsDefinition::new();
        ctr.add_contrast(Contrast::new("A>B", vec![1, -1])).unwrap();
        ctr.add_contrast(Contrast::new("B>A", vec![-1, 1])).unwrap();
        let expected = concat!(
            "\n",
            "FileVersion:          1\n",
            "NrOfContrasts:        2\n",
            "NrOfValues:           2\n",
            "\n",
            "\"A>B\" \"B>A\"\n",
            "  1  -1\n",
            " -1   1",
        );
        assert_eq!(ctr.to_text(), expected);
        assert_eq!(ContrastsDefinition::from_text(expected).unwrap(), ctr);
    }

    #[test]
    fn counters_follow_the_grid() {
        let text = concat!(
            "\n",
            "FileVersion:          1\n",
            "NrOfContrasts:        1\n",
            "NrOfValues:           2\n",
            "\n",
            "\"A\"\n",
            "  1\n",
            " -1\n",
            "  0",
        );
        let mut ctr = ContrastsDefinition::from_text(text).unwrap();
        assert_eq!(ctr.header().get_int("NrOfValues"), Some(3));

        let err = ctr.add_contrast(Contrast::new("B", vec![1, 1])).unwrap_err();
        assert!(err.is_invariant());
        ctr.add_contrast(Contrast::new("B", vec![0, 1, 1])).unwrap();
        assert_eq!(ctr.data(), vec![vec![1, 0], vec![-1, 1], vec![0, 1]]);
        assert_eq!(ctr.header().get_int("NrOfContrasts"), Some(2));
    }

    #[test]
    fn empty() {
        let ctr = ContrastsDefinition::new();
        let text = ctr.to_text();
        assert!(text.ends_with("\"\"\n"));
        assert_eq!(ContrastsDefinition::from_text(&text).unwrap(), ctr);
    }
}
