//! Multi-subject design matrices (`.mdm`).
//!
//! A multi-subject design matrix pairs functional data with single-subject
//! design matrices, one study per line. Functional data is either a volume
//! time course (one `.vtc` file) or a mesh time course (an `.ssm` and an
//! `.mtc` file); all studies of one document share the same kind.

use crate::document::{check_counter, Document};
use crate::error::{BvError, Result};
use crate::header::Header;
use crate::layout::{HeaderLayout, KeySplit, Sentinel};
use crate::text::{lines, quoted_tokens, render_names, Line};
use std::fmt;
use std::str::FromStr;

/// Header layout of `.mdm` files.
pub const LAYOUT: HeaderLayout = HeaderLayout {
    key_split: KeySplit::Column(22),
    key_width: 22,
    sentinel: Sentinel::Quote,
    lines_before_sentinel: 0,
    blank_before: &[],
    blank_after: &["TypeOfFunctionalData", "RFX-GLM", "SeparatePredictors"],
    omit: None,
};

/// One subject run: functional data and its design matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Study {
    data_files: Vec<String>,
    sdm_file: String,
}

impl Study {
    /// Create a study from one (`.vtc`) or two (`.ssm` and `.mtc`) data
    /// files.
    ///
    /// # Errors
    ///
    /// - `BvError::InvalidStudy` for any other number of data files.
    pub fn new<S: Into<String>>(data_files: Vec<String>, sdm_file: S) -> Result<Self> {
        match data_files.len() {
            1 | 2 => Ok(Study {
                data_files,
                sdm_file: sdm_file.into(),
            }),
            n => Err(BvError::InvalidStudy(n)),
        }
    }

    /// A study on a volume time course.
    pub fn vtc<S: Into<String>>(vtc_file: S, sdm_file: S) -> Self {
        Study {
            data_files: vec![vtc_file.into()],
            sdm_file: sdm_file.into(),
        }
    }

    /// A study on a mesh time course.
    pub fn mtc<S: Into<String>>(ssm_file: S, mtc_file: S, sdm_file: S) -> Self {
        Study {
            data_files: vec![ssm_file.into(), mtc_file.into()],
            sdm_file: sdm_file.into(),
        }
    }

    /// The functional data files.
    pub fn data_files(&self) -> &[String] {
        &self.data_files
    }

    /// The single-subject design matrix file.
    pub fn sdm_file(&self) -> &str {
        &self.sdm_file
    }

    /// Whether the study is on a mesh time course.
    pub fn is_mtc(&self) -> bool {
        self.data_files.len() > 1
    }

    fn kind(&self) -> &'static str {
        if self.is_mtc() {
            "MTC"
        } else {
            "VTC"
        }
    }

    fn from_line(line: Line<'_>) -> Result<Self> {
        let mut paths: Vec<String> = quoted_tokens(line)?
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .collect();
        let sdm_file = match paths.len() {
            2 | 3 => paths.pop(),
            _ => None,
        }
        .ok_or(BvError::MalformedLine(
            line.number,
            "expected two or three quoted paths",
        ))?;
        Ok(Study {
            data_files: paths,
            sdm_file,
        })
    }

    fn render(&self) -> String {
        render_names(
            self.data_files
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.sdm_file.as_str())),
        )
    }
}

/// Normalisation applied to the time courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    /// Percent signal change
    Psc,
    /// z-scores
    Z,
}

impl FromStr for Transformation {
    type Err = BvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "psc" => Ok(Transformation::Psc),
            "z" => Ok(Transformation::Z),
            _ => Err(BvError::InvalidTransformation(s.to_string())),
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::Psc => f.write_str("psc"),
            Transformation::Z => f.write_str("z"),
        }
    }
}

/// A multi-subject design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    header: Header,
    studies: Vec<Study>,
}

impl Default for DesignMatrix {
    fn default() -> Self {
        let mut header = Header::new();
        header.set("FileVersion", 3);
        header.set("TypeOfFunctionalData", "VTC");
        header.set("RFX-GLM", 0);
        header.set("PSCTransformation", 1);
        header.set("zTransformation", 0);
        header.set("SeparatePredictors", 0);
        header.set("NrOfStudies", 0);
        DesignMatrix {
            header,
            studies: Vec::new(),
        }
    }
}

impl DesignMatrix {
    /// Create an empty design matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a reference to the studies, in order.
    pub fn studies(&self) -> &[Study] {
        &self.studies
    }

    /// Whether a random effects GLM is computed.
    pub fn rfx_glm(&self) -> bool {
        self.header.int_or_zero("RFX-GLM") != 0
    }

    /// Enable or disable the random effects GLM.
    pub fn set_rfx_glm(&mut self, value: bool) {
        self.header.set("RFX-GLM", value as i64);
    }

    /// The transformation applied to the time courses, if any.
    pub fn transformation(&self) -> Option<Transformation> {
        if self.header.int_or_zero("PSCTransformation") == 1 {
            Some(Transformation::Psc)
        } else if self.header.int_or_zero("zTransformation") == 1 {
            Some(Transformation::Z)
        } else {
            None
        }
    }

    /// Select the transformation applied to the time courses.
    pub fn set_transformation(&mut self, value: Transformation) {
        let psc = value == Transformation::Psc;
        self.header.set("PSCTransformation", psc as i64);
        self.header.set("zTransformation", !psc as i64);
    }

    /// Whether predictors are separated per subject.
    pub fn separate_predictors(&self) -> bool {
        self.header.int_or_zero("SeparatePredictors") != 0
    }

    /// Enable or disable separate predictors per subject.
    pub fn set_separate_predictors(&mut self, value: bool) {
        self.header.set("SeparatePredictors", value as i64);
    }

    /// Add a study.
    ///
    /// # Errors
    ///
    /// - `BvError::MixedDataType` if the study's kind of functional data
    ///   differs from the studies already present.
    pub fn add_study(&mut self, study: Study) -> Result<()> {
        let kind = study.kind();
        if self.header.int_or_zero("NrOfStudies") > 0 {
            let current = self
                .header
                .get("TypeOfFunctionalData")
                .map(|v| v.to_string())
                .unwrap_or_default();
            if current != kind {
                return Err(BvError::MixedDataType(kind, current));
            }
        } else {
            self.header.set("TypeOfFunctionalData", kind);
        }
        self.studies.push(study);
        self.header.increment("NrOfStudies");
        Ok(())
    }

    /// Remove all studies and reset the header.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Document for DesignMatrix {
    const EXTENSION: &'static str = "mdm";

    fn header(&self) -> &Header {
        &self.header
    }

    fn from_text(text: &str) -> Result<Self> {
        let lines = lines(text);
        // a document without studies has no quoted line
        let (parsed, end) = if lines.iter().any(|l| LAYOUT.sentinel.matches(l.text)) {
            Header::parse(&lines, &LAYOUT)?
        } else {
            (Header::parse_lines(&lines, LAYOUT.key_split)?, lines.len())
        };

        let studies = lines[end..]
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| Study::from_line(*l))
            .collect::<Result<Vec<_>>>()?;

        let declared = parsed.get("TypeOfFunctionalData").map(|v| v.to_string());
        if let (Some(declared), Some(first)) = (declared, studies.first()) {
            if !declared.eq_ignore_ascii_case(first.kind()) {
                return Err(BvError::MixedDataType(first.kind(), declared));
            }
        }

        let mut doc = Self::default();
        doc.header.merge(parsed);
        check_counter(&doc.header, "NrOfStudies", studies.len());
        doc.header.set("NrOfStudies", 0);
        for study in studies {
            doc.add_study(study)?;
        }
        Ok(doc)
    }

    fn to_text(&self) -> String {
        let studies: Vec<String> = self.studies.iter().map(Study::render).collect();
        format!("\n{}\n{}", self.header.render(&LAYOUT), studies.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn study_kinds() {
        assert!(Study::new(vec![], "a.sdm").is_err());
        let err = Study::new(vec!["a".into(), "b".into(), "c".into()], "a.sdm").unwrap_err();
        assert!(matches!(err, BvError::InvalidStudy(3)));
        let s = Study::new(vec!["run1.vtc".into()], "run1.sdm").unwrap();
        assert_eq!(s, Study::vtc("run1.vtc", "run1.sdm"));
        assert!(!s.is_mtc());
        assert!(Study::mtc("a.ssm", "a.mtc", "a.sdm").is_mtc());
    }

    #[test]
    fn mixed_types_rejected() {
        let mut mdm = DesignMatrix::new();
        mdm.add_study(Study::mtc("a.ssm", "a.mtc", "a.sdm")).unwrap();
        assert_eq!(mdm.header().get_text("TypeOfFunctionalData"), Some("MTC"));
        let err = mdm.add_study(Study::vtc("b.vtc", "b.sdm")).unwrap_err();
        assert!(err.is_invariant());
        assert_eq!(mdm.studies().len(), 1);

        let mut mdm = DesignMatrix::new();
        mdm.add_study(Study::vtc("b.vtc", "b.sdm")).unwrap();
        assert!(mdm.add_study(Study::mtc("a.ssm", "a.mtc", "a.sdm")).is_err());
        assert_eq!(mdm.header().get_int("NrOfStudies"), Some(1));
    }

    #[test]
    fn flags() {
        let mut mdm = DesignMatrix::new();
        assert_eq!(mdm.transformation(), Some(Transformation::Psc));
        mdm.set_transformation("Z".parse().unwrap());
        assert_eq!(mdm.transformation(), Some(Transformation::Z));
        assert_eq!(mdm.header().get_int("PSCTransformation"), Some(0));
        assert!("log".parse::<Transformation>().is_err());

        mdm.set_rfx_glm(true);
        mdm.set_separate_predictors(true);
        assert!(mdm.rfx_glm());
        assert!(mdm.separate_predictors());
        assert_eq!(mdm.header().get_int("RFX-GLM"), Some(1));
    }

    #[test]
    fn layout() {
        let mut mdm = DesignMatrix::new();
        mdm.add_study(Study::vtc("C:\\data\\s1.vtc", "s1.sdm")).unwrap();
        mdm.add_study(Study::vtc("C:\\data\\s2.vtc", "s2.sdm")).unwrap();
        let expected = concat!(
            "\n",
            "FileVersion:          3\n",
            "TypeOfFunctionalData: VTC\n",
            "\n",
            "RFX-GLM:              0\n",
            "\n",
            "PSCTransformation:    1\n",
            "zTransformation:      0\n",
            "SeparatePredictors:   0\n",
            "\n",
            "NrOfStudies:          2\n",
            "\"C:\\data\\s1.vtc\" \"s1.sdm\"\n",
            "\"C:\\data\\s2.vtc\" \"s2.sdm\"",
        );
        assert_eq!(mdm.to_text(), expected);
        assert_eq!(DesignMatrix::from_text(expected).unwrap(), mdm);
    }

    #[test]
    fn empty() {
        let mdm = DesignMatrix::new();
        assert_eq!(DesignMatrix::from_text(&mdm.to_text()).unwrap(), mdm);
    }

    #[test]
    fn mixed_types_rejected_on_load() {
        let text = concat!(
            "\nFileVersion:          3\n",
            "TypeOfFunctionalData: VTC\n",
            "NrOfStudies:          2\n",
            "\"a.vtc\" \"a.sdm\"\n",
            "\"b.ssm\" \"b.mtc\" \"b.sdm\"\n",
        );
        let err = DesignMatrix::from_text(text).unwrap_err();
        assert!(matches!(err, BvError::MixedDataType("MTC", _)), "{:?}", err);

        let text = concat!(
            "\nFileVersion:          3\n",
            "TypeOfFunctionalData: MTC\n",
            "NrOfStudies:          1\n",
            "\"a.vtc\" \"a.sdm\"\n",
        );
        let err = DesignMatrix::from_text(text).unwrap_err();
        assert!(matches!(err, BvError::MixedDataType("VTC", _)), "{:?}", err);
    }

    #[test]
    fn bad_study_line() {
        let text = "\nNrOfStudies:          1\n\"only.vtc\"\n";
        let err = DesignMatrix::from_text(text).unwrap_err();
        assert!(err.is_structural());
    }
}
