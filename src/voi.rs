//! Volumes of interest definitions (`.voi`).
//!
//! Each VOI is a named, coloured set of voxel coordinates. The document also
//! lists VTC files associated with the VOIs.

use crate::colour::{self, Colour};
use crate::document::Document;
use crate::error::{BvError, Result};
use crate::header::Header;
use crate::layout::{HeaderLayout, KeySplit, Sentinel};
use crate::text::{
    collapse_duplicates, keyed_count, keyed_value, lines, parse_number, Cursor, Line,
};
use log::debug;

/// Header layout of `.voi` files.
pub const LAYOUT: HeaderLayout = HeaderLayout {
    key_split: KeySplit::Column(27),
    key_width: 29,
    sentinel: Sentinel::Key("NrOfVOIs"),
    lines_before_sentinel: 0,
    blank_before: &[
        "FileVersion",
        "OriginalVMRResolutionX",
        "LeftRightConvention",
        "SubjectVOINamingConvention",
    ],
    blank_after: &["FileVersion"],
    omit: None,
};

/// A volume of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Voi {
    /// Name of the VOI
    pub name: String,
    /// Voxel coordinates
    pub data: Vec<[i64; 3]>,
    /// Display colour
    pub colour: Colour,
}

impl Voi {
    /// Create a VOI. A random colour is picked if none is given.
    pub fn new<S: Into<String>>(name: S, data: Vec<[i64; 3]>, colour: Option<Colour>) -> Self {
        Voi {
            name: name.into(),
            data,
            colour: colour.unwrap_or_else(colour::random),
        }
    }

    fn render(&self) -> String {
        let voxels: Vec<String> = self
            .data
            .iter()
            .map(|[x, y, z]| format!("{} {} {}", x, y, z))
            .collect();
        format!(
            "NameOfVOI:  {}\nColorOfVOI: {}\n\nNrOfVoxels: {}\n{}",
            self.name,
            colour::render(&self.colour),
            self.data.len(),
            voxels.join("\n")
        )
    }
}

fn parse_voxel(line: Line<'_>) -> Result<[i64; 3]> {
    let values = line
        .text
        .split_whitespace()
        .map(|t| parse_number(line, t))
        .collect::<Result<Vec<i64>>>()?;
    match values[..] {
        [x, y, z] => Ok([x, y, z]),
        _ => Err(BvError::MalformedLine(line.number, "expected three coordinates")),
    }
}

fn read_voi(cursor: &mut Cursor<'_, '_>) -> Result<Voi> {
    let name = keyed_value(cursor.expect("NameOfVOI")?, "NameOfVOI")?.to_string();
    let colour = colour::parse(keyed_value(cursor.expect(&name)?, "ColorOfVOI")?)?;
    let count = keyed_count(cursor.expect(&name)?, "NrOfVoxels")?;
    let data = cursor
        .rows(&name, count)?
        .into_iter()
        .map(parse_voxel)
        .collect::<Result<Vec<_>>>()?;
    Ok(Voi::new(name, data, Some(colour)))
}

/// Properties of the anatomical reference of a VOIs definition.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiOptions {
    /// Reference space: "BV", "TAL" or "MNI"
    pub reference_space: String,
    /// Resolution of the original VMR
    pub resolution: [i64; 3],
    /// Offset of the original VMR
    pub offset: [i64; 3],
    /// Dimension of the original VMR framing cube
    pub framing_cube: i64,
    /// Image orientation: 1 for radiological, 2 for neurological
    pub left_right: i64,
    /// Subject and VOI naming convention
    pub subject_voi_naming: String,
}

impl Default for VoiOptions {
    fn default() -> Self {
        VoiOptions {
            reference_space: "BV".to_string(),
            resolution: [1, 1, 1],
            offset: [0, 0, 0],
            framing_cube: 256,
            left_right: 1,
            subject_voi_naming: "<VOI>_<SUBJ>".to_string(),
        }
    }
}

/// A set of volumes of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct VoisDefinition {
    header: Header,
    vois: Vec<Voi>,
    vtcs: Vec<String>,
}

impl Default for VoisDefinition {
    fn default() -> Self {
        Self::with_options(&VoiOptions::default())
    }
}

impl VoisDefinition {
    /// Create an empty VOIs definition in BrainVoyager space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty VOIs definition with the given reference.
    pub fn with_options(options: &VoiOptions) -> Self {
        let mut header = Header::new();
        header.set("FileVersion", 4);
        header.set("ReferenceSpace", options.reference_space.as_str());
        for (axis, v) in ["X", "Y", "Z"].iter().zip(&options.resolution) {
            header.set(&format!("OriginalVMRResolution{}", axis), *v);
        }
        for (axis, v) in ["X", "Y", "Z"].iter().zip(&options.offset) {
            header.set(&format!("OriginalVMROffset{}", axis), *v);
        }
        header.set("OriginalVMRFramingCubeDim", options.framing_cube);
        header.set("LeftRightConvention", options.left_right);
        header.set("SubjectVOINamingConvention", options.subject_voi_naming.as_str());
        VoisDefinition {
            header,
            vois: Vec::new(),
            vtcs: Vec::new(),
        }
    }

    /// Obtain a reference to the VOIs, in order.
    pub fn vois(&self) -> &[Voi] {
        &self.vois
    }

    /// The VTC files, in order.
    pub fn vtcs(&self) -> &[String] {
        &self.vtcs
    }

    /// The VOI names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.vois.iter().map(|v| v.name.as_str()).collect()
    }

    /// The VOI colours, in order.
    pub fn colours(&self) -> Vec<Colour> {
        self.vois.iter().map(|v| v.colour).collect()
    }

    /// Add a VOI.
    pub fn add_voi(&mut self, voi: Voi) {
        self.vois.push(voi);
    }

    /// Add the path of a VOI VTC file.
    pub fn add_vtc<S: Into<String>>(&mut self, vtc: S) {
        self.vtcs.push(vtc.into());
    }

    /// Remove all VOIs and VTCs and reset the header.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Document for VoisDefinition {
    const EXTENSION: &'static str = "voi";

    fn header(&self) -> &Header {
        &self.header
    }

    fn from_text(text: &str) -> Result<Self> {
        let lines = collapse_duplicates(lines(text));
        let (parsed, end) = Header::parse(&lines, &LAYOUT)?;
        let count = keyed_count(lines[end], "NrOfVOIs")?;

        let mut doc = Self::default();
        doc.header.merge(parsed);

        let mut cursor = Cursor::new(&lines[end + 1..]);
        for _ in 0..count {
            let voi = read_voi(&mut cursor)?;
            doc.add_voi(voi);
        }
        if let Some(line) = cursor.next_nonblank() {
            let n = keyed_count(line, "NrOfVOIVTCs")?;
            for vtc in cursor.rows("NrOfVOIVTCs", n)? {
                doc.add_vtc(vtc.text.trim());
            }
        }
        if let Some(line) = cursor.peek_nonblank() {
            debug!("ignoring content after the VTC list, from line {}", line.number);
        }
        Ok(doc)
    }

    fn to_text(&self) -> String {
        let vois: Vec<String> = self.vois.iter().map(Voi::render).collect();
        let mut vtcs = format!("NrOfVOIVTCs: {}", self.vtcs.len());
        for vtc in &self.vtcs {
            vtcs.push('\n');
            vtcs.push_str(vtc);
        }
        format!(
            "{}\n\n\n{:<29}{}\n\n{}\n\n\n{}",
            self.header.render(&LAYOUT),
            "NrOfVOIs:",
            self.vois.len(),
            vois.join("\n\n"),
            vtcs
        )
    }
}
