//! Single-subject design matrices (`.sdm`).
//!
//! Predictors are ordered in three groups: predictors of interest, confound
//! predictors, and an optional trailing constant. The header keeps track of
//! the group boundaries through `FirstConfoundPredictor` and
//! `IncludesConstant`.

use crate::colour::{self, Colour};
use crate::document::{check_counter, Document};
use crate::error::{BvError, Result};
use crate::header::Header;
use crate::layout::{HeaderLayout, KeySplit, Sentinel};
use crate::prt::{StimulationProtocol, TimeUnits};
use crate::text::{
    fixed_width_fields, lines, parse_grid, parse_names, render_names, transpose, Line,
};
use crate::util::read_text;
use log::{debug, warn};
use num_traits::ToPrimitive;
use rgb::RGB;
use std::path::Path;

#[cfg(feature = "ndarray_matrices")]
use ndarray::Array2;

/// Header layout of `.sdm` files. The colour line sits right before the
/// line of names.
pub const LAYOUT: HeaderLayout = HeaderLayout {
    key_split: KeySplit::Column(24),
    key_width: 24,
    sentinel: Sentinel::Quote,
    lines_before_sentinel: 1,
    blank_before: &[],
    blank_after: &["FileVersion"],
    omit: None,
};

/// Column width of design files.
pub const DESIGN_COLUMN_WIDTH: usize = 11;
/// Column width of motion parameter files.
pub const MOTION_COLUMN_WIDTH: usize = 12;

/// A named time course of a design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictor {
    /// Name of the predictor
    pub name: String,
    /// One value per data point
    pub data: Vec<f64>,
    /// Display colour
    pub colour: Colour,
}

impl Predictor {
    /// Create a predictor. A random colour is picked if none is given.
    pub fn new<S: Into<String>>(name: S, data: Vec<f64>, colour: Option<Colour>) -> Self {
        Predictor {
            name: name.into(),
            data,
            colour: colour.unwrap_or_else(colour::random),
        }
    }

    /// Convolve the time course with an impulse response, keeping the
    /// original number of data points.
    pub fn convolve(&mut self, kernel: &[f64]) {
        let data = &self.data;
        let convolved: Vec<f64> = (0..data.len())
            .map(|i| {
                kernel
                    .iter()
                    .take(i + 1)
                    .enumerate()
                    .map(|(k, w)| w * data[i - k])
                    .sum::<f64>()
            })
            .collect();
        self.data = convolved;
    }
}

/// A single-subject design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    header: Header,
    predictors: Vec<Predictor>,
}

impl Default for DesignMatrix {
    fn default() -> Self {
        let mut header = Header::new();
        header.set("FileVersion", 1);
        header.set("NrOfPredictors", 0);
        header.set("NrOfDataPoints", 0);
        header.set("IncludesConstant", 0);
        header.set("FirstConfoundPredictor", 1);
        DesignMatrix {
            header,
            predictors: Vec::new(),
        }
    }
}

impl DesignMatrix {
    /// Create an empty design matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a reference to the predictors, in order.
    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    /// The predictor names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.predictors.iter().map(|p| p.name.as_str()).collect()
    }

    /// The predictor colours, in order.
    pub fn colours(&self) -> Vec<Colour> {
        self.predictors.iter().map(|p| p.colour).collect()
    }

    fn data_points(&self) -> usize {
        self.predictors.first().map_or(0, |p| p.data.len())
    }

    /// The values as rows, one column per predictor.
    pub fn data(&self) -> Vec<Vec<f64>> {
        (0..self.data_points())
            .map(|i| self.predictors.iter().map(|p| p.data[i]).collect())
            .collect()
    }

    /// The values as a matrix of shape `(data points, predictors)`.
    #[cfg(feature = "ndarray_matrices")]
    pub fn data_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.data_points(), self.predictors.len()), |(i, j)| {
            self.predictors[j].data[i]
        })
    }

    /// Add a predictor.
    ///
    /// Predictors of interest are placed before the first confound
    /// predictor, confound predictors before the constant.
    ///
    /// # Errors
    ///
    /// - `BvError::LengthMismatch` if the predictor does not have as many
    ///   values as the predictors already present.
    pub fn add_predictor(&mut self, predictor: Predictor, is_confound: bool) -> Result<()> {
        if self.predictors.is_empty() {
            self.header
                .set("NrOfDataPoints", predictor.data.len() as i64);
        } else if predictor.data.len() != self.data_points() {
            return Err(BvError::LengthMismatch(
                "Predictor",
                predictor.data.len(),
                self.data_points(),
            ));
        }
        let count = self.predictors.len() as i64;

        let position = if is_confound {
            count - self.header.int_or_zero("IncludesConstant")
        } else {
            self.header.int_or_zero("FirstConfoundPredictor") - 1
        };
        let position = position.max(0).min(self.predictors.len() as i64) as usize;
        self.predictors.insert(position, predictor);

        self.header.increment("NrOfPredictors");
        if !is_confound {
            self.header.increment("FirstConfoundPredictor");
        }
        Ok(())
    }

    /// Add a confound predictor.
    pub fn add_confound_predictor(&mut self, predictor: Predictor) -> Result<()> {
        self.add_predictor(predictor, true)
    }

    /// Add a white constant predictor as the last predictor.
    ///
    /// # Errors
    ///
    /// - `BvError::NoDataPoints` if the design matrix has no predictors yet.
    pub fn add_constant(&mut self) -> Result<()> {
        let n = self.data_points();
        if self.predictors.is_empty() {
            return Err(BvError::NoDataPoints);
        }
        let constant = Predictor::new("Constant", vec![1.; n], Some(RGB::new(255, 255, 255)));
        self.add_predictor(constant, true)?;
        self.header.set("IncludesConstant", 1);
        Ok(())
    }

    /// Add one boxcar predictor per condition of a protocol in volumes.
    ///
    /// Conditions with weights other than 1 get a `[Main]` predictor and a
    /// `[Parametric]` predictor holding the weights minus the mean of the
    /// distinct weights. When a kernel is given, every predictor is convolved
    /// with it.
    ///
    /// # Errors
    ///
    /// - `BvError::UnsupportedTimeUnits` if the protocol is in milliseconds.
    /// - `BvError::LengthMismatch` if `data_points` differs from the
    ///   predictors already present.
    pub fn define_predictors(
        &mut self,
        protocol: &StimulationProtocol,
        data_points: usize,
        kernel: Option<&[f64]>,
    ) -> Result<()> {
        let units = protocol.time_units();
        if units != TimeUnits::Volumes {
            return Err(BvError::UnsupportedTimeUnits(units.to_string()));
        }
        if !self.predictors.is_empty() && self.data_points() != data_points {
            return Err(BvError::LengthMismatch(
                "Predictor",
                data_points,
                self.data_points(),
            ));
        }

        for condition in protocol.conditions() {
            let weights: Vec<f64> = condition
                .intervals
                .iter()
                .map(|i| i.weight.map_or(1., |w| w.as_f64()))
                .collect();
            let modulated = protocol.is_parametric() && weights.iter().any(|&w| w != 1.);

            let mut main = vec![0.; data_points];
            let mut parametric = vec![0.; data_points];
            let mut distinct = weights.clone();
            distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            distinct.dedup();
            let mean = distinct.iter().sum::<f64>() / distinct.len().max(1) as f64;

            for (interval, weight) in condition.intervals.iter().zip(&weights) {
                let onset = interval.onset.to_i64().unwrap_or(1);
                let offset = interval.offset.to_i64().unwrap_or(0);
                for volume in onset..=offset {
                    if volume < 1 || volume as usize > data_points {
                        warn!(
                            "volume {} of condition `{}` is outside of the {} data points",
                            volume, condition.name, data_points
                        );
                        continue;
                    }
                    main[volume as usize - 1] = 1.;
                    parametric[volume as usize - 1] = weight - mean;
                }
            }

            let predictors = if modulated {
                vec![
                    Predictor::new(
                        format!("{} [Main]", condition.name),
                        main,
                        Some(condition.colour),
                    ),
                    Predictor::new(
                        format!("{} [Parametric]", condition.name),
                        parametric,
                        Some(condition.colour),
                    ),
                ]
            } else {
                vec![Predictor::new(condition.name.clone(), main, Some(condition.colour))]
            };
            for mut predictor in predictors {
                if let Some(kernel) = kernel {
                    predictor.convolve(kernel);
                }
                self.add_predictor(predictor, false)?;
            }
        }
        Ok(())
    }

    /// Remove all predictors and reset the header.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Options for reading design matrices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    column_width: Option<usize>,
}

impl ReaderOptions {
    /// Options inferring the column width from the data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read values from columns of exactly this many characters
    /// (see [`DESIGN_COLUMN_WIDTH`] and [`MOTION_COLUMN_WIDTH`]).
    pub fn column_width(mut self, width: usize) -> Self {
        self.column_width = Some(width);
        self
    }

    /// Read a design matrix from a file. Files ending in ".gz" are
    /// decompressed.
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<DesignMatrix> {
        let path = path.as_ref();
        let text = read_text(path)?;
        self.read_text(&text)
            .map_err(|e| BvError::Read(path.to_path_buf(), Box::new(e)))
    }

    /// Parse a design matrix from its text representation.
    pub fn read_text(&self, text: &str) -> Result<DesignMatrix> {
        let lines = lines(text);
        let (parsed, end) = Header::parse(&lines, &LAYOUT)?;
        let names = parse_names(lines[end])?;
        let colours = match end.checked_sub(1) {
            Some(i) => colour::parse_many(lines[i].text)?,
            None => Vec::new(),
        };
        if colours.len() != names.len() {
            return Err(BvError::MalformedLine(
                lines[end].number,
                "number of colours does not match the number of names",
            ));
        }
        let rows = self.parse_rows(&lines[end + 1..], names.len())?;
        let columns = transpose(&rows, names.len());

        let mut doc = DesignMatrix::default();
        doc.header.merge(parsed);
        doc.predictors = names
            .into_iter()
            .zip(columns)
            .zip(colours)
            .map(|((name, data), colour)| Predictor::new(name, data, Some(colour)))
            .collect();
        check_counter(&doc.header, "NrOfPredictors", doc.predictors.len());
        check_counter(&doc.header, "NrOfDataPoints", rows.len());
        doc.header.set("NrOfPredictors", doc.predictors.len() as i64);
        if !doc.predictors.is_empty() {
            doc.header.set("NrOfDataPoints", rows.len() as i64);
        }
        Ok(doc)
    }

    fn parse_rows(&self, rows: &[Line<'_>], columns: usize) -> Result<Vec<Vec<f64>>> {
        if let Some(width) = self.column_width {
            return parse_grid(rows, width, columns);
        }
        let mut widths = Vec::with_capacity(3);
        widths.extend(infer_width(rows, columns));
        widths.extend(&[DESIGN_COLUMN_WIDTH, MOTION_COLUMN_WIDTH]);

        let mut result = Ok(Vec::new());
        for width in widths {
            result = parse_grid(rows, width, columns);
            if result.is_ok() {
                debug!("design matrix grid read with columns of {} characters", width);
                break;
            }
        }
        result
    }
}

/// Guess the column width from the first data row.
fn infer_width(rows: &[Line<'_>], columns: usize) -> Option<usize> {
    let row = rows.iter().find(|l| !l.is_blank())?;
    let len = row.text.trim_end().chars().count();
    if columns == 0 || len % columns != 0 {
        return None;
    }
    let width = len / columns;
    // a width that merges neighbouring values yields fewer fields
    if fixed_width_fields(row.text, width).len() == columns {
        Some(width)
    } else {
        None
    }
}

impl Document for DesignMatrix {
    const EXTENSION: &'static str = "sdm";

    fn header(&self) -> &Header {
        &self.header
    }

    fn from_text(text: &str) -> Result<Self> {
        ReaderOptions::default().read_text(text)
    }

    fn to_text(&self) -> String {
        let colours: Vec<String> = self
            .predictors
            .iter()
            .map(|p| colour::render(&p.colour))
            .collect();
        let rows: Vec<String> = self
            .data()
            .iter()
            .map(|row| row.iter().map(|v| format!("{:>12.6}", v)).collect())
            .collect();
        format!(
            "{}\n\n{}\n{}\n{}",
            self.header.render(&LAYOUT),
            colours.join("   "),
            render_names(self.names()),
            rows.join("\n")
        )
    }
}
