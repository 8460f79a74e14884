//! Stimulation protocols (`.prt`).
//!
//! A protocol lists conditions, each made of time intervals (onset and
//! offset, plus a parametric weight in version 3 files). Intervals are
//! given in volumes or in milliseconds.
//!
//! Every condition of a protocol has the same number of columns: adding a
//! condition with weights gives all others a unit weight, and conditions
//! added to a parametric protocol get a unit weight as well.

use crate::colour::{self, Colour};
use crate::document::Document;
use crate::error::{BvError, Result};
use crate::header::Header;
use crate::layout::{HeaderLayout, KeySplit, Sentinel};
use crate::text::{
    collapse_duplicates, keyed_count, keyed_value, lines, parse_number, Cursor, Line,
};
use log::debug;
use num_traits::ToPrimitive;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Header layout of `.prt` files.
pub const LAYOUT: HeaderLayout = HeaderLayout {
    key_split: KeySplit::Colon,
    key_width: 20,
    sentinel: Sentinel::Key("NrOfConditions"),
    lines_before_sentinel: 0,
    blank_before: &[],
    blank_after: &[
        "FileVersion",
        "ResolutionOfTime",
        "Experiment",
        "ReferenceFuncThick",
        "ParametricWeights",
    ],
    omit: Some(omit_weights_flag),
};

// Only version 3 files carry the flag.
fn omit_weights_flag(header: &Header, key: &str) -> bool {
    key == "ParametricWeights" && header.get_int("FileVersion") != Some(3)
}

/// A number found in a condition row: integral unless written otherwise.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// An integer
    Int(i64),
    /// A floating point number
    Float(f64),
}

impl Number {
    /// Parse an integer, falling back to floating point.
    pub fn parse(token: &str) -> Option<Number> {
        let token = token.trim();
        token
            .parse()
            .map(Number::Int)
            .or_else(|_| token.parse().map(Number::Float))
            .ok()
    }

    /// The value as a floating point number.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn combine(
        self,
        other: Number,
        int: fn(i64, i64) -> i64,
        float: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Number::Int(int(a, b)),
            (a, b) => Number::Float(float(a.as_f64(), b.as_f64())),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(&b),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, other: Number) -> Number {
        self.combine(other, |a, b| a + b, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, other: Number) -> Number {
        self.combine(other, |a, b| a - b, |a, b| a - b)
    }
}

impl ToPrimitive for Number {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(v) => Some(v),
            Number::Float(v) => v.to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(v) => v.to_u64(),
            Number::Float(v) => v.to_u64(),
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.as_f64())
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int(v.into())
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// One row of a condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Start of the interval
    pub onset: Number,
    /// End of the interval
    pub offset: Number,
    /// Parametric weight, if the protocol has them
    pub weight: Option<Number>,
}

impl Interval {
    /// An interval without weight.
    pub fn new<N: Into<Number>>(onset: N, offset: N) -> Self {
        Interval {
            onset: onset.into(),
            offset: offset.into(),
            weight: None,
        }
    }

    /// An interval with a parametric weight.
    pub fn weighted<N: Into<Number>, W: Into<Number>>(onset: N, offset: N, weight: W) -> Self {
        Interval {
            onset: onset.into(),
            offset: offset.into(),
            weight: Some(weight.into()),
        }
    }

    fn columns(&self) -> Vec<Number> {
        let mut cols = vec![self.onset, self.offset];
        cols.extend(self.weight);
        cols
    }

    fn from_row(line: Line<'_>) -> Result<Self> {
        let values = line
            .text
            .split_whitespace()
            .map(|t| {
                Number::parse(t).ok_or_else(|| BvError::InvalidNumber(line.number, t.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        match values[..] {
            [onset, offset] => Ok(Interval::new(onset, offset)),
            [onset, offset, weight] => Ok(Interval::weighted(onset, offset, weight)),
            _ => Err(BvError::MalformedLine(
                line.number,
                "expected onset, offset and optional weight",
            )),
        }
    }
}

/// A named condition of a stimulation protocol.
///
/// The name takes a line of its own in the file, so a condition whose name
/// is empty or only whitespace is written but cannot be read back.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Name of the condition, not blank
    pub name: String,
    /// Intervals, in order
    pub intervals: Vec<Interval>,
    /// Display colour
    pub colour: Colour,
}

impl Condition {
    /// Create a condition. A random colour is picked if none is given.
    pub fn new<S: Into<String>>(name: S, intervals: Vec<Interval>, colour: Option<Colour>) -> Self {
        Condition {
            name: name.into(),
            intervals,
            colour: colour.unwrap_or_else(colour::random),
        }
    }

    /// Whether any interval carries a parametric weight.
    pub fn has_weights(&self) -> bool {
        self.intervals.iter().any(|i| i.weight.is_some())
    }

    /// Merge two conditions into one named `a+b`, holding the intervals of
    /// both sorted by onset. The colours are summed, saturating at 255.
    pub fn combine(&self, other: &Condition) -> Condition {
        let mut intervals: Vec<Interval> = self
            .intervals
            .iter()
            .chain(&other.intervals)
            .copied()
            .collect();
        intervals.sort_by(|a, b| a.onset.partial_cmp(&b.onset).unwrap_or(Ordering::Equal));
        Condition {
            name: format!("{}+{}", self.name, other.name),
            intervals,
            colour: colour::combine(self.colour, other.colour),
        }
    }

    fn fill_unit_weights(&mut self) {
        for interval in &mut self.intervals {
            let _ = interval.weight.get_or_insert(Number::Int(1));
        }
    }

    fn render(&self) -> String {
        let width = self
            .intervals
            .iter()
            .map(|i| i.offset.to_string().len())
            .max()
            .unwrap_or(0);
        let mut out = format!("{}\n{}\n", self.name, self.intervals.len());
        let rows: Vec<String> = self
            .intervals
            .iter()
            .map(|i| {
                let cols: Vec<String> = i
                    .columns()
                    .iter()
                    .map(|c| format!("{:>width$}", c.to_string(), width = width))
                    .collect();
                format!(" {}", cols.join("  "))
            })
            .collect();
        out.push_str(&rows.join("\n"));
        out.push_str("\nColor: ");
        out.push_str(&colour::render(&self.colour));
        out
    }
}

impl Add for Condition {
    type Output = Condition;

    fn add(self, other: Condition) -> Condition {
        self.combine(&other)
    }
}

impl<'a> Add<&'a Condition> for &'a Condition {
    type Output = Condition;

    fn add(self, other: &Condition) -> Condition {
        self.combine(other)
    }
}

/// The unit of onsets and offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnits {
    /// Volume numbers, starting at 1, offsets inclusive
    Volumes,
    /// Milliseconds
    Msec,
}

impl TimeUnits {
    /// The name used in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnits::Volumes => "Volumes",
            TimeUnits::Msec => "msec",
        }
    }
}

impl FromStr for TimeUnits {
    type Err = BvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Volumes" => Ok(TimeUnits::Volumes),
            "msec" => Ok(TimeUnits::Msec),
            _ => Err(BvError::InvalidTimeUnits(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event of a protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Name of the condition the event belongs to
    pub name: String,
    /// Start of the event
    pub onset: Number,
    /// End of the event
    pub offset: Number,
    /// Parametric weight, if any
    pub weight: Option<Number>,
}

/// A stimulation protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulationProtocol {
    header: Header,
    conditions: Vec<Condition>,
}

impl Default for StimulationProtocol {
    fn default() -> Self {
        let mut header = Header::new();
        header.set("FileVersion", 2);
        header.set("ResolutionOfTime", TimeUnits::Volumes.as_str());
        header.set("Experiment", "untitled");
        header.set("BackgroundColor", [0, 0, 0]);
        header.set("TextColor", [255, 255, 255]);
        header.set("TimeCourseColor", [255, 255, 255]);
        header.set("TimeCourseThick", 3);
        header.set("ReferenceFuncColor", [0, 0, 80]);
        header.set("ReferenceFuncThick", 3);
        header.set("ParametricWeights", 0);
        header.set("NrOfConditions", 0);
        StimulationProtocol {
            header,
            conditions: Vec::new(),
        }
    }
}

impl StimulationProtocol {
    /// Create an empty protocol.
    ///
    /// # Example
    ///
    /// ```
    /// use brainvoyager::prt::{Condition, Interval, Number, StimulationProtocol, TimeUnits};
    ///
    /// let mut prt = StimulationProtocol::new("faces", TimeUnits::Volumes);
    /// prt.add_condition(Condition::new("Faces", vec![Interval::new(1, 10)], None));
    /// prt.add_condition(Condition::new("Houses", vec![Interval::weighted(11, 20, 2)], None));
    /// assert_eq!(prt.condition_weights(), vec![vec![Number::Int(1)], vec![Number::Int(2)]]);
    /// ```
    pub fn new(experiment_name: &str, time_units: TimeUnits) -> Self {
        let mut prt = Self::default();
        prt.header.set("Experiment", experiment_name);
        prt.header.set("ResolutionOfTime", time_units.as_str());
        prt
    }

    /// Obtain a reference to the protocol's conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The time units of onsets and offsets.
    pub fn time_units(&self) -> TimeUnits {
        match self.header.get("ResolutionOfTime") {
            Some(v) if v.to_string() == "msec" => TimeUnits::Msec,
            _ => TimeUnits::Volumes,
        }
    }

    /// The experiment name.
    pub fn experiment_name(&self) -> String {
        self.header
            .get("Experiment")
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Whether the protocol carries parametric weights.
    pub fn is_parametric(&self) -> bool {
        self.header.get_int("FileVersion") == Some(3)
            && self.header.get_int("ParametricWeights") == Some(1)
    }

    /// Add a condition to the protocol, keeping the number of columns equal
    /// across all conditions.
    pub fn add_condition(&mut self, mut condition: Condition) {
        if condition.has_weights() {
            self.header.set("FileVersion", 3);
            self.header.set("ParametricWeights", 1);
            for c in &mut self.conditions {
                c.fill_unit_weights();
            }
        }
        if self.is_parametric() {
            condition.fill_unit_weights();
        }
        self.conditions.push(condition);
        self.header.increment("NrOfConditions");
    }

    /// Remove all conditions and reset the header.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Convert onsets and offsets from volumes to milliseconds, given the
    /// repetition time in milliseconds. Onset `v` becomes `(v - 1) * tr` and
    /// offset `v` becomes `v * tr`.
    ///
    /// Nothing happens if the protocol is already in milliseconds.
    pub fn convert_to_msec(&mut self, tr: f64) {
        if self.time_units() == TimeUnits::Msec {
            return;
        }
        for condition in &mut self.conditions {
            for interval in &mut condition.intervals {
                interval.onset = Number::Int(((interval.onset.as_f64() - 1.) * tr) as i64);
                interval.offset = Number::Int((interval.offset.as_f64() * tr) as i64);
            }
        }
        self.header.set("ResolutionOfTime", TimeUnits::Msec.as_str());
    }

    fn duration(&self, interval: &Interval) -> Number {
        match self.time_units() {
            TimeUnits::Msec => interval.offset - interval.onset,
            TimeUnits::Volumes => interval.offset - interval.onset + Number::Int(1),
        }
    }

    /// All events of all conditions, sorted by onset.
    pub fn event_list(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .conditions
            .iter()
            .flat_map(|c| {
                c.intervals.iter().map(move |i| Event {
                    name: c.name.clone(),
                    onset: i.onset,
                    offset: i.offset,
                    weight: i.weight,
                })
            })
            .collect();
        events.sort_by(|a, b| a.onset.partial_cmp(&b.onset).unwrap_or(Ordering::Equal));
        events
    }

    /// Condition names of all events, sorted by onset.
    pub fn event_names(&self) -> Vec<String> {
        self.event_list().into_iter().map(|e| e.name).collect()
    }

    /// Onsets of all events, sorted by onset.
    pub fn event_onsets(&self) -> Vec<Number> {
        self.event_list().iter().map(|e| e.onset).collect()
    }

    /// Durations of all events, sorted by onset. Durations in volumes
    /// include the offset volume.
    pub fn event_durations(&self) -> Vec<Number> {
        self.event_list()
            .iter()
            .map(|e| self.duration(&Interval::new(e.onset, e.offset)))
            .collect()
    }

    /// Weights of all events, sorted by onset; 1 for unweighted events.
    pub fn event_weights(&self) -> Vec<Number> {
        self.event_list()
            .iter()
            .map(|e| e.weight.unwrap_or(Number::Int(1)))
            .collect()
    }

    /// Names of all conditions.
    pub fn condition_names(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.name.as_str()).collect()
    }

    /// Onsets, per condition.
    pub fn condition_onsets(&self) -> Vec<Vec<Number>> {
        self.conditions
            .iter()
            .map(|c| c.intervals.iter().map(|i| i.onset).collect())
            .collect()
    }

    /// Durations, per condition.
    pub fn condition_durations(&self) -> Vec<Vec<Number>> {
        self.conditions
            .iter()
            .map(|c| c.intervals.iter().map(|i| self.duration(i)).collect())
            .collect()
    }

    /// Weights, per condition; 1 for unweighted intervals.
    pub fn condition_weights(&self) -> Vec<Vec<Number>> {
        self.conditions
            .iter()
            .map(|c| {
                c.intervals
                    .iter()
                    .map(|i| i.weight.unwrap_or(Number::Int(1)))
                    .collect()
            })
            .collect()
    }
}

fn read_condition(cursor: &mut Cursor<'_, '_>) -> Result<Condition> {
    let name = cursor.expect("condition name")?.text.trim().to_string();
    let count_line = cursor.expect(&name)?;
    let count: usize = parse_number(count_line, count_line.text)?;
    let intervals = cursor
        .rows(&name, count)?
        .into_iter()
        .map(Interval::from_row)
        .collect::<Result<Vec<_>>>()?;
    let colour_line = cursor.expect(&name)?;
    let colour = colour::parse(keyed_value(colour_line, "Color")?)?;
    Ok(Condition::new(name, intervals, Some(colour)))
}

impl Document for StimulationProtocol {
    const EXTENSION: &'static str = "prt";

    fn header(&self) -> &Header {
        &self.header
    }

    fn from_text(text: &str) -> Result<Self> {
        let lines = collapse_duplicates(lines(text));
        let (parsed, end) = Header::parse(&lines, &LAYOUT)?;
        let count = keyed_count(lines[end], "NrOfConditions")?;

        let mut prt = Self::default();
        prt.header.merge(parsed);
        prt.header.set("NrOfConditions", 0);
        prt.header.move_to_end("NrOfConditions");

        let mut cursor = Cursor::new(&lines[end + 1..]);
        for _ in 0..count {
            let condition = read_condition(&mut cursor)?;
            prt.add_condition(condition);
        }
        if let Some(line) = cursor.peek_nonblank() {
            debug!("ignoring content after the last condition, from line {}", line.number);
        }
        Ok(prt)
    }

    fn to_text(&self) -> String {
        let conditions: Vec<String> = self.conditions.iter().map(Condition::render).collect();
        format!(
            "\n{}\n\n{}",
            self.header.render(&LAYOUT),
            conditions.join("\n\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rgb::RGB;

    fn two_conditions() -> StimulationProtocol {
        let mut prt = StimulationProtocol::default();
        prt.add_condition(Condition::new(
            "A",
            vec![Interval::new(1, 3)],
            Some(RGB::new(255, 0, 0)),
        ));
        prt.add_condition(Condition::new(
            "B",
            vec![Interval::new(5, 6)],
            Some(RGB::new(0, 255, 0)),
        ));
        prt
    }

    #[test]
    fn numbers() {
        assert_eq!(Number::parse("3"), Some(Number::Int(3)));
        assert_eq!(Number::parse("0.5"), Some(Number::Float(0.5)));
        assert_eq!(Number::parse("x"), None);
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_eq!(Number::Int(6) - Number::Int(5), Number::Int(1));
        assert_eq!((Number::Float(1.5) + Number::Int(1)).to_string(), "2.5");
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(4.7).to_i64(), Some(4));
    }

    #[test]
    fn time_units() {
        assert_eq!("msec".parse::<TimeUnits>().unwrap(), TimeUnits::Msec);
        let err = "seconds".parse::<TimeUnits>().unwrap_err();
        assert!(err.is_invariant());
        let prt = StimulationProtocol::new("x", TimeUnits::Msec);
        assert_eq!(prt.time_units(), TimeUnits::Msec);
        assert_eq!(prt.experiment_name(), "x");
    }

    #[test]
    fn derived_views() {
        let prt = two_conditions();
        let events = prt.event_list();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "A");
        assert_eq!((events[0].onset, events[0].offset), (Number::Int(1), Number::Int(3)));
        assert_eq!(events[1].name, "B");
        assert_eq!(prt.event_names(), vec!["A", "B"]);
        assert_eq!(prt.event_durations(), vec![Number::Int(3), Number::Int(2)]);
        assert_eq!(prt.condition_durations()[0], vec![Number::Int(3)]);
        assert_eq!(prt.condition_weights(), vec![vec![Number::Int(1)], vec![Number::Int(1)]]);
        assert_eq!(prt.condition_onsets(), vec![vec![Number::Int(1)], vec![Number::Int(5)]]);
    }

    #[test]
    fn events_sorted_across_conditions() {
        let mut prt = StimulationProtocol::default();
        prt.add_condition(Condition::new(
            "late",
            vec![Interval::new(10, 12), Interval::new(2, 3)],
            None,
        ));
        prt.add_condition(Condition::new("early", vec![Interval::new(1, 1)], None));
        assert_eq!(prt.event_names(), vec!["early", "late", "late"]);
        assert_eq!(prt.event_onsets(), vec![Number::Int(1), Number::Int(2), Number::Int(10)]);
    }

    #[test]
    fn weight_retrofit() {
        let mut prt = two_conditions();
        assert!(!prt.is_parametric());
        prt.add_condition(Condition::new("C", vec![Interval::weighted(8, 9, 0.5)], None));
        assert!(prt.is_parametric());
        assert_eq!(prt.header().get_int("FileVersion"), Some(3));
        assert_eq!(prt.header().get_int("ParametricWeights"), Some(1));
        for c in prt.conditions() {
            assert!(c.intervals.iter().all(|i| i.weight.is_some()));
        }
        assert_eq!(prt.conditions()[0].intervals[0].weight, Some(Number::Int(1)));

        prt.add_condition(Condition::new("D", vec![Interval::new(20, 21)], None));
        assert_eq!(prt.conditions()[3].intervals[0].weight, Some(Number::Int(1)));
        assert_eq!(prt.header().get_int("NrOfConditions"), Some(4));
    }

    #[test]
    fn msec_conversion() {
        let mut prt = two_conditions();
        prt.convert_to_msec(2000.);
        assert_eq!(prt.time_units(), TimeUnits::Msec);
        let a = &prt.conditions()[0].intervals[0];
        assert_eq!((a.onset, a.offset), (Number::Int(0), Number::Int(6000)));
        assert_eq!(prt.condition_durations()[0], vec![Number::Int(6000)]);

        let once = prt.clone();
        prt.convert_to_msec(2000.);
        assert_eq!(prt, once);
    }

    #[test]
    fn combine_conditions() {
        let a = Condition::new(
            "A",
            vec![Interval::new(7, 8), Interval::new(1, 2)],
            Some(RGB::new(200, 0, 10)),
        );
        let b = Condition::new("B", vec![Interval::new(4, 5)], Some(RGB::new(100, 0, 20)));
        let ab = &a + &b;
        assert_eq!(ab.name, "A+B");
        let onsets: Vec<Number> = ab.intervals.iter().map(|i| i.onset).collect();
        assert_eq!(onsets, vec![Number::Int(1), Number::Int(4), Number::Int(7)]);
        assert_eq!(ab.colour, RGB::new(255, 0, 30));
        assert_eq!(a + b, ab);
    }

    #[test]
    fn condition_layout() {
        let c = Condition::new(
            "B",
            vec![Interval::new(5, 6), Interval::new(10, 12)],
            Some(RGB::new(0, 255, 0)),
        );
        assert_eq!(c.render(), "B\n2\n  5   6\n 10  12\nColor: 0 255 0");
    }

    #[test]
    fn blank_condition_name_is_not_readable() {
        let mut prt = StimulationProtocol::new("x", TimeUnits::Volumes);
        prt.add_condition(Condition::new(" ", vec![Interval::new(1, 2)], None));
        let err = StimulationProtocol::from_text(&prt.to_text()).unwrap_err();
        assert!(err.is_structural(), "{:?}", err);
    }

    #[test]
    fn round_trip() {
        let prt = two_conditions();
        let text = prt.to_text();
        assert_eq!(StimulationProtocol::from_text(&text).unwrap(), prt);
    }

    #[test]
    fn truncated_condition() {
        let mut text = two_conditions().to_text();
        text = text.replace("B\n1\n", "B\n4\n");
        let err = StimulationProtocol::from_text(&text).unwrap_err();
        assert!(err.is_structural(), "{:?}", err);
    }
}
