//! Rust implementation of the plain-text BrainVoyager analysis formats.
//!
//! Five document kinds are supported, one module each:
//!
//! | extension | document | module |
//! |---|---|---|
//! | `.ctr` | [`ContrastsDefinition`] | [`ctr`] |
//! | `.sdm` | [`sdm::DesignMatrix`] | [`sdm`] |
//! | `.mdm` | [`mdm::DesignMatrix`] | [`mdm`] |
//! | `.prt` | [`StimulationProtocol`] | [`prt`] |
//! | `.voi` | [`VoisDefinition`] | [`voi`] |
//!
//! All of them implement [`Document`], which reads and writes files
//! (gzipped when the name ends in ".gz").
//!
//! # Example
//!
//! ```no_run
//! use brainvoyager::{Document, StimulationProtocol};
//! # use brainvoyager::Result;
//!
//! # fn run() -> Result<()> {
//! let prt = StimulationProtocol::from_file("run1.prt")?;
//! for event in prt.event_list() {
//!     println!("{} {} {}", event.name, event.onset, event.offset);
//! }
//! # Ok(())
//! # }
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

#[cfg(feature = "ndarray_matrices")]
extern crate ndarray;

pub mod colour;
pub mod ctr;
pub mod document;
pub mod error;
pub mod header;
pub mod layout;
pub mod mdm;
pub mod prt;
pub mod sdm;
pub mod text;
mod util;
pub mod voi;
pub mod writer;

pub use crate::colour::Colour;
pub use crate::ctr::{Contrast, ContrastsDefinition};
pub use crate::document::Document;
pub use crate::error::{BvError, Result};
pub use crate::header::{Header, Value};
pub use crate::prt::{Condition, Interval, StimulationProtocol, TimeUnits};
pub use crate::voi::{Voi, VoiOptions, VoisDefinition};
pub use crate::writer::WriterOptions;
