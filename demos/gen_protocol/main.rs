//! An application for writing a block design protocol and its design matrix
//! from scratch.

extern crate brainvoyager;

use brainvoyager::sdm::DesignMatrix;
use brainvoyager::{Condition, Document, Interval, StimulationProtocol, TimeUnits, WriterOptions};
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Output path, without extension, is required");

    // alternating 10 volume blocks of two conditions, starting with rest
    let mut prt = StimulationProtocol::new("blocks", TimeUnits::Volumes);
    for (i, name) in ["A", "B"].iter().enumerate() {
        let intervals = (0..5)
            .map(|b| {
                let onset = 11 + (2 * b + i as i64) * 10;
                Interval::new(onset, onset + 9)
            })
            .collect();
        prt.add_condition(Condition::new(*name, intervals, None));
    }
    let path = prt.save(&filename).unwrap();
    println!("wrote {}", path.display());

    let mut sdm = DesignMatrix::new();
    sdm.define_predictors(&prt, 110, None).unwrap();
    sdm.add_constant().unwrap();
    let path = WriterOptions::new(format!("{}.gz", filename)).write(&sdm).unwrap();
    println!("wrote {}", path.display());
}
