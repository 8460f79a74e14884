//! An application for printing the content of a BrainVoyager text file.

extern crate brainvoyager;

use brainvoyager::{mdm, sdm, ContrastsDefinition, Document, StimulationProtocol, VoisDefinition};
use std::env;
use std::fmt::Debug;
use std::path::Path;

fn dump<D: Document + Debug>(path: &Path) {
    let doc = D::from_file(path).expect("Failed to read file");
    for (key, value) in doc.header().iter() {
        println!("{:<28}{}", format!("{}:", key), value);
    }
    println!("{:#?}", &doc);
}

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to a .ctr, .sdm, .mdm, .prt or .voi file is required");
    let path = Path::new(&filename);
    let name = filename.trim_end_matches(".gz").to_ascii_lowercase();
    match name.rsplit('.').next() {
        Some("ctr") => dump::<ContrastsDefinition>(path),
        Some("sdm") => dump::<sdm::DesignMatrix>(path),
        Some("mdm") => dump::<mdm::DesignMatrix>(path),
        Some("prt") => dump::<StimulationProtocol>(path),
        Some("voi") => dump::<VoisDefinition>(path),
        _ => eprintln!("Unknown file kind: {}", filename),
    }
}
