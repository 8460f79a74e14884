extern crate brainvoyager;
extern crate flate2;
#[macro_use]
extern crate pretty_assertions;

mod util;

use brainvoyager::{Document, StimulationProtocol, WriterOptions};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::Read;
use util::{faces_prt_gt, temporary_path};

#[test]
fn keep_extension() {
    let (_dir, path) = temporary_path("faces.txt");
    let written = WriterOptions::new(&path)
        .fix_extension(false)
        .write(&faces_prt_gt())
        .unwrap();
    assert_eq!(written, path);
    assert_eq!(fs::read_to_string(&written).unwrap(), faces_prt_gt().to_text());
}

#[test]
fn forced_compression() {
    let (_dir, path) = temporary_path("faces.prt");
    let written = WriterOptions::new(&path)
        .compress(true)
        .write(&faces_prt_gt())
        .unwrap();
    assert_eq!(written, path);

    let mut text = String::new();
    let _ = GzDecoder::new(File::open(&written).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, faces_prt_gt().to_text());
}

#[test]
fn disabled_compression() {
    let (_dir, path) = temporary_path("faces.prt.gz");
    let written = WriterOptions::new(&path)
        .compress(false)
        .write(&faces_prt_gt())
        .unwrap();
    assert_eq!(fs::read_to_string(&written).unwrap(), faces_prt_gt().to_text());
    // the name still asks for decompression
    assert!(StimulationProtocol::from_file(&written).is_err());
}
