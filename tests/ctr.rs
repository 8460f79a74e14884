extern crate brainvoyager;
#[macro_use]
extern crate pretty_assertions;

mod util;

use brainvoyager::{Contrast, ContrastsDefinition, Document};
use std::fs;
use util::{contrasts_ctr_gt, temporary_path};

#[test]
fn contrasts_ctr() {
    const FILE_NAME: &str = "resources/contrasts.ctr";
    let ctr = ContrastsDefinition::from_file(FILE_NAME).unwrap();
    assert_eq!(ctr, contrasts_ctr_gt());
    assert_eq!(ctr.names(), vec!["Faces > Houses", "Houses > Faces", "Faces"]);
    assert_eq!(
        ctr.data(),
        vec![vec![1, -1, 1], vec![-1, 1, 0], vec![0, 0, 0]]
    );
}

#[test]
fn contrasts_ctr_layout() {
    let expected = fs::read_to_string("resources/contrasts.ctr").unwrap();
    assert_eq!(contrasts_ctr_gt().to_text(), expected);
}

#[test]
fn save_and_load() {
    let (_dir, path) = temporary_path("contrasts.CTR");
    let written = contrasts_ctr_gt().save(&path).unwrap();
    assert_eq!(written, path);

    let mut ctr = ContrastsDefinition::new();
    ctr.load(&written).unwrap();
    assert_eq!(ctr, contrasts_ctr_gt());
}

#[test]
fn single_contrast() {
    let mut ctr = ContrastsDefinition::new();
    ctr.add_contrast(Contrast::new("Main", vec![1, 0, -10]))
        .unwrap();
    let text = ctr.to_text();
    assert!(text.ends_with("\"Main\"\n  1\n  0\n-10"));
    assert_eq!(ContrastsDefinition::from_text(&text).unwrap(), ctr);
}

#[test]
fn grid_must_match_names() {
    let text = contrasts_ctr_gt()
        .to_text()
        .replace("\"Faces\"\n", "\"Faces\" \"Extra\"\n");
    let err = ContrastsDefinition::from_text(&text).unwrap_err();
    assert!(err.is_structural());
}
