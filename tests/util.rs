use brainvoyager::mdm::{self, Study};
use brainvoyager::sdm::{self, Predictor};
use brainvoyager::{
    Condition, Contrast, ContrastsDefinition, Interval, StimulationProtocol, TimeUnits, Voi,
    VoiOptions, VoisDefinition,
};
use rgb::RGB;
use std::path::PathBuf;
use tempfile::TempDir;

/// A fresh temporary directory and a path inside it. The directory is removed
/// when the returned guard is dropped.
#[allow(dead_code)]
pub fn temporary_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

/// Known content of "resources/faces.prt".
#[allow(dead_code)]
pub fn faces_prt_gt() -> StimulationProtocol {
    let mut prt = StimulationProtocol::new("faces", TimeUnits::Volumes);
    prt.add_condition(Condition::new(
        "Faces",
        vec![Interval::weighted(1, 10, 1), Interval::weighted(41, 50, 2)],
        Some(RGB::new(255, 0, 0)),
    ));
    prt.add_condition(Condition::new(
        "Houses",
        vec![Interval::new(21, 30)],
        Some(RGB::new(0, 0, 255)),
    ));
    prt
}

/// Known content of "resources/contrasts.ctr".
#[allow(dead_code)]
pub fn contrasts_ctr_gt() -> ContrastsDefinition {
    let mut ctr = ContrastsDefinition::new();
    ctr.add_contrast(Contrast::new("Faces > Houses", vec![1, -1, 0]))
        .unwrap();
    ctr.add_contrast(Contrast::new("Houses > Faces", vec![-1, 1, 0]))
        .unwrap();
    ctr.add_contrast(Contrast::new("Faces", vec![1, 0, 0])).unwrap();
    ctr
}

/// Known content of "resources/design.sdm".
#[allow(dead_code)]
pub fn design_sdm_gt() -> sdm::DesignMatrix {
    let mut sdm = sdm::DesignMatrix::new();
    sdm.add_predictor(
        Predictor::new("Faces", vec![0., 1., 1., 0., 0.], Some(RGB::new(255, 0, 0))),
        false,
    )
    .unwrap();
    sdm.add_predictor(
        Predictor::new("Houses", vec![0., 0., 0., 1., 1.], Some(RGB::new(0, 0, 255))),
        false,
    )
    .unwrap();
    sdm.add_constant().unwrap();
    sdm
}

/// Known content of "resources/group.mdm".
#[allow(dead_code)]
pub fn group_mdm_gt() -> mdm::DesignMatrix {
    let mut mdm = mdm::DesignMatrix::new();
    mdm.set_rfx_glm(true);
    mdm.set_transformation(mdm::Transformation::Z);
    mdm.set_separate_predictors(true);
    for s in &["s1", "s2"] {
        mdm.add_study(Study::mtc(
            format!("/data/{0}/{0}.ssm", s),
            format!("/data/{0}/{0}_run1.mtc", s),
            format!("/data/{0}/{0}_run1.sdm", s),
        ))
        .unwrap();
    }
    mdm
}

/// Known content of "resources/regions.voi".
#[allow(dead_code)]
pub fn regions_voi_gt() -> VoisDefinition {
    let mut voi = VoisDefinition::with_options(&VoiOptions {
        reference_space: "TAL".to_string(),
        ..Default::default()
    });
    voi.add_voi(Voi::new(
        "FFA",
        vec![[40, -52, -18], [41, -52, -18], [42, -52, -18]],
        Some(RGB::new(255, 0, 0)),
    ));
    voi.add_voi(Voi::new("PPA", vec![[-28, -44, -8]], Some(RGB::new(0, 255, 0))));
    voi.add_vtc("/data/s1/run1_FFA_PPA.vtc");
    voi.add_vtc("/data/s1/run2_FFA_PPA.vtc");
    voi
}
