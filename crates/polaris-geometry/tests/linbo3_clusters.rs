//! Built-in LiNbO3 clusters through the induced-dipole model.

use approx::assert_relative_eq;

use polaris_core::estimator::FieldResponseEstimator;
use polaris_core::solver::induction::InducedDipoleSolver;
use polaris_core::types::SolverOptions;
use polaris_geometry::builder::default_structures;
use polaris_geometry::parsers::block::{parse_geometry_block, to_geometry_block};
use polaris_geometry::{build_structure, ClusterTemplate, StructureSpec};

fn alpha_zz(spec: &StructureSpec) -> f64 {
    let molecule = build_structure(spec).unwrap();
    let mut solver = InducedDipoleSolver::default();
    let scan = FieldResponseEstimator::new(&mut solver, SolverOptions::default()).run(&molecule);
    scan.estimate()
        .unwrap_or_else(|| panic!("{} has no estimate", spec.name))
        .component
}

#[test]
fn every_default_structure_has_a_positive_polarizability() {
    for spec in default_structures() {
        let alpha = alpha_zz(&spec);
        assert!(alpha.is_finite() && alpha > 0.0, "{}: {}", spec.name, alpha);
    }
}

#[test]
fn removing_an_oxygen_lowers_the_response() {
    let full = alpha_zz(&StructureSpec::new("full", ClusterTemplate::Minimal));
    let deficient = alpha_zz(&StructureSpec::new("def", ClusterTemplate::OxygenDeficient));
    assert!(deficient < full, "{} !< {}", deficient, full);
}

#[test]
fn extended_cluster_is_more_polarizable() {
    let minimal = alpha_zz(&StructureSpec::new("min", ClusterTemplate::Minimal));
    let extended = alpha_zz(&StructureSpec::new("ext", ClusterTemplate::Extended));
    assert!(extended > minimal);
}

#[test]
fn built_cluster_survives_block_text() {
    let spec = StructureSpec::new("LiNbO3_strained_0.98", ClusterTemplate::Minimal).with_strain(0.98);
    let mol = build_structure(&spec).unwrap();
    let parsed = parse_geometry_block(&to_geometry_block(&mol), &mol.name).unwrap();
    assert_eq!(parsed.len(), mol.len());
    for (a, b) in parsed.atoms.iter().zip(&mol.atoms) {
        assert_eq!(a.element, b.element);
        for c in 0..3 {
            assert_relative_eq!(a.position[c], b.position[c], epsilon = 1e-4);
        }
    }
}
