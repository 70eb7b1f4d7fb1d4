//! LiNbO3 cluster construction.
//!
//! Clusters are cut from one or two LiNbO3 formula units with Li at the
//! origin. A dopant replaces the host cation sitting at the origin, and a
//! strain factor scales every coordinate uniformly about the origin.

use std::fmt;
use std::str::FromStr;

use polaris_core::types::{Atom, Molecule};
use thiserror::Error;

use crate::transform::Transform;

/// Spacing between the two formula units of the extended cluster (Å).
const UNIT_SPACING: f64 = 2.574;

/// Formula-unit coordinates (Å).
const FORMULA_UNIT: [(&str, [f64; 3]); 5] = [
    ("Li", [0.0, 0.0, 0.0]),
    ("Nb", [0.0, 0.0, 2.5]),
    ("O", [1.0607, 0.6124, 1.25]),
    ("O", [-1.0607, 0.6124, 1.25]),
    ("O", [0.0, -1.2248, 1.25]),
];

/// Host cations a dopant may replace.
pub const DOPANT_HOSTS: [&str; 2] = ["Li", "Nb"];

/// Errors while building a structure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Unknown cluster template '{0}' (expected minimal, extended or oxygen_deficient)")]
    UnknownTemplate(String),

    #[error("Dopant host must be Li or Nb, got '{0}'")]
    InvalidHost(String),

    #[error("Invalid dopant element '{0}'")]
    InvalidDopant(String),

    #[error("No {host} atom at the origin of the {template} template to substitute")]
    NoDopantSite { host: String, template: ClusterTemplate },

    #[error("Strain factor must be finite and positive, got {0}")]
    InvalidStrain(f64),
}

/// Built-in cluster geometries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClusterTemplate {
    /// One formula unit: Li, Nb, 3 O.
    #[default]
    Minimal,
    /// Two formula units along x.
    Extended,
    /// One formula unit with the last oxygen removed.
    OxygenDeficient,
}

impl ClusterTemplate {
    pub const ALL: [ClusterTemplate; 3] = [
        ClusterTemplate::Minimal,
        ClusterTemplate::Extended,
        ClusterTemplate::OxygenDeficient,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClusterTemplate::Minimal => "minimal",
            ClusterTemplate::Extended => "extended",
            ClusterTemplate::OxygenDeficient => "oxygen_deficient",
        }
    }

    /// Unstrained, undoped atoms of this template.
    pub fn atoms(self) -> Vec<Atom> {
        let unit: Vec<Atom> = FORMULA_UNIT
            .iter()
            .map(|(el, pos)| Atom::new(*el, *pos))
            .collect();

        match self {
            ClusterTemplate::Minimal => unit,
            ClusterTemplate::Extended => {
                let shift = Transform::translation(UNIT_SPACING, 0.0, 0.0);
                let image: Vec<Atom> = unit
                    .iter()
                    .map(|a| Atom::new(a.element.clone(), shift.apply(&a.position)))
                    .collect();
                unit.into_iter().chain(image).collect()
            }
            ClusterTemplate::OxygenDeficient => {
                let mut atoms = unit;
                atoms.pop();
                atoms
            }
        }
    }
}

impl fmt::Display for ClusterTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClusterTemplate {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(ClusterTemplate::Minimal),
            "extended" => Ok(ClusterTemplate::Extended),
            "oxygen_deficient" | "o_deficient" => Ok(ClusterTemplate::OxygenDeficient),
            _ => Err(BuildError::UnknownTemplate(s.to_string())),
        }
    }
}

/// A substitutional dopant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dopant {
    /// Element placed on the host site.
    pub element: String,
    /// Host cation replaced, `Li` or `Nb`.
    pub host: String,
}

impl Dopant {
    pub fn new(element: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            host: host.into(),
        }
    }

    fn validate(&self) -> Result<(), BuildError> {
        if !DOPANT_HOSTS.contains(&self.host.as_str()) {
            return Err(BuildError::InvalidHost(self.host.clone()));
        }
        let mut chars = self.element.chars();
        let well_formed = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_lowercase())
            && self.element.len() <= 3;
        if !well_formed {
            return Err(BuildError::InvalidDopant(self.element.clone()));
        }
        Ok(())
    }
}

/// Everything needed to build one named structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSpec {
    pub name: String,
    pub template: ClusterTemplate,
    pub dopant: Option<Dopant>,
    /// Uniform scale factor applied to all coordinates; 1.0 is unstrained.
    pub strain: f64,
}

impl StructureSpec {
    pub fn new(name: impl Into<String>, template: ClusterTemplate) -> Self {
        Self {
            name: name.into(),
            template,
            dopant: None,
            strain: 1.0,
        }
    }

    pub fn with_dopant(mut self, dopant: Dopant) -> Self {
        self.dopant = Some(dopant);
        self
    }

    pub fn with_strain(mut self, strain: f64) -> Self {
        self.strain = strain;
        self
    }
}

fn at_origin(atom: &Atom) -> bool {
    atom.position.iter().all(|c| c.abs() < 1e-8)
}

/// Build a neutral singlet cluster from a structure description.
///
/// Dopants are not applied to the oxygen-deficient template.
pub fn build_structure(spec: &StructureSpec) -> Result<Molecule, BuildError> {
    if !spec.strain.is_finite() || spec.strain <= 0.0 {
        return Err(BuildError::InvalidStrain(spec.strain));
    }

    let mut molecule = Molecule::new(spec.name.clone(), spec.template.atoms());

    match &spec.dopant {
        Some(_) if spec.template == ClusterTemplate::OxygenDeficient => {
            log::warn!(
                "{}: dopant ignored for the {} template",
                spec.name,
                spec.template
            );
        }
        Some(dopant) => {
            dopant.validate()?;
            let site = molecule
                .atoms
                .iter_mut()
                .find(|a| a.element == dopant.host && at_origin(a))
                .ok_or_else(|| BuildError::NoDopantSite {
                    host: dopant.host.clone(),
                    template: spec.template,
                })?;
            log::debug!("{}: {} -> {} at origin", spec.name, dopant.host, dopant.element);
            site.element = dopant.element.clone();
        }
        None => {}
    }

    if spec.strain != 1.0 {
        Transform::uniform_scale(spec.strain).apply_to(&mut molecule);
    }

    Ok(molecule)
}

/// The six structures of the default LiNbO3 study.
pub fn default_structures() -> Vec<StructureSpec> {
    use ClusterTemplate::*;
    vec![
        StructureSpec::new("LiNbO3_minimal", Minimal),
        StructureSpec::new("LiNbO3_extended", Extended),
        StructureSpec::new("LiNbO3_Mg_doped", Minimal).with_dopant(Dopant::new("Mg", "Li")),
        StructureSpec::new("LiNbO3_Fe_doped", Minimal).with_dopant(Dopant::new("Fe", "Li")),
        StructureSpec::new("LiNbO3_strained_0.98", Minimal).with_strain(0.98),
        StructureSpec::new("LiNbO3_O_deficient", OxygenDeficient),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn elements(mol: &Molecule) -> Vec<&str> {
        mol.atoms.iter().map(|a| a.element.as_str()).collect()
    }

    #[test]
    fn test_template_sizes() {
        assert_eq!(ClusterTemplate::Minimal.atoms().len(), 5);
        assert_eq!(ClusterTemplate::Extended.atoms().len(), 10);
        assert_eq!(ClusterTemplate::OxygenDeficient.atoms().len(), 4);
    }

    #[test]
    fn test_extended_second_unit_coordinates() {
        let atoms = ClusterTemplate::Extended.atoms();
        assert_eq!(atoms[5].element, "Li");
        assert_abs_diff_eq!(atoms[5].position[0], 2.574, epsilon = 1e-12);
        assert_abs_diff_eq!(atoms[7].position[0], 3.6347, epsilon = 1e-12);
        assert_abs_diff_eq!(atoms[8].position[0], 1.5133, epsilon = 1e-12);
        assert_abs_diff_eq!(atoms[9].position[1], -1.2248, epsilon = 1e-12);
    }

    #[test]
    fn test_template_names_parse_back() {
        for t in ClusterTemplate::ALL {
            assert_eq!(t.name().parse::<ClusterTemplate>().unwrap(), t);
        }
        assert!(matches!(
            "rutile".parse::<ClusterTemplate>(),
            Err(BuildError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_li_site_doping() {
        let spec = StructureSpec::new("Mg", ClusterTemplate::Extended)
            .with_dopant(Dopant::new("Mg", "Li"));
        let mol = build_structure(&spec).unwrap();
        assert_eq!(mol.atoms[0].element, "Mg");
        // Only the origin site is substituted.
        assert_eq!(mol.atoms[5].element, "Li");
        assert_eq!((mol.charge, mol.multiplicity), (0, 1));
    }

    #[test]
    fn test_nb_host_has_no_origin_site() {
        let spec = StructureSpec::new("Ti", ClusterTemplate::Minimal)
            .with_dopant(Dopant::new("Ti", "Nb"));
        let err = build_structure(&spec).unwrap_err();
        assert_eq!(
            err,
            BuildError::NoDopantSite { host: "Nb".into(), template: ClusterTemplate::Minimal }
        );
    }

    #[test]
    fn test_invalid_dopants() {
        let bad_host = StructureSpec::new("x", ClusterTemplate::Minimal)
            .with_dopant(Dopant::new("Mg", "O"));
        assert_eq!(build_structure(&bad_host).unwrap_err(), BuildError::InvalidHost("O".into()));

        let bad_element = StructureSpec::new("x", ClusterTemplate::Minimal)
            .with_dopant(Dopant::new("mg", "Li"));
        assert!(matches!(build_structure(&bad_element), Err(BuildError::InvalidDopant(_))));
    }

    #[test]
    fn test_oxygen_deficient_ignores_dopant() {
        let spec = StructureSpec::new("Od", ClusterTemplate::OxygenDeficient)
            .with_dopant(Dopant::new("Mg", "Li"));
        let mol = build_structure(&spec).unwrap();
        assert_eq!(elements(&mol), vec!["Li", "Nb", "O", "O"]);
    }

    #[test]
    fn test_strain_scales_about_origin() {
        let mol = build_structure(&StructureSpec::new("s", ClusterTemplate::Minimal).with_strain(0.98))
            .unwrap();
        assert_eq!(mol.atoms[0].position, [0.0; 3]);
        assert_abs_diff_eq!(mol.atoms[1].position[2], 2.45, epsilon = 1e-12);
        assert_abs_diff_eq!(mol.atoms[2].position[0], 1.0607 * 0.98, epsilon = 1e-12);

        for s in [0.0, -1.0, f64::NAN] {
            let spec = StructureSpec::new("s", ClusterTemplate::Minimal).with_strain(s);
            assert!(matches!(build_structure(&spec), Err(BuildError::InvalidStrain(_))));
        }
    }

    #[test]
    fn test_default_study_builds() {
        let built: Vec<Molecule> = default_structures()
            .iter()
            .map(|s| build_structure(s).unwrap())
            .collect();
        assert_eq!(built.len(), 6);
        assert_eq!(built[2].atoms[0].element, "Mg");
        assert_eq!(built[3].atoms[0].element, "Fe");
        assert_eq!(built[5].len(), 4);
    }
}
