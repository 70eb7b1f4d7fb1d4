//! Affine transformations for geometry manipulation.
//!
//! Provides scale and translate operations that can be applied to
//! single points or to whole molecules. The cluster builder uses them to
//! replicate formula units and to apply strain.

use nalgebra::{Matrix3, Vector3};
use polaris_core::types::Molecule;

/// An affine transformation: rotation/scale matrix + translation.
#[derive(Debug, Clone)]
pub struct Transform {
    /// 3x3 rotation/scale matrix.
    pub matrix: Matrix3<f64>,
    /// Translation vector (angstrom).
    pub translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }
}

impl Transform {
    /// Create a pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::new(dx, dy, dz),
        }
    }

    /// Create a uniform scale about the origin.
    pub fn uniform_scale(factor: f64) -> Self {
        Self {
            matrix: Matrix3::identity() * factor,
            translation: Vector3::zeros(),
        }
    }

    /// Apply this transformation to a 3D point.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let v = Vector3::new(point[0], point[1], point[2]);
        let result = self.matrix * v + self.translation;
        [result.x, result.y, result.z]
    }

    /// Apply this transformation to every atom of a molecule in place.
    pub fn apply_to(&self, molecule: &mut Molecule) {
        for atom in &mut molecule.atoms {
            atom.position = self.apply(&atom.position);
        }
    }

    /// A transformed copy of `molecule`.
    pub fn transformed(&self, molecule: &Molecule) -> Molecule {
        let mut out = molecule.clone();
        self.apply_to(&mut out);
        out
    }

    /// Compose two transforms: self followed by other.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
            translation: other.matrix * self.translation + other.translation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use polaris_core::types::Atom;

    #[test]
    fn test_identity_transform() {
        let t = Transform::default();
        let p = [1.0, 2.0, 3.0];
        let result = t.apply(&p);
        assert_abs_diff_eq!(result[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_and_translate() {
        let t = Transform::uniform_scale(2.0).then(&Transform::translation(1.0, 0.0, 0.0));
        let p = [1.0, 1.0, 1.0];
        let result = t.apply(&p);
        assert_abs_diff_eq!(result[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_molecule_scaling_keeps_metadata() {
        let mol = Molecule {
            name: "LiO".into(),
            charge: -1,
            multiplicity: 2,
            atoms: vec![Atom::new("Li", [0.0; 3]), Atom::new("O", [0.0, 0.0, 1.6])],
        };
        let strained = Transform::uniform_scale(0.98).transformed(&mol);
        assert_eq!(strained.name, "LiO");
        assert_eq!((strained.charge, strained.multiplicity), (-1, 2));
        assert_abs_diff_eq!(strained.atoms[1].position[2], 1.568, epsilon = 1e-12);
        assert_eq!(strained.atoms[0].position, [0.0; 3]);
    }
}
