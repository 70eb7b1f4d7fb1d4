//! # Polaris Geometry
//!
//! Structure handling for Polaris finite-field studies. This crate provides:
//!
//! - **Cluster builder** ([`builder`]): LiNbO3 cluster templates with
//!   dopant substitution and uniform strain.
//! - **File parsers** ([`parsers`]): Import molecules from `.xyz` files and
//!   from quantum-chemistry style geometry blocks.
//! - **Transformations** ([`transform`]): Scale and translate
//!   operations on molecules.

pub mod builder;
pub mod parsers;
pub mod transform;

pub use builder::{build_structure, BuildError, ClusterTemplate, Dopant, StructureSpec};
pub use parsers::{load_molecule, ParseError};
pub use transform::Transform;
