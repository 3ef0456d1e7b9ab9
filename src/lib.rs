#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod assembly;
pub mod conditions;
pub mod config;
pub mod constraints;
pub mod dofs;
pub mod errors;
pub mod geometry;
pub mod mesh;
pub mod solver;

pub use analysis::{Analysis, TrussModel};
pub use assembly::{
    assemble_loads, assemble_stiffness, element_contribution, load_contribution,
    merge_stiffness, ElementContribution, NodalContribution,
};
pub use conditions::{PinSupport, PointLoad, RollerDirection, RollerSupport, Supports};
pub use config::AnalysisOptions;
pub use constraints::{prescribed_displacements, transformation_matrix};
pub use dofs::DofPartition;
pub use errors::{AnalysisError, ElementPropertyError};
pub use geometry::{components, point, Components, FrameAngle, Point};
pub use mesh::{Element, ElementGeometry, ElementId, Mesh, NodeId};
pub use solver::Solution;
