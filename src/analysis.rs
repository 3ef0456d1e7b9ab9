//! Preparation of the partitioned equilibrium system for a truss model.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::{assemble_loads, assemble_stiffness};
use crate::conditions::{PointLoad, Supports};
use crate::config::AnalysisOptions;
use crate::constraints::{prescribed_displacements, transformation_matrix};
use crate::dofs::DofPartition;
use crate::errors::AnalysisError;
use crate::mesh::Mesh;
use crate::solver::{solve, Solution};

/// Complete input snapshot of a planar truss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrussModel {
    /// Nodes, elements and section properties.
    pub mesh: Mesh,
    /// Pin and roller supports.
    #[serde(default)]
    pub supports: Supports,
    /// Point loads.
    #[serde(default)]
    pub loads: Vec<PointLoad>,
}

impl TrussModel {
    /// Prepare and solve the model in one step.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] from either [`Analysis::prepare`] or
    /// [`Analysis::solve`].
    pub fn analyse(&self, options: &AnalysisOptions) -> Result<Solution, AnalysisError> {
        Analysis::prepare(self, options)?.solve(&self.mesh)
    }
}

/// Global matrices and vectors of one analysis run.
///
/// All four artifacts are built from the same immutable [`TrussModel`] and
/// are independent of each other once the DOF partition exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    /// Fixed and free DOF sets.
    dofs: DofPartition,
    /// Global stiffness matrix.
    stiffness: DMatrix<f64>,
    /// Global load vector.
    loads: DVector<f64>,
    /// Known displacements at fixed DOFs.
    prescribed: DVector<f64>,
    /// Constraint-frame transformation.
    transformation: DMatrix<f64>,
}

impl Analysis {
    /// Validate a model and build its DOF partition, stiffness matrix, load
    /// vector, prescribed displacements and transformation matrix.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] for inconsistent supports, references to
    /// missing nodes, invalid section properties or degenerate elements.
    /// Supports are checked before anything is assembled.
    ///
    /// # Examples
    /// ```
    /// use trussfem::{point, Analysis, AnalysisOptions, Element, Mesh, NodeId, PinSupport, Supports, TrussModel};
    ///
    /// let model = TrussModel {
    ///     mesh: Mesh::new(
    ///         vec![point(0.0, 0.0), point(3.0, 0.0)],
    ///         vec![Element::new(NodeId(1), NodeId(2), 200_000.0, 10.0)],
    ///     ),
    ///     supports: Supports {
    ///         pins: vec![PinSupport::fixed(NodeId(1))],
    ///         rollers: Vec::new(),
    ///     },
    ///     loads: Vec::new(),
    /// };
    /// let analysis = Analysis::prepare(&model, &AnalysisOptions::default()).unwrap();
    /// assert_eq!(analysis.stiffness().shape(), (4, 4));
    /// assert_eq!(analysis.dofs().fixed(), &[1, 2]);
    /// ```
    pub fn prepare(model: &TrussModel, options: &AnalysisOptions) -> Result<Self, AnalysisError> {
        let mesh = &model.mesh;
        let dofs = DofPartition::new(mesh.node_count(), &model.supports)?;
        mesh.validate()?;

        let dof_count = dofs.dof_count();
        let stiffness = assemble_stiffness(mesh, options)?;
        let loads = assemble_loads(&model.loads, dof_count)?;
        let prescribed = prescribed_displacements(&model.supports, dof_count)?;
        let transformation = transformation_matrix(&model.supports, dof_count)?;

        debug!(
            nodes = mesh.node_count(),
            elements = mesh.element_count(),
            fixed = dofs.fixed_count(),
            free = dofs.free_count(),
            "prepared truss analysis"
        );
        Ok(Self {
            dofs,
            stiffness,
            loads,
            prescribed,
            transformation,
        })
    }

    /// Solve the prepared system for displacements, reactions and member forces.
    ///
    /// `mesh` must be the mesh the analysis was prepared from.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SingularStiffness`] when the structure is a
    /// mechanism under the given supports.
    pub fn solve(&self, mesh: &Mesh) -> Result<Solution, AnalysisError> {
        solve(mesh, self)
    }

    /// Fixed and free DOF sets.
    #[must_use]
    pub fn dofs(&self) -> &DofPartition {
        &self.dofs
    }

    /// Global stiffness matrix.
    #[must_use]
    pub fn stiffness(&self) -> &DMatrix<f64> {
        &self.stiffness
    }

    /// Global load vector.
    #[must_use]
    pub fn loads(&self) -> &DVector<f64> {
        &self.loads
    }

    /// Prescribed displacement vector.
    #[must_use]
    pub fn prescribed_displacements(&self) -> &DVector<f64> {
        &self.prescribed
    }

    /// Constraint-frame transformation matrix.
    #[must_use]
    pub fn transformation(&self) -> &DMatrix<f64> {
        &self.transformation
    }
}
