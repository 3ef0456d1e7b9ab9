//! Partitioned solve of a prepared analysis.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::analysis::Analysis;
use crate::errors::AnalysisError;
use crate::geometry::Components;
use crate::mesh::{ElementId, Mesh, NodeId};

/// Results of a solved truss.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Nodal displacements in global axes.
    displacements: DVector<f64>,
    /// Support reactions in the constraint frame, zero at free DOFs.
    reactions: DVector<f64>,
    /// Axial force per element, tension positive.
    axial_forces: Vec<f64>,
    /// Axial stress per element.
    stresses: Vec<f64>,
}

impl Solution {
    /// Global displacement vector.
    #[must_use]
    pub fn displacements(&self) -> &DVector<f64> {
        &self.displacements
    }

    /// Reaction vector in the constraint frame.
    #[must_use]
    pub fn reactions(&self) -> &DVector<f64> {
        &self.reactions
    }

    /// Displacement of a node in global axes.
    #[must_use]
    pub fn displacement(&self, node: NodeId) -> Option<Components> {
        node_pair(&self.displacements, node)
    }

    /// Reaction at a node in the constraint frame: along the roller axes for a
    /// roller, in global axes otherwise.
    #[must_use]
    pub fn reaction(&self, node: NodeId) -> Option<Components> {
        node_pair(&self.reactions, node)
    }

    /// Axial force in an element, tension positive.
    #[must_use]
    pub fn axial_force(&self, element: ElementId) -> Option<f64> {
        element
            .index()
            .and_then(|index| self.axial_forces.get(index).copied())
    }

    /// Axial stress in an element.
    #[must_use]
    pub fn stress(&self, element: ElementId) -> Option<f64> {
        element
            .index()
            .and_then(|index| self.stresses.get(index).copied())
    }
}

/// Read the two entries belonging to a node.
fn node_pair(vector: &DVector<f64>, node: NodeId) -> Option<Components> {
    node.check(vector.len() / 2).ok()?;
    let [x, y] = node.dof_indices();
    Some(Components::new(vector[x], vector[y]))
}

/// Solve the equilibrium equations prepared in `analysis`.
///
/// The system is rotated into the constraint frame (`K* = Tc·K·Tcᵀ`,
/// `F* = Tc·F`), the free block `K*ff·u*f = F*f − K*fc·uc` is solved by LU
/// decomposition and the displacements are rotated back with `Tcᵀ`.
///
/// # Errors
///
/// Returns [`AnalysisError::SingularStiffness`] when the free block cannot be
/// factorised, and propagates element errors if `mesh` does not match the
/// analysis.
pub fn solve(mesh: &Mesh, analysis: &Analysis) -> Result<Solution, AnalysisError> {
    let transformation = analysis.transformation();
    let stiffness = transformation * analysis.stiffness() * transformation.transpose();
    let loads = transformation * analysis.loads();

    let free = analysis.dofs().free_zero_based();
    let fixed = analysis.dofs().fixed_zero_based();
    let mut constrained = analysis.prescribed_displacements().clone();

    if !free.is_empty() {
        let free_rows = stiffness.select_rows(&free);
        let k_ff = free_rows.select_columns(&free);
        let k_fc = free_rows.select_columns(&fixed);
        let known = analysis.prescribed_displacements().select_rows(&fixed);
        let rhs = loads.select_rows(&free) - k_fc * known;
        let solution = solve_dense(k_ff, &rhs)?;
        for (idx, &dof) in free.iter().enumerate() {
            constrained[dof] = solution[idx];
        }
    }

    let residual = &stiffness * &constrained - &loads;
    let mut reactions = DVector::zeros(residual.len());
    for &dof in &fixed {
        reactions[dof] = residual[dof];
    }

    let displacements = transformation.transpose() * constrained;
    let (axial_forces, stresses) = member_forces(mesh, &displacements)?;

    debug!(
        free = free.len(),
        fixed = fixed.len(),
        "solved truss equilibrium"
    );
    Ok(Solution {
        displacements,
        reactions,
        axial_forces,
        stresses,
    })
}

/// Smallest LU pivot, relative to the largest stiffness entry, accepted as
/// non-singular.
const PIVOT_TOLERANCE: f64 = 1.0e-12;

/// Factorise and solve a dense system, rejecting singular matrices.
///
/// Rounding leaves mechanisms with tiny nonzero pivots, so every pivot is
/// compared against the scale of the matrix rather than against zero.
fn solve_dense(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, AnalysisError> {
    let scale = matrix.amax();
    let tolerance = PIVOT_TOLERANCE.max(matrix.nrows() as f64 * f64::EPSILON) * scale;
    let lu = matrix.lu();
    if scale == 0.0 || lu.u().diagonal().iter().any(|pivot| pivot.abs() <= tolerance) {
        return Err(AnalysisError::SingularStiffness);
    }
    let solution = lu.solve(rhs).ok_or(AnalysisError::SingularStiffness)?;
    if solution.iter().all(|value| value.is_finite()) {
        Ok(solution)
    } else {
        Err(AnalysisError::SingularStiffness)
    }
}

/// Compute axial forces and stresses from global displacements.
fn member_forces(
    mesh: &Mesh,
    displacements: &DVector<f64>,
) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
    let mut forces = Vec::with_capacity(mesh.element_count());
    let mut stresses = Vec::with_capacity(mesh.element_count());
    for (id, element) in mesh.iter_elements() {
        let geometry = mesh.element_geometry(id, element, 0.0)?;
        let [x1, y1, x2, y2] = element.dof_indices();
        let elongation = geometry.cos * (displacements[x2] - displacements[x1])
            + geometry.sin * (displacements[y2] - displacements[y1]);
        let force = element.axial_rigidity() / geometry.length * elongation;
        forces.push(force);
        stresses.push(force / element.area);
    }
    Ok((forces, stresses))
}
