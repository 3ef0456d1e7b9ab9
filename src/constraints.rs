//! Known displacements and the constraint-frame transformation.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::conditions::Supports;
use crate::errors::AnalysisError;

/// Build the vector of prescribed displacements, length `dof_count`.
///
/// Pin displacements are rotated from their support frame into global axes.
/// Roller displacements are scalars along the restrained local axis and are
/// stored as given. Entries at unrestrained DOFs stay zero.
///
/// # Errors
///
/// Returns [`AnalysisError::NodeOutOfRange`] when a support sits on a node
/// outside the mesh.
pub fn prescribed_displacements(
    supports: &Supports,
    dof_count: usize,
) -> Result<DVector<f64>, AnalysisError> {
    let node_count = dof_count / 2;
    let mut known = DVector::zeros(dof_count);
    for pin in &supports.pins {
        let [x, y] = pin.node.check(node_count)?.dof_indices();
        let global = pin.angle.to_global(pin.displacement);
        known[x] = global.x;
        known[y] = global.y;
    }
    for roller in &supports.rollers {
        roller.node.check(node_count)?;
        known[roller.dof_index()] = roller.displacement;
    }
    debug!(dof_count, "built prescribed displacement vector");
    Ok(known)
}

/// Build the block-diagonal transformation matrix, size `dof_count`.
///
/// Every roller node gets the 2×2 rotation of its support frame; all other
/// blocks stay identity. Applied as `Tc·K·Tcᵀ` and `Tc·F` it expresses roller
/// DOFs along their inclined axes.
///
/// # Errors
///
/// Returns [`AnalysisError::NodeOutOfRange`] when a roller sits on a node
/// outside the mesh.
pub fn transformation_matrix(
    supports: &Supports,
    dof_count: usize,
) -> Result<DMatrix<f64>, AnalysisError> {
    let node_count = dof_count / 2;
    let mut transformation = DMatrix::identity(dof_count, dof_count);
    for roller in &supports.rollers {
        let [first, _] = roller.node.check(node_count)?.dof_indices();
        transformation
            .fixed_view_mut::<2, 2>(first, first)
            .copy_from(&roller.angle.rotation());
    }
    debug!(
        dof_count,
        rotated_blocks = supports.rollers.len(),
        "built constraint transformation matrix"
    );
    Ok(transformation)
}
