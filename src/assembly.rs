//! Global stiffness matrix and load vector assembly.
//!
//! Both are written as a reduction: every element or load produces a small
//! contribution keyed by 0-based global indices, and a separate step merges
//! the contributions into the global structure. Scattering only ever adds, so
//! the merge order does not matter and the parallel path can sum per-thread
//! buffers.

use nalgebra::{DMatrix, DVector, Matrix4, Vector2};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::conditions::PointLoad;
use crate::config::AnalysisOptions;
use crate::errors::AnalysisError;
use crate::mesh::{check_properties, Element, ElementId, Mesh, NodeId};

/// Stiffness of one element and the global DOFs it couples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementContribution {
    /// 0-based global positions of the element DOFs.
    pub dofs: [usize; 4],
    /// Element stiffness in global axes.
    pub matrix: Matrix4<f64>,
}

impl ElementContribution {
    /// Add the element stiffness into a global matrix.
    pub fn scatter_into(&self, global: &mut DMatrix<f64>) {
        for (row_local, &global_row) in self.dofs.iter().enumerate() {
            for (col_local, &global_col) in self.dofs.iter().enumerate() {
                global[(global_row, global_col)] += self.matrix[(row_local, col_local)];
            }
        }
    }
}

/// Force a load adds to the two DOFs of its node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodalContribution {
    /// 0-based global positions of the node DOFs.
    pub dofs: [usize; 2],
    /// Force components in global axes.
    pub values: Vector2<f64>,
}

impl NodalContribution {
    /// Add the force into a global vector.
    pub fn scatter_into(&self, global: &mut DVector<f64>) {
        for (local, &dof) in self.dofs.iter().enumerate() {
            global[dof] += self.values[local];
        }
    }
}

/// Compute the global-axes stiffness of a single bar element.
///
/// `ke = (E·A/L)·[[c², cs, -c², -cs], [cs, s², -cs, -s²], [-c², -cs, c², cs], [-cs, -s², cs, s²]]`
///
/// # Errors
///
/// Returns [`AnalysisError::ElementNodeOutOfRange`],
/// [`AnalysisError::InvalidElementProperties`] or
/// [`AnalysisError::ZeroLengthElement`] when the element cannot be evaluated.
pub fn element_contribution(
    mesh: &Mesh,
    id: ElementId,
    element: &Element,
    length_tolerance: f64,
) -> Result<ElementContribution, AnalysisError> {
    let geometry = mesh.element_geometry(id, element, length_tolerance)?;
    check_properties(id, element)?;

    let c = geometry.cos;
    let s = geometry.sin;
    let cc = c * c;
    let cs = c * s;
    let ss = s * s;
    #[rustfmt::skip]
    let matrix = Matrix4::new(
         cc,  cs, -cc, -cs,
         cs,  ss, -cs, -ss,
        -cc, -cs,  cc,  cs,
        -cs, -ss,  cs,  ss,
    ) * (element.axial_rigidity() / geometry.length);

    trace!(element = id.0, length = geometry.length, "element stiffness computed");
    Ok(ElementContribution {
        dofs: element.dof_indices(),
        matrix,
    })
}

/// Merge element contributions into a zeroed `dof_count`-square matrix.
#[must_use]
pub fn merge_stiffness<'a, I>(dof_count: usize, contributions: I) -> DMatrix<f64>
where
    I: IntoIterator<Item = &'a ElementContribution>,
{
    let mut global = DMatrix::zeros(dof_count, dof_count);
    for contribution in contributions {
        contribution.scatter_into(&mut global);
    }
    global
}

/// Assemble the global stiffness matrix of a mesh.
///
/// # Errors
///
/// Returns the error of the lowest-numbered failing element, whichever path
/// assembles the matrix; see [`element_contribution`].
pub fn assemble_stiffness(
    mesh: &Mesh,
    options: &AnalysisOptions,
) -> Result<DMatrix<f64>, AnalysisError> {
    let dof_count = mesh.dof_count();
    let tolerance = options.length_tolerance;
    let stiffness = if options.parallel_assembly {
        mesh.elements()
            .par_iter()
            .enumerate()
            .map(|(index, element)| {
                element_contribution(mesh, ElementId::from_index(index), element, tolerance)
            })
            .try_fold(
                || DMatrix::zeros(dof_count, dof_count),
                |mut partial, contribution| -> Result<DMatrix<f64>, AnalysisError> {
                    contribution?.scatter_into(&mut partial);
                    Ok(partial)
                },
            )
            .try_reduce(
                || DMatrix::zeros(dof_count, dof_count),
                |left, right| Ok(left + right),
            )
            .map_err(|error| first_element_error(mesh, tolerance).unwrap_or(error))?
    } else {
        let contributions = mesh
            .iter_elements()
            .map(|(id, element)| element_contribution(mesh, id, element, tolerance))
            .collect::<Result<Vec<_>, _>>()?;
        merge_stiffness(dof_count, &contributions)
    };
    debug!(
        dof_count,
        elements = mesh.element_count(),
        parallel = options.parallel_assembly,
        "assembled global stiffness matrix"
    );
    Ok(stiffness)
}

/// Error of the lowest-numbered element that cannot be evaluated.
fn first_element_error(mesh: &Mesh, length_tolerance: f64) -> Option<AnalysisError> {
    mesh.iter_elements()
        .find_map(|(id, element)| element_contribution(mesh, id, element, length_tolerance).err())
}

/// Rotate a point load into the global frame.
///
/// # Errors
///
/// Returns [`AnalysisError::NodeOutOfRange`] when the load sits on a node that
/// does not exist in a mesh with `node_count` nodes.
pub fn load_contribution(
    load: &PointLoad,
    node_count: usize,
) -> Result<NodalContribution, AnalysisError> {
    let node: NodeId = load.node.check(node_count)?;
    Ok(NodalContribution {
        dofs: node.dof_indices(),
        values: load.angle.to_global(load.force).to_vector(),
    })
}

/// Assemble the global load vector of length `dof_count`.
///
/// Loads sharing a node add up.
///
/// # Errors
///
/// Returns the first load error encountered; see [`load_contribution`].
pub fn assemble_loads(loads: &[PointLoad], dof_count: usize) -> Result<DVector<f64>, AnalysisError> {
    let node_count = dof_count / 2;
    let mut global = DVector::zeros(dof_count);
    for load in loads {
        load_contribution(load, node_count)?.scatter_into(&mut global);
    }
    debug!(dof_count, loads = loads.len(), "assembled global load vector");
    Ok(global)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{components, point, FrameAngle};

    fn bar(length: f64) -> Mesh {
        Mesh::new(
            vec![point(0.0, 0.0), point(length, 0.0)],
            vec![Element::new(NodeId(1), NodeId(2), 200_000.0, 10.0)],
        )
    }

    fn fan() -> Mesh {
        Mesh::new(
            vec![
                point(0.0, 0.0),
                point(4.0, 0.0),
                point(4.0, 3.0),
                point(0.0, 3.0),
            ],
            vec![
                Element::new(NodeId(1), NodeId(2), 200.0e9, 0.01),
                Element::new(NodeId(2), NodeId(3), 200.0e9, 0.02),
                Element::new(NodeId(1), NodeId(3), 70.0e9, 0.01),
                Element::new(NodeId(3), NodeId(4), 200.0e9, 0.01),
                Element::new(NodeId(4), NodeId(2), 70.0e9, 0.03),
            ],
        )
    }

    #[test]
    fn horizontal_bar_is_axial_only() {
        let stiffness = assemble_stiffness(&bar(3.0), &AnalysisOptions::default())
            .expect("assembly succeeds");
        let k = 200_000.0 * 10.0 / 3.0;
        #[rustfmt::skip]
        let expected = DMatrix::from_row_slice(4, 4, &[
             k, 0.0, -k, 0.0,
            0.0, 0.0, 0.0, 0.0,
            -k, 0.0,  k, 0.0,
            0.0, 0.0, 0.0, 0.0,
        ]);
        assert_relative_eq!(stiffness, expected, epsilon = 1.0e-9);
    }

    #[test]
    fn inclined_element_matches_closed_form() {
        let mesh = fan();
        let element = mesh.elements()[2];
        let contribution = element_contribution(&mesh, ElementId(3), &element, 0.0)
            .expect("valid element");
        let k = 70.0e9 * 0.01 / 5.0;
        assert_eq!(contribution.dofs, [0, 1, 4, 5]);
        assert_relative_eq!(contribution.matrix[(0, 0)], k * 0.64, max_relative = 1.0e-12);
        assert_relative_eq!(contribution.matrix[(0, 1)], k * 0.48, max_relative = 1.0e-12);
        assert_relative_eq!(contribution.matrix[(1, 3)], -k * 0.36, max_relative = 1.0e-12);
    }

    #[test]
    fn global_stiffness_is_symmetric() {
        let stiffness =
            assemble_stiffness(&fan(), &AnalysisOptions::default()).expect("assembly succeeds");
        assert_relative_eq!(stiffness.clone(), stiffness.transpose(), max_relative = 1.0e-12);
    }

    #[test]
    fn element_order_does_not_change_the_result() {
        let mesh = fan();
        let mut reversed = mesh.elements().to_vec();
        reversed.reverse();
        let permuted = Mesh::new(
            (1..=mesh.node_count())
                .filter_map(|n| mesh.node(NodeId(n)))
                .collect(),
            reversed,
        );
        let options = AnalysisOptions::default();
        let forward = assemble_stiffness(&mesh, &options).expect("assembly succeeds");
        let backward = assemble_stiffness(&permuted, &options).expect("assembly succeeds");
        assert_relative_eq!(forward, backward, epsilon = 1.0e-3, max_relative = 1.0e-12);
    }

    #[test]
    fn parallel_assembly_matches_serial() {
        let mesh = fan();
        let serial = assemble_stiffness(&mesh, &AnalysisOptions::default())
            .expect("serial assembly succeeds");
        let parallel = assemble_stiffness(&mesh, &AnalysisOptions::parallel())
            .expect("parallel assembly succeeds");
        assert_relative_eq!(serial, parallel, epsilon = 1.0e-3, max_relative = 1.0e-12);
    }

    #[test]
    fn parallel_assembly_reports_degenerate_elements() {
        let mesh = Mesh::new(
            vec![point(0.0, 0.0), point(1.0, 0.0), point(1.0, 0.0)],
            vec![
                Element::new(NodeId(1), NodeId(2), 1.0, 1.0),
                Element::new(NodeId(2), NodeId(3), 1.0, 1.0),
            ],
        );
        let error = assemble_stiffness(&mesh, &AnalysisOptions::parallel())
            .expect_err("zero length detected");
        assert_eq!(error, AnalysisError::ZeroLengthElement(ElementId(2)));
    }

    #[test]
    fn parallel_assembly_reports_lowest_failing_element() {
        let mut nodes = vec![point(0.0, 0.0)];
        let mut elements = vec![Element::new(NodeId(1), NodeId(1), 1.0, 1.0)];
        for index in 1..64 {
            nodes.push(point(index as f64, 0.0));
            elements.push(Element::new(NodeId(index), NodeId(index + 1), 1.0, 1.0));
            elements.push(Element::new(NodeId(index + 1), NodeId(index + 1), 1.0, 1.0));
        }
        let mesh = Mesh::new(nodes, elements);
        for options in [AnalysisOptions::default(), AnalysisOptions::parallel()] {
            let error = assemble_stiffness(&mesh, &options).expect_err("zero length detected");
            assert_eq!(error, AnalysisError::ZeroLengthElement(ElementId(1)));
        }
    }

    #[test]
    fn length_tolerance_widens_degenerate_check() {
        let options = AnalysisOptions {
            length_tolerance: 1.0e-3,
            ..AnalysisOptions::default()
        };
        let error = assemble_stiffness(&bar(1.0e-4), &options).expect_err("too short");
        assert_eq!(error, AnalysisError::ZeroLengthElement(ElementId(1)));
    }

    #[test]
    fn rotated_load_lands_on_global_axes() {
        let loads = [PointLoad {
            node: NodeId(3),
            force: components(10.0, 0.0),
            angle: FrameAngle(90.0),
        }];
        let vector = assemble_loads(&loads, 6).expect("assembly succeeds");
        assert_relative_eq!(vector[4], 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(vector[5], 10.0, epsilon = 1.0e-12);
    }

    #[test]
    fn loads_on_one_node_add_up() {
        let loads = [
            PointLoad::global(NodeId(2), components(1.0, -2.0)),
            PointLoad::global(NodeId(2), components(3.0, 5.0)),
            PointLoad::global(NodeId(1), components(0.5, 0.0)),
        ];
        let vector = assemble_loads(&loads, 4).expect("assembly succeeds");
        assert_eq!(vector, DVector::from_vec(vec![0.5, 0.0, 4.0, 3.0]));
    }

    #[test]
    fn loads_outside_mesh_are_rejected() {
        let loads = [PointLoad::global(NodeId(3), components(1.0, 0.0))];
        let error = assemble_loads(&loads, 4).expect_err("missing node");
        assert_eq!(
            error,
            AnalysisError::NodeOutOfRange {
                node: NodeId(3),
                node_count: 2,
            }
        );
    }
}
