use approx::assert_relative_eq;
use nalgebra::{DMatrix, Matrix2};
use trussfem::{
    assemble_loads, assemble_stiffness, components, point, transformation_matrix, Analysis,
    AnalysisError, AnalysisOptions, DofPartition, Element, ElementId, FrameAngle, Mesh, NodeId,
    PinSupport, PointLoad, RollerDirection, RollerSupport, Supports, TrussModel,
};

fn bridge() -> Mesh {
    Mesh::new(
        vec![
            point(0.0, 0.0),
            point(2.0, 0.0),
            point(4.0, 0.0),
            point(1.0, 1.5),
            point(3.0, 1.5),
        ],
        vec![
            Element::new(NodeId(1), NodeId(2), 200.0e9, 0.002),
            Element::new(NodeId(2), NodeId(3), 200.0e9, 0.002),
            Element::new(NodeId(1), NodeId(4), 200.0e9, 0.003),
            Element::new(NodeId(4), NodeId(2), 70.0e9, 0.003),
            Element::new(NodeId(2), NodeId(5), 70.0e9, 0.003),
            Element::new(NodeId(5), NodeId(3), 200.0e9, 0.003),
            Element::new(NodeId(4), NodeId(5), 200.0e9, 0.002),
        ],
    )
}

#[test]
fn two_node_bar_is_axial_only() {
    let mesh = Mesh::new(
        vec![point(0.0, 0.0), point(3.0, 0.0)],
        vec![Element::new(NodeId(1), NodeId(2), 200_000.0, 10.0)],
    );
    let stiffness =
        assemble_stiffness(&mesh, &AnalysisOptions::default()).expect("assembly succeeds");
    let k = 200_000.0 * 10.0 / 3.0;
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(4, 4, &[
         1.0, 0.0, -1.0, 0.0,
         0.0, 0.0,  0.0, 0.0,
        -1.0, 0.0,  1.0, 0.0,
         0.0, 0.0,  0.0, 0.0,
    ]) * k;
    assert_relative_eq!(stiffness, expected, epsilon = 1.0e-9);
}

#[test]
fn single_pin_fixes_both_dofs_of_node_one() {
    let supports = Supports {
        pins: vec![PinSupport::fixed(NodeId(1))],
        rollers: Vec::new(),
    };
    let dofs = DofPartition::new(2, &supports).expect("valid supports");
    assert_eq!(dofs.fixed(), &[1, 2]);
}

#[test]
fn vertical_roller_fixes_dof_four_only() {
    let supports = Supports {
        pins: Vec::new(),
        rollers: vec![RollerSupport::new(
            NodeId(2),
            RollerDirection::Y,
            FrameAngle::GLOBAL,
        )],
    };
    let dofs = DofPartition::new(2, &supports).expect("valid supports");
    assert_eq!(dofs.fixed(), &[4]);
}

#[test]
fn quarter_turn_load_points_along_global_y() {
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
fn zero_angle_load_passes_through() {
    let loads = [PointLoad::global(NodeId(2), components(-7.5, 2.25))];
    let vector = assemble_loads(&loads, 4).expect("assembly succeeds");
    assert_eq!(vector.as_slice(), &[0.0, 0.0, -7.5, 2.25]);
}

#[test]
fn partition_is_disjoint_and_complete() {
    let supports = Supports {
        pins: vec![PinSupport::fixed(NodeId(1))],
        rollers: vec![
            RollerSupport::new(NodeId(3), RollerDirection::Y, FrameAngle(-15.0)),
            RollerSupport::new(NodeId(5), RollerDirection::X, FrameAngle(60.0)),
        ],
    };
    let dofs = DofPartition::new(5, &supports).expect("valid supports");
    assert_eq!(dofs.fixed_count() + dofs.free_count(), 10);
    assert_eq!(dofs.fixed_count(), 2 + 2);
    assert!(dofs.fixed().iter().all(|dof| !dofs.free().contains(dof)));
    assert!(dofs.free().windows(2).all(|pair| pair[0] < pair[1]));
    let mut all = [dofs.fixed(), dofs.free()].concat();
    all.sort_unstable();
    assert_eq!(all, (1..=10).collect::<Vec<_>>());
}

#[test]
fn global_stiffness_is_symmetric_and_order_independent() {
    let mesh = bridge();
    let options = AnalysisOptions::default();
    let stiffness = assemble_stiffness(&mesh, &options).expect("assembly succeeds");
    assert_relative_eq!(stiffness.transpose(), stiffness.clone(), max_relative = 1.0e-12);

    let nodes = (1..=mesh.node_count())
        .filter_map(|n| mesh.node(NodeId(n)))
        .collect::<Vec<_>>();
    let mut shuffled = mesh.elements().to_vec();
    shuffled.swap(0, 6);
    shuffled.swap(2, 4);
    shuffled.rotate_left(3);
    let permuted = Mesh::new(nodes, shuffled);
    let reordered = assemble_stiffness(&permuted, &options).expect("assembly succeeds");
    assert_relative_eq!(stiffness, reordered, epsilon = 1.0e-3, max_relative = 1.0e-12);

    let parallel =
        assemble_stiffness(&permuted, &AnalysisOptions::parallel()).expect("assembly succeeds");
    assert_relative_eq!(stiffness, parallel, epsilon = 1.0e-3, max_relative = 1.0e-12);
}

#[test]
fn roller_blocks_are_orthogonal() {
    let supports = Supports {
        pins: vec![PinSupport::fixed(NodeId(1))],
        rollers: vec![
            RollerSupport::new(NodeId(3), RollerDirection::Y, FrameAngle(-15.0)),
            RollerSupport::new(NodeId(5), RollerDirection::X, FrameAngle(60.0)),
        ],
    };
    let transformation = transformation_matrix(&supports, 10).expect("valid supports");
    for first in [4, 8] {
        let block: Matrix2<f64> = transformation.fixed_view::<2, 2>(first, first).into_owned();
        assert_relative_eq!(block.transpose() * block, Matrix2::identity(), epsilon = 1.0e-12);
    }
    assert_relative_eq!(
        transformation.transpose() * &transformation,
        DMatrix::identity(10, 10),
        epsilon = 1.0e-12
    );
}

#[test]
fn invalid_inputs_name_the_offending_entity() {
    let mut model = TrussModel {
        mesh: bridge(),
        supports: Supports {
            pins: vec![PinSupport::fixed(NodeId(1))],
            rollers: vec![RollerSupport::new(
                NodeId(1),
                RollerDirection::Y,
                FrameAngle::GLOBAL,
            )],
        },
        loads: Vec::new(),
    };
    let options = AnalysisOptions::default();
    assert_eq!(
        Analysis::prepare(&model, &options),
        Err(AnalysisError::PinRollerConflict(NodeId(1)))
    );

    model.supports.rollers[0].node = NodeId(6);
    assert_eq!(
        Analysis::prepare(&model, &options),
        Err(AnalysisError::NodeOutOfRange {
            node: NodeId(6),
            node_count: 5,
        })
    );

    model.supports.rollers[0].node = NodeId(3);
    let mut elements = model.mesh.elements().to_vec();
    elements.push(Element::new(NodeId(5), NodeId(5), 200.0e9, 0.002));
    model.mesh = Mesh::new(
        (1..=5).filter_map(|n| model.mesh.node(NodeId(n))).collect(),
        elements,
    );
    assert_eq!(
        Analysis::prepare(&model, &options),
        Err(AnalysisError::ZeroLengthElement(ElementId(8)))
    );
}
