use trussfem::{
    components, point, Analysis, AnalysisOptions, Element, ElementId, FrameAngle, Mesh, NodeId,
    PinSupport, PointLoad, RollerDirection, RollerSupport, Supports, TrussModel,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A triangle sitting on a pin and on a roller running along a 30 degree ramp
    let model = TrussModel {
        mesh: Mesh::new(
            vec![point(0.0, 0.0), point(4.0, 0.0), point(2.0, 3.0)],
            vec![
                Element::new(NodeId(1), NodeId(2), 200.0e9, 0.002),
                Element::new(NodeId(2), NodeId(3), 200.0e9, 0.002),
                Element::new(NodeId(1), NodeId(3), 200.0e9, 0.002),
            ],
        ),
        supports: Supports {
            pins: vec![PinSupport::fixed(NodeId(1))],
            rollers: vec![RollerSupport::new(
                NodeId(2),
                RollerDirection::Y,
                FrameAngle(30.0),
            )],
        },
        loads: vec![PointLoad::global(NodeId(3), components(5_000.0, -20_000.0))],
    };

    // Build the global system and solve it
    let analysis = Analysis::prepare(&model, &AnalysisOptions::default())?;
    println!("Fixed DOFs: {:?}", analysis.dofs().fixed());
    println!("Free DOFs: {:?}", analysis.dofs().free());
    let solution = analysis.solve(&model.mesh)?;

    for (id, _) in model.mesh.iter_elements() {
        if let Some(force) = solution.axial_force(id) {
            println!("Element {id}: axial force = {force:+.1} N");
        }
    }
    if let Some(displacement) = solution.displacement(NodeId(3)) {
        println!(
            "Node 3: ux = {:+.3e} m, uy = {:+.3e} m",
            displacement.x, displacement.y
        );
    }
    if let Some(stress) = solution.stress(ElementId(1)) {
        println!("Element 1 stress: {stress:+.3e} Pa");
    }

    Ok(())
}
