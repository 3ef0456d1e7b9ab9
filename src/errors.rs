//! Error types produced while validating or analysing a truss model.

use thiserror::Error;

use crate::mesh::{ElementId, NodeId};

/// Error returned when a truss analysis fails.
///
/// Every variant names the node or element that triggered it so callers can
/// point users at the offending row of their input tables.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when an element connects two coincident nodes.
    #[error("element {0} has zero length")]
    ZeroLengthElement(ElementId),
    /// Returned when the supplied properties for an element are not physically meaningful.
    #[error("element {element} has invalid properties: {source}")]
    InvalidElementProperties {
        /// Identifier of the offending element.
        element: ElementId,
        /// Description of the invalid property.
        #[source]
        source: ElementPropertyError,
    },
    /// Returned when a support or load refers to a node that does not exist.
    #[error("node {node} is outside the mesh (node count {node_count})")]
    NodeOutOfRange {
        /// Identifier that was referenced.
        node: NodeId,
        /// Number of nodes in the mesh.
        node_count: usize,
    },
    /// Returned when element connectivity refers to a node that does not exist.
    #[error("element {element} references node {node} outside the mesh (node count {node_count})")]
    ElementNodeOutOfRange {
        /// Identifier of the offending element.
        element: ElementId,
        /// Identifier that was referenced.
        node: NodeId,
        /// Number of nodes in the mesh.
        node_count: usize,
    },
    /// Returned when a node carries both a pin and a roller.
    #[error("node {0} is supported by both a pin and a roller")]
    PinRollerConflict(NodeId),
    /// Returned when a node carries two supports of the same kind.
    #[error("node {0} has more than one support of the same kind")]
    DuplicateSupport(NodeId),
    /// Returned when a roller direction code is not recognised.
    #[error("roller at node {node} has unknown direction code {code} (expected 0 or 1)")]
    UnknownRollerDirection {
        /// Node carrying the roller.
        node: NodeId,
        /// Rejected direction code.
        code: i64,
    },
    /// Returned when the reduced stiffness matrix cannot be factorised.
    #[error("stiffness matrix is singular; check supports and connectivity")]
    SingularStiffness,
}

/// Error describing why element properties were rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ElementPropertyError {
    /// Returned when the cross-sectional area is zero or negative.
    #[error("area must be positive (received {area})")]
    NonPositiveArea {
        /// Rejected cross-sectional area.
        area: f64,
    },
    /// Returned when the elastic modulus is zero or negative.
    #[error("elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let error = AnalysisError::ZeroLengthElement(ElementId(4));
        assert_eq!(error.to_string(), "element 4 has zero length");

        let error = AnalysisError::UnknownRollerDirection {
            node: NodeId(2),
            code: 7,
        };
        assert!(error.to_string().contains("node 2"));
        assert!(error.to_string().contains("code 7"));
    }

    #[test]
    fn property_errors_are_chained() {
        let error = AnalysisError::InvalidElementProperties {
            element: ElementId(1),
            source: ElementPropertyError::NonPositiveArea { area: -1.0 },
        };
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("area must be positive (received -1)"));
    }
}
