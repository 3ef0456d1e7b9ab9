//! Node and element tables for a planar truss.
//!
//! Nodes and elements are numbered from 1, matching the tables a truss is
//! usually described with. [`NodeId`] and [`ElementId`] are the only place
//! that numbering is converted into 0-based storage positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, ElementPropertyError};
use crate::geometry::Point;

/// 1-based node number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Node number for a 0-based storage position.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// 0-based storage position, or `None` for the invalid node number 0.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }

    /// 1-based DOF numbers `[2n - 1, 2n]` of this node.
    ///
    /// # Panics
    ///
    /// Panics for node 0; use [`NodeId::check`] on untrusted input first.
    #[must_use]
    pub const fn dofs(self) -> [usize; 2] {
        assert!(self.0 > 0, "node numbers start at 1");
        [2 * self.0 - 1, 2 * self.0]
    }

    /// 0-based matrix positions `[2n - 2, 2n - 1]` of this node.
    ///
    /// # Panics
    ///
    /// Panics for node 0; use [`NodeId::check`] on untrusted input first.
    #[must_use]
    pub const fn dof_indices(self) -> [usize; 2] {
        assert!(self.0 > 0, "node numbers start at 1");
        [2 * self.0 - 2, 2 * self.0 - 1]
    }

    /// Check that the node exists in a mesh with `node_count` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NodeOutOfRange`] for node 0 or any number past
    /// `node_count`.
    pub fn check(self, node_count: usize) -> Result<Self, AnalysisError> {
        if self.0 == 0 || self.0 > node_count {
            return Err(AnalysisError::NodeOutOfRange {
                node: self,
                node_count,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based element number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Element number for a 0-based storage position.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// 0-based storage position, or `None` for the invalid element number 0.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bar element connecting two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Start node.
    pub start: NodeId,
    /// End node.
    pub end: NodeId,
    /// Elastic modulus.
    pub elastic_modulus: f64,
    /// Cross-sectional area.
    pub area: f64,
}

impl Element {
    /// Create an element between two nodes.
    #[must_use]
    pub const fn new(start: NodeId, end: NodeId, elastic_modulus: f64, area: f64) -> Self {
        Self {
            start,
            end,
            elastic_modulus,
            area,
        }
    }

    /// Axial rigidity `E * A`.
    #[must_use]
    pub fn axial_rigidity(&self) -> f64 {
        self.elastic_modulus * self.area
    }

    /// 0-based matrix positions of the four element DOFs, start node first.
    ///
    /// # Panics
    ///
    /// Panics when either end is node 0; [`Mesh::validate`] rejects such
    /// elements.
    #[must_use]
    pub const fn dof_indices(&self) -> [usize; 4] {
        let [a, b] = self.start.dof_indices();
        let [c, d] = self.end.dof_indices();
        [a, b, c, d]
    }
}

/// Length and direction cosines of an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Distance between the two nodes.
    pub length: f64,
    /// Cosine of the angle between the element axis and global X.
    pub cos: f64,
    /// Sine of the angle between the element axis and global X.
    pub sin: f64,
}

/// Node coordinates plus element connectivity and section properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Node coordinates; node `n` is stored at position `n - 1`.
    nodes: Vec<Point>,
    /// Elements; element `e` is stored at position `e - 1`.
    elements: Vec<Element>,
}

impl Mesh {
    /// Create a mesh from node coordinates and elements.
    #[must_use]
    pub fn new(nodes: Vec<Point>, elements: Vec<Element>) -> Self {
        Self { nodes, elements }
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Total number of DOFs, two per node.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        2 * self.nodes.len()
    }

    /// Coordinates of a node.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<Point> {
        node.index().and_then(|index| self.nodes.get(index).copied())
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, element: ElementId) -> Option<&Element> {
        element.index().and_then(|index| self.elements.get(index))
    }

    /// All elements in storage order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Iterate over elements together with their identifiers.
    pub fn iter_elements(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId::from_index(index), element))
    }

    /// Compute length and direction cosines of an element.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ElementNodeOutOfRange`] when the element refers
    /// to a missing node and [`AnalysisError::ZeroLengthElement`] when its
    /// length does not exceed `length_tolerance`.
    pub fn element_geometry(
        &self,
        id: ElementId,
        element: &Element,
        length_tolerance: f64,
    ) -> Result<ElementGeometry, AnalysisError> {
        let start = self.connected_node(id, element.start)?;
        let end = self.connected_node(id, element.end)?;
        let delta = end.to_vector() - start.to_vector();
        let length = delta.norm();
        if length <= length_tolerance || length == 0.0 {
            return Err(AnalysisError::ZeroLengthElement(id));
        }
        Ok(ElementGeometry {
            length,
            cos: delta.x / length,
            sin: delta.y / length,
        })
    }

    /// Validate connectivity and section properties of every element.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in element order.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (id, element) in self.iter_elements() {
            self.connected_node(id, element.start)?;
            self.connected_node(id, element.end)?;
            check_properties(id, element)?;
        }
        Ok(())
    }

    /// Resolve an element end node, attributing failures to the element.
    fn connected_node(&self, element: ElementId, node: NodeId) -> Result<Point, AnalysisError> {
        self.node(node)
            .ok_or(AnalysisError::ElementNodeOutOfRange {
                element,
                node,
                node_count: self.node_count(),
            })
    }
}

/// Reject non-positive section properties.
pub(crate) fn check_properties(id: ElementId, element: &Element) -> Result<(), AnalysisError> {
    if element.area <= 0.0 {
        return Err(AnalysisError::InvalidElementProperties {
            element: id,
            source: ElementPropertyError::NonPositiveArea { area: element.area },
        });
    }
    if element.elastic_modulus <= 0.0 {
        return Err(AnalysisError::InvalidElementProperties {
            element: id,
            source: ElementPropertyError::NonPositiveElasticModulus {
                elastic_modulus: element.elastic_modulus,
            },
        });
    }
    Ok(())
}
