//! Supports and point loads applied to a truss.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::geometry::{Components, FrameAngle};
use crate::mesh::NodeId;

/// Pin support fixing both DOFs of a node to a prescribed displacement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinSupport {
    /// Supported node.
    pub node: NodeId,
    /// Prescribed displacement expressed in the support frame.
    #[serde(default)]
    pub displacement: Components,
    /// Orientation of the support frame.
    #[serde(default)]
    pub angle: FrameAngle,
}

impl PinSupport {
    /// Pin with zero displacement in the global frame.
    #[must_use]
    pub const fn fixed(node: NodeId) -> Self {
        Self {
            node,
            displacement: Components::new(0.0, 0.0),
            angle: FrameAngle::GLOBAL,
        }
    }
}

/// Axis of the support frame a roller restrains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollerDirection {
    /// First local axis; input code `0`.
    X,
    /// Second local axis; input code `1`.
    Y,
}

impl RollerDirection {
    /// Decode the numeric direction code used by input tables.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownRollerDirection`] for any code other
    /// than `0` or `1`.
    pub fn from_code(node: NodeId, code: i64) -> Result<Self, AnalysisError> {
        match code {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            code => Err(AnalysisError::UnknownRollerDirection { node, code }),
        }
    }

    /// Numeric code of the direction.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

/// Roller support fixing one DOF of a node along an axis of its frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RollerRecord", into = "RollerRecord")]
pub struct RollerSupport {
    /// Supported node.
    pub node: NodeId,
    /// Restrained axis of the support frame.
    pub direction: RollerDirection,
    /// Orientation of the support frame.
    pub angle: FrameAngle,
    /// Prescribed displacement along the restrained axis.
    pub displacement: f64,
}

impl RollerSupport {
    /// Roller with zero displacement.
    #[must_use]
    pub const fn new(node: NodeId, direction: RollerDirection, angle: FrameAngle) -> Self {
        Self {
            node,
            direction,
            angle,
            displacement: 0.0,
        }
    }

    /// 1-based number of the restrained DOF.
    #[must_use]
    pub const fn dof(&self) -> usize {
        let [x, y] = self.node.dofs();
        match self.direction {
            RollerDirection::X => x,
            RollerDirection::Y => y,
        }
    }

    /// 0-based matrix position of the restrained DOF.
    #[must_use]
    pub const fn dof_index(&self) -> usize {
        self.dof() - 1
    }
}

/// Serialised form of a roller with its raw direction code.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RollerRecord {
    /// Supported node.
    node: NodeId,
    /// Direction code, `0` for x and `1` for y.
    direction: i64,
    /// Orientation of the support frame.
    #[serde(default)]
    angle: FrameAngle,
    /// Prescribed displacement along the restrained axis.
    #[serde(default)]
    displacement: f64,
}

impl TryFrom<RollerRecord> for RollerSupport {
    type Error = AnalysisError;

    fn try_from(record: RollerRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            node: record.node,
            direction: RollerDirection::from_code(record.node, record.direction)?,
            angle: record.angle,
            displacement: record.displacement,
        })
    }
}

impl From<RollerSupport> for RollerRecord {
    fn from(roller: RollerSupport) -> Self {
        Self {
            node: roller.node,
            direction: roller.direction.code(),
            angle: roller.angle,
            displacement: roller.displacement,
        }
    }
}

/// Every support of a truss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Supports {
    /// Pin supports.
    #[serde(default)]
    pub pins: Vec<PinSupport>,
    /// Roller supports.
    #[serde(default)]
    pub rollers: Vec<RollerSupport>,
}

impl Supports {
    /// Check that every support sits on an existing node and that no node is
    /// supported twice.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NodeOutOfRange`],
    /// [`AnalysisError::DuplicateSupport`] or
    /// [`AnalysisError::PinRollerConflict`] for the first offending support.
    pub fn validate(&self, node_count: usize) -> Result<(), AnalysisError> {
        let mut pinned = BTreeSet::new();
        for pin in &self.pins {
            pin.node.check(node_count)?;
            if !pinned.insert(pin.node) {
                return Err(AnalysisError::DuplicateSupport(pin.node));
            }
        }
        let mut rolled = BTreeSet::new();
        for roller in &self.rollers {
            roller.node.check(node_count)?;
            if pinned.contains(&roller.node) {
                return Err(AnalysisError::PinRollerConflict(roller.node));
            }
            if !rolled.insert(roller.node) {
                return Err(AnalysisError::DuplicateSupport(roller.node));
            }
        }
        Ok(())
    }

    /// Number of restrained DOFs: two per pin and one per roller.
    #[must_use]
    pub fn restrained_count(&self) -> usize {
        2 * self.pins.len() + self.rollers.len()
    }
}

/// Point load applied at a node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Loaded node.
    pub node: NodeId,
    /// Force components in the load frame.
    pub force: Components,
    /// Orientation of the load frame.
    #[serde(default)]
    pub angle: FrameAngle,
}

impl PointLoad {
    /// Load given directly in the global frame.
    #[must_use]
    pub const fn global(node: NodeId, force: Components) -> Self {
        Self {
            node,
            force,
            angle: FrameAngle::GLOBAL,
        }
    }
}
