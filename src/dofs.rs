//! Partition of the DOFs into restrained and unrestrained sets.

use tracing::debug;

use crate::conditions::Supports;
use crate::errors::AnalysisError;

/// Disjoint fixed and free DOF sets covering `1..=dof_count`.
///
/// DOF numbers are 1-based (`2n - 1` along x and `2n` along y for node `n`).
/// The `*_zero_based` accessors re-base them for use as matrix indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DofPartition {
    /// Total number of DOFs.
    dof_count: usize,
    /// Restrained DOFs in support order: pins first, then rollers.
    fixed: Vec<usize>,
    /// Unrestrained DOFs in ascending order.
    free: Vec<usize>,
}

impl DofPartition {
    /// Partition the DOFs of a mesh with `node_count` nodes.
    ///
    /// Each pin contributes both DOFs of its node, each roller the single DOF
    /// along its restrained axis.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Supports::validate`] when a support is placed
    /// on a missing node, a node is supported twice or a node carries both a
    /// pin and a roller.
    ///
    /// # Examples
    /// ```
    /// use trussfem::{DofPartition, NodeId, PinSupport, Supports};
    ///
    /// let supports = Supports {
    ///     pins: vec![PinSupport::fixed(NodeId(1))],
    ///     rollers: Vec::new(),
    /// };
    /// let dofs = DofPartition::new(2, &supports).unwrap();
    /// assert_eq!(dofs.fixed(), &[1, 2]);
    /// assert_eq!(dofs.free(), &[3, 4]);
    /// ```
    pub fn new(node_count: usize, supports: &Supports) -> Result<Self, AnalysisError> {
        supports.validate(node_count)?;

        let dof_count = 2 * node_count;
        let mut fixed = Vec::with_capacity(supports.restrained_count());
        for pin in &supports.pins {
            fixed.extend(pin.node.dofs());
        }
        fixed.extend(supports.rollers.iter().map(|roller| roller.dof()));

        let mut restrained = vec![false; dof_count];
        for &dof in &fixed {
            restrained[dof - 1] = true;
        }
        let free = (1..=dof_count)
            .filter(|dof| !restrained[dof - 1])
            .collect::<Vec<_>>();

        debug!(
            dof_count,
            fixed = fixed.len(),
            free = free.len(),
            "partitioned degrees of freedom"
        );
        Ok(Self {
            dof_count,
            fixed,
            free,
        })
    }

    /// Total number of DOFs.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.dof_count
    }

    /// Number of restrained DOFs.
    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }

    /// Number of unrestrained DOFs.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Restrained DOFs, 1-based.
    #[must_use]
    pub fn fixed(&self) -> &[usize] {
        &self.fixed
    }

    /// Unrestrained DOFs, 1-based and ascending.
    #[must_use]
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    /// Restrained DOFs as 0-based matrix indices.
    #[must_use]
    pub fn fixed_zero_based(&self) -> Vec<usize> {
        self.fixed.iter().map(|dof| dof - 1).collect()
    }

    /// Unrestrained DOFs as 0-based matrix indices.
    #[must_use]
    pub fn free_zero_based(&self) -> Vec<usize> {
        self.free.iter().map(|dof| dof - 1).collect()
    }
}
