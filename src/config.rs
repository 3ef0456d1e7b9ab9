//! Options controlling how an analysis is assembled.

use serde::{Deserialize, Serialize};

/// Tunables for [`Analysis::prepare`](crate::Analysis::prepare).
///
/// # Examples
/// ```
/// use trussfem::AnalysisOptions;
///
/// let options: AnalysisOptions = serde_json::from_str(r#"{ "parallel_assembly": true }"#).unwrap();
/// assert!(options.parallel_assembly);
/// assert_eq!(options.length_tolerance, 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Assemble the stiffness matrix on the rayon thread pool.
    pub parallel_assembly: bool,
    /// Elements whose length does not exceed this value are degenerate.
    pub length_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            parallel_assembly: false,
            length_tolerance: 0.0,
        }
    }
}

impl AnalysisOptions {
    /// Options with parallel stiffness assembly switched on.
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel_assembly: true,
            ..Self::default()
        }
    }
}
