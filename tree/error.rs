/*!
This module defines the errors returned by this crate. Only configuration errors are fatal to a build. Per-node conditions such as a missing admissible split or a non-finite objective are recorded on the node instead.
*/

use thiserror::Error;

/// A `ConfigurationError` is returned before any node is created when the options or inputs passed to [`compute_tree`](../fn.compute_tree.html) are invalid.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
	#[error("max_depth must be at least 1, got {0}")]
	MaxDepth(usize),
	#[error("min_node_size must be at least 1, got {0}")]
	MinNodeSize(usize),
	#[error("unknown objective \"{0}\"")]
	UnknownObjective(String),
	#[error("the improvement threshold must be a finite number >= 0, got {0}")]
	ImprovementThreshold(f64),
	#[error("n_quantiles must be at least 1")]
	NQuantiles,
	#[error("the sum of squares objective requires a target for each observation")]
	MissingTargets,
	#[error("the ice curves objective requires a curve for each observation")]
	MissingCurves,
	#[error("expected {expected} rows of {what} but got {actual}")]
	LengthMismatch {
		what: &'static str,
		expected: usize,
		actual: usize,
	},
	#[error("the feature matrix has no observations")]
	NoObservations,
}

/// This is the error type returned by [`compute_tree`](../fn.compute_tree.html).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ComputeTreeError {
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),
	#[error("the split of node {node_id} left one side empty")]
	EmptyPartition { node_id: usize },
	#[error("node {node_id} has no split to create children from")]
	MissingSplit { node_id: usize },
}

/// This is the error type returned by the ICE data adapter.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IceError {
	#[error("the grid has no points")]
	EmptyGrid,
	#[error("grid values must be finite")]
	NonFiniteGrid,
	#[error("feature index {feature_index} is out of bounds for {n_features} features")]
	FeatureIndex {
		feature_index: usize,
		n_features: usize,
	},
	#[error("the column has no finite values to build a grid from")]
	EmptyColumn,
}
