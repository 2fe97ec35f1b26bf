/*!
This crate grows a binary decision tree that partitions a feature space so that the response curves of the observations in each region, usually Individual Conditional Expectation (ICE) curves produced by some other machine learning model, are more homogeneous than in the parent region. The features used in the splits, weighted by how much each split reduced the heterogeneity, point at the interactions responsible for heterogeneity in the model's effect of one feature.

For an example, see `benchmarks/synthetic.rs`.

## Growing a tree

1. Choose an [`Objective`](enum.Objective.html). `SumOfSquares` measures the heterogeneity of a scalar target. `IceCurves` measures the heterogeneity of a matrix of curves, one row per observation, which you can compute with [`compute_data_for_ice_splitting`](fn.compute_data_for_ice_splitting.html).
2. Call [`compute_tree`](fn.compute_tree.html). The root holds every observation. The tree is grown one level at a time. Each node at the current level searches every (feature, threshold) pair for the split that minimizes the size weighted objective of its children, and the split is kept only if it improves the objective by at least the configured threshold.
3. Inspect the resulting [`Tree`](struct.Tree.html), or rank the features with [`compute_feature_importances`](fn.compute_feature_importances.html).
*/

#![allow(clippy::tabs_in_doc_comments)]

mod choose_best_split;
mod compute_tree;
pub mod config;
mod error;
mod feature_importances;
mod ice;
mod node;
mod objective;
mod split_candidates;
#[cfg(feature = "timing")]
mod timing;

pub use self::choose_best_split::{
	choose_best_split, ChooseBestSplitFailure, ChooseBestSplitOptions, ChooseBestSplitOutput,
	ChooseBestSplitSuccess,
};
pub use self::compute_tree::{
	compute_tree, ComputeTreeInput, ComputeTreeProgress, Diagnostic, DiagnosticKind, Tree,
};
pub use self::error::{ComputeTreeError, ConfigurationError, IceError};
pub use self::feature_importances::compute_feature_importances;
pub use self::ice::{
	compute_data_for_ice_splitting, compute_grid, ComputeGridOptions, Effect, Model,
};
pub use self::node::{Children, ComputeSplitOutcome, Node, ParentBranch, Split};
pub use self::objective::{Objective, ObjectiveAccumulator, SplitScore};
pub use self::split_candidates::{compute_split_candidates, SplitCandidate};

/// Objective values at or below this value are considered to be zero. A node whose objective value is zero has nothing left to improve.
pub const OBJECTIVE_EPSILON: f64 = 1e-12;

/// These are the options passed to [`compute_tree`](fn.compute_tree.html). They are held immutable for the whole build.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputeTreeOptions {
	/// This selects the objective used to score the heterogeneity of a node.
	pub objective: ObjectiveKind,
	/// The depth of a node will never exceed this value. The root has depth 0. Must be at least 1.
	pub max_depth: usize,
	/// A split will only be considered if it sends at least this many observations to each child. Must be at least 1.
	pub min_node_size: usize,
	/// A split is only accepted if it improves the node's objective by at least this much.
	pub improvement_threshold: ImprovementThreshold,
	/// This controls which thresholds are tried for each feature.
	pub split_candidates: SplitCandidates,
}

impl Default for ComputeTreeOptions {
	fn default() -> Self {
		Self {
			objective: ObjectiveKind::IceCurves,
			max_depth: 3,
			min_node_size: 10,
			improvement_threshold: ImprovementThreshold::Relative(0.0),
			split_candidates: SplitCandidates::Exhaustive,
		}
	}
}

impl ComputeTreeOptions {
	/// Check that the options describe a valid build.
	pub fn validate(&self) -> Result<(), ConfigurationError> {
		if self.max_depth < 1 {
			return Err(ConfigurationError::MaxDepth(self.max_depth));
		}
		if self.min_node_size < 1 {
			return Err(ConfigurationError::MinNodeSize(self.min_node_size));
		}
		let threshold = self.improvement_threshold.value();
		if !threshold.is_finite() || threshold < 0.0 {
			return Err(ConfigurationError::ImprovementThreshold(threshold));
		}
		if let SplitCandidates::Quantiles { n_quantiles: 0 } = self.split_candidates {
			return Err(ConfigurationError::NQuantiles);
		}
		Ok(())
	}
}

/// The minimum improvement required to accept a split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImprovementThreshold {
	/// The improvement must be at least this value.
	Absolute(f64),
	/// The improvement must be at least this fraction of the node's objective value.
	Relative(f64),
}

impl ImprovementThreshold {
	pub fn value(&self) -> f64 {
		match self {
			ImprovementThreshold::Absolute(value) => *value,
			ImprovementThreshold::Relative(value) => *value,
		}
	}

	/// Return the minimum improvement required for a node with the given objective value.
	pub fn required_improvement(&self, objective_value: f64) -> f64 {
		match self {
			ImprovementThreshold::Absolute(value) => *value,
			ImprovementThreshold::Relative(value) => *value * objective_value,
		}
	}

	pub fn is_met(&self, improvement: f64, objective_value: f64) -> bool {
		improvement >= self.required_improvement(objective_value)
	}
}

/// This controls which thresholds the split finder tries for each feature. Whichever strategy is chosen, a threshold that sends fewer than `min_node_size` observations to either side is never considered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitCandidates {
	/// Try the midpoint between every pair of consecutive distinct values of the feature in the node.
	Exhaustive,
	/// Take every `min_node_size`th sorted value of the feature in the node and try `n_quantiles + 1` evenly spaced percentiles of those values.
	Quantiles { n_quantiles: usize },
}

/// The closed set of objectives. This is chosen once before a build starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ObjectiveKind {
	/// The sum of squared deviations of a scalar target.
	#[serde(rename = "sum_of_squares")]
	SumOfSquares,
	/// The sum over grid points of the variance of the curves at that grid point.
	#[serde(rename = "ice_curves")]
	IceCurves,
}

impl std::str::FromStr for ObjectiveKind {
	type Err = ConfigurationError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sum_of_squares" | "scalar" => Ok(ObjectiveKind::SumOfSquares),
			"ice_curves" | "ice" => Ok(ObjectiveKind::IceCurves),
			_ => Err(ConfigurationError::UnknownObjective(s.to_owned())),
		}
	}
}

impl std::fmt::Display for ObjectiveKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ObjectiveKind::SumOfSquares => "sum_of_squares",
			ObjectiveKind::IceCurves => "ice_curves",
		};
		write!(f, "{}", s)
	}
}

#[test]
fn test_validate() {
	let options = ComputeTreeOptions::default();
	assert_eq!(options.validate(), Ok(()));
	let options = ComputeTreeOptions {
		max_depth: 0,
		..Default::default()
	};
	assert_eq!(options.validate(), Err(ConfigurationError::MaxDepth(0)));
	let options = ComputeTreeOptions {
		min_node_size: 0,
		..Default::default()
	};
	assert_eq!(options.validate(), Err(ConfigurationError::MinNodeSize(0)));
	let options = ComputeTreeOptions {
		improvement_threshold: ImprovementThreshold::Absolute(-1.0),
		..Default::default()
	};
	assert_eq!(
		options.validate(),
		Err(ConfigurationError::ImprovementThreshold(-1.0))
	);
	let options = ComputeTreeOptions {
		split_candidates: SplitCandidates::Quantiles { n_quantiles: 0 },
		..Default::default()
	};
	assert_eq!(options.validate(), Err(ConfigurationError::NQuantiles));
}

#[test]
fn test_objective_kind_from_str() {
	assert_eq!("ice".parse::<ObjectiveKind>(), Ok(ObjectiveKind::IceCurves));
	assert_eq!("sum_of_squares".parse::<ObjectiveKind>(), Ok(ObjectiveKind::SumOfSquares));
	assert_eq!(
		"gini".parse::<ObjectiveKind>(),
		Err(ConfigurationError::UnknownObjective("gini".to_owned()))
	);
}

#[test]
fn test_improvement_threshold() {
	let threshold = ImprovementThreshold::Relative(0.1);
	assert!(threshold.is_met(1.0, 10.0));
	assert!(!threshold.is_met(0.5, 10.0));
	let threshold = ImprovementThreshold::Absolute(2.0);
	assert!(threshold.is_met(2.0, 100.0));
	assert!(!threshold.is_met(1.9, 1.0));
}
