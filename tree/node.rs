use crate::{
	choose_best_split::{
		choose_best_split, ChooseBestSplitFailure, ChooseBestSplitOptions, ChooseBestSplitOutput,
	},
	compute_tree::DiagnosticKind,
	objective::{partition_indices, Objective},
	ComputeTreeError, ComputeTreeOptions,
};
use ndarray::prelude::*;

/// A `Split` sends an observation to the left child if its value for the feature at `feature_index` is `<= threshold` and to the right child otherwise. NaN values are sent right.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Split {
	pub feature_index: usize,
	pub threshold: f32,
}

/// Which side of its parent's split a node is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentBranch {
	Root,
	Left,
	Right,
}

/// The ids of a node's two children. A node has either both or neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Children {
	pub left: usize,
	pub right: usize,
}

/// A `Node` is one region of the partition. Its index set and objective value are set when it is created, and its split related fields are set once by `compute_split`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Node {
	/// This is the node's index in the tree's node vector.
	pub id: usize,
	/// The root has depth 0.
	pub depth: usize,
	/// These are the indices of the observations in this node.
	pub indices: Vec<usize>,
	/// This is the heterogeneity of the observations in this node.
	pub objective_value: f64,
	/// This is the parent's objective value, or the node's own for the root.
	pub parent_objective_value: f64,
	pub parent_id: Option<usize>,
	pub parent_branch: ParentBranch,
	/// This is present only if a split was found and accepted.
	pub split: Option<Split>,
	pub children: Option<Children>,
	/// If true, no split will be attempted from this node.
	pub stop_flag: bool,
	/// If true, the accepted split's improvement met the improvement threshold.
	pub improvement_flag: bool,
	/// This is the improvement of the accepted split weighted by the fraction of all observations in this node, or 0 if the node was not split.
	pub improvement_score: f64,
}

/// The result of calling `compute_split` on a node.
#[derive(Clone, Debug, PartialEq)]
pub enum ComputeSplitOutcome {
	Accepted { split: Split, improvement: f64 },
	Rejected { improvement: f64, required: f64 },
	NoSplit(ChooseBestSplitFailure),
	NumericAnomaly(DiagnosticKind),
	AlreadyStopped,
}

impl Node {
	pub(crate) fn new_root(indices: Vec<usize>, objective: &Objective) -> Node {
		let objective_value = objective.score(&indices);
		Node {
			id: 0,
			depth: 0,
			indices,
			objective_value,
			parent_objective_value: objective_value,
			parent_id: None,
			parent_branch: ParentBranch::Root,
			split: None,
			children: None,
			stop_flag: false,
			improvement_flag: false,
			improvement_score: 0.0,
		}
	}

	fn new_child(
		id: usize,
		parent: &Node,
		parent_branch: ParentBranch,
		indices: Vec<usize>,
		objective: &Objective,
	) -> Node {
		Node {
			id,
			depth: parent.depth + 1,
			objective_value: objective.score(&indices),
			indices,
			parent_objective_value: parent.objective_value,
			parent_id: Some(parent.id),
			parent_branch,
			split: None,
			children: None,
			stop_flag: false,
			improvement_flag: false,
			improvement_score: 0.0,
		}
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_none()
	}

	pub fn n_examples(&self) -> usize {
		self.indices.len()
	}

	/// Mark the node as terminal without searching for a split.
	pub(crate) fn stop(&mut self) {
		self.stop_flag = true;
	}

	/// Decide whether and how to split this node. This sets every split related field at once. `n_root_examples` is the number of observations in the root, used to weight the improvement score.
	pub(crate) fn compute_split(
		&mut self,
		features: ArrayView2<f32>,
		objective: &Objective,
		options: &ComputeTreeOptions,
		n_root_examples: usize,
	) -> ComputeSplitOutcome {
		if self.stop_flag {
			return ComputeSplitOutcome::AlreadyStopped;
		}
		if !self.objective_value.is_finite() {
			self.stop_flag = true;
			return ComputeSplitOutcome::NumericAnomaly(DiagnosticKind::NonFiniteObjective {
				objective_value: self.objective_value,
			});
		}
		let output = choose_best_split(ChooseBestSplitOptions {
			features,
			indices: &self.indices,
			objective,
			objective_value: self.objective_value,
			compute_tree_options: options,
		});
		let success = match output {
			ChooseBestSplitOutput::Success(success) => success,
			ChooseBestSplitOutput::Failure(failure) => {
				self.stop_flag = true;
				return ComputeSplitOutcome::NoSplit(failure);
			}
		};
		if !success.improvement.is_finite() {
			self.stop_flag = true;
			return ComputeSplitOutcome::NumericAnomaly(DiagnosticKind::NonFiniteImprovement {
				improvement: success.improvement,
			});
		}
		let improvement = success.improvement;
		if options
			.improvement_threshold
			.is_met(improvement, self.objective_value)
		{
			self.split = Some(success.split);
			self.improvement_flag = true;
			self.improvement_score =
				improvement * (self.indices.len() as f64 / n_root_examples as f64);
			ComputeSplitOutcome::Accepted {
				split: success.split,
				improvement,
			}
		} else {
			self.stop_flag = true;
			self.improvement_flag = false;
			ComputeSplitOutcome::Rejected {
				improvement,
				required: options
					.improvement_threshold
					.required_improvement(self.objective_value),
			}
		}
	}

	/// Partition this node's observations by its split and create the two children, with ids `left_id` and `left_id + 1`.
	pub(crate) fn compute_children(
		&mut self,
		left_id: usize,
		features: ArrayView2<f32>,
		objective: &Objective,
	) -> Result<(Node, Node), ComputeTreeError> {
		let split = self
			.split
			.ok_or(ComputeTreeError::MissingSplit { node_id: self.id })?;
		let (left_indices, right_indices) = partition_indices(
			&self.indices,
			features.column(split.feature_index),
			split.threshold,
		);
		if left_indices.is_empty() || right_indices.is_empty() {
			return Err(ComputeTreeError::EmptyPartition { node_id: self.id });
		}
		let left = Node::new_child(left_id, self, ParentBranch::Left, left_indices, objective);
		let right = Node::new_child(
			left_id + 1,
			self,
			ParentBranch::Right,
			right_indices,
			objective,
		);
		self.children = Some(Children {
			left: left.id,
			right: right.id,
		});
		Ok((left, right))
	}
}

#[cfg(test)]
fn test_options(improvement_threshold: crate::ImprovementThreshold) -> ComputeTreeOptions {
	ComputeTreeOptions {
		objective: crate::ObjectiveKind::SumOfSquares,
		min_node_size: 1,
		improvement_threshold,
		..Default::default()
	}
}

#[test]
fn test_compute_split_and_children() {
	let features = arr2(&[[0.0], [1.0], [0.0], [1.0]]);
	let targets = arr1(&[0.0, 10.0, 0.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let options = test_options(crate::ImprovementThreshold::Relative(0.5));
	let mut root = Node::new_root(vec![0, 1, 2, 3], &objective);
	assert_eq!(root.objective_value, 100.0);
	let outcome = root.compute_split(features.view(), &objective, &options, 4);
	let split = Split {
		feature_index: 0,
		threshold: 0.5,
	};
	assert_eq!(
		outcome,
		ComputeSplitOutcome::Accepted {
			split,
			improvement: 100.0,
		}
	);
	assert_eq!(root.split, Some(split));
	assert!(root.improvement_flag);
	assert!(!root.stop_flag);
	assert_eq!(root.improvement_score, 100.0);

	let (left, right) = root.compute_children(1, features.view(), &objective).unwrap();
	assert_eq!(
		root.children,
		Some(Children {
			left: 1,
			right: 2,
		})
	);
	assert_eq!(left.indices, vec![0, 2]);
	assert_eq!(right.indices, vec![1, 3]);
	assert_eq!(left.depth, 1);
	assert_eq!(left.parent_id, Some(0));
	assert_eq!(left.parent_branch, ParentBranch::Left);
	assert_eq!(right.parent_branch, ParentBranch::Right);
	assert_eq!(left.parent_objective_value, 100.0);
	assert_eq!(left.objective_value, 0.0);
	assert_eq!(right.objective_value, 0.0);
}

#[test]
fn test_compute_split_rejects_small_improvement() {
	// Splitting [0, 1 | 2, 2] only removes part of the heterogeneity.
	let features = arr2(&[[0.0], [1.0], [2.0], [3.0]]);
	let targets = arr1(&[0.0, 1.0, 2.0, 2.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let options = test_options(crate::ImprovementThreshold::Absolute(1000.0));
	let mut root = Node::new_root(vec![0, 1, 2, 3], &objective);
	let outcome = root.compute_split(features.view(), &objective, &options, 4);
	match outcome {
		ComputeSplitOutcome::Rejected { required, .. } => assert_eq!(required, 1000.0),
		outcome => panic!("{:?}", outcome),
	}
	assert!(root.stop_flag);
	assert!(!root.improvement_flag);
	assert_eq!(root.split, None);
	assert_eq!(root.improvement_score, 0.0);
	// A stopped node is never revisited.
	let outcome = root.compute_split(features.view(), &objective, &options, 4);
	assert_eq!(outcome, ComputeSplitOutcome::AlreadyStopped);
	assert_eq!(
		root.compute_children(1, features.view(), &objective),
		Err(ComputeTreeError::MissingSplit { node_id: 0 })
	);
}

#[test]
fn test_compute_split_non_finite_objective() {
	let features = arr2(&[[0.0], [1.0]]);
	let curves = arr2(&[[f32::NAN, 1.0], [0.0, 1.0]]);
	let objective = Objective::IceCurves {
		curves: curves.view(),
	};
	let options = test_options(crate::ImprovementThreshold::Relative(0.0));
	let mut root = Node::new_root(vec![0, 1], &objective);
	let outcome = root.compute_split(features.view(), &objective, &options, 2);
	assert!(matches!(
		outcome,
		ComputeSplitOutcome::NumericAnomaly(DiagnosticKind::NonFiniteObjective { .. })
	));
	assert!(root.stop_flag);
	assert!(root.is_leaf());
}
