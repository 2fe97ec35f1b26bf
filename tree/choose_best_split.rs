use crate::{
	node::Split,
	objective::{weighted_score, Objective, ObjectiveAccumulator, SplitScore},
	split_candidates::compute_split_candidates,
	ComputeTreeOptions, OBJECTIVE_EPSILON,
};
use ndarray::prelude::*;
use rayon::prelude::*;
use std::cmp::Ordering;

pub struct ChooseBestSplitOptions<'a, 'b, 'c> {
	pub features: ArrayView2<'c, f32>,
	pub indices: &'a [usize],
	pub objective: &'a Objective<'b>,
	pub objective_value: f64,
	pub compute_tree_options: &'a ComputeTreeOptions,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChooseBestSplitOutput {
	Success(ChooseBestSplitSuccess),
	Failure(ChooseBestSplitFailure),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChooseBestSplitSuccess {
	pub split: Split,
	/// The node's objective value minus the weighted objective of its children.
	pub improvement: f64,
	pub split_score: SplitScore,
}

/// The reason no split was found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChooseBestSplitFailure {
	/// The node has fewer than `2 * min_node_size` observations.
	TooFewExamples,
	/// The node's objective value is already zero.
	ObjectiveIsZero,
	/// No threshold of any feature leaves `min_node_size` observations on both sides.
	NoAdmissibleSplit,
}

struct ChooseBestSplitForFeatureOutput {
	feature_index: usize,
	threshold: f32,
	weighted_score: f64,
}

/**
Find the (feature, threshold) pair that minimizes the weighted objective of the two children of the node holding `indices`.

Features are searched in parallel. Within a feature, the observations are sorted once by feature value and every candidate threshold is scored in a single sweep using running sums. The winner is then rescored exactly with [`Objective::split_score`](enum.Objective.html#method.split_score), so the reported scores are identical to the objective values the children will have. If two candidates have the same weighted score, the one with the smaller feature index wins, then the one with the smaller threshold. This order does not depend on how the search is scheduled.
*/
pub fn choose_best_split(options: ChooseBestSplitOptions) -> ChooseBestSplitOutput {
	let ChooseBestSplitOptions {
		features,
		indices,
		objective,
		objective_value,
		compute_tree_options,
	} = options;

	// Determine if we should try to split the node at all.
	if indices.len() < 2 * compute_tree_options.min_node_size {
		return ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::TooFewExamples);
	}
	if objective_value <= OBJECTIVE_EPSILON {
		return ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::ObjectiveIsZero);
	}

	let mut total = objective.accumulator();
	for index in indices {
		objective.accumulate(&mut total, *index);
	}

	// For each feature, choose the best split, then choose the best among them.
	let best_split_output = (0..features.ncols())
		.into_par_iter()
		.filter_map(|feature_index| {
			choose_best_split_for_feature(
				feature_index,
				features.column(feature_index),
				indices,
				objective,
				&total,
				compute_tree_options,
			)
		})
		.min_by(compare_split_outputs);
	let best_split_output = match best_split_output {
		Some(best_split_output) => best_split_output,
		None => return ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::NoAdmissibleSplit),
	};

	// Rescore the best split exactly.
	let split_score = match objective.split_score(
		indices,
		features,
		best_split_output.feature_index,
		best_split_output.threshold,
	) {
		Some(split_score) => split_score,
		None => return ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::NoAdmissibleSplit),
	};
	ChooseBestSplitOutput::Success(ChooseBestSplitSuccess {
		split: Split {
			feature_index: best_split_output.feature_index,
			threshold: best_split_output.threshold,
		},
		improvement: objective_value - split_score.weighted_score(),
		split_score,
	})
}

fn choose_best_split_for_feature(
	feature_index: usize,
	feature_values: ArrayView1<f32>,
	indices: &[usize],
	objective: &Objective,
	total: &ObjectiveAccumulator,
	compute_tree_options: &ComputeTreeOptions,
) -> Option<ChooseBestSplitForFeatureOutput> {
	let min_node_size = compute_tree_options.min_node_size;
	let n_examples = indices.len();
	// Sort the observations by feature value. NaN values sort last and are always sent right.
	let mut sorted_indices = indices.to_vec();
	sorted_indices.sort_by(|a, b| compare_feature_values(feature_values[*a], feature_values[*b]));
	let sorted_values: Vec<f32> = sorted_indices
		.iter()
		.map(|index| feature_values[*index])
		.take_while(|value| !value.is_nan())
		.collect();
	let candidates = compute_split_candidates(
		&sorted_values,
		min_node_size,
		compute_tree_options.split_candidates,
	);

	let mut best_split_so_far: Option<ChooseBestSplitForFeatureOutput> = None;
	let mut left = objective.accumulator();
	let mut n_added = 0;
	for candidate in candidates {
		let left_n_examples = candidate.left_n_examples;
		let right_n_examples = n_examples - left_n_examples;
		if left_n_examples < min_node_size {
			continue;
		}
		// Candidates are in ascending order, so the right side only gets smaller.
		if right_n_examples < min_node_size {
			break;
		}
		while n_added < left_n_examples {
			objective.accumulate(&mut left, sorted_indices[n_added]);
			n_added += 1;
		}
		let right = total.difference(&left);
		let weighted_score =
			weighted_score(left.score(), left_n_examples, right.score(), right_n_examples);
		if !weighted_score.is_finite() {
			continue;
		}
		let is_better = match &best_split_so_far {
			Some(best_split_so_far) => weighted_score < best_split_so_far.weighted_score,
			None => true,
		};
		if is_better {
			best_split_so_far = Some(ChooseBestSplitForFeatureOutput {
				feature_index,
				threshold: candidate.threshold,
				weighted_score,
			});
		}
	}
	best_split_so_far
}

fn compare_feature_values(a: f32, b: f32) -> Ordering {
	a.is_nan().cmp(&b.is_nan()).then_with(|| a.total_cmp(&b))
}

fn compare_split_outputs(
	a: &ChooseBestSplitForFeatureOutput,
	b: &ChooseBestSplitForFeatureOutput,
) -> Ordering {
	a.weighted_score
		.total_cmp(&b.weighted_score)
		.then_with(|| a.feature_index.cmp(&b.feature_index))
		.then_with(|| a.threshold.total_cmp(&b.threshold))
}

#[cfg(test)]
fn options_with_min_node_size(min_node_size: usize) -> ComputeTreeOptions {
	ComputeTreeOptions {
		objective: crate::ObjectiveKind::SumOfSquares,
		min_node_size,
		..Default::default()
	}
}

#[test]
fn test_choose_best_split_midpoint() {
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3];
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(1),
	});
	insta::assert_debug_snapshot!(output, @r###"
	Success(
	    ChooseBestSplitSuccess {
	        split: Split {
	            feature_index: 0,
	            threshold: 0.5,
	        },
	        improvement: 100.0,
	        split_score: SplitScore {
	            left_score: 0.0,
	            right_score: 0.0,
	            left_n_examples: 2,
	            right_n_examples: 2,
	        },
	    },
	)
	"###);
}

#[test]
fn test_choose_best_split_picks_informative_feature() {
	// Feature 0 is noise, feature 1 separates the targets.
	let features = arr2(&[
		[3.0, 0.0],
		[1.0, 0.1],
		[2.0, 0.2],
		[1.0, 5.0],
		[3.0, 5.1],
		[2.0, 5.2],
	]);
	let targets = arr1(&[1.0, 1.0, 1.0, 7.0, 7.0, 7.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3, 4, 5];
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(1),
	});
	let success = match output {
		ChooseBestSplitOutput::Success(success) => success,
		ChooseBestSplitOutput::Failure(failure) => panic!("{:?}", failure),
	};
	assert_eq!(success.split.feature_index, 1);
	assert!(success.split.threshold > 0.2 && success.split.threshold < 5.0);
	assert_eq!(success.split_score.weighted_score(), 0.0);
	assert_eq!(success.improvement, 54.0);
}

#[test]
fn test_choose_best_split_tie_break() {
	// Both features produce the same partition, so the first feature wins.
	let features = arr2(&[[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [1.0, 1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3];
	for _ in 0..10 {
		let output = choose_best_split(ChooseBestSplitOptions {
			features: features.view(),
			indices: &indices,
			objective: &objective,
			objective_value: objective.score(&indices),
			compute_tree_options: &options_with_min_node_size(1),
		});
		match output {
			ChooseBestSplitOutput::Success(success) => assert_eq!(success.split.feature_index, 0),
			ChooseBestSplitOutput::Failure(failure) => panic!("{:?}", failure),
		}
	}
}

#[test]
fn test_choose_best_split_failures() {
	let features = arr2(&[[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3, 4, 5];
	// 6 observations cannot be split into two children of at least 5.
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(5),
	});
	assert_eq!(
		output,
		ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::TooFewExamples)
	);
	// A node with a zero objective has nothing to improve.
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices[2..],
		objective: &objective,
		objective_value: objective.score(&indices[2..]),
		compute_tree_options: &options_with_min_node_size(1),
	});
	assert_eq!(
		output,
		ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::ObjectiveIsZero)
	);
	// A constant feature has no thresholds.
	let constant_features = arr2(&[[1.0], [1.0], [1.0], [1.0], [1.0], [1.0]]);
	let output = choose_best_split(ChooseBestSplitOptions {
		features: constant_features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(1),
	});
	assert_eq!(
		output,
		ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::NoAdmissibleSplit)
	);
}

#[test]
fn test_choose_best_split_excludes_small_children() {
	// The only improving split is 2 / 4, which violates min_node_size = 3.
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0], [1.0], [1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3, 4, 5];
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(3),
	});
	assert_eq!(
		output,
		ChooseBestSplitOutput::Failure(ChooseBestSplitFailure::NoAdmissibleSplit)
	);
}

#[test]
fn test_choose_best_split_nan_goes_right() {
	let features = arr2(&[[0.0], [0.0], [1.0], [f32::NAN]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let indices = [0, 1, 2, 3];
	let output = choose_best_split(ChooseBestSplitOptions {
		features: features.view(),
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &options_with_min_node_size(1),
	});
	match output {
		ChooseBestSplitOutput::Success(success) => {
			assert_eq!(success.split.threshold, 0.5);
			assert_eq!(success.split_score.right_n_examples, 2);
			assert_eq!(success.split_score.weighted_score(), 0.0);
		}
		ChooseBestSplitOutput::Failure(failure) => panic!("{:?}", failure),
	}
}

#[cfg(test)]
fn choose_best_split_for_targets(
	features: ArrayView2<f32>,
	targets: ArrayView1<f32>,
	min_node_size: usize,
) -> ChooseBestSplitOutput {
	let objective = Objective::SumOfSquares { targets };
	let indices: Vec<usize> = (0..features.nrows()).collect();
	choose_best_split(ChooseBestSplitOptions {
		features,
		indices: &indices,
		objective: &objective,
		objective_value: objective.score(&indices),
		compute_tree_options: &ComputeTreeOptions {
			objective: crate::ObjectiveKind::SumOfSquares,
			min_node_size,
			..Default::default()
		},
	})
}

#[test]
fn test_choose_best_split_with_local_objective() {
	let features = arr2(&[[0.0], [1.0], [2.0], [3.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	match choose_best_split_for_targets(features.view(), targets.view(), 2) {
		ChooseBestSplitOutput::Success(success) => {
			assert_eq!(success.split.threshold, 1.5);
			assert_eq!(success.improvement, 100.0);
		}
		ChooseBestSplitOutput::Failure(failure) => panic!("{:?}", failure),
	}
}
