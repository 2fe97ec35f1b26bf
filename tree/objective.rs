use crate::{ConfigurationError, ObjectiveKind};
use itertools::izip;
use ndarray::prelude::*;

/**
An `Objective` scores the heterogeneity of a subset of observations. Lower is more homogeneous. The objective is chosen once before a build starts and is shared read only by every node.

1. **SumOfSquares**: the sum of squared deviations of a scalar target from its mean within the subset.
2. **IceCurves**: each observation's discretized ICE curve is treated as a vector target. The score is the sum over grid points of the population variance, across the subset's curves, of the value at that grid point.
*/
#[derive(Clone, Copy, Debug)]
pub enum Objective<'a> {
	SumOfSquares { targets: ArrayView1<'a, f32> },
	IceCurves { curves: ArrayView2<'a, f32> },
}

/// The scores of the two sides of a candidate split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitScore {
	pub left_score: f64,
	pub right_score: f64,
	pub left_n_examples: usize,
	pub right_n_examples: usize,
}

impl SplitScore {
	/// The post split objective, with each side weighted by its share of the node's observations.
	pub fn weighted_score(&self) -> f64 {
		weighted_score(
			self.left_score,
			self.left_n_examples,
			self.right_score,
			self.right_n_examples,
		)
	}
}

pub(crate) fn weighted_score(
	left_score: f64,
	left_n_examples: usize,
	right_score: f64,
	right_n_examples: usize,
) -> f64 {
	let left_n_examples = left_n_examples as f64;
	let right_n_examples = right_n_examples as f64;
	let n_examples = left_n_examples + right_n_examples;
	(left_n_examples / n_examples) * left_score + (right_n_examples / n_examples) * right_score
}

impl<'a> Objective<'a> {
	/// Select the objective for `kind`, checking that its data has one row per observation.
	pub fn new(
		kind: ObjectiveKind,
		n_observations: usize,
		targets: Option<ArrayView1<'a, f32>>,
		curves: Option<ArrayView2<'a, f32>>,
	) -> Result<Objective<'a>, ConfigurationError> {
		match kind {
			ObjectiveKind::SumOfSquares => {
				let targets = targets.ok_or(ConfigurationError::MissingTargets)?;
				if targets.len() != n_observations {
					return Err(ConfigurationError::LengthMismatch {
						what: "targets",
						expected: n_observations,
						actual: targets.len(),
					});
				}
				Ok(Objective::SumOfSquares { targets })
			}
			ObjectiveKind::IceCurves => {
				let curves = curves.ok_or(ConfigurationError::MissingCurves)?;
				if curves.nrows() != n_observations {
					return Err(ConfigurationError::LengthMismatch {
						what: "curves",
						expected: n_observations,
						actual: curves.nrows(),
					});
				}
				Ok(Objective::IceCurves { curves })
			}
		}
	}

	pub fn kind(&self) -> ObjectiveKind {
		match self {
			Objective::SumOfSquares { .. } => ObjectiveKind::SumOfSquares,
			Objective::IceCurves { .. } => ObjectiveKind::IceCurves,
		}
	}

	/// This is the number of values stored per observation: 1 for a scalar target, the number of grid points for curves.
	fn n_dims(&self) -> usize {
		match self {
			Objective::SumOfSquares { .. } => 1,
			Objective::IceCurves { curves } => curves.ncols(),
		}
	}

	/// Compute the objective value of the observations in `indices`. The empty set scores 0.
	pub fn score(&self, indices: &[usize]) -> f64 {
		if indices.is_empty() {
			return 0.0;
		}
		let n_examples = indices.len() as f64;
		match self {
			Objective::SumOfSquares { targets } => {
				let mean = indices
					.iter()
					.map(|index| f64::from(targets[*index]))
					.sum::<f64>() / n_examples;
				indices
					.iter()
					.map(|index| {
						let deviation = f64::from(targets[*index]) - mean;
						deviation * deviation
					})
					.sum::<f64>()
			}
			Objective::IceCurves { curves } => {
				let mut means = vec![0.0f64; curves.ncols()];
				for index in indices {
					for (mean, value) in means.iter_mut().zip(curves.row(*index)) {
						*mean += f64::from(*value);
					}
				}
				for mean in means.iter_mut() {
					*mean /= n_examples;
				}
				let mut sums_of_squares = vec![0.0f64; curves.ncols()];
				for index in indices {
					for (sum_of_squares, mean, value) in
						izip!(sums_of_squares.iter_mut(), means.iter(), curves.row(*index))
					{
						let deviation = f64::from(*value) - mean;
						*sum_of_squares += deviation * deviation;
					}
				}
				sums_of_squares
					.iter()
					.map(|sum_of_squares| sum_of_squares / n_examples)
					.sum::<f64>()
			}
		}
	}

	/// Score the split of `indices` that sends observations with `features[[i, feature_index]] <= threshold` left and every other observation, including those with a NaN feature value, right. Returns `None` if either side would be empty.
	pub fn split_score(
		&self,
		indices: &[usize],
		features: ArrayView2<f32>,
		feature_index: usize,
		threshold: f32,
	) -> Option<SplitScore> {
		let (left, right) = partition_indices(indices, features.column(feature_index), threshold);
		if left.is_empty() || right.is_empty() {
			return None;
		}
		Some(SplitScore {
			left_score: self.score(&left),
			right_score: self.score(&right),
			left_n_examples: left.len(),
			right_n_examples: right.len(),
		})
	}

	/// Create an empty accumulator for this objective.
	pub fn accumulator(&self) -> ObjectiveAccumulator {
		ObjectiveAccumulator {
			kind: self.kind(),
			n_examples: 0,
			sums: vec![0.0; self.n_dims()],
			sums_of_squares: vec![0.0; self.n_dims()],
		}
	}

	/// Add the observation at `index` to `accumulator`.
	pub fn accumulate(&self, accumulator: &mut ObjectiveAccumulator, index: usize) {
		accumulator.n_examples += 1;
		match self {
			Objective::SumOfSquares { targets } => {
				let value = f64::from(targets[index]);
				accumulator.sums[0] += value;
				accumulator.sums_of_squares[0] += value * value;
			}
			Objective::IceCurves { curves } => {
				for (sum, sum_of_squares, value) in izip!(
					accumulator.sums.iter_mut(),
					accumulator.sums_of_squares.iter_mut(),
					curves.row(index)
				) {
					let value = f64::from(*value);
					*sum += value;
					*sum_of_squares += value * value;
				}
			}
		}
	}
}

/// Split `indices` into those with a feature value `<= threshold` and the rest, preserving their order.
pub(crate) fn partition_indices(
	indices: &[usize],
	feature_values: ArrayView1<f32>,
	threshold: f32,
) -> (Vec<usize>, Vec<usize>) {
	indices
		.iter()
		.partition(|index| feature_values[**index] <= threshold)
}

/**
An `ObjectiveAccumulator` holds running sums and sums of squares for a set of observations so the split finder can score every threshold of a feature in a single sweep over the sorted observations. The score it computes is algebraically equal to [`Objective::score`](enum.Objective.html#method.score), which is used to recompute the winning split exactly.
*/
#[derive(Clone, Debug)]
pub struct ObjectiveAccumulator {
	kind: ObjectiveKind,
	n_examples: usize,
	sums: Vec<f64>,
	sums_of_squares: Vec<f64>,
}

impl ObjectiveAccumulator {
	pub fn n_examples(&self) -> usize {
		self.n_examples
	}

	/// Return the accumulator for the observations in `self` but not in `other`.
	pub fn difference(&self, other: &ObjectiveAccumulator) -> ObjectiveAccumulator {
		ObjectiveAccumulator {
			kind: self.kind,
			n_examples: self.n_examples - other.n_examples,
			sums: self
				.sums
				.iter()
				.zip(other.sums.iter())
				.map(|(a, b)| a - b)
				.collect(),
			sums_of_squares: self
				.sums_of_squares
				.iter()
				.zip(other.sums_of_squares.iter())
				.map(|(a, b)| a - b)
				.collect(),
		}
	}

	pub fn score(&self) -> f64 {
		if self.n_examples == 0 {
			return 0.0;
		}
		let n_examples = self.n_examples as f64;
		let sum_of_squared_deviations = self
			.sums
			.iter()
			.zip(self.sums_of_squares.iter())
			// Cancellation can leave a tiny negative value for a constant column.
			.map(|(sum, sum_of_squares)| (sum_of_squares - sum * sum / n_examples).max(0.0));
		match self.kind {
			ObjectiveKind::SumOfSquares => sum_of_squared_deviations.sum(),
			ObjectiveKind::IceCurves => sum_of_squared_deviations
				.map(|value| value / n_examples)
				.sum(),
		}
	}
}

#[test]
fn test_sum_of_squares_score() {
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	assert_eq!(objective.score(&[0, 1, 2, 3]), 100.0);
	assert_eq!(objective.score(&[0, 1]), 0.0);
	assert_eq!(objective.score(&[2, 3]), 0.0);
	assert_eq!(objective.score(&[]), 0.0);
}

#[test]
fn test_ice_curves_score() {
	let curves = arr2(&[[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [9.0, 8.0, 7.0]]);
	let objective = Objective::IceCurves {
		curves: curves.view(),
	};
	assert!((objective.score(&[0, 1, 2]) - 232.0 / 9.0).abs() < 1e-9);
	assert_eq!(objective.score(&[0, 1]), 0.0);
	assert_eq!(objective.score(&[2]), 0.0);
	// Parallel curves that are not centered still differ pointwise.
	let curves = arr2(&[[1.0, 2.0, 3.0], [2.0, 3.0, 4.0]]);
	let objective = Objective::IceCurves {
		curves: curves.view(),
	};
	assert!((objective.score(&[0, 1]) - 0.75).abs() < 1e-12);
}

#[test]
fn test_split_score() {
	let features = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
	let targets = arr1(&[0.0, 0.0, 10.0, 10.0]);
	let objective = Objective::SumOfSquares {
		targets: targets.view(),
	};
	let split_score = objective
		.split_score(&[0, 1, 2, 3], features.view(), 0, 0.5)
		.unwrap();
	assert_eq!(
		split_score,
		SplitScore {
			left_score: 0.0,
			right_score: 0.0,
			left_n_examples: 2,
			right_n_examples: 2,
		}
	);
	assert_eq!(split_score.weighted_score(), 0.0);
	assert!(objective
		.split_score(&[0, 1, 2, 3], features.view(), 0, 1.0)
		.is_none());
}

#[test]
fn test_accumulator_matches_score() {
	let curves = arr2(&[
		[0.5, -1.0, 2.0],
		[1.5, 0.0, 2.5],
		[-3.0, 4.0, 1.0],
		[2.0, 2.0, 2.0],
	]);
	let objective = Objective::IceCurves {
		curves: curves.view(),
	};
	let mut total = objective.accumulator();
	for index in 0..4 {
		objective.accumulate(&mut total, index);
	}
	assert!((total.score() - objective.score(&[0, 1, 2, 3])).abs() < 1e-9);
	let mut left = objective.accumulator();
	objective.accumulate(&mut left, 0);
	objective.accumulate(&mut left, 1);
	let right = total.difference(&left);
	assert_eq!(right.n_examples(), 2);
	assert!((right.score() - objective.score(&[2, 3])).abs() < 1e-9);
}

#[test]
fn test_new_checks_lengths() {
	let targets = arr1(&[1.0, 2.0]);
	let result = Objective::new(ObjectiveKind::SumOfSquares, 3, Some(targets.view()), None);
	assert_eq!(
		result.err(),
		Some(ConfigurationError::LengthMismatch {
			what: "targets",
			expected: 3,
			actual: 2,
		})
	);
	let result = Objective::new(ObjectiveKind::IceCurves, 2, Some(targets.view()), None);
	assert_eq!(result.err(), Some(ConfigurationError::MissingCurves));
}
