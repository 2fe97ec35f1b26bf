use crate::SplitCandidates;
use num_traits::ToPrimitive;

/// A threshold to try for one feature, along with the number of the node's observations that it sends left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitCandidate {
	pub threshold: f32,
	pub left_n_examples: usize,
}

/// Compute the candidate thresholds for one feature. `sorted_values` are the finite values of the feature for the node's observations, sorted ascending. The candidates are returned in ascending order of threshold and no two candidates produce the same partition. Admissibility with respect to `min_node_size` is left to the caller, because it also depends on the observations whose value is not finite.
pub fn compute_split_candidates(
	sorted_values: &[f32],
	min_node_size: usize,
	strategy: SplitCandidates,
) -> Vec<SplitCandidate> {
	match strategy {
		SplitCandidates::Exhaustive => compute_split_candidates_exhaustive(sorted_values),
		SplitCandidates::Quantiles { n_quantiles } => {
			compute_split_candidates_quantiles(sorted_values, min_node_size, n_quantiles)
		}
	}
}

fn compute_split_candidates_exhaustive(sorted_values: &[f32]) -> Vec<SplitCandidate> {
	sorted_values
		.windows(2)
		.enumerate()
		.filter(|(_, window)| window[0] < window[1])
		.map(|(index, window)| SplitCandidate {
			threshold: midpoint(window[0], window[1]),
			left_n_examples: index + 1,
		})
		.collect()
}

/// Return a threshold strictly between `a` and `b`, or `a` itself if they are adjacent floats.
fn midpoint(a: f32, b: f32) -> f32 {
	let midpoint = a + (b - a) / 2.0;
	if midpoint < b {
		midpoint
	} else {
		a
	}
}

fn compute_split_candidates_quantiles(
	sorted_values: &[f32],
	min_node_size: usize,
	n_quantiles: usize,
) -> Vec<SplitCandidate> {
	let n_examples = sorted_values.len();
	// Values that leave at least min_node_size observations on either side, if the feature has no ties.
	let values: Vec<f32> = (min_node_size..n_examples.saturating_sub(min_node_size))
		.step_by(min_node_size.max(1))
		.map(|index| sorted_values[index])
		.collect();
	if values.is_empty() {
		return Vec::new();
	}
	let mut candidates: Vec<SplitCandidate> = Vec::new();
	for quantile_index in 0..=n_quantiles {
		let p = quantile_index as f64 / n_quantiles as f64;
		let threshold = percentile(&values, p);
		let left_n_examples = sorted_values.partition_point(|value| *value <= threshold);
		match candidates.last() {
			Some(last) if last.left_n_examples == left_n_examples => {}
			_ => candidates.push(SplitCandidate {
				threshold,
				left_n_examples,
			}),
		}
	}
	candidates
}

/// Compute the `p`th percentile, `0 <= p <= 1`, of sorted values with linear interpolation between the closest ranks.
pub(crate) fn percentile(sorted_values: &[f32], p: f64) -> f32 {
	let last_index = sorted_values.len() - 1;
	let position = p * last_index as f64;
	let lower_index = position.floor().to_usize().unwrap_or(0).min(last_index);
	let upper_index = position.ceil().to_usize().unwrap_or(0).min(last_index);
	let lower = f64::from(sorted_values[lower_index]);
	let upper = f64::from(sorted_values[upper_index]);
	(lower + (upper - lower) * (position - lower_index as f64)) as f32
}

#[test]
fn test_exhaustive() {
	let candidates = compute_split_candidates(&[0.0, 0.0, 1.0, 1.0], 1, SplitCandidates::Exhaustive);
	assert_eq!(
		candidates,
		vec![SplitCandidate {
			threshold: 0.5,
			left_n_examples: 2,
		}]
	);
	let candidates = compute_split_candidates(&[1.0, 2.0, 3.0], 1, SplitCandidates::Exhaustive);
	assert_eq!(
		candidates,
		vec![
			SplitCandidate {
				threshold: 1.5,
				left_n_examples: 1,
			},
			SplitCandidate {
				threshold: 2.5,
				left_n_examples: 2,
			},
		]
	);
	assert!(compute_split_candidates(&[4.0, 4.0, 4.0], 1, SplitCandidates::Exhaustive).is_empty());
	assert!(compute_split_candidates(&[], 1, SplitCandidates::Exhaustive).is_empty());
}

#[test]
fn test_midpoint_of_adjacent_floats() {
	let a = 1.0f32;
	let b = f32::from_bits(a.to_bits() + 1);
	let threshold = midpoint(a, b);
	assert!(a <= threshold && threshold < b);
}

#[test]
fn test_quantiles() {
	let sorted_values: Vec<f32> = (0..100).map(|value| value as f32).collect();
	let candidates = compute_split_candidates(
		&sorted_values,
		10,
		SplitCandidates::Quantiles { n_quantiles: 4 },
	);
	let thresholds: Vec<f32> = candidates.iter().map(|c| c.threshold).collect();
	let left_n_examples: Vec<usize> = candidates.iter().map(|c| c.left_n_examples).collect();
	assert_eq!(thresholds, vec![10.0, 27.5, 45.0, 62.5, 80.0]);
	assert_eq!(left_n_examples, vec![11, 28, 46, 63, 81]);
}

#[test]
fn test_quantiles_too_few_values() {
	let candidates = compute_split_candidates(
		&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
		5,
		SplitCandidates::Quantiles { n_quantiles: 10 },
	);
	assert!(candidates.is_empty());
}

#[test]
fn test_percentile() {
	assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.5), 3.0);
	assert_eq!(percentile(&[1.0, 2.0], 0.25), 1.25);
	assert_eq!(percentile(&[7.0], 0.9), 7.0);
	assert_eq!(percentile(&[0.0, 10.0], 0.0), 0.0);
	assert_eq!(percentile(&[0.0, 10.0], 1.0), 10.0);
}
