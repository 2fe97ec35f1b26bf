/*!
This module converts a fitted model and a test dataset into the matrix of ICE curves consumed by the ICE curves objective. Row `i` of the matrix is observation `i`'s prediction at each grid value of the chosen feature, with every other feature held at the observation's own values.
*/

use crate::{split_candidates::percentile, IceError};
use ndarray::parallel::prelude::*;
use ndarray::prelude::*;

/// A `Model` is anything that can make predictions for a matrix of observations, one row per observation. Closures with the same signature implement it.
pub trait Model: Sync {
	fn predict(&self, features: ArrayView2<f32>, predictions: ArrayViewMut1<f32>);
}

impl<F> Model for F
where
	F: Fn(ArrayView2<f32>, ArrayViewMut1<f32>) + Sync,
{
	fn predict(&self, features: ArrayView2<f32>, predictions: ArrayViewMut1<f32>) {
		self(features, predictions)
	}
}

/// An `Effect` describes which feature of a model to sweep and where to evaluate it.
pub struct Effect<'a> {
	pub model: &'a dyn Model,
	/// This is the column of the test data to sweep.
	pub feature_index: usize,
	/// These are the values the feature is set to.
	pub grid: Vec<f32>,
	/// If true, each curve has its own mean subtracted, so curves that differ only by a vertical shift become identical.
	pub center: bool,
}

/// These options control how [`compute_grid`](fn.compute_grid.html) chooses grid values.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ComputeGridOptions {
	pub n_grid_points: usize,
	/// The grid spans the values between these two percentiles of the feature, each between 0 and 1.
	pub percentiles: (f32, f32),
}

impl Default for ComputeGridOptions {
	fn default() -> Self {
		Self {
			n_grid_points: 100,
			percentiles: (0.05, 0.95),
		}
	}
}

/// Compute the grid for a feature column. If the column has fewer unique finite values than `n_grid_points`, the grid is its sorted unique values. Otherwise it is `n_grid_points` evenly spaced values between the two percentiles.
pub fn compute_grid(
	column: ArrayView1<f32>,
	options: &ComputeGridOptions,
) -> Result<Vec<f32>, IceError> {
	if options.n_grid_points == 0 {
		return Err(IceError::EmptyGrid);
	}
	let mut values: Vec<f32> = column.iter().cloned().filter(|value| value.is_finite()).collect();
	if values.is_empty() {
		return Err(IceError::EmptyColumn);
	}
	values.sort_by(|a, b| a.total_cmp(b));
	let mut unique_values = values.clone();
	unique_values.dedup();
	if unique_values.len() < options.n_grid_points {
		return Ok(unique_values);
	}
	let (low, high) = options.percentiles;
	let low = f64::from(percentile(&values, f64::from(low).max(0.0).min(1.0)));
	let high = f64::from(percentile(&values, f64::from(high).max(0.0).min(1.0)));
	if options.n_grid_points == 1 {
		return Ok(vec![((low + high) / 2.0) as f32]);
	}
	let step = (high - low) / (options.n_grid_points - 1) as f64;
	Ok((0..options.n_grid_points)
		.map(|index| (low + step * index as f64) as f32)
		.collect())
}

/// Compute the ICE curves of the effect for every observation in `test_data`. The output has shape `(test_data.nrows(), effect.grid.len())`.
pub fn compute_data_for_ice_splitting(
	effect: &Effect,
	test_data: ArrayView2<f32>,
) -> Result<Array2<f32>, IceError> {
	if effect.grid.is_empty() {
		return Err(IceError::EmptyGrid);
	}
	if effect.grid.iter().any(|value| !value.is_finite()) {
		return Err(IceError::NonFiniteGrid);
	}
	if effect.feature_index >= test_data.ncols() {
		return Err(IceError::FeatureIndex {
			feature_index: effect.feature_index,
			n_features: test_data.ncols(),
		});
	}
	let mut curves = Array2::zeros((test_data.nrows(), effect.grid.len()));
	// Each grid value gets its own copy of the test data with the feature replaced.
	curves
		.axis_iter_mut(Axis(1))
		.into_par_iter()
		.zip(effect.grid.par_iter())
		.for_each(|(predictions, grid_value)| {
			let mut features = test_data.to_owned();
			features.column_mut(effect.feature_index).fill(*grid_value);
			effect.model.predict(features.view(), predictions);
		});
	if effect.center {
		let n_grid_points = effect.grid.len() as f64;
		for mut curve in curves.genrows_mut() {
			let mean = curve.iter().map(|value| f64::from(*value)).sum::<f64>() / n_grid_points;
			curve.mapv_inplace(|value| (f64::from(value) - mean) as f32);
		}
	}
	Ok(curves)
}

#[cfg(test)]
fn interaction_model(features: ArrayView2<f32>, mut predictions: ArrayViewMut1<f32>) {
	// The effect of feature 0 has slope +1 or -1 depending on the sign of feature 1, shifted by feature 2.
	for (prediction, row) in predictions.iter_mut().zip(features.genrows()) {
		let slope = if row[1] > 0.0 { 1.0 } else { -1.0 };
		*prediction = slope * row[0] + row[2];
	}
}

#[test]
fn test_compute_data_for_ice_splitting() {
	let test_data = arr2(&[[0.0, 1.0, 10.0], [0.0, -1.0, 0.0], [5.0, 1.0, -3.0]]);
	let effect = Effect {
		model: &interaction_model,
		feature_index: 0,
		grid: vec![0.0, 1.0, 2.0],
		center: false,
	};
	let curves = compute_data_for_ice_splitting(&effect, test_data.view()).unwrap();
	assert_eq!(
		curves,
		arr2(&[[10.0, 11.0, 12.0], [0.0, -1.0, -2.0], [-3.0, -2.0, -1.0]])
	);
	let effect = Effect {
		center: true,
		..effect
	};
	let curves = compute_data_for_ice_splitting(&effect, test_data.view()).unwrap();
	// Centering removes the vertical shift, so observations 0 and 2 have identical curves.
	assert_eq!(
		curves,
		arr2(&[[-1.0, 0.0, 1.0], [1.0, 0.0, -1.0], [-1.0, 0.0, 1.0]])
	);
}

#[test]
fn test_compute_data_for_ice_splitting_errors() {
	let test_data = arr2(&[[0.0, 1.0, 10.0]]);
	let effect = Effect {
		model: &interaction_model,
		feature_index: 3,
		grid: vec![0.0],
		center: true,
	};
	assert_eq!(
		compute_data_for_ice_splitting(&effect, test_data.view()),
		Err(IceError::FeatureIndex {
			feature_index: 3,
			n_features: 3,
		})
	);
	let effect = Effect {
		feature_index: 0,
		grid: vec![],
		..effect
	};
	assert_eq!(
		compute_data_for_ice_splitting(&effect, test_data.view()),
		Err(IceError::EmptyGrid)
	);
	let effect = Effect {
		grid: vec![f32::NAN],
		..effect
	};
	assert_eq!(
		compute_data_for_ice_splitting(&effect, test_data.view()),
		Err(IceError::NonFiniteGrid)
	);
}

#[test]
fn test_compute_grid() {
	let column = arr1(&[3.0, 1.0, 2.0, 1.0, f32::NAN]);
	let grid = compute_grid(column.view(), &ComputeGridOptions::default()).unwrap();
	assert_eq!(grid, vec![1.0, 2.0, 3.0]);
	let column = Array1::from_shape_fn(101, |i| i as f32);
	let grid = compute_grid(
		column.view(),
		&ComputeGridOptions {
			n_grid_points: 5,
			percentiles: (0.1, 0.9),
		},
	)
	.unwrap();
	assert_eq!(grid, vec![10.0, 30.0, 50.0, 70.0, 90.0]);
	assert_eq!(
		compute_grid(
			arr1(&[f32::NAN]).view(),
			&ComputeGridOptions::default()
		),
		Err(IceError::EmptyColumn)
	);
}
