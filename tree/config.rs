/*!
This module defines the `Config` struct, which is read from a YAML file to configure [`compute_tree`](../fn.compute_tree.html). Every field is optional. Fields that are not set take the values of [`ComputeTreeOptions::default`](../struct.ComputeTreeOptions.html).
*/

use crate::{
	ComputeGridOptions, ComputeTreeOptions, ConfigurationError, ImprovementThreshold, ObjectiveKind,
	SplitCandidates,
};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	/// One of "sum_of_squares", "scalar", "ice_curves" or "ice".
	pub objective: Option<String>,
	pub max_depth: Option<usize>,
	pub min_node_size: Option<usize>,
	pub improvement_threshold: Option<ImprovementThresholdConfig>,
	pub split_candidates: Option<SplitCandidatesConfig>,
	pub grid: Option<GridConfig>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ImprovementThresholdConfig {
	#[serde(rename = "absolute")]
	Absolute { value: f64 },
	#[serde(rename = "relative")]
	Relative { value: f64 },
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
pub enum SplitCandidatesConfig {
	#[serde(rename = "exhaustive")]
	Exhaustive,
	#[serde(rename = "quantiles")]
	Quantiles { n_quantiles: usize },
}

#[derive(Debug, serde::Deserialize)]
pub struct GridConfig {
	pub n_grid_points: Option<usize>,
	pub percentiles: Option<(f32, f32)>,
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<Config> {
	let config = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read config file {}", path.display()))?;
	let config = serde_yaml::from_str(&config)
		.with_context(|| format!("failed to parse config file {}", path.display()))?;
	Ok(config)
}

impl Config {
	/// Merge the config with the default options. The result is validated.
	pub fn to_options(&self) -> Result<ComputeTreeOptions, ConfigurationError> {
		let defaults = ComputeTreeOptions::default();
		let objective = match &self.objective {
			Some(objective) => objective.parse::<ObjectiveKind>()?,
			None => defaults.objective,
		};
		let improvement_threshold = match self.improvement_threshold {
			Some(ImprovementThresholdConfig::Absolute { value }) => {
				ImprovementThreshold::Absolute(value)
			}
			Some(ImprovementThresholdConfig::Relative { value }) => {
				ImprovementThreshold::Relative(value)
			}
			None => defaults.improvement_threshold,
		};
		let split_candidates = match self.split_candidates {
			Some(SplitCandidatesConfig::Exhaustive) => SplitCandidates::Exhaustive,
			Some(SplitCandidatesConfig::Quantiles { n_quantiles }) => {
				SplitCandidates::Quantiles { n_quantiles }
			}
			None => defaults.split_candidates,
		};
		let options = ComputeTreeOptions {
			objective,
			max_depth: self.max_depth.unwrap_or(defaults.max_depth),
			min_node_size: self.min_node_size.unwrap_or(defaults.min_node_size),
			improvement_threshold,
			split_candidates,
		};
		options.validate()?;
		Ok(options)
	}

	pub fn to_grid_options(&self) -> ComputeGridOptions {
		let defaults = ComputeGridOptions::default();
		match &self.grid {
			Some(grid) => ComputeGridOptions {
				n_grid_points: grid.n_grid_points.unwrap_or(defaults.n_grid_points),
				percentiles: grid.percentiles.unwrap_or(defaults.percentiles),
			},
			None => defaults,
		}
	}
}

#[test]
fn test_config_to_options() {
	let config: Config = serde_yaml::from_str(
		r#"
objective: scalar
max_depth: 5
improvement_threshold:
  type: absolute
  value: 0.5
split_candidates:
  type: quantiles
  n_quantiles: 20
grid:
  n_grid_points: 50
"#,
	)
	.unwrap();
	assert_eq!(
		config.to_options(),
		Ok(ComputeTreeOptions {
			objective: ObjectiveKind::SumOfSquares,
			max_depth: 5,
			min_node_size: 10,
			improvement_threshold: ImprovementThreshold::Absolute(0.5),
			split_candidates: SplitCandidates::Quantiles { n_quantiles: 20 },
		})
	);
	assert_eq!(
		config.to_grid_options(),
		ComputeGridOptions {
			n_grid_points: 50,
			percentiles: (0.05, 0.95),
		}
	);
}

#[test]
fn test_empty_config() {
	let config = Config::default();
	assert_eq!(config.to_options(), Ok(ComputeTreeOptions::default()));
	assert_eq!(config.to_grid_options(), ComputeGridOptions::default());
}

#[test]
fn test_invalid_config() {
	let config: Config = serde_yaml::from_str("objective: gini").unwrap();
	assert_eq!(
		config.to_options(),
		Err(ConfigurationError::UnknownObjective("gini".to_owned()))
	);
	let config: Config = serde_yaml::from_str("max_depth: 0").unwrap();
	assert_eq!(config.to_options(), Err(ConfigurationError::MaxDepth(0)));
}
