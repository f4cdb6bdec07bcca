// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parse limit sources: defaults, TOML file, environment variables and CLI flags.

use std::path::PathBuf;

use loom_scim_filter::{ParseLimits, ParseLimitsLayer};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::ConfigError;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "scim-filter.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ParseLimitsLayer, ConfigError>;
}

/// On-disk layout of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
	#[serde(default)]
	pub limits: Option<ParseLimitsLayer>,
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ParseLimitsLayer, ConfigError> {
		debug!("loading defaults");
		// Empty layer; defaults are applied during finalization
		Ok(ParseLimitsLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that is skipped when it does not exist.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file the user asked for by name; its absence is an error.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	pub fn working_dir() -> Self {
		Self::new(DEFAULT_CONFIG_FILE)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ParseLimitsLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::FileNotFound {
					path: self.path.clone(),
				});
			}
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ParseLimitsLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let file: FileConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed limits layer from TOML");
		Ok(file.limits.unwrap_or_default())
	}
}

/// Environment variable source.
///
/// Convention: LOOM_SCIM_FILTER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ParseLimitsLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ParseLimitsLayer {
			max_input_length: env_usize("LOOM_SCIM_FILTER_MAX_INPUT_LENGTH")?,
			max_depth: env_usize("LOOM_SCIM_FILTER_MAX_DEPTH")?,
			max_height: env_usize("LOOM_SCIM_FILTER_MAX_HEIGHT")?,
		})
	}
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub max_input_length: Option<usize>,
	pub max_depth: Option<usize>,
	pub max_height: Option<usize>,
}

/// CLI flag source.
pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ParseLimitsLayer, ConfigError> {
		debug!("loading CLI overrides");
		Ok(ParseLimitsLayer {
			max_input_length: self.overrides.max_input_length,
			max_depth: self.overrides.max_depth,
			max_height: self.overrides.max_height,
		})
	}
}

/// The standard source set: defaults, config file, environment, CLI flags.
pub fn default_sources(
	config_path: Option<PathBuf>,
	overrides: CliOverrides,
) -> Vec<Box<dyn ConfigSource>> {
	let file = match config_path {
		Some(path) => TomlSource::required(path),
		None => TomlSource::working_dir(),
	};
	vec![
		Box::new(DefaultsSource),
		Box::new(file),
		Box::new(EnvSource),
		Box::new(CliSource::new(overrides)),
	]
}

/// Merge sources lowest precedence first, finalize and validate.
pub fn load_limits(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ParseLimits, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ParseLimitsLayer::default();
	for source in &sources {
		let layer = source.load()?;
		debug!(source = source.name(), precedence = ?source.precedence(), "merging limits layer");
		merged.merge(layer);
	}

	let limits = merged.finalize();
	validate(&limits)?;

	debug!(
		max_input_length = limits.max_input_length,
		max_depth = limits.max_depth,
		max_height = limits.max_height,
		"parse limits resolved"
	);
	Ok(limits)
}

fn validate(limits: &ParseLimits) -> Result<(), ConfigError> {
	if limits.max_input_length == 0 {
		return Err(ConfigError::invalid_value(
			"max_input_length",
			"must be greater than zero",
		));
	}
	if limits.max_depth == 0 {
		return Err(ConfigError::invalid_value(
			"max_depth",
			"must be greater than zero",
		));
	}
	if limits.max_height == 0 {
		return Err(ConfigError::invalid_value(
			"max_height",
			"must be greater than zero",
		));
	}
	Ok(())
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	env_var(name).map(|v| parse_usize(name, &v)).transpose()
}

fn parse_usize(name: &str, value: &str) -> Result<usize, ConfigError> {
	value
		.trim()
		.parse()
		.map_err(|_| ConfigError::invalid_value(name, format!("invalid usize value '{value}'")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(Precedence, ParseLimitsLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<ParseLimitsLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	fn write_config(content: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, ParseLimitsLayer::default());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/scim-filter.toml");
		assert_eq!(source.load().unwrap(), ParseLimitsLayer::default());
	}

	#[test]
	fn test_required_toml_source_missing_file_errors() {
		let source = TomlSource::required("/nonexistent/scim-filter.toml");
		assert!(matches!(
			source.load(),
			Err(ConfigError::FileNotFound { .. })
		));
	}

	#[test]
	fn test_toml_source_reads_limits_table() {
		let file =
			write_config("[limits]\nmax_input_length = 256\nmax_depth = 5\nmax_height = 40\n");
		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.max_input_length, Some(256));
		assert_eq!(layer.max_depth, Some(5));
		assert_eq!(layer.max_height, Some(40));
	}

	#[test]
	fn test_toml_source_without_limits_table() {
		let file = write_config("# nothing here\n");
		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer, ParseLimitsLayer::default());
	}

	#[test]
	fn test_toml_source_invalid_toml() {
		let file = write_config("[limits\nmax_depth = ");
		assert!(matches!(
			TomlSource::new(file.path()).load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn test_toml_source_wrong_type() {
		let file = write_config("[limits]\nmax_depth = \"deep\"\n");
		assert!(matches!(
			TomlSource::new(file.path()).load(),
			Err(ConfigError::TomlParse { .. })
		));
	}

	#[test]
	fn test_cli_source_passes_overrides() {
		let layer = CliSource::new(CliOverrides {
			max_input_length: None,
			max_depth: Some(3),
			max_height: Some(30),
		})
		.load()
		.unwrap();
		assert_eq!(layer.max_input_length, None);
		assert_eq!(layer.max_depth, Some(3));
		assert_eq!(layer.max_height, Some(30));
	}

	#[test]
	fn test_load_limits_higher_precedence_wins() {
		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(FixedSource(
				Precedence::Cli,
				ParseLimitsLayer {
					max_depth: Some(2),
					..Default::default()
				},
			)),
			Box::new(FixedSource(
				Precedence::ConfigFile,
				ParseLimitsLayer {
					max_input_length: Some(100),
					max_depth: Some(10),
					max_height: Some(20),
				},
			)),
			Box::new(DefaultsSource),
		];
		let limits = load_limits(sources).unwrap();
		assert_eq!(limits.max_input_length, 100);
		assert_eq!(limits.max_depth, 2);
		assert_eq!(limits.max_height, 20);
	}

	#[test]
	fn test_load_limits_defaults() {
		let limits = load_limits(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(limits, ParseLimits::default());
	}

	#[test]
	fn test_load_limits_rejects_zero() {
		let zero_depth = ParseLimitsLayer {
			max_depth: Some(0),
			..Default::default()
		};
		let zero_height = ParseLimitsLayer {
			max_height: Some(0),
			..Default::default()
		};
		for (layer, expected) in [(zero_depth, "max_depth"), (zero_height, "max_height")] {
			let sources: Vec<Box<dyn ConfigSource>> =
				vec![Box::new(FixedSource(Precedence::Cli, layer))];
			match load_limits(sources) {
				Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected),
				other => panic!("unexpected result {other:?}"),
			}
		}
	}

	#[test]
	fn test_parse_usize() {
		assert_eq!(parse_usize("KEY", "42").unwrap(), 42);
		assert_eq!(parse_usize("KEY", " 7 ").unwrap(), 7);
		assert!(matches!(
			parse_usize("KEY", "-1"),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
