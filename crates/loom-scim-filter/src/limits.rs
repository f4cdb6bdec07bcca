// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource limits applied before and during parsing.

use serde::Deserialize;
use tracing::debug;

use crate::error::FilterError;

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 8192;
pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_HEIGHT: usize = 512;

/// Limits (runtime, fully resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
	/// Maximum filter length in characters.
	pub max_input_length: usize,
	/// Maximum nesting of groups and value paths.
	pub max_depth: usize,
	/// Maximum height of the resulting tree. Every `and`/`or` fold, negation
	/// and value path adds a level; a leaf is one level high.
	///
	/// Dropping, comparing and rendering a [`crate::Filter`] recurse once per
	/// level, so raising this far trades safety for reach.
	pub max_height: usize,
}

impl Default for ParseLimits {
	fn default() -> Self {
		Self {
			max_input_length: DEFAULT_MAX_INPUT_LENGTH,
			max_depth: DEFAULT_MAX_DEPTH,
			max_height: DEFAULT_MAX_HEIGHT,
		}
	}
}

impl ParseLimits {
	/// Rejects `input` when it is longer than `max_input_length` characters.
	pub fn check_length(&self, input: &str) -> Result<(), FilterError> {
		let length = input.chars().count();
		if length > self.max_input_length {
			debug!(length, limit = self.max_input_length, "filter exceeds length limit");
			return Err(FilterError::InputTooLong {
				length,
				limit: self.max_input_length,
			});
		}
		Ok(())
	}
}

/// Limits layer (partial, for merging).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParseLimitsLayer {
	#[serde(default)]
	pub max_input_length: Option<usize>,
	#[serde(default)]
	pub max_depth: Option<usize>,
	#[serde(default)]
	pub max_height: Option<usize>,
}

impl ParseLimitsLayer {
	pub fn merge(&mut self, other: ParseLimitsLayer) {
		if other.max_input_length.is_some() {
			self.max_input_length = other.max_input_length;
		}
		if other.max_depth.is_some() {
			self.max_depth = other.max_depth;
		}
		if other.max_height.is_some() {
			self.max_height = other.max_height;
		}
	}

	pub fn finalize(self) -> ParseLimits {
		ParseLimits {
			max_input_length: self.max_input_length.unwrap_or(DEFAULT_MAX_INPUT_LENGTH),
			max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
			max_height: self.max_height.unwrap_or(DEFAULT_MAX_HEIGHT),
		}
	}
}
