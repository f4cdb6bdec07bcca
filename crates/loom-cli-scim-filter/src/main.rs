// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! scim-filter - inspect SCIM filter expressions
//!
//! Tokenizes and parses a filter, then prints the token sequence or the
//! resulting tree as JSON or canonical filter syntax.

mod config;
mod error;
mod render;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use loom_scim_filter::{parse_with_limits, tokenize, Filter, FilterError, ParseLimits, Token};

use config::{default_sources, load_limits, CliOverrides};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
	/// Compact JSON
	Json,
	/// Indented JSON
	#[default]
	Pretty,
	/// Filter syntax (or a token table with --tokens)
	Canonical,
}

/// Parse a SCIM filter expression and print the result
#[derive(Parser, Debug)]
#[command(name = "scim-filter", version, about, long_about = None)]
struct Args {
	/// Filter expression; read from stdin when omitted or "-"
	filter: Option<String>,

	/// Path to configuration file (default: ./scim-filter.toml if present)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Maximum filter length in characters
	#[arg(long)]
	max_input_length: Option<usize>,

	/// Maximum nesting of groups and value paths
	#[arg(long)]
	max_depth: Option<usize>,

	/// Maximum height of the filter tree
	#[arg(long)]
	max_height: Option<usize>,

	/// Print the token sequence instead of the filter tree
	#[arg(long)]
	tokens: bool,

	/// Output format
	#[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
	format: OutputFormat,

	/// Enable debug logging
	#[arg(short, long)]
	verbose: bool,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			max_input_length: args.max_input_length,
			max_depth: args.max_depth,
			max_height: args.max_height,
		}
	}
}

fn main() -> Result<ExitCode> {
	let args = Args::parse();
	init_tracing(args.verbose);

	let limits = load_limits(default_sources(args.config.clone(), CliOverrides::from(&args)))
		.context("failed to load configuration")?;

	let input = read_filter(args.filter.as_deref())?;
	debug!(length = input.chars().count(), "read filter");

	match run(&args, &input, &limits) {
		Ok(parsed) => {
			let output =
				render_output(&parsed, args.format).context("failed to serialize output")?;
			println!("{output}");
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprint!("{}", render::error_report(&input, &e));
			Ok(ExitCode::FAILURE)
		}
	}
}

fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(io::stderr)
		.init();
}

fn read_filter(arg: Option<&str>) -> Result<String> {
	match arg {
		Some(filter) if filter != "-" => Ok(filter.to_string()),
		_ => {
			let mut buf = String::new();
			io::stdin()
				.read_to_string(&mut buf)
				.context("failed to read filter from stdin")?;
			Ok(trim_line_ending(&buf).to_string())
		}
	}
}

fn trim_line_ending(s: &str) -> &str {
	s.strip_suffix("\r\n")
		.or_else(|| s.strip_suffix('\n'))
		.unwrap_or(s)
}

/// What a successful run prints.
#[derive(Debug, PartialEq)]
enum Parsed {
	Tokens(Vec<Token>),
	Filter(Filter),
}

/// Tokenize and, unless only tokens were asked for, parse the filter.
fn run(args: &Args, input: &str, limits: &ParseLimits) -> Result<Parsed, FilterError> {
	limits.check_length(input)?;

	let tokens = tokenize(input)?;
	if args.tokens {
		return Ok(Parsed::Tokens(tokens));
	}
	Ok(Parsed::Filter(parse_with_limits(&tokens, limits)?))
}

fn render_output(parsed: &Parsed, format: OutputFormat) -> serde_json::Result<String> {
	match (parsed, format) {
		(Parsed::Tokens(tokens), OutputFormat::Canonical) => {
			Ok(render::token_table(tokens).trim_end().to_string())
		}
		(Parsed::Filter(filter), OutputFormat::Canonical) => Ok(filter.to_string()),
		(Parsed::Tokens(tokens), format) => to_json(tokens, format),
		(Parsed::Filter(filter), format) => to_json(filter, format),
	}
}

fn to_json<T: serde::Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
	if format == OutputFormat::Pretty {
		serde_json::to_string_pretty(value)
	} else {
		serde_json::to_string(value)
	}
}
