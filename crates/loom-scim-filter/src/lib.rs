// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM 2.0 filter expressions (RFC 7644 section 3.4.2.2).
//!
//! Turning filter text into a tree happens in two stages:
//!
//! 1. [`tokenize`] converts the text into a [`Token`] sequence, applying JSON
//!    literal rules to strings, numbers, booleans and `null`.
//! 2. [`parse`] runs a recursive-descent parser over the tokens and builds a
//!    [`Filter`] tree.
//!
//! [`FilterParser::parse`] does both. Evaluating the resulting tree against
//! resources is left to the caller.
//!
//! ```
//! use loom_scim_filter::{Filter, FilterParser};
//!
//! let filter = FilterParser::parse(r#"emails[type eq "work"] and active eq true"#)?;
//! assert_eq!(filter.operator(), "and");
//! assert!(matches!(filter, Filter::Logical { .. }));
//! assert_eq!(filter.to_string(), r#"emails[type eq "work"] and active eq true"#);
//! # Ok::<(), loom_scim_filter::FilterError>(())
//! ```

pub mod ast;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod token;

pub use ast::{AttributePath, CompareOp, Filter, LogicalOp, Value};
pub use cursor::Cursor;
pub use error::{
	EscapeError, FilterError, NumberError, ParseError, ParseErrorKind, TokenizeError,
};
pub use lexer::tokenize;
pub use limits::{
	ParseLimits, ParseLimitsLayer, DEFAULT_MAX_DEPTH, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_INPUT_LENGTH,
};
pub use parser::{parse, parse_with_limits, parse_with_max_depth, FilterParser};
pub use token::{LogicalOperator, Operator, Token, TokenKind};
