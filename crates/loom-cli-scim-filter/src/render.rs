// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Terminal rendering of tokens and errors.

use std::fmt::Write;

use loom_scim_filter::{FilterError, Token, Value};

/// Source text for a single token, as it would be written in a filter.
pub fn token_text(token: &Token) -> String {
	match token {
		Token::Identifier(name) => name.clone(),
		Token::Dot => ".".to_string(),
		Token::Operator(op) => op.to_string(),
		Token::LogicalOperator(op) => op.to_string(),
		Token::String(s) => Value::String(s.clone()).to_string(),
		Token::Number(n) => Value::Number(*n).to_string(),
		Token::Boolean(b) => b.to_string(),
		Token::Null => "null".to_string(),
		Token::OpenParen => "(".to_string(),
		Token::CloseParen => ")".to_string(),
		Token::OpenBracket => "[".to_string(),
		Token::CloseBracket => "]".to_string(),
		Token::EndOfInput => String::new(),
	}
}

/// One line per token: index, kind and source text.
pub fn token_table(tokens: &[Token]) -> String {
	let mut out = String::new();
	for (index, token) in tokens.iter().enumerate() {
		let kind = token.kind().to_string();
		let _ = writeln!(out, "{index:>4}  {kind:<18}{}", token_text(token));
	}
	out
}

/// Error report for a failed filter.
///
/// Tokenize errors carry a character offset, so the input is echoed with a
/// caret under the failing character. Parse errors point at a token index
/// and are reported by message alone.
pub fn error_report(input: &str, error: &FilterError) -> String {
	let mut out = format!("error: {error}\n");
	if let FilterError::Tokenize(e) = error {
		let line: String = input
			.chars()
			.map(|c| if c.is_ascii_whitespace() { ' ' } else { c })
			.collect();
		let caret = " ".repeat(e.position());
		out.push_str(&format!("  {line}\n  {caret}^\n"));
	}
	out
}
