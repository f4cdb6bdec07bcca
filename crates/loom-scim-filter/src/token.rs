// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Serialize, Serializer};

use crate::ast::CompareOp;

/// A lexical unit of a filter expression. Every token sequence produced by
/// [`crate::tokenize`] ends with exactly one [`Token::EndOfInput`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Token {
	Identifier(String),
	Dot,
	Operator(Operator),
	LogicalOperator(LogicalOperator),
	String(String),
	Number(f64),
	Boolean(bool),
	Null,
	OpenParen,
	CloseParen,
	OpenBracket,
	CloseBracket,
	EndOfInput,
}

impl Token {
	pub fn kind(&self) -> TokenKind {
		match self {
			Token::Identifier(_) => TokenKind::Identifier,
			Token::Dot => TokenKind::Dot,
			Token::Operator(_) => TokenKind::Operator,
			Token::LogicalOperator(_) => TokenKind::LogicalOperator,
			Token::String(_) => TokenKind::String,
			Token::Number(_) => TokenKind::Number,
			Token::Boolean(_) => TokenKind::Boolean,
			Token::Null => TokenKind::Null,
			Token::OpenParen => TokenKind::OpenParen,
			Token::CloseParen => TokenKind::CloseParen,
			Token::OpenBracket => TokenKind::OpenBracket,
			Token::CloseBracket => TokenKind::CloseBracket,
			Token::EndOfInput => TokenKind::EndOfInput,
		}
	}
}

/// Payload-free discriminant of a [`Token`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
	Identifier,
	Dot,
	Operator,
	LogicalOperator,
	String,
	Number,
	Boolean,
	Null,
	OpenParen,
	CloseParen,
	OpenBracket,
	CloseBracket,
	EndOfInput,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TokenKind::Identifier => "identifier",
			TokenKind::Dot => "'.'",
			TokenKind::Operator => "operator",
			TokenKind::LogicalOperator => "logical operator",
			TokenKind::String => "string",
			TokenKind::Number => "number",
			TokenKind::Boolean => "boolean",
			TokenKind::Null => "null",
			TokenKind::OpenParen => "'('",
			TokenKind::CloseParen => "')'",
			TokenKind::OpenBracket => "'['",
			TokenKind::CloseBracket => "']'",
			TokenKind::EndOfInput => "end of input",
		};
		f.write_str(name)
	}
}

/// Attribute operator keyword: one of the value comparisons or `pr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	Compare(CompareOp),
	Present,
}

impl Operator {
	pub fn from_keyword(word: &str) -> Option<Self> {
		if word == "pr" {
			return Some(Operator::Present);
		}
		CompareOp::from_keyword(word).map(Operator::Compare)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Operator::Compare(op) => op.as_str(),
			Operator::Present => "pr",
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for Operator {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
	And,
	Or,
	Not,
}

impl LogicalOperator {
	pub fn from_keyword(word: &str) -> Option<Self> {
		match word {
			"and" => Some(LogicalOperator::And),
			"or" => Some(LogicalOperator::Or),
			"not" => Some(LogicalOperator::Not),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			LogicalOperator::And => "and",
			LogicalOperator::Or => "or",
			LogicalOperator::Not => "not",
		}
	}
}

impl fmt::Display for LogicalOperator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
