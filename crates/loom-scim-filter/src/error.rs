// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for tokenizing and parsing filter expressions.
//!
//! Tokenizer positions are character offsets into the raw input. Parser
//! positions are indices into the token sequence.

use thiserror::Error;

use crate::token::TokenKind;

/// Why a number literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberError {
	#[error("expected digit")]
	ExpectedDigit,
	#[error("leading zeros are not allowed")]
	LeadingZero,
	#[error("value is out of range")]
	OutOfRange,
}

/// Why a backslash escape inside a string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscapeError {
	#[error("unknown escape character {0:?}")]
	UnknownEscape(char),
	#[error("expected hexadecimal digit")]
	ExpectedHexDigit,
	#[error("unpaired surrogate")]
	UnpairedSurrogate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
	#[error("invalid character {character:?} at position {position}")]
	InvalidCharacter { character: char, position: usize },

	/// A raw control character inside a string literal.
	#[error("invalid string character {character:?} at position {position}")]
	InvalidStringCharacter { character: char, position: usize },

	#[error("invalid escape sequence, {reason} at position {position}")]
	InvalidEscape { reason: EscapeError, position: usize },

	/// `position` is the opening quote.
	#[error("unterminated string literal starting at position {position}")]
	UnterminatedString { position: usize },

	#[error("invalid number format, {reason} at position {position}")]
	InvalidNumber { reason: NumberError, position: usize },
}

impl TokenizeError {
	pub fn position(&self) -> usize {
		match self {
			TokenizeError::InvalidCharacter { position, .. }
			| TokenizeError::InvalidStringCharacter { position, .. }
			| TokenizeError::InvalidEscape { position, .. }
			| TokenizeError::UnterminatedString { position }
			| TokenizeError::InvalidNumber { position, .. } => *position,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
	#[error("expected identifier")]
	ExpectedIdentifier,
	#[error("expected operator")]
	ExpectedOperator,
	#[error("expected value")]
	ExpectedValue,
	#[error("expected closing parenthesis")]
	ExpectedClosingParenthesis,
	#[error("expected closing bracket")]
	ExpectedClosingBracket,
	#[error("expected group after \"not\" operator")]
	ExpectedGroupAfterNot,
	#[error("expected end of input")]
	ExpectedEndOfInput,
	#[error("nesting exceeds maximum depth of {limit}")]
	NestingTooDeep { limit: usize },
	#[error("filter tree exceeds maximum height of {limit}")]
	TreeTooTall { limit: usize },
}

impl ParseErrorKind {
	/// Token kinds that would have satisfied the parser.
	pub fn expected(&self) -> &'static [TokenKind] {
		match self {
			ParseErrorKind::ExpectedIdentifier => &[TokenKind::Identifier],
			ParseErrorKind::ExpectedOperator => &[TokenKind::Operator],
			ParseErrorKind::ExpectedValue => &[
				TokenKind::String,
				TokenKind::Number,
				TokenKind::Boolean,
				TokenKind::Null,
			],
			ParseErrorKind::ExpectedClosingParenthesis => &[TokenKind::CloseParen],
			ParseErrorKind::ExpectedClosingBracket => &[TokenKind::CloseBracket],
			ParseErrorKind::ExpectedGroupAfterNot => &[TokenKind::OpenParen],
			ParseErrorKind::ExpectedEndOfInput => &[TokenKind::EndOfInput],
			ParseErrorKind::NestingTooDeep { .. } | ParseErrorKind::TreeTooTall { .. } => &[],
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at token {position}, found {}", describe_found(.found))]
pub struct ParseError {
	pub kind: ParseErrorKind,
	/// Index of the offending token.
	pub position: usize,
	/// `None` when the token sequence ended without an end-of-input marker.
	pub found: Option<TokenKind>,
}

impl ParseError {
	pub fn new(kind: ParseErrorKind, position: usize, found: Option<TokenKind>) -> Self {
		Self {
			kind,
			position,
			found,
		}
	}
}

fn describe_found(found: &Option<TokenKind>) -> String {
	match found {
		Some(kind) => kind.to_string(),
		None => "nothing".to_string(),
	}
}

/// Any failure turning filter text into a [`crate::Filter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
	#[error(transparent)]
	Tokenize(#[from] TokenizeError),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error("filter is {length} characters long, limit is {limit}")]
	InputTooLong { length: usize, limit: usize },
}
