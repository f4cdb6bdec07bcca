// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recursive-descent parser from tokens to a [`Filter`] tree.
//!
//! ```text
//! filter        := orExpr
//! orExpr        := andExpr ( "or" andExpr )*
//! andExpr       := notExpr ( "and" notExpr )*
//! notExpr       := "not" group | attributeExpr
//! attributeExpr := group | attributePath ( valuePath | operatorExpr )
//! group         := "(" filter ")"
//! valuePath     := "[" filter "]"
//! operatorExpr  := "pr" | compareOp value
//! attributePath := identifier ( "." identifier )*
//! ```
//!
//! Chains of `and`/`or` fold to the left. The whole token sequence must be
//! consumed: anything after the top-level filter other than the end marker
//! is an error.

use tracing::{debug, trace};

use crate::ast::{AttributePath, Filter, LogicalOp, Value};
use crate::cursor::Cursor;
use crate::error::{FilterError, ParseError, ParseErrorKind};
use crate::lexer::tokenize;
use crate::limits::ParseLimits;
use crate::token::{LogicalOperator, Operator, Token, TokenKind};

/// Text-to-tree entry point combining [`tokenize`] and [`parse`].
pub struct FilterParser;

impl FilterParser {
	pub fn parse(input: &str) -> Result<Filter, FilterError> {
		Self::parse_with_limits(input, &ParseLimits::default())
	}

	pub fn parse_with_limits(input: &str, limits: &ParseLimits) -> Result<Filter, FilterError> {
		limits.check_length(input)?;
		let tokens = tokenize(input)?;
		Ok(parse_with_limits(&tokens, limits)?)
	}
}

/// Parses a token sequence produced by [`tokenize`] under the default
/// [`ParseLimits`].
pub fn parse(tokens: &[Token]) -> Result<Filter, ParseError> {
	parse_with_limits(tokens, &ParseLimits::default())
}

/// Like [`parse`], rejecting groups and value paths nested deeper than
/// `max_depth`.
pub fn parse_with_max_depth(tokens: &[Token], max_depth: usize) -> Result<Filter, ParseError> {
	parse_with_limits(
		tokens,
		&ParseLimits {
			max_depth,
			..ParseLimits::default()
		},
	)
}

/// Parses a token sequence, enforcing the nesting and tree height bounds of
/// `limits`. The input length bound applies to text and is not checked here.
pub fn parse_with_limits(tokens: &[Token], limits: &ParseLimits) -> Result<Filter, ParseError> {
	let mut parser = Parser {
		cursor: Cursor::new(tokens),
		depth: 0,
		limits: *limits,
	};
	let result = parser.parse_filter().and_then(|node| {
		parser.expect_end()?;
		Ok(node.filter)
	});
	match &result {
		Ok(filter) => trace!(operator = filter.operator(), "parsed filter"),
		Err(e) => debug!(position = e.position, error = %e, "failed to parse filter"),
	}
	result
}

/// A parsed subtree and its height.
struct Node {
	filter: Filter,
	height: usize,
}

impl Node {
	fn leaf(filter: Filter) -> Self {
		Self { filter, height: 1 }
	}
}

struct Parser<'a> {
	cursor: Cursor<'a, Token>,
	depth: usize,
	limits: ParseLimits,
}

impl<'a> Parser<'a> {
	fn parse_filter(&mut self) -> Result<Node, ParseError> {
		self.parse_or_expr()
	}

	fn parse_or_expr(&mut self) -> Result<Node, ParseError> {
		let mut result = self.parse_and_expr()?;
		while let Some(position) = self.advance_logical(LogicalOperator::Or) {
			let right = self.parse_and_expr()?;
			result = self.fold(LogicalOp::Or, result, right, position)?;
		}
		Ok(result)
	}

	fn parse_and_expr(&mut self) -> Result<Node, ParseError> {
		let mut result = self.parse_not_expr()?;
		while let Some(position) = self.advance_logical(LogicalOperator::And) {
			let right = self.parse_not_expr()?;
			result = self.fold(LogicalOp::And, result, right, position)?;
		}
		Ok(result)
	}

	fn parse_not_expr(&mut self) -> Result<Node, ParseError> {
		let Some(position) = self.advance_logical(LogicalOperator::Not) else {
			return self.parse_attribute_expr();
		};
		match self.parse_group()? {
			Some(inner) => Ok(Node {
				height: self.grow(inner.height, position, TokenKind::LogicalOperator)?,
				filter: Filter::Not(Box::new(inner.filter)),
			}),
			None => Err(self.error(ParseErrorKind::ExpectedGroupAfterNot)),
		}
	}

	fn parse_attribute_expr(&mut self) -> Result<Node, ParseError> {
		if let Some(group) = self.parse_group()? {
			return Ok(group);
		}

		let attr_path = self.parse_attr_path()?;
		let bracket = self.cursor.position();
		if let Some(inner) = self.parse_value_path()? {
			return Ok(Node {
				height: self.grow(inner.height, bracket, TokenKind::OpenBracket)?,
				filter: Filter::ValuePath {
					attr_path,
					filter: Box::new(inner.filter),
				},
			});
		}

		let op = self.expect_with(
			|t| match t {
				Token::Operator(op) => Some(*op),
				_ => None,
			},
			ParseErrorKind::ExpectedOperator,
		)?;
		let filter = match op {
			Operator::Present => Filter::Present { attr_path },
			Operator::Compare(op) => Filter::Compare {
				attr_path,
				op,
				value: self.expect_with(value_of, ParseErrorKind::ExpectedValue)?,
			},
		};
		Ok(Node::leaf(filter))
	}

	fn parse_group(&mut self) -> Result<Option<Node>, ParseError> {
		self.parse_delimited(
			|t| matches!(t, Token::OpenParen),
			|t| matches!(t, Token::CloseParen),
			ParseErrorKind::ExpectedClosingParenthesis,
		)
	}

	fn parse_value_path(&mut self) -> Result<Option<Node>, ParseError> {
		self.parse_delimited(
			|t| matches!(t, Token::OpenBracket),
			|t| matches!(t, Token::CloseBracket),
			ParseErrorKind::ExpectedClosingBracket,
		)
	}

	/// Parses `open filter close` if the current token opens it.
	fn parse_delimited(
		&mut self,
		open: fn(&Token) -> bool,
		close: fn(&Token) -> bool,
		unclosed: ParseErrorKind,
	) -> Result<Option<Node>, ParseError> {
		if !self.cursor.check(open) {
			return Ok(None);
		}
		if self.depth >= self.limits.max_depth {
			return Err(self.error(ParseErrorKind::NestingTooDeep {
				limit: self.limits.max_depth,
			}));
		}
		self.cursor.advance();
		self.depth += 1;
		let node = self.parse_filter()?;
		self.expect(close, unclosed)?;
		self.depth -= 1;
		Ok(Some(node))
	}

	fn parse_attr_path(&mut self) -> Result<AttributePath, ParseError> {
		let mut attr_path = AttributePath::new(self.expect_identifier()?);
		while self.cursor.advance_if(|t| matches!(t, Token::Dot)) {
			attr_path.push(self.expect_identifier()?);
		}
		Ok(attr_path)
	}

	/// Joins two operands under `op`, found at token `position`.
	fn fold(
		&self,
		op: LogicalOp,
		left: Node,
		right: Node,
		position: usize,
	) -> Result<Node, ParseError> {
		let height = self.grow(
			left.height.max(right.height),
			position,
			TokenKind::LogicalOperator,
		)?;
		Ok(Node {
			filter: Filter::Logical {
				op,
				left: Box::new(left.filter),
				right: Box::new(right.filter),
			},
			height,
		})
	}

	/// Height of a node over a child `child_height` high, or an error at the
	/// token that introduced the node when that exceeds the limit.
	fn grow(
		&self,
		child_height: usize,
		position: usize,
		found: TokenKind,
	) -> Result<usize, ParseError> {
		let height = child_height + 1;
		if height > self.limits.max_height {
			return Err(ParseError::new(
				ParseErrorKind::TreeTooTall {
					limit: self.limits.max_height,
				},
				position,
				Some(found),
			));
		}
		Ok(height)
	}

	/// Consumes the logical operator `op`, returning the index it sat at.
	fn advance_logical(&mut self, op: LogicalOperator) -> Option<usize> {
		let position = self.cursor.position();
		self.cursor
			.advance_if(|t| matches!(t, Token::LogicalOperator(found) if *found == op))
			.then_some(position)
	}

	fn expect_identifier(&mut self) -> Result<String, ParseError> {
		self.expect_with(
			|t| match t {
				Token::Identifier(name) => Some(name.clone()),
				_ => None,
			},
			ParseErrorKind::ExpectedIdentifier,
		)
	}

	fn expect_end(&mut self) -> Result<(), ParseError> {
		self.expect(
			|t| matches!(t, Token::EndOfInput),
			ParseErrorKind::ExpectedEndOfInput,
		)
	}

	fn expect(
		&mut self,
		predicate: fn(&Token) -> bool,
		kind: ParseErrorKind,
	) -> Result<(), ParseError> {
		self.cursor
			.consume(predicate, |position, found| {
				ParseError::new(kind, position, found.map(Token::kind))
			})
			.map(|_| ())
	}

	/// Consumes the current token if `extract` accepts it.
	fn expect_with<T>(
		&mut self,
		extract: impl Fn(&Token) -> Option<T>,
		kind: ParseErrorKind,
	) -> Result<T, ParseError> {
		match self.cursor.peek().and_then(extract) {
			Some(value) => {
				self.cursor.advance();
				Ok(value)
			}
			None => Err(self.error(kind)),
		}
	}

	fn error(&self, kind: ParseErrorKind) -> ParseError {
		ParseError::new(
			kind,
			self.cursor.position(),
			self.cursor.peek().map(Token::kind),
		)
	}
}

fn value_of(token: &Token) -> Option<Value> {
	match token {
		Token::String(s) => Some(Value::String(s.clone())),
		Token::Number(n) => Some(Value::Number(*n)),
		Token::Boolean(b) => Some(Value::Boolean(*b)),
		Token::Null => Some(Value::Null),
		_ => None,
	}
}
