// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The parsed filter tree handed to evaluators.

use std::fmt::{self, Write};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Comparison operators that take a value. `pr` is modelled separately as
/// [`Filter::Present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
	Eq,
	Ne,
	Co,
	Sw,
	Ew,
	Gt,
	Ge,
	Lt,
	Le,
}

impl CompareOp {
	pub const ALL: [CompareOp; 9] = [
		CompareOp::Eq,
		CompareOp::Ne,
		CompareOp::Co,
		CompareOp::Sw,
		CompareOp::Ew,
		CompareOp::Gt,
		CompareOp::Ge,
		CompareOp::Lt,
		CompareOp::Le,
	];

	pub fn from_keyword(word: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|op| op.as_str() == word)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			CompareOp::Eq => "eq",
			CompareOp::Ne => "ne",
			CompareOp::Co => "co",
			CompareOp::Sw => "sw",
			CompareOp::Ew => "ew",
			CompareOp::Gt => "gt",
			CompareOp::Ge => "ge",
			CompareOp::Lt => "lt",
			CompareOp::Le => "le",
		}
	}
}

impl fmt::Display for CompareOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
	And,
	Or,
}

impl LogicalOp {
	pub fn as_str(self) -> &'static str {
		match self {
			LogicalOp::And => "and",
			LogicalOp::Or => "or",
		}
	}

	/// Binding strength; `and` binds tighter than `or`.
	pub fn precedence(self) -> u8 {
		match self {
			LogicalOp::Or => 1,
			LogicalOp::And => 2,
		}
	}
}

impl fmt::Display for LogicalOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A non-empty, ordered list of attribute name segments, e.g.
/// `name.familyName` is `["name", "familyName"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributePath(Vec<String>);

impl AttributePath {
	pub fn new(first: impl Into<String>) -> Self {
		Self(vec![first.into()])
	}

	/// Builds a path from segments; `None` if there are none.
	pub fn from_segments<I, S>(segments: I) -> Option<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
		if segments.is_empty() {
			None
		} else {
			Some(Self(segments))
		}
	}

	pub(crate) fn push(&mut self, segment: impl Into<String>) {
		self.0.push(segment.into());
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}
}

impl fmt::Display for AttributePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0.join("."))
	}
}

/// A JSON literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	String(String),
	Number(f64),
	Boolean(bool),
	Null,
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::String(s) => write_quoted(f, s),
			Value::Number(n) => write!(f, "{n}"),
			Value::Boolean(b) => write!(f, "{b}"),
			Value::Null => f.write_str("null"),
		}
	}
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
	f.write_char('"')?;
	for c in s.chars() {
		match c {
			'"' => f.write_str("\\\"")?,
			'\\' => f.write_str("\\\\")?,
			'\n' => f.write_str("\\n")?,
			'\r' => f.write_str("\\r")?,
			'\t' => f.write_str("\\t")?,
			'\u{08}' => f.write_str("\\b")?,
			'\u{0C}' => f.write_str("\\f")?,
			c if c < '\u{20}' => write!(f, "\\u{:04x}", c as u32)?,
			c => f.write_char(c)?,
		}
	}
	f.write_char('"')
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	/// `attr pr`
	Present { attr_path: AttributePath },
	/// `attr op value`
	Compare {
		attr_path: AttributePath,
		op: CompareOp,
		value: Value,
	},
	/// `attr[filter]`, applied to each element of a multi-valued attribute.
	ValuePath {
		attr_path: AttributePath,
		filter: Box<Filter>,
	},
	Logical {
		op: LogicalOp,
		left: Box<Filter>,
		right: Box<Filter>,
	},
	Not(Box<Filter>),
}

impl Filter {
	pub fn present(attr_path: AttributePath) -> Self {
		Filter::Present { attr_path }
	}

	pub fn compare(attr_path: AttributePath, op: CompareOp, value: Value) -> Self {
		Filter::Compare {
			attr_path,
			op,
			value,
		}
	}

	pub fn value_path(attr_path: AttributePath, filter: Filter) -> Self {
		Filter::ValuePath {
			attr_path,
			filter: Box::new(filter),
		}
	}

	pub fn and(left: Filter, right: Filter) -> Self {
		Filter::Logical {
			op: LogicalOp::And,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn or(left: Filter, right: Filter) -> Self {
		Filter::Logical {
			op: LogicalOp::Or,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn negate(inner: Filter) -> Self {
		Filter::Not(Box::new(inner))
	}

	/// Operator name as it appears on the wire: `pr`, `eq`..`le`,
	/// `valuePath`, `and`, `or` or `not`.
	pub fn operator(&self) -> &'static str {
		match self {
			Filter::Present { .. } => "pr",
			Filter::Compare { op, .. } => op.as_str(),
			Filter::ValuePath { .. } => "valuePath",
			Filter::Logical { op, .. } => op.as_str(),
			Filter::Not(_) => "not",
		}
	}

	/// The attribute this node filters on, if it is an attribute node.
	pub fn attr_path(&self) -> Option<&AttributePath> {
		match self {
			Filter::Present { attr_path }
			| Filter::Compare { attr_path, .. }
			| Filter::ValuePath { attr_path, .. } => Some(attr_path),
			Filter::Logical { .. } | Filter::Not(_) => None,
		}
	}
}

impl Serialize for Filter {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(None)?;
		if let Some(attr_path) = self.attr_path() {
			map.serialize_entry("attribute", attr_path)?;
		}
		map.serialize_entry("operator", self.operator())?;
		match self {
			Filter::Present { .. } => {}
			Filter::Compare { value, .. } => map.serialize_entry("value", value)?,
			Filter::ValuePath { filter, .. } | Filter::Not(filter) => {
				map.serialize_entry("filters", std::slice::from_ref(filter.as_ref()))?
			}
			Filter::Logical { left, right, .. } => {
				map.serialize_entry("filters", &[left.as_ref(), right.as_ref()])?
			}
		}
		map.end()
	}
}

/// Renders canonical filter syntax that parses back to an equal tree.
impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Filter::Present { attr_path } => write!(f, "{attr_path} pr"),
			Filter::Compare {
				attr_path,
				op,
				value,
			} => write!(f, "{attr_path} {op} {value}"),
			Filter::ValuePath { attr_path, filter } => write!(f, "{attr_path}[{filter}]"),
			Filter::Logical { op, left, right } => {
				write_operand(f, left, *op, false)?;
				write!(f, " {op} ")?;
				write_operand(f, right, *op, true)
			}
			Filter::Not(inner) => write!(f, "not ({inner})"),
		}
	}
}

// Chains fold to the left, so a right operand at the same level needs
// parentheses as well as any operand that binds looser than its parent.
fn write_operand(
	f: &mut fmt::Formatter<'_>,
	operand: &Filter,
	parent: LogicalOp,
	is_right: bool,
) -> fmt::Result {
	let needs_group = match operand {
		Filter::Logical { op, .. } => {
			op.precedence() < parent.precedence() || (is_right && *op == parent)
		}
		_ => false,
	};
	if needs_group {
		write!(f, "({operand})")
	} else {
		write!(f, "{operand}")
	}
}
