// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Forward-only traversal over a borrowed slice of symbols.
//!
//! The lexer walks characters and the parser walks tokens with the same
//! cursor. A cursor never moves backwards and never moves past the end of
//! its slice; advancing at the end is a no-op.

/// A read-only cursor over `&'a [T]`.
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
	symbols: &'a [T],
	position: usize,
}

impl<'a, T> Cursor<'a, T> {
	pub fn new(symbols: &'a [T]) -> Self {
		Self {
			symbols,
			position: 0,
		}
	}

	/// The current symbol, or `None` at the end.
	pub fn peek(&self) -> Option<&'a T> {
		self.symbols.get(self.position)
	}

	/// Returns the current symbol and moves past it.
	pub fn advance(&mut self) -> Option<&'a T> {
		let current = self.peek()?;
		self.position += 1;
		Some(current)
	}

	/// True iff a current symbol exists and satisfies `predicate`.
	pub fn check<P>(&self, predicate: P) -> bool
	where
		P: Fn(&T) -> bool,
	{
		self.peek().is_some_and(|symbol| predicate(symbol))
	}

	/// Advances over the current symbol if it satisfies `predicate`.
	pub fn advance_if<P>(&mut self, predicate: P) -> bool
	where
		P: Fn(&T) -> bool,
	{
		if self.check(predicate) {
			self.position += 1;
			true
		} else {
			false
		}
	}

	/// Advances over the current symbol if it satisfies `predicate`, otherwise
	/// builds an error from the current position and the symbol found there.
	///
	/// The cursor does not move when the predicate fails.
	pub fn consume<P, E, F>(&mut self, predicate: P, on_error: F) -> Result<&'a T, E>
	where
		P: Fn(&T) -> bool,
		F: FnOnce(usize, Option<&'a T>) -> E,
	{
		match self.peek() {
			Some(symbol) if predicate(symbol) => {
				self.position += 1;
				Ok(symbol)
			}
			found => Err(on_error(self.position, found)),
		}
	}

	/// Symbols advanced over since `start`.
	pub fn span_from(&self, start: usize) -> &'a [T] {
		&self.symbols[start.min(self.position)..self.position]
	}

	/// Zero-based index of the current symbol.
	pub fn position(&self) -> usize {
		self.position
	}

	pub fn is_at_end(&self) -> bool {
		self.position >= self.symbols.len()
	}
}
