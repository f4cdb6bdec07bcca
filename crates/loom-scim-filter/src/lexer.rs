// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Character-level tokenizer for filter expressions.
//!
//! Value literals follow the JSON grammar (RFC 7159): strings with the JSON
//! escape set, numbers with optional fraction and exponent, `true`, `false`
//! and `null`. Any other word is an operator keyword or an attribute name.
//! Keywords are recognised by exact match only; whether `and` may appear
//! somewhere is for the parser to decide.

use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{EscapeError, NumberError, TokenizeError};
use crate::token::{LogicalOperator, Operator, Token};

/// Tokenizes `input`. The result always ends with [`Token::EndOfInput`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizeError> {
	let chars: Vec<char> = input.chars().collect();
	let result = Lexer::new(&chars).run();
	match &result {
		Ok(tokens) => trace!(tokens = tokens.len(), "tokenized filter"),
		Err(e) => debug!(position = e.position(), error = %e, "failed to tokenize filter"),
	}
	result
}

struct Lexer<'a> {
	cursor: Cursor<'a, char>,
	tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
	fn new(chars: &'a [char]) -> Self {
		Self {
			cursor: Cursor::new(chars),
			tokens: Vec::new(),
		}
	}

	fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
		while let Some(&c) = self.cursor.peek() {
			match c {
				c if c.is_ascii_whitespace() => {
					self.cursor.advance();
				}
				'(' => self.single(Token::OpenParen),
				')' => self.single(Token::CloseParen),
				'[' => self.single(Token::OpenBracket),
				']' => self.single(Token::CloseBracket),
				'.' => self.single(Token::Dot),
				'"' => {
					let value = self.scan_string()?;
					self.tokens.push(Token::String(value));
				}
				'-' | '0'..='9' => {
					let value = self.scan_number()?;
					self.tokens.push(Token::Number(value));
				}
				c if c.is_ascii_alphabetic() => {
					let word = self.scan_word();
					self.tokens.push(classify(word));
				}
				character => {
					return Err(TokenizeError::InvalidCharacter {
						character,
						position: self.cursor.position(),
					});
				}
			}
		}
		self.tokens.push(Token::EndOfInput);
		Ok(self.tokens)
	}

	fn single(&mut self, token: Token) {
		self.cursor.advance();
		self.tokens.push(token);
	}

	fn scan_string(&mut self) -> Result<String, TokenizeError> {
		let start = self.cursor.position();
		self.cursor.advance();
		let mut value = String::new();
		loop {
			let position = self.cursor.position();
			let Some(&c) = self.cursor.advance() else {
				return Err(TokenizeError::UnterminatedString { position: start });
			};
			match c {
				'"' => return Ok(value),
				'\\' => value.push(self.scan_escape(start, position)?),
				c if c < '\u{20}' => {
					return Err(TokenizeError::InvalidStringCharacter {
						character: c,
						position,
					});
				}
				c => value.push(c),
			}
		}
	}

	/// Decodes the escape whose backslash sits at `escape_position`; the
	/// backslash has already been consumed.
	fn scan_escape(&mut self, start: usize, escape_position: usize) -> Result<char, TokenizeError> {
		let position = self.cursor.position();
		let Some(&c) = self.cursor.advance() else {
			return Err(TokenizeError::UnterminatedString { position: start });
		};
		let decoded = match c {
			'"' => '"',
			'\\' => '\\',
			'/' => '/',
			'b' => '\u{08}',
			'f' => '\u{0C}',
			'n' => '\n',
			'r' => '\r',
			't' => '\t',
			'u' => return self.scan_unicode_escape(start, escape_position),
			other => {
				return Err(TokenizeError::InvalidEscape {
					reason: EscapeError::UnknownEscape(other),
					position,
				});
			}
		};
		Ok(decoded)
	}

	fn scan_unicode_escape(
		&mut self,
		start: usize,
		escape_position: usize,
	) -> Result<char, TokenizeError> {
		let unpaired = TokenizeError::InvalidEscape {
			reason: EscapeError::UnpairedSurrogate,
			position: escape_position,
		};
		let high = self.scan_hex4(start)?;
		let code = match high {
			0xD800..=0xDBFF => {
				if !self.cursor.advance_if(|&c| c == '\\') {
					return Err(self.unterminated_or(start, unpaired));
				}
				if !self.cursor.advance_if(|&c| c == 'u') {
					return Err(self.unterminated_or(start, unpaired));
				}
				let low = self.scan_hex4(start)?;
				if !(0xDC00..=0xDFFF).contains(&low) {
					return Err(unpaired);
				}
				0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
			}
			0xDC00..=0xDFFF => return Err(unpaired),
			code => code,
		};
		char::from_u32(code).ok_or(unpaired)
	}

	/// End of input inside an escape leaves the string unterminated;
	/// anything else is reported as `error`.
	fn unterminated_or(&self, start: usize, error: TokenizeError) -> TokenizeError {
		if self.cursor.is_at_end() {
			TokenizeError::UnterminatedString { position: start }
		} else {
			error
		}
	}

	fn scan_hex4(&mut self, start: usize) -> Result<u32, TokenizeError> {
		let mut code = 0;
		for _ in 0..4 {
			let position = self.cursor.position();
			let Some(c) = self.cursor.peek() else {
				return Err(TokenizeError::UnterminatedString { position: start });
			};
			let digit = c.to_digit(16).ok_or(TokenizeError::InvalidEscape {
				reason: EscapeError::ExpectedHexDigit,
				position,
			})?;
			self.cursor.advance();
			code = code * 16 + digit;
		}
		Ok(code)
	}

	fn scan_number(&mut self) -> Result<f64, TokenizeError> {
		let start = self.cursor.position();
		self.cursor.advance_if(|&c| c == '-');

		let leading = self.cursor.position();
		if *self.expect_digit()? == '0' {
			if self.cursor.check(char::is_ascii_digit) {
				return Err(TokenizeError::InvalidNumber {
					reason: NumberError::LeadingZero,
					position: leading,
				});
			}
		} else {
			self.skip_digits();
		}

		if self.cursor.advance_if(|&c| c == '.') {
			self.expect_digit()?;
			self.skip_digits();
		}

		if self.cursor.advance_if(|&c| c == 'e' || c == 'E') {
			self.cursor.advance_if(|&c| c == '+' || c == '-');
			self.expect_digit()?;
			self.skip_digits();
		}

		let text: String = self.cursor.span_from(start).iter().collect();
		let out_of_range = TokenizeError::InvalidNumber {
			reason: NumberError::OutOfRange,
			position: start,
		};
		match text.parse::<f64>() {
			Ok(value) if value.is_finite() => Ok(value),
			_ => Err(out_of_range),
		}
	}

	fn expect_digit(&mut self) -> Result<&'a char, TokenizeError> {
		self.cursor
			.consume(char::is_ascii_digit, |position, _| TokenizeError::InvalidNumber {
				reason: NumberError::ExpectedDigit,
				position,
			})
	}

	fn skip_digits(&mut self) {
		while self.cursor.advance_if(char::is_ascii_digit) {}
	}

	fn scan_word(&mut self) -> String {
		let start = self.cursor.position();
		while self
			.cursor
			.advance_if(|&c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
		{}
		self.cursor.span_from(start).iter().collect()
	}
}

fn classify(word: String) -> Token {
	if let Some(op) = Operator::from_keyword(&word) {
		return Token::Operator(op);
	}
	if let Some(op) = LogicalOperator::from_keyword(&word) {
		return Token::LogicalOperator(op);
	}
	match word.as_str() {
		"true" => return Token::Boolean(true),
		"false" => return Token::Boolean(false),
		"null" => return Token::Null,
		_ => {}
	}
	Token::Identifier(word)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::CompareOp;
	use proptest::prelude::*;

	fn ident(name: &str) -> Token {
		Token::Identifier(name.to_string())
	}

	fn string(value: &str) -> Token {
		Token::String(value.to_string())
	}

	fn op(op: CompareOp) -> Token {
		Token::Operator(Operator::Compare(op))
	}

	fn logical(op: LogicalOperator) -> Token {
		Token::LogicalOperator(op)
	}

	fn number_of(input: &str) -> f64 {
		match tokenize(input).unwrap().as_slice() {
			[Token::Number(n), Token::EndOfInput] => *n,
			other => panic!("expected a single number, got {other:?}"),
		}
	}

	fn string_of(input: &str) -> String {
		match tokenize(input).unwrap().as_slice() {
			[Token::String(s), Token::EndOfInput] => s.clone(),
			other => panic!("expected a single string, got {other:?}"),
		}
	}

	#[test]
	fn test_simple_comparison() {
		assert_eq!(
			tokenize(r#"userName eq "bjensen""#).unwrap(),
			vec![ident("userName"), op(CompareOp::Eq), string("bjensen"), Token::EndOfInput]
		);
	}

	#[test]
	fn test_dotted_attribute() {
		assert_eq!(
			tokenize(r#"name.familyName co "O'Malley""#).unwrap(),
			vec![
				ident("name"),
				Token::Dot,
				ident("familyName"),
				op(CompareOp::Co),
				string("O'Malley"),
				Token::EndOfInput
			]
		);
	}

	#[test]
	fn test_presence_and_logical() {
		assert_eq!(
			tokenize(r#"title pr and userType eq "Employee""#).unwrap(),
			vec![
				ident("title"),
				Token::Operator(Operator::Present),
				logical(LogicalOperator::And),
				ident("userType"),
				op(CompareOp::Eq),
				string("Employee"),
				Token::EndOfInput
			]
		);
	}

	#[test]
	fn test_not_without_space() {
		assert_eq!(
			tokenize(r#"not(userType eq "Employee")"#).unwrap(),
			vec![
				logical(LogicalOperator::Not),
				Token::OpenParen,
				ident("userType"),
				op(CompareOp::Eq),
				string("Employee"),
				Token::CloseParen,
				Token::EndOfInput
			]
		);
	}

	#[test]
	fn test_value_path_brackets() {
		assert_eq!(
			tokenize(r#"emails[type eq "work" and value co "@example.com"]"#).unwrap(),
			vec![
				ident("emails"),
				Token::OpenBracket,
				ident("type"),
				op(CompareOp::Eq),
				string("work"),
				logical(LogicalOperator::And),
				ident("value"),
				op(CompareOp::Co),
				string("@example.com"),
				Token::CloseBracket,
				Token::EndOfInput
			]
		);
	}

	#[test]
	fn test_literals() {
		assert_eq!(
			tokenize("active eq true").unwrap()[2],
			Token::Boolean(true)
		);
		assert_eq!(
			tokenize("active eq false").unwrap()[2],
			Token::Boolean(false)
		);
		assert_eq!(tokenize("parent eq null").unwrap()[2], Token::Null);
		assert_eq!(tokenize("age lt 40").unwrap()[2], Token::Number(40.0));
	}

	#[test]
	fn test_identifier_characters() {
		assert_eq!(tokenize("user_age pr").unwrap()[0], ident("user_age"));
		assert_eq!(tokenize("user-age pr").unwrap()[0], ident("user-age"));
		assert_eq!(tokenize("addr2 pr").unwrap()[0], ident("addr2"));
	}

	#[test]
	fn test_keywords_are_case_sensitive() {
		assert_eq!(tokenize("EQ").unwrap()[0], ident("EQ"));
		assert_eq!(tokenize("And").unwrap()[0], ident("And"));
		assert_eq!(tokenize("True").unwrap()[0], ident("True"));
	}

	#[test]
	fn test_empty_input() {
		assert_eq!(tokenize("").unwrap(), vec![Token::EndOfInput]);
		assert_eq!(tokenize(" \t\r\n").unwrap(), vec![Token::EndOfInput]);
	}

	#[test]
	fn test_numbers() {
		assert_eq!(number_of("-20"), -20.0);
		assert_eq!(number_of("0"), 0.0);
		assert_eq!(number_of("0.5"), 0.5);
		assert_eq!(number_of("0.25"), 0.25);
		assert_eq!(number_of("12e3"), 12000.0);
		assert_eq!(number_of("12E3"), 12000.0);
		assert_eq!(number_of("12e+3"), 12000.0);
		assert_eq!(number_of("1e-2"), 0.01);
		assert_eq!(number_of("2.5e2"), 250.0);
		assert_eq!(number_of("2.5e-1"), 0.25);
		assert_eq!(number_of("2e10"), 20_000_000_000.0);
	}

	#[test]
	fn test_string_escapes() {
		assert_eq!(string_of(r#""\"""#), "\"");
		assert_eq!(string_of(r#""a\"b""#), "a\"b");
		assert_eq!(string_of(r#""\\""#), "\\");
		assert_eq!(string_of(r#""/""#), "/");
		assert_eq!(string_of(r#""\/""#), "/");
		assert_eq!(string_of(r#""\b\f\n\r\t""#), "\u{08}\u{0C}\n\r\t");
		assert_eq!(string_of(r#""\u00bf""#), "¿");
		assert_eq!(string_of(r#""\u00BF""#), "¿");
		assert_eq!(string_of(r#""\ud83d\ude00""#), "\u{1F600}");
		assert_eq!(string_of(r#""""#), "");
	}

	#[test]
	fn test_unterminated_string() {
		assert_eq!(
			tokenize(r#"userName eq "unterminated"#),
			Err(TokenizeError::UnterminatedString { position: 12 })
		);
		assert_eq!(
			tokenize(r#""\"#),
			Err(TokenizeError::UnterminatedString { position: 0 })
		);
		assert_eq!(
			tokenize(r#"x eq "\u00"#),
			Err(TokenizeError::UnterminatedString { position: 5 })
		);
		for input in [r#""\ud83d"#, r#""\ud83d\"#, r#""\ud83d\u"#, r#""\ud83d\ude"#] {
			assert_eq!(
				tokenize(input),
				Err(TokenizeError::UnterminatedString { position: 0 }),
				"{input}"
			);
		}
	}

	#[test]
	fn test_invalid_character() {
		assert_eq!(
			tokenize(r#"user+name eq "Michael""#),
			Err(TokenizeError::InvalidCharacter {
				character: '+',
				position: 4
			})
		);
		assert_eq!(
			tokenize("urn:ietf pr"),
			Err(TokenizeError::InvalidCharacter {
				character: ':',
				position: 3
			})
		);
	}

	#[test]
	fn test_invalid_numbers() {
		let expected_digit = |position| TokenizeError::InvalidNumber {
			reason: NumberError::ExpectedDigit,
			position,
		};
		let leading_zero = |position| TokenizeError::InvalidNumber {
			reason: NumberError::LeadingZero,
			position,
		};
		assert_eq!(tokenize("age eq 1."), Err(expected_digit(9)));
		assert_eq!(tokenize("age eq --2"), Err(expected_digit(8)));
		assert_eq!(tokenize("age eq 1e"), Err(expected_digit(9)));
		assert_eq!(tokenize("age eq 1e+"), Err(expected_digit(10)));
		assert_eq!(tokenize("age eq 1.x"), Err(expected_digit(9)));
		assert_eq!(tokenize("age eq 01"), Err(leading_zero(7)));
		assert_eq!(tokenize("age eq -01"), Err(leading_zero(8)));
		assert_eq!(
			tokenize("age eq 1e400"),
			Err(TokenizeError::InvalidNumber {
				reason: NumberError::OutOfRange,
				position: 7
			})
		);
	}

	#[test]
	fn test_invalid_escapes() {
		assert_eq!(
			tokenize(r#""\u1""#),
			Err(TokenizeError::InvalidEscape {
				reason: EscapeError::ExpectedHexDigit,
				position: 4
			})
		);
		assert_eq!(
			tokenize(r#""\x""#),
			Err(TokenizeError::InvalidEscape {
				reason: EscapeError::UnknownEscape('x'),
				position: 2
			})
		);
		assert_eq!(
			tokenize(r#""ab\ude00""#),
			Err(TokenizeError::InvalidEscape {
				reason: EscapeError::UnpairedSurrogate,
				position: 3
			})
		);
		assert_eq!(
			tokenize(r#""\ud83dx""#),
			Err(TokenizeError::InvalidEscape {
				reason: EscapeError::UnpairedSurrogate,
				position: 1
			})
		);
	}

	#[test]
	fn test_raw_control_characters_rejected() {
		for control in ['\u{08}', '\u{0C}', '\n', '\r', '\t', '\u{00}'] {
			let input = format!("\"{control}\"");
			assert_eq!(
				tokenize(&input),
				Err(TokenizeError::InvalidStringCharacter {
					character: control,
					position: 1
				})
			);
		}
	}

	#[test]
	fn test_positions_count_characters() {
		assert_eq!(
			tokenize(r#"name eq "¿¿" +"#),
			Err(TokenizeError::InvalidCharacter {
				character: '+',
				position: 13
			})
		);
	}

	proptest! {
		/// Integers tokenize to their numeric value.
		#[test]
		fn integers_round_trip(n in -1_000_000_000i64..1_000_000_000i64) {
			prop_assert_eq!(number_of(&n.to_string()), n as f64);
		}

		/// Strings without quotes, backslashes or control characters pass through unchanged.
		#[test]
		fn plain_strings_round_trip(s in "[^\"\\\\\\x00-\\x1f]{0,40}") {
			prop_assert_eq!(string_of(&format!("\"{s}\"")), s);
		}

		/// Every successful tokenization ends with exactly one end marker.
		#[test]
		fn single_end_marker(input in "[a-z0-9 ().\\[\\]\"-]{0,40}") {
			if let Ok(tokens) = tokenize(&input) {
				let ends = tokens.iter().filter(|t| **t == Token::EndOfInput).count();
				prop_assert_eq!(ends, 1);
				prop_assert_eq!(tokens.last(), Some(&Token::EndOfInput));
			}
		}
	}
}
