use crate::yy::validate::{Violation, ViolationKind};
use crate::yy::value::{Number, Object, Value};
use crate::yy::{Result, YyError};

/// Maximum container nesting depth accepted by the parser.
const MAX_DEPTH: u32 = 128;

/// Successful parse output.
#[derive(Debug, Clone)]
pub struct Parsed {
	/// The parsed value tree.
	pub value: Value,
	/// Non-fatal findings, currently duplicate-key collapses.
	pub warnings: Vec<Violation>,
}

/// Parse relaxed-JSON descriptor text into a value tree.
///
/// The grammar is strict JSON plus one relaxation: a trailing comma is
/// permitted before a closing `}` or `]`. Comments are not supported.
/// Duplicate keys within one object collapse to the first position with the
/// last value winning; each collapse is reported as a warning.
pub fn parse(text: &str) -> Result<Parsed> {
	let mut cursor = Cursor::new(text);
	let mut warnings = Vec::new();

	cursor.skip_whitespace();
	let value = parse_value(&mut cursor, &mut warnings, "", 0)?;
	cursor.skip_whitespace();

	if cursor.peek().is_some() {
		return Err(cursor.error("end of input"));
	}

	Ok(Parsed { value, warnings })
}

/// Parse descriptor text, discarding warnings.
pub fn parse_value_only(text: &str) -> Result<Value> {
	parse(text).map(|parsed| parsed.value)
}

struct Cursor<'a> {
	text: &'a str,
	pos: usize,
	line: u32,
	column: u32,
}

impl<'a> Cursor<'a> {
	fn new(text: &'a str) -> Self {
		Self { text, pos: 0, line: 1, column: 1 }
	}

	fn peek(&self) -> Option<char> {
		self.text[self.pos..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.pos += ch.len_utf8();
		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
		Some(ch)
	}

	fn skip_whitespace(&mut self) {
		while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
			self.bump();
		}
	}

	fn eat(&mut self, ch: char) -> bool {
		if self.peek() == Some(ch) {
			self.bump();
			true
		} else {
			false
		}
	}

	fn expect(&mut self, ch: char, expected: &'static str) -> Result<()> {
		if self.eat(ch) { Ok(()) } else { Err(self.error(expected)) }
	}

	fn error(&self, expected: &'static str) -> YyError {
		let found = match self.peek() {
			Some(ch) => format!("{ch:?}"),
			None => "end of input".to_owned(),
		};
		YyError::Parse {
			line: self.line,
			column: self.column,
			expected,
			found,
		}
	}
}

fn parse_value(cursor: &mut Cursor<'_>, warnings: &mut Vec<Violation>, path: &str, depth: u32) -> Result<Value> {
	if depth > MAX_DEPTH {
		return Err(YyError::DepthExceeded { max_depth: MAX_DEPTH });
	}

	match cursor.peek() {
		Some('{') => parse_object(cursor, warnings, path, depth),
		Some('[') => parse_array(cursor, warnings, path, depth),
		Some('"') => Ok(Value::String(parse_string(cursor)?)),
		Some('t' | 'f') => parse_bool(cursor),
		Some('n') => parse_null(cursor),
		Some(ch) if ch == '-' || ch.is_ascii_digit() => parse_number(cursor),
		_ => Err(cursor.error("value")),
	}
}

fn parse_object(cursor: &mut Cursor<'_>, warnings: &mut Vec<Violation>, path: &str, depth: u32) -> Result<Value> {
	cursor.expect('{', "'{'")?;
	let mut object = Object::new();

	loop {
		cursor.skip_whitespace();
		if cursor.eat('}') {
			break;
		}

		let key = parse_string(cursor)?;
		cursor.skip_whitespace();
		cursor.expect(':', "':'")?;
		cursor.skip_whitespace();

		let member_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
		let value = parse_value(cursor, warnings, &member_path, depth + 1)?;

		if object.get(&key).is_some() {
			warnings.push(Violation {
				path: member_path,
				kind: ViolationKind::DuplicateKey { key: key.clone() },
			});
		}
		object.set(key, value);

		cursor.skip_whitespace();
		if cursor.eat(',') {
			continue;
		}
		cursor.expect('}', "',' or '}'")?;
		break;
	}

	Ok(Value::Object(object))
}

fn parse_array(cursor: &mut Cursor<'_>, warnings: &mut Vec<Violation>, path: &str, depth: u32) -> Result<Value> {
	cursor.expect('[', "'['")?;
	let mut items = Vec::new();

	loop {
		cursor.skip_whitespace();
		if cursor.eat(']') {
			break;
		}

		let item_path = format!("{path}[{}]", items.len());
		items.push(parse_value(cursor, warnings, &item_path, depth + 1)?);

		cursor.skip_whitespace();
		if cursor.eat(',') {
			continue;
		}
		cursor.expect(']', "',' or ']'")?;
		break;
	}

	Ok(Value::Array(items))
}

fn parse_string(cursor: &mut Cursor<'_>) -> Result<String> {
	cursor.expect('"', "'\"'")?;
	let mut out = String::new();

	loop {
		let Some(ch) = cursor.bump() else {
			return Err(cursor.error("closing '\"'"));
		};
		match ch {
			'"' => return Ok(out),
			'\\' => out.push(parse_escape(cursor)?),
			ch if (ch as u32) < 0x20 => return Err(cursor.error("unescaped control character is invalid")),
			ch => out.push(ch),
		}
	}
}

fn parse_escape(cursor: &mut Cursor<'_>) -> Result<char> {
	let Some(ch) = cursor.bump() else {
		return Err(cursor.error("escape sequence"));
	};
	match ch {
		'"' => Ok('"'),
		'\\' => Ok('\\'),
		'/' => Ok('/'),
		'b' => Ok('\u{0008}'),
		'f' => Ok('\u{000C}'),
		'n' => Ok('\n'),
		'r' => Ok('\r'),
		't' => Ok('\t'),
		'u' => parse_unicode_escape(cursor),
		_ => Err(cursor.error("valid escape character")),
	}
}

fn parse_unicode_escape(cursor: &mut Cursor<'_>) -> Result<char> {
	let first = parse_hex4(cursor)?;

	// Surrogate pairs arrive as two consecutive \u escapes.
	if (0xD800..=0xDBFF).contains(&first) {
		cursor.expect('\\', "low surrogate escape")?;
		cursor.expect('u', "low surrogate escape")?;
		let second = parse_hex4(cursor)?;
		if !(0xDC00..=0xDFFF).contains(&second) {
			return Err(cursor.error("low surrogate"));
		}
		let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
		return char::from_u32(combined).ok_or_else(|| cursor.error("valid unicode scalar"));
	}
	if (0xDC00..=0xDFFF).contains(&first) {
		return Err(cursor.error("high surrogate before low surrogate"));
	}

	char::from_u32(first).ok_or_else(|| cursor.error("valid unicode scalar"))
}

fn parse_hex4(cursor: &mut Cursor<'_>) -> Result<u32> {
	let mut out = 0_u32;
	for _ in 0..4 {
		let Some(digit) = cursor.bump().and_then(|ch| ch.to_digit(16)) else {
			return Err(cursor.error("four hex digits"));
		};
		out = (out << 4) | digit;
	}
	Ok(out)
}

fn parse_bool(cursor: &mut Cursor<'_>) -> Result<Value> {
	if eat_keyword(cursor, "true") {
		Ok(Value::Bool(true))
	} else if eat_keyword(cursor, "false") {
		Ok(Value::Bool(false))
	} else {
		Err(cursor.error("'true' or 'false'"))
	}
}

fn parse_null(cursor: &mut Cursor<'_>) -> Result<Value> {
	if eat_keyword(cursor, "null") {
		Ok(Value::Null)
	} else {
		Err(cursor.error("'null'"))
	}
}

fn eat_keyword(cursor: &mut Cursor<'_>, keyword: &'static str) -> bool {
	if cursor.text[cursor.pos..].starts_with(keyword) {
		for _ in 0..keyword.len() {
			cursor.bump();
		}
		true
	} else {
		false
	}
}

fn parse_number(cursor: &mut Cursor<'_>) -> Result<Value> {
	let start = cursor.pos;
	let mut is_float = false;

	cursor.eat('-');

	if cursor.eat('0') {
		// No leading zeros.
	} else if matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
		eat_digits(cursor);
	} else {
		return Err(cursor.error("digit"));
	}

	if cursor.peek() == Some('.') {
		is_float = true;
		cursor.bump();
		if !matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
			return Err(cursor.error("fraction digit"));
		}
		eat_digits(cursor);
	}

	if matches!(cursor.peek(), Some('e' | 'E')) {
		is_float = true;
		cursor.bump();
		if matches!(cursor.peek(), Some('+' | '-')) {
			cursor.bump();
		}
		if !matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
			return Err(cursor.error("exponent digit"));
		}
		eat_digits(cursor);
	}

	let literal = &cursor.text[start..cursor.pos];
	if !is_float && let Ok(value) = literal.parse::<i64>() {
		return Ok(Value::Number(Number::Int(value)));
	}

	let value = literal.parse::<f64>().map_err(|_| cursor.error("valid number literal"))?;
	if !value.is_finite() {
		return Err(cursor.error("finite number literal"));
	}
	Ok(Value::Number(Number::Float(value)))
}

fn eat_digits(cursor: &mut Cursor<'_>) {
	while matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
		cursor.bump();
	}
}
