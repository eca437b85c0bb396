use log::debug;

use crate::error::{Result, ShellError};
use crate::redirect;
use crate::types::*;

const BACKGROUND: &[u8] = b"&";

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		match c {
			b' ' | b'\t' | b'\n' => true,
			_ => false,
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(|c| !Parser::is_whitespace(c));
		&self.line[orig .. self.i]
	}
}

/// Splits a line on spaces, tabs and newlines.
///
/// No quoting: `a|b` is one word, `a | b` is three. Lines with more than `max` words are
/// rejected as a whole.
pub fn tokenize(line: &[u8], max: usize) -> Result<Tokens> {
	let mut parser = Parser { line: line, i: 0 };
	let mut words: Vec<&[u8]> = vec![];
	let mut connectors = 0;
	loop {
		parser.skip_whitespaces();
		let word = parser.read_word();
		if word.is_empty() {
			break;
		}
		if words.len() == max {
			return Err(ShellError::TooManyTokens { max: max });
		}
		if Connector::from_token(word).is_some() {
			connectors += 1;
		}
		words.push(word);
	}
	debug!("tokens: {:?}", words.iter().map(|w| String::from_utf8_lossy(w)).collect::<Vec<_>>());
	Ok(Tokens { words: words, connectors: connectors })
}

fn parse_stage<'a>(span: &[&'a [u8]]) -> Result<Stage<'a>> {
	let (words, background) = match span.iter().position(|&w| w == BACKGROUND) {
		Some(i) if i + 1 == span.len() => (&span[.. i], true),
		Some(i) => {
			return Err(ShellError::Syntax(format!("unexpected token after '&': '{}'", String::from_utf8_lossy(span[i + 1]))));
		},
		None => (span, false),
	};
	let (argv, redirects) = redirect::strip(words)?;
	if argv.is_empty() {
		return Err(ShellError::Syntax("empty command".to_string()));
	}
	Ok(Stage { argv: argv, redirects: redirects, background: background })
}

/// Partitions tokens into stages at `|` and `&&`.
///
/// Every stage is validated here, so a malformed line is rejected before anything runs.
pub fn segment<'a>(tokens: &Tokens<'a>) -> Result<Pipeline<'a>> {
	let words = &tokens.words;
	let mut stages = Vec::with_capacity(tokens.connectors + 1);
	let mut connectors = Vec::with_capacity(tokens.connectors);
	let mut start = 0;
	for (i, word) in words.iter().enumerate() {
		if connectors.len() == tokens.connectors {
			break;
		}
		if let Some(connector) = Connector::from_token(word) {
			stages.push(parse_stage(&words[start .. i])?);
			connectors.push(connector);
			start = i + 1;
		}
	}
	stages.push(parse_stage(&words[start ..])?);
	debug_assert_eq!(stages.len(), connectors.len() + 1);
	Ok(Pipeline { stages: stages, connectors: connectors })
}
