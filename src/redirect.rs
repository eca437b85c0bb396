use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::os::unix::ffi::OsStrExt;

use crate::error::{Result, ShellError};
use crate::types::*;

/// Removes `<`, `>` and `>>` together with their operands from a stage's words.
///
/// Returns the remaining argument vector; a later redirection of the same direction
/// replaces an earlier one.
pub fn strip<'a>(words: &[&'a [u8]]) -> Result<(Vec<&'a [u8]>, Redirects<'a>)> {
	let mut argv = Vec::with_capacity(words.len());
	let mut redirects = Redirects::default();
	let mut iter = words.iter();
	while let Some(&word) = iter.next() {
		let mode = match word {
			b"<" => None,
			b">" => Some(RedirectMode::Truncate),
			b">>" => Some(RedirectMode::Append),
			_ => {
				argv.push(word);
				continue;
			},
		};
		let target = match iter.next() {
			Some(&target) => target,
			None => {
				return Err(ShellError::Syntax(format!("missing file after '{}'", String::from_utf8_lossy(word))));
			},
		};
		match mode {
			None => redirects.input = Some(target),
			Some(mode) => redirects.output = Some((target, mode)),
		}
	}
	Ok((argv, redirects))
}

/// Files opened for one stage, to be installed as its standard input and output.
#[derive(Debug, Default)]
pub struct Opened {
	pub input: Option<File>,
	pub output: Option<File>,
}

fn invalid_file(path: &[u8], stream: &'static str, stage: &Stage) -> impl FnOnce(std::io::Error) -> ShellError {
	let path = String::from_utf8_lossy(path).into_owned();
	let program = stage.label();
	move |source| ShellError::InvalidFile { path: path, stream: stream, program: program, source: source }
}

pub fn open(stage: &Stage) -> Result<Opened> {
	let mut opened = Opened::default();
	if let Some(path) = stage.redirects.input {
		let file = File::open(OsStr::from_bytes(path)).map_err(invalid_file(path, "STDIN", stage))?;
		opened.input = Some(file);
	}
	if let Some((path, mode)) = stage.redirects.output {
		let mut oopt = OpenOptions::new();
		let _ = match mode {
			RedirectMode::Truncate => oopt.write(true).create(true).truncate(true),
			RedirectMode::Append => oopt.append(true).create(true),
		};
		let file = oopt.open(OsStr::from_bytes(path)).map_err(invalid_file(path, "STDOUT", stage))?;
		opened.output = Some(file);
	}
	Ok(opened)
}
