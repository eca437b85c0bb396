mod builtin;
mod config;
mod error;
mod eval;
mod global;
mod job;
mod parser;
mod prompt;
mod redirect;
mod types;

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::process;

use anyhow::Context;
use log::debug;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use error::ShellError;
use eval::EvalResult;

const FATAL_STATUS: i32 = 255;

/// Reads one line of at most `max` bytes, newline included.
///
/// Returns `Ok(false)` at end of input. A longer line is consumed up to its newline and
/// reported as `LineTooLong` without ever holding more than `max + 1` bytes.
fn read_line<R: BufRead>(input: &mut R, max: usize, line: &mut Vec<u8>) -> error::Result<bool> {
	line.clear();
	let n = input.by_ref().take(max as u64 + 1).read_until(b'\n', line).map_err(ShellError::io("read-line"))?;
	if n == 0 {
		return Ok(false);
	}
	if line.len() <= max {
		return Ok(true);
	}
	if line.last() != Some(&b'\n') {
		loop {
			let (done, used) = {
				let buf = input.fill_buf().map_err(ShellError::io("read-line"))?;
				match buf.iter().position(|&c| c == b'\n') {
					Some(i) => (true, i + 1),
					None => (buf.is_empty(), buf.len()),
				}
			};
			input.consume(used);
			if done { break; }
		}
	}
	line.clear();
	Err(ShellError::LineTooLong { max: max })
}

/// One prompt cycle: print the prompt, read a line, run it.
fn cycle<R: BufRead>(state: &mut global::State, input: &mut R, show_prompt: bool, line: &mut Vec<u8>) -> error::Result<EvalResult> {
	if show_prompt {
		let prompt = prompt::render()?;
		let mut stdout = io::stdout();
		let _ = stdout.write_all(prompt.as_bytes());
		let _ = stdout.flush();
	}

	if !read_line(input, state.config.max_line, line)? {
		debug!("end of input");
		return Ok(EvalResult::Exit(0));
	}
	eval::eval(state, line)
}

fn run(state: &mut global::State) -> i32 {
	let stdin = io::stdin();
	let show_prompt = !state.config.no_prompt && stdin.is_terminal();
	let mut stdin_locked = stdin.lock();
	let mut line: Vec<u8> = Vec::with_capacity(state.config.max_line);
	loop {
		match cycle(state, &mut stdin_locked, show_prompt, &mut line) {
			Ok(EvalResult::Continue) => {},
			Ok(EvalResult::Exit(status)) => return status,
			Err(e) => {
				let _ = writeln!(io::stderr(), "{}", e);
				if e.is_fatal() {
					return FATAL_STATUS;
				}
			},
		}
	}
}

fn try_main() -> anyhow::Result<i32> {
	let config: config::Config = argh::from_env();
	TermLogger::init(config.log_level, simplelog::Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
		.context("failed to initialize logger")?;

	let mut state = global::State::new(config);
	let status = run(&mut state);
	// Dropping the state reaps every background job, whichever way the loop ended.
	drop(state);
	Ok(status)
}

fn main() {
	let status = match try_main() {
		Ok(status) => status,
		Err(e) => {
			let _ = writeln!(io::stderr(), "internal-error: {:#}", e);
			FATAL_STATUS
		},
	};
	process::exit(status)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn reads_line_by_line() {
		let mut input = Cursor::new(&b"ls -l\necho\n"[..]);
		let mut line = vec![];
		assert!(read_line(&mut input, 16, &mut line).unwrap());
		assert_eq!(line, b"ls -l\n");
		assert!(read_line(&mut input, 16, &mut line).unwrap());
		assert_eq!(line, b"echo\n");
		assert!(!read_line(&mut input, 16, &mut line).unwrap());
	}

	#[test]
	fn long_line_is_skipped_through_its_newline() {
		let mut input = io::BufReader::with_capacity(4, Cursor::new(&b"touch aaaaaaaaaaaaaaaaaaaa\nok\n"[..]));
		let mut line = vec![];
		match read_line(&mut input, 8, &mut line) {
			Err(ShellError::LineTooLong { max: 8 }) => {},
			r => panic!("unexpected {:?}", r),
		}
		assert!(line.is_empty());
		assert!(read_line(&mut input, 8, &mut line).unwrap());
		assert_eq!(line, b"ok\n");
	}

	#[test]
	fn unterminated_long_line_reaches_end_of_input() {
		let mut input = Cursor::new(vec![b'x'; 1000]);
		let mut line = vec![];
		assert!(read_line(&mut input, 8, &mut line).is_err());
		assert!(!read_line(&mut input, 8, &mut line).unwrap());
	}
}
