use std::io;

use thiserror::Error;

/// Every diagnostic the controller can report.
///
/// The `Display` text is what the user sees on standard error, so each variant starts
/// with one of the stable prefixes `internal-error:` or `invalid-file:`.
#[derive(Debug, Error)]
pub enum ShellError {
	#[error("internal-error: too many tokens found, maximum number of tokens is {max}")]
	TooManyTokens { max: usize },

	#[error("internal-error: line is longer than {max} bytes")]
	LineTooLong { max: usize },

	#[error("internal-error: {0}")]
	Syntax(String),

	#[error("invalid-file: unable to open {path} to use as {stream} for {program}: {source}")]
	InvalidFile {
		path: String,
		stream: &'static str,
		program: String,
		#[source]
		source: io::Error,
	},

	#[error("invalid-file: unable to change directory to {path}: {source}")]
	InvalidDirectory {
		path: String,
		#[source]
		source: io::Error,
	},

	#[error("internal-error: too many background jobs, maximum is {max}")]
	JobsFull { max: usize },

	#[error("internal-error: {op}: failed: {source}")]
	Os {
		op: &'static str,
		#[source]
		source: nix::Error,
	},

	#[error("internal-error: {op}: failed: {source}")]
	Io {
		op: &'static str,
		#[source]
		source: io::Error,
	},
}

impl ShellError {
	pub fn os(op: &'static str) -> impl FnOnce(nix::Error) -> ShellError {
		move |source| ShellError::Os { op: op, source: source }
	}

	pub fn io(op: &'static str) -> impl FnOnce(io::Error) -> ShellError {
		move |source| ShellError::Io { op: op, source: source }
	}

	/// Fatal errors terminate the controller; all others only discard the current line.
	pub fn is_fatal(&self) -> bool {
		match *self {
			ShellError::Os { .. } | ShellError::Io { .. } => true,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, ShellError>;
