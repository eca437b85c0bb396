use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

use crate::error::{Result, ShellError};
use crate::global;

/// `exit` and `quit` terminate the shell wherever they appear as the first token.
pub fn is_exit(name: &[u8]) -> bool {
	name == b"exit" || name == b"quit"
}

pub fn builtin_cd(_: &mut global::State, args: &[&[u8]]) -> Result<()> {
	let target = match args.first() {
		Some(dir) => OsStr::from_bytes(dir).to_owned(),
		None => env::var_os("HOME").unwrap_or_else(|| OsString::from("/")),
	};
	env::set_current_dir(&target).map_err(|source| ShellError::InvalidDirectory {
		path: target.to_string_lossy().into_owned(),
		source: source,
	})
}

pub fn builtin_jobs(state: &mut global::State, _: &[&[u8]]) -> Result<()> {
	let mut stdout = io::stdout();
	for job in state.jobs.iter() {
		let _ = writeln!(stdout, "[{}]\t{}", job.label, job.pid);
	}
	let _ = stdout.flush();
	Ok(())
}

pub fn match_builtin(name: &[u8]) -> Option<fn(&mut global::State, &[&[u8]]) -> Result<()>> {
	match name {
		b"cd" => Some(builtin_cd),
		b"jobs" => Some(builtin_jobs),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Config;

	#[test]
	fn exit_words() {
		assert!(is_exit(b"exit"));
		assert!(is_exit(b"quit"));
		assert!(!is_exit(b"exits"));
		assert!(!is_exit(b"cd"));
	}

	#[test]
	fn lookup() {
		assert!(match_builtin(b"cd").is_some());
		assert!(match_builtin(b"jobs").is_some());
		assert!(match_builtin(b"ls").is_none());
		assert!(match_builtin(b"exit").is_none());
	}

	#[test]
	fn cd_changes_directory() {
		let mut state = global::State::new(Config::default());
		let orig = env::current_dir().unwrap();
		let dir = tempfile::tempdir().unwrap();
		let canonical = dir.path().canonicalize().unwrap();

		builtin_cd(&mut state, &[canonical.as_os_str().as_bytes()]).unwrap();
		let now = env::current_dir().unwrap();
		env::set_current_dir(&orig).unwrap();
		assert_eq!(now, canonical);

		let missing = canonical.join("missing");
		let err = builtin_cd(&mut state, &[missing.as_os_str().as_bytes()]).unwrap_err();
		assert!(err.to_string().starts_with("invalid-file: "));
		assert!(!err.is_fatal());
	}
}
