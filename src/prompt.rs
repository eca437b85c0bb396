use std::env;
use std::path::{Path, PathBuf};

use nix::unistd::{self, User};

use crate::error::{Result, ShellError};

fn home_dir() -> Option<PathBuf> {
	env::var_os("HOME").map(PathBuf::from).or_else(|| {
		User::from_uid(unistd::getuid()).ok().and_then(|user| user.map(|u| u.dir))
	})
}

/// `[stagesh <folder>] <mark> `, with `~` for the home directory and `#` for root.
pub fn format_prompt(cwd: &Path, home: Option<&Path>, superuser: bool) -> String {
	let folder = if home == Some(cwd) {
		"~".to_string()
	} else {
		match cwd.file_name() {
			Some(name) => name.to_string_lossy().into_owned(),
			None => "/".to_string(),
		}
	};
	format!("[stagesh {}] {} ", folder, if superuser { "#" } else { "$" })
}

pub fn render() -> Result<String> {
	let cwd = env::current_dir().map_err(ShellError::io("getcwd"))?;
	let home = home_dir();
	Ok(format_prompt(&cwd, home.as_deref(), unistd::geteuid().is_root()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn last_component() {
		let p = format_prompt(Path::new("/usr/local/src"), Some(Path::new("/home/me")), false);
		assert_eq!(p, "[stagesh src] $ ");
	}

	#[test]
	fn home_is_tilde() {
		let p = format_prompt(Path::new("/home/me"), Some(Path::new("/home/me")), false);
		assert_eq!(p, "[stagesh ~] $ ");
	}

	#[test]
	fn root_directory_and_superuser() {
		assert_eq!(format_prompt(Path::new("/"), None, true), "[stagesh /] # ");
	}
}
