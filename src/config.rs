use argh::FromArgs;
use log::LevelFilter;

pub const DEFAULT_MAX_TOKENS: usize = 25;
pub const DEFAULT_MAX_JOBS: usize = 25;
/// `BUFSIZ` on glibc.
pub const DEFAULT_MAX_LINE: usize = 8192;

#[derive(FromArgs, Debug)]
/// Interactive command interpreter with pipes, `&&` chaining, redirection and background jobs.
pub struct Config {
	/// maximum number of tokens accepted on one line
	#[argh(option, default = "DEFAULT_MAX_TOKENS")]
	pub max_tokens: usize,

	/// maximum number of background jobs tracked at once
	#[argh(option, default = "DEFAULT_MAX_JOBS")]
	pub max_jobs: usize,

	/// maximum length of one input line in bytes
	#[argh(option, default = "DEFAULT_MAX_LINE")]
	pub max_line: usize,

	/// never print the prompt
	#[argh(switch)]
	pub no_prompt: bool,

	/// log verbosity: off, error, warn, info, debug or trace
	#[argh(option, default = "LevelFilter::Warn")]
	pub log_level: LevelFilter,
}

impl Default for Config {
	fn default() -> Config {
		Config {
			max_tokens: DEFAULT_MAX_TOKENS,
			max_jobs: DEFAULT_MAX_JOBS,
			max_line: DEFAULT_MAX_LINE,
			no_prompt: false,
			log_level: LevelFilter::Warn,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = Config::from_args(&["stagesh"], &[]).unwrap();
		assert_eq!(config.max_tokens, 25);
		assert_eq!(config.max_jobs, 25);
		assert_eq!(config.max_line, 8192);
		assert!(!config.no_prompt);
		assert_eq!(config.log_level, LevelFilter::Warn);
	}

	#[test]
	fn overrides() {
		let config = Config::from_args(&["stagesh"], &["--max-tokens", "4", "--no-prompt", "--log-level", "debug"]).unwrap();
		assert_eq!(config.max_tokens, 4);
		assert!(config.no_prompt);
		assert_eq!(config.log_level, LevelFilter::Debug);
	}

	#[test]
	fn rejects_bad_level() {
		assert!(Config::from_args(&["stagesh"], &["--log-level", "loud"]).is_err());
	}
}
