use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use log::{debug, info, trace};
use nix::errno::Errno;
use nix::fcntl::{self, FcntlArg, FdFlag, OFlag};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};

use crate::builtin;
use crate::error::{Result, ShellError};
use crate::global;
use crate::job::{self, WaitStatusExt};
use crate::parser;
use crate::redirect;
use crate::types::*;

/// Installs `fd` as `target` in the child, keeping it open across `exec`.
fn install(fd: Option<RawFd>, target: RawFd) -> nix::Result<()> {
	match fd {
		Some(fd) if fd == target => {
			fcntl::fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
		},
		Some(fd) => {
			unistd::dup2(fd, target)?;
		},
		None => {},
	}
	Ok(())
}

fn exec_stage(argv: &[CString], stdin: Option<RawFd>, stdout: Option<RawFd>) -> ! {
	// The Rust runtime ignores SIGPIPE and an ignored signal survives exec.
	let _ = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) };
	let status = match install(stdin, libc::STDIN_FILENO).and_then(|_| install(stdout, libc::STDOUT_FILENO)) {
		Err(e) => {
			let _ = writeln!(io::stderr(), "internal-error: dup2: failed: {}", e);
			126
		},
		Ok(()) => {
			let e = match unistd::execvp(&argv[0], argv) {
				Ok(never) => match never {},
				Err(e) => e,
			};
			let _ = writeln!(io::stderr(), "invalid-executable: unable to execute {}, make sure it is in your path: {}",
			                 argv[0].to_string_lossy(), e);
			if e == Errno::ENOENT { 127 } else { 126 }
		},
	};
	unsafe { libc::_exit(status) }
}

fn build_argv(stage: &Stage) -> Result<Vec<CString>> {
	stage.argv.iter()
		.map(|&word| CString::new(word))
		.collect::<std::result::Result<Vec<_>, _>>()
		.map_err(|_| ShellError::Syntax(format!("argument of {} contains a NUL byte", stage.label())))
}

struct Spawned {
	pid: Pid,
	/// Read end of this stage's pipe; the next stage's standard input.
	next_input: OwnedFd,
}

/// Forks one stage.
///
/// `input` is the previous stage's pipe, or `None` for the shell's own standard input.
/// Output goes into the fresh pipe only when a `|` follows and no `>`/`>>` was given.
/// Every descriptor passed in is closed in the parent before returning.
fn spawn_stage(stage: &Stage, input: Option<OwnedFd>, connector: Option<Connector>,
               opened: redirect::Opened) -> Result<Spawned> {
	let (pipe_read, pipe_write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ShellError::os("pipe-creation"))?;
	let argv = build_argv(stage)?;
	debug!("args-to-[{}]: {:?}", stage.label(), argv);

	let stdin = match (&opened.input, &input) {
		(Some(file), _) => Some(file.as_raw_fd()),
		(None, Some(fd)) => Some(fd.as_raw_fd()),
		(None, None) => None,
	};
	let stdout = match (&opened.output, connector) {
		(Some(file), _) => Some(file.as_raw_fd()),
		(None, Some(Connector::Pipe)) => Some(pipe_write.as_raw_fd()),
		(None, _) => None,
	};
	trace!("[{}] stdin={:?} stdout={:?} pipe=({}, {})", stage.label(), stdin, stdout,
	       pipe_read.as_raw_fd(), pipe_write.as_raw_fd());

	let _ = io::stdout().flush();
	match unsafe { unistd::fork() }.map_err(ShellError::os("fork"))? {
		ForkResult::Child => exec_stage(&argv, stdin, stdout),
		ForkResult::Parent { child } => {
			info!("spawned [{}] {}", stage.label(), child);
			Ok(Spawned { pid: child, next_input: pipe_read })
		},
	}
}

fn wait_foreground(pids: &mut Vec<Pid>) -> Result<()> {
	for pid in pids.drain(..) {
		if let Some(status) = job::wait_for(pid)? {
			info!("{} exited with status {}", pid, status.code());
		}
	}
	Ok(())
}

/// Forks the stages left to right. Foreground pids are collected into `foreground`;
/// a `&&` waits for all of them before the next stage is forked.
fn spawn_stages(state: &mut global::State, pipeline: &Pipeline, foreground: &mut Vec<Pid>) -> Result<()> {
	let mut input: Option<OwnedFd> = None;
	for (i, stage) in pipeline.stages.iter().enumerate() {
		let connector = pipeline.connector_after(i);
		if stage.background {
			state.jobs.ensure_room()?;
		}
		let opened = redirect::open(stage)?;
		let spawned = spawn_stage(stage, input.take(), connector, opened)?;
		if stage.background {
			let job = state.jobs.push(spawned.pid, stage.label())?;
			let mut stdout = io::stdout();
			let _ = writeln!(stdout, "[{}]\t{}", job.label, job.pid);
			let _ = stdout.flush();
		} else {
			foreground.push(spawned.pid);
		}
		input = Some(spawned.next_input);
		if connector == Some(Connector::Sequential) {
			wait_foreground(foreground)?;
		}
	}
	Ok(())
}

fn run_pipeline(state: &mut global::State, pipeline: &Pipeline) -> Result<()> {
	let mut foreground = Vec::with_capacity(pipeline.stages.len());
	// Stages already forked keep running when a later one fails; they are still waited on.
	let spawned = spawn_stages(state, pipeline, &mut foreground);
	let waited = wait_foreground(&mut foreground);
	spawned.and(waited)
}

#[derive(Debug, PartialEq, Eq)]
pub enum EvalResult {
	Continue,
	Exit(i32),
}

/// Runs one command line to completion of its foreground stages.
pub fn eval(state: &mut global::State, line: &[u8]) -> Result<EvalResult> {
	let tokens = parser::tokenize(line, state.config.max_tokens)?;
	match tokens.words.first() {
		None => return Ok(EvalResult::Continue),
		Some(&first) if builtin::is_exit(first) => return Ok(EvalResult::Exit(0)),
		Some(_) => {},
	}

	let pipeline = parser::segment(&tokens)?;
	if let [ref stage] = pipeline.stages[..] {
		if stage.redirects.is_empty() && !stage.background {
			if let Some(func) = builtin::match_builtin(stage.program()) {
				func(state, &stage.argv[1 ..])?;
				return Ok(EvalResult::Continue);
			}
		}
	}

	run_pipeline(state, &pipeline)?;
	Ok(EvalResult::Continue)
}
