use log::{info, warn};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::Pid;

use crate::error::{Result, ShellError};

pub trait WaitStatusExt {
	/// Status as a shell would report it: the exit code, or 128 plus the signal number.
	fn code(&self) -> i32;
}

impl WaitStatusExt for WaitStatus {
	fn code(&self) -> i32 {
		match *self {
			WaitStatus::Exited(_, code) => code,
			WaitStatus::Signaled(_, sig, _) => 128 + sig as i32,
			_ => 0,
		}
	}
}

/// Blocks until `pid` terminates.
///
/// Returns `None` when the child was already reaped elsewhere.
pub fn wait_for(pid: Pid) -> Result<Option<WaitStatus>> {
	loop {
		match wait::waitpid(pid, None) {
			Ok(WaitStatus::Stopped(..)) | Ok(WaitStatus::Continued(..)) => continue,
			Ok(status) => return Ok(Some(status)),
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => return Ok(None),
			Err(e) => return Err(ShellError::os("waitpid")(e)),
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Job {
	pub pid: Pid,
	pub label: String,
}

/// Background processes started with `&`, kept until the shell terminates.
///
/// Entries are never removed before they are reaped, so a tracked pid stays a zombie
/// and cannot be handed out again by the kernel.
#[derive(Debug)]
pub struct JobTracker {
	jobs: Vec<Job>,
	capacity: usize,
}

impl JobTracker {
	pub fn with_capacity(capacity: usize) -> JobTracker {
		JobTracker { jobs: Vec::with_capacity(capacity), capacity: capacity }
	}

	pub fn is_full(&self) -> bool {
		self.jobs.len() >= self.capacity
	}

	pub fn iter(&self) -> std::slice::Iter<Job> {
		self.jobs.iter()
	}

	pub fn ensure_room(&self) -> Result<()> {
		if self.is_full() {
			return Err(ShellError::JobsFull { max: self.capacity });
		}
		Ok(())
	}

	pub fn push(&mut self, pid: Pid, label: String) -> Result<&Job> {
		self.ensure_room()?;
		debug_assert!(self.jobs.iter().all(|job| job.pid != pid));
		self.jobs.push(Job { pid: pid, label: label });
		Ok(&self.jobs[self.jobs.len() - 1])
	}

	/// Waits for every tracked job and forgets it.
	pub fn reap_all(&mut self) {
		for job in self.jobs.drain(..) {
			match wait_for(job.pid) {
				Ok(Some(status)) => info!("reaped [{}] {} with status {}", job.label, job.pid, status.code()),
				Ok(None) => info!("[{}] {} was already reaped", job.label, job.pid),
				Err(e) => warn!("[{}] {}: {}", job.label, job.pid, e),
			}
		}
	}
}

impl Drop for JobTracker {
	fn drop(&mut self) {
		self.reap_all();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::sys::signal::Signal;
	use std::process::Command;

	fn spawn(program: &str, args: &[&str]) -> Pid {
		let child = Command::new(program).args(args).spawn().unwrap();
		Pid::from_raw(child.id() as i32)
	}

	#[test]
	fn status_codes() {
		let pid = Pid::from_raw(1);
		assert_eq!(WaitStatus::Exited(pid, 3).code(), 3);
		assert_eq!(WaitStatus::Signaled(pid, Signal::SIGKILL, false).code(), 137);
	}

	#[test]
	fn capacity_is_enforced() {
		let mut jobs = JobTracker::with_capacity(1);
		jobs.push(spawn("true", &[]), "true".to_string()).unwrap();
		assert!(jobs.is_full());
		match jobs.push(Pid::from_raw(i32::MAX), "x".to_string()) {
			Err(ShellError::JobsFull { max: 1 }) => {},
			r => panic!("unexpected {:?}", r),
		}
		assert_eq!(jobs.iter().count(), 1);
		jobs.reap_all();
	}

	#[test]
	fn reap_all_waits_and_clears() {
		let mut jobs = JobTracker::with_capacity(4);
		let first = spawn("sleep", &["0.2"]);
		let second = spawn("false", &[]);
		jobs.push(first, "sleep".to_string()).unwrap();
		jobs.push(second, "false".to_string()).unwrap();
		assert_eq!(jobs.iter().map(|j| j.pid).collect::<Vec<_>>(), vec![first, second]);

		jobs.reap_all();
		assert_eq!(jobs.iter().count(), 0);
		assert!(!jobs.is_full());
		// Both pids are gone from the process table once reaped.
		assert_eq!(wait_for(first).unwrap(), None);
		assert_eq!(wait_for(second).unwrap(), None);
	}
}
