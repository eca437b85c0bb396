use crate::config::Config;
use crate::job::JobTracker;

pub struct State {
	pub config: Config,
	pub jobs: JobTracker,
}

impl State {
	pub fn new(config: Config) -> State {
		let jobs = JobTracker::with_capacity(config.max_jobs);
		State { config: config, jobs: jobs }
	}
}
