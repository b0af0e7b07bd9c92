use std::convert::TryInto;
use std::ops::AddAssign;
use std::time::{Duration, Instant};

/// Accumulates wall time spent on completed jobs. One per worker thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct JobTimer {
    total_cpu_time: Duration,
    jobs_completed: u32,
}

impl JobTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `job` and records how long it took. Failed jobs are not counted.
    pub fn try_time<R, E>(&mut self, job: impl FnOnce() -> Result<R, E>) -> Result<R, E> {
        let start = Instant::now();
        let result = job();
        if result.is_ok() {
            self.complete_job(start.elapsed());
        }
        result
    }

    pub fn complete_job(&mut self, d: Duration) {
        self.total_cpu_time += d;
        self.jobs_completed += 1;
    }

    pub fn summary(&self) -> WorkSummary {
        WorkSummary {
            jobs_completed: self.jobs_completed,
            total_cpu_time: self.total_cpu_time,
        }
    }
}

/// Totals across any number of [`JobTimer`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WorkSummary {
    pub jobs_completed: u32,
    pub total_cpu_time: Duration,
}

impl WorkSummary {
    pub fn average_job_time_us(&self) -> u32 {
        let total_us: u32 = self
            .total_cpu_time
            .as_micros()
            .try_into()
            .unwrap_or(u32::MAX);

        total_us / self.jobs_completed.max(1)
    }
}

impl AddAssign for WorkSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.jobs_completed += rhs.jobs_completed;
        self.total_cpu_time += rhs.total_cpu_time;
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
