use crossbeam::queue::ArrayQueue;
use otmap_core::{JobTimer, WorkSummary};
use parking_lot::{Condvar, Mutex};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A unit of work that a [`WorkQueue`] runs on one of its threads.
pub trait WorkItem: Send + 'static {
    fn execute(self);
}

enum Message<W> {
    Job(W),
    /// Sent once per worker. Everything queued before it still runs.
    Shutdown,
}

/// A condition variable with its own lock. Waiters must re-check their condition under the lock before waiting, and notifiers
/// take the lock before notifying, so no wakeup is lost between a check and a wait.
#[derive(Default)]
struct Monitor {
    lock: Mutex<()>,
    condition: Condvar,
}

impl Monitor {
    fn notify_one(&self) {
        let _guard = self.lock.lock();
        self.condition.notify_one();
    }

    fn notify_all(&self) {
        let _guard = self.lock.lock();
        self.condition.notify_all();
    }
}

struct Worker<W> {
    queue: ArrayQueue<Message<W>>,
    monitor: Monitor,
}

struct Shared<W> {
    workers: Box<[Worker<W>]>,
    /// Signaled whenever a worker frees a queue slot.
    space: Monitor,
}

impl<W> Shared<W> {
    /// Tries every worker once, starting at `*cursor`, and leaves the cursor after the worker that accepted.
    fn push_any(&self, cursor: &mut usize, mut message: Message<W>) -> Result<(), Message<W>> {
        for _ in 0..self.workers.len() {
            let i = *cursor;
            *cursor = (*cursor + 1) % self.workers.len();
            match self.workers[i].queue.push(message) {
                Ok(()) => {
                    self.workers[i].monitor.notify_one();
                    return Ok(());
                }
                Err(rejected) => message = rejected,
            }
        }
        Err(message)
    }

    /// Pushes to worker `i`, parking until it has room.
    fn push_to(&self, i: usize, mut message: Message<W>) {
        let worker = &self.workers[i];
        loop {
            match worker.queue.push(message) {
                Ok(()) => break,
                Err(rejected) => message = rejected,
            }
            let mut guard = self.space.lock.lock();
            if worker.queue.is_full() {
                self.space.condition.wait(&mut guard);
            }
        }
        worker.monitor.notify_one();
    }
}

/// A fixed pool of threads, each with a bounded FIFO queue of jobs.
///
/// Jobs are dealt round-robin. When every queue is full, [`push`](Self::push) parks the producer until a worker takes a job.
/// Jobs given to the same worker run in submission order; there is no ordering across workers.
///
/// Dropping the queue is the same as [`signal_completion`](Self::signal_completion): all queued jobs run before the threads
/// exit.
pub struct WorkQueue<W: WorkItem> {
    shared: Arc<Shared<W>>,
    threads: Vec<JoinHandle<WorkSummary>>,
    cursor: usize,
}

impl<W: WorkItem> WorkQueue<W> {
    /// Spawns `worker_count` threads whose queues each hold up to `capacity` pending jobs. Both are clamped to at least 1.
    pub fn new(worker_count: usize, capacity: usize) -> io::Result<Self> {
        let worker_count = worker_count.max(1);
        let workers = (0..worker_count)
            .map(|_| Worker {
                queue: ArrayQueue::new(capacity.max(1)),
                monitor: Monitor::default(),
            })
            .collect();
        let shared = Arc::new(Shared {
            workers,
            space: Monitor::default(),
        });

        let mut queue = Self {
            shared,
            threads: Vec::with_capacity(worker_count),
            cursor: 0,
        };
        for i in 0..worker_count {
            let shared = queue.shared.clone();
            let handle = thread::Builder::new()
                .name(format!("otmap-worker-{}", i))
                .spawn(move || worker_loop(&shared, i))?;
            queue.threads.push(handle);
        }

        Ok(queue)
    }

    pub fn worker_count(&self) -> usize {
        self.shared.workers.len()
    }

    /// Offers `job` to the next worker in round-robin order only. Hands the job back if that worker's queue is full.
    pub fn try_push(&mut self, job: W) -> Result<(), W> {
        let i = self.cursor;
        self.cursor = (self.cursor + 1) % self.worker_count();
        let worker = &self.shared.workers[i];
        match worker.queue.push(Message::Job(job)) {
            Ok(()) => {
                worker.monitor.notify_one();
                Ok(())
            }
            Err(Message::Job(job)) => Err(job),
            Err(Message::Shutdown) => unreachable!(),
        }
    }

    /// Gives `job` to the first worker, in round-robin order, with room for it. Parks while every queue is full.
    pub fn push(&mut self, job: W) {
        let shared = &*self.shared;
        let mut message = Message::Job(job);
        loop {
            match shared.push_any(&mut self.cursor, message) {
                Ok(()) => return,
                Err(rejected) => message = rejected,
            }

            let mut guard = shared.space.lock.lock();
            // A worker may have made room between the attempt and taking the lock.
            match shared.push_any(&mut self.cursor, message) {
                Ok(()) => return,
                Err(rejected) => message = rejected,
            }
            shared.space.condition.wait(&mut guard);
        }
    }

    /// Queues a shutdown message behind each worker's pending jobs and joins every thread. Returns the combined timing of all
    /// jobs run. Calling this again returns an empty summary.
    pub fn signal_completion(&mut self) -> WorkSummary {
        if self.threads.is_empty() {
            return WorkSummary::default();
        }

        for i in 0..self.worker_count() {
            self.shared.push_to(i, Message::Shutdown);
        }

        let mut summary = WorkSummary::default();
        for handle in self.threads.drain(..) {
            match handle.join() {
                Ok(worker_summary) => summary += worker_summary,
                Err(_) => log::error!("A worker thread panicked"),
            }
        }
        summary
    }
}

impl<W: WorkItem> Drop for WorkQueue<W> {
    fn drop(&mut self) {
        self.signal_completion();
    }
}

fn worker_loop<W: WorkItem>(shared: &Shared<W>, i: usize) -> WorkSummary {
    let worker = &shared.workers[i];
    let mut timer = JobTimer::new();
    loop {
        match worker.queue.pop() {
            Some(Message::Job(job)) => {
                shared.space.notify_all();
                // A panicking job is logged and skipped; the worker keeps serving its queue.
                if timer
                    .try_time(|| panic::catch_unwind(AssertUnwindSafe(|| job.execute())))
                    .is_err()
                {
                    log::error!("A job panicked on worker {}", i);
                }
            }
            Some(Message::Shutdown) => {
                shared.space.notify_all();
                return timer.summary();
            }
            None => {
                let mut guard = worker.monitor.lock.lock();
                if worker.queue.is_empty() {
                    worker.monitor.condition.wait(&mut guard);
                }
            }
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountJob {
        id: usize,
        runs: Arc<Vec<AtomicUsize>>,
    }

    impl WorkItem for CountJob {
        fn execute(self) {
            self.runs[self.id].fetch_add(1, Ordering::SeqCst);
        }
    }

    struct RecordJob {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
    }

    impl WorkItem for RecordJob {
        fn execute(self) {
            thread::sleep(Duration::from_micros(50));
            self.log.lock().push(self.id);
        }
    }

    #[test]
    fn every_job_runs_exactly_once_before_shutdown_returns() {
        const JOBS: usize = 5000;
        let runs = Arc::new((0..JOBS).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>());

        // Tiny queues so the producer has to park.
        let mut queue = WorkQueue::new(4, 2).unwrap();
        for id in 0..JOBS {
            queue.push(CountJob {
                id,
                runs: runs.clone(),
            });
        }
        let summary = queue.signal_completion();

        assert_eq!(summary.jobs_completed as usize, JOBS);
        assert!(runs.iter().all(|r| r.load(Ordering::SeqCst) == 1));
        assert!(queue.threads.is_empty());
        // Every worker thread has exited and released its handle on the shared state.
        assert_eq!(Arc::strong_count(&queue.shared), 1);

        assert_eq!(queue.signal_completion(), WorkSummary::default());
    }

    #[test]
    fn one_worker_runs_jobs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = WorkQueue::new(1, 3).unwrap();
        for id in 0..50 {
            queue.push(RecordJob {
                id,
                log: log.clone(),
            });
        }
        drop(queue);

        assert_eq!(*log.lock(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn try_push_hands_back_rejected_jobs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = WorkQueue::new(2, 1).unwrap();
        for id in 0..100 {
            let mut job = RecordJob {
                id,
                log: log.clone(),
            };
            loop {
                match queue.try_push(job) {
                    Ok(()) => break,
                    Err(back) => {
                        assert_eq!(back.id, id);
                        job = back;
                        thread::yield_now();
                    }
                }
            }
        }
        let summary = queue.signal_completion();

        assert_eq!(summary.jobs_completed, 100);
        let mut ids = log.lock().clone();
        ids.sort_unstable();
        assert_eq!(ids, (0..100).collect::<Vec<_>>());
    }

    struct FallibleJob {
        fail: bool,
        runs: Arc<AtomicUsize>,
    }

    impl WorkItem for FallibleJob {
        fn execute(self) {
            if self.fail {
                panic!("job failed");
            }
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn worker_survives_a_panicking_job() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut queue = WorkQueue::new(1, 1).unwrap();
        for n in 0..20 {
            queue.push(FallibleJob {
                fail: n % 5 == 0,
                runs: runs.clone(),
            });
        }
        let summary = queue.signal_completion();

        assert_eq!(summary.jobs_completed, 16);
        assert_eq!(runs.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn sizes_are_clamped() {
        let mut queue = WorkQueue::<CountJob>::new(0, 0).unwrap();
        assert_eq!(queue.worker_count(), 1);
        assert_eq!(queue.signal_completion().jobs_completed, 0);
    }
}
