use crate::prelude::{DetectionError, DetectionResult};
use log::warn;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tokio::runtime::Builder;
use tokio::task::JoinSet;

/// One unit of work and the file it belongs to.
pub struct PoolTask<T> {
    pub label: PathBuf,
    pub job: Box<dyn FnOnce() -> DetectionResult<T> + Send + 'static>,
}

impl<T> PoolTask<T> {
    pub fn new<F>(label: PathBuf, job: F) -> Self
    where
        F: FnOnce() -> DetectionResult<T> + Send + 'static,
    {
        Self {
            label,
            job: Box::new(job),
        }
    }
}

/// Fixed-size pool for independent blocking jobs.
///
/// Jobs are dispatched in submission order and their results delivered in
/// completion order. An error or panic in one job is reported for that job
/// alone.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> DetectionResult<Self> {
        if workers == 0 {
            return Err(DetectionError::InvalidConfig(
                "worker pool needs at least one worker".into(),
            ));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn run<T, C>(&self, tasks: Vec<PoolTask<T>>, mut on_complete: C) -> DetectionResult<()>
    where
        T: Send + 'static,
        C: FnMut(PathBuf, DetectionResult<T>),
    {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.workers)
            .thread_name("annotation-worker")
            .build()
            .map_err(|err| DetectionError::Worker(format!("building worker pool: {err}")))?;

        runtime.block_on(async {
            let mut pending = JoinSet::new();
            for task in tasks {
                let PoolTask { label, job } = task;
                pending.spawn_blocking(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                        .unwrap_or_else(|payload| Err(DetectionError::Worker(panic_message(payload))));
                    (label, outcome)
                });
            }

            while let Some(joined) = pending.join_next().await {
                match joined {
                    Ok((label, outcome)) => on_complete(label, outcome),
                    Err(err) => warn!("annotation task did not complete: {}", err),
                }
            }
        });

        Ok(())
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {message}")
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_rejected() {
        assert!(WorkerPool::new(0).is_err());
    }

    #[test]
    fn every_task_reports_back() {
        let pool = WorkerPool::new(3).unwrap();
        let tasks = (0..10)
            .map(|index| PoolTask::new(PathBuf::from(format!("file-{index}")), move || Ok(index * 2)))
            .collect();
        let mut results = Vec::new();
        pool.run(tasks, |_, outcome| results.push(outcome.unwrap()))
            .unwrap();
        results.sort();
        assert_eq!(results, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn failures_are_isolated_per_task() {
        let pool = WorkerPool::new(2).unwrap();
        let tasks = vec![
            PoolTask::new(PathBuf::from("ok"), || Ok(1)),
            PoolTask::new(PathBuf::from("err"), || {
                Err(DetectionError::Worker("corrupt input".into()))
            }),
            PoolTask::new(PathBuf::from("panic"), || -> DetectionResult<i32> {
                panic!("unexpected schema")
            }),
            PoolTask::new(PathBuf::from("ok-too"), || Ok(2)),
        ];

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        pool.run(tasks, |label, outcome| match outcome {
            Ok(_) => succeeded.push(label),
            Err(err) => failed.push((label, err.to_string())),
        })
        .unwrap();

        succeeded.sort();
        assert_eq!(succeeded, vec![PathBuf::from("ok"), PathBuf::from("ok-too")]);
        assert_eq!(failed.len(), 2);
        assert!(failed
            .iter()
            .any(|(label, message)| label == &PathBuf::from("panic")
                && message.contains("unexpected schema")));
    }
}
