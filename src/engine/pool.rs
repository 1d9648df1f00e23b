//! Bounded-concurrency job execution
//!
//! Every submitted job is attempted and produces exactly one `JobResult`,
//! even when a sibling fails or panics. Results are observed in completion
//! order and returned in submission order.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::domain::errors::DomainError;

/// Stable key used to correlate a result with its unit of work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobIdentity {
    pub file: String,
    /// 1-based unit number within the file, when the file is split up
    pub unit: Option<usize>,
}

impl JobIdentity {
    pub fn file(file: &str) -> Self {
        Self {
            file: file.to_string(),
            unit: None,
        }
    }

    pub fn unit(file: &str, unit: usize) -> Self {
        Self {
            file: file.to_string(),
            unit: Some(unit),
        }
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{}#{}", self.file, unit),
            None => f.write_str(&self.file),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job<T> {
    pub identity: JobIdentity,
    pub payload: T,
}

impl<T> Job<T> {
    pub fn new(identity: JobIdentity, payload: T) -> Self {
        Self { identity, payload }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobResult<O> {
    pub identity: JobIdentity,
    pub outcome: Result<O, DomainError>,
}

impl<O> JobResult<O> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs independent jobs with at most `max_concurrency` in flight
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_concurrency: usize,
}

impl WorkerPool {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Never more workers than there are units to run
    pub fn for_units(configured: usize, units: usize) -> Self {
        Self::new(configured.min(units))
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn run<T, O, F, Fut, C>(
        &self,
        jobs: Vec<Job<T>>,
        work: F,
        mut on_result: C,
    ) -> Vec<JobResult<O>>
    where
        T: Send + 'static,
        O: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, DomainError>> + Send + 'static,
        C: FnMut(&JobResult<O>),
    {
        let identities: Vec<JobIdentity> = jobs.iter().map(|j| j.identity.clone()).collect();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, JobResult<O>)>();

        debug!(jobs = identities.len(), workers = self.max_concurrency, "Dispatching jobs");

        for (index, job) in jobs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            let tx = tx.clone();

            tokio::spawn(async move {
                let Job { identity, payload } = job;
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        // inner task so a panic surfaces as a JoinError here
                        match tokio::spawn(async move { work(payload).await }).await {
                            Ok(outcome) => outcome,
                            Err(e) => {
                                warn!(job = %identity, "Worker panicked: {}", e);
                                Err(DomainError::tool(&format!("worker panicked: {}", e)))
                            }
                        }
                    }
                    Err(_) => Err(DomainError::tool("worker pool closed")),
                };
                let _ = tx.send((index, JobResult { identity, outcome }));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<JobResult<O>>> = identities.iter().map(|_| None).collect();
        while let Some((index, result)) = rx.recv().await {
            on_result(&result);
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .zip(identities)
            .map(|(slot, identity)| {
                slot.unwrap_or_else(|| JobResult {
                    identity,
                    outcome: Err(DomainError::tool("worker lost before reporting")),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn jobs(count: usize) -> Vec<Job<usize>> {
        (1..=count)
            .map(|n| Job::new(JobIdentity::unit("clip.mp4", n), n))
            .collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_concurrency_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));

        let mut seen = Vec::new();
        let results = WorkerPool::new(2)
            .run(
                jobs(5),
                move |n| {
                    let (active, peak) = (Arc::clone(&a), Arc::clone(&p));
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        // later jobs finish first
                        tokio::time::sleep(Duration::from_millis(60 - 10 * n as u64)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        if n == 3 {
                            Err(DomainError::tool("job 3 failed"))
                        } else {
                            Ok(n * 10)
                        }
                    }
                },
                |result| seen.push(result.identity.unit),
            )
            .await;

        assert_eq!(results.len(), 5);
        assert_eq!(seen.len(), 5);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.identity.unit, Some(i + 1));
            if i + 1 == 3 {
                assert_eq!(result.outcome, Err(DomainError::ToolFail("job 3 failed".into())));
            } else {
                assert_eq!(result.outcome, Ok((i + 1) * 10));
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_job_becomes_failure() {
        let results = WorkerPool::new(3)
            .run(
                jobs(3),
                |n| async move {
                    if n == 2 {
                        panic!("decoder exploded");
                    }
                    Ok(n)
                },
                |_| {},
            )
            .await;

        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let results: Vec<JobResult<()>> = WorkerPool::new(4).run(Vec::<Job<()>>::new(), |_| async { Ok(()) }, |_| {}).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_units_cap_workers() {
        assert_eq!(WorkerPool::for_units(8, 3).max_concurrency(), 3);
        assert_eq!(WorkerPool::for_units(2, 10).max_concurrency(), 2);
        assert_eq!(WorkerPool::for_units(4, 0).max_concurrency(), 1);
        assert_eq!(JobIdentity::unit("a.mp4", 2).to_string(), "a.mp4#2");
    }
}
