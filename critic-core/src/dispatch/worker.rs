//! Queue consumer: one task at a time, cache first, retry on transient failure

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

use super::retry::RetryPolicy;
use crate::analysis::Analyzer;
use crate::model::{AnalysisRequest, TaskId, TaskStatus};
use crate::store::{CacheKey, Stores};
use crate::{Error, Result};

/// A queued unit of work
#[derive(Debug)]
pub(super) struct Job {
    pub id: TaskId,
    pub request: AnalysisRequest,
    /// 1-based attempt number
    pub attempt: u32,
}

pub(super) type JobQueue = Arc<Mutex<mpsc::UnboundedReceiver<Job>>>;

pub(super) struct Worker {
    pub index: usize,
    pub analyzer: Analyzer,
    pub stores: Stores,
    pub retry: RetryPolicy,
    pub cache_ttl: Duration,
    pub queue: JobQueue,
    pub requeue: mpsc::UnboundedSender<Job>,
    pub shutdown: watch::Receiver<bool>,
}

impl Worker {
    /// Pull jobs until shutdown is signalled or the dispatcher goes away
    pub(super) async fn run(mut self) {
        debug!(worker = self.index, "Worker started");

        loop {
            let queue = self.queue.clone();
            let job = tokio::select! {
                _ = self.shutdown.changed() => break,
                job = async move { queue.lock().await.recv().await } => job,
            };

            match job {
                Some(job) => self.process(job).await,
                None => break,
            }
        }

        debug!(worker = self.index, "Worker stopped");
    }

    async fn process(&self, job: Job) {
        let Job { id, request, attempt } = job;

        self.set_status(&id, TaskStatus::Processing, attempt, None).await;
        info!(
            task_id = %id,
            worker = self.index,
            attempt,
            repo = %request.repo_url,
            pr = request.pr_number,
            "Processing task"
        );

        match self.execute(&id, &request).await {
            Ok(()) => {
                self.set_status(&id, TaskStatus::Completed, attempt, None).await;
                info!(task_id = %id, attempt, "Task completed");
            }
            Err(e) if self.retry.should_retry(attempt, &e) => {
                self.schedule_retry(
                    Job {
                        id,
                        request,
                        attempt: attempt + 1,
                    },
                    &e,
                );
            }
            Err(e) => {
                error!(task_id = %id, attempt, error = %e, "Task failed");
                let message = e.to_string();
                self.set_status(&id, TaskStatus::Failed, attempt, Some(&message))
                    .await;
            }
        }
    }

    /// Serve from cache or run the analysis, then record the result
    async fn execute(&self, id: &TaskId, request: &AnalysisRequest) -> Result<()> {
        let key = CacheKey::for_request(request);

        match self.stores.cache.get_cached(&key).await {
            Ok(Some(cached)) => {
                info!(task_id = %id, cache_key = %key, "Serving analysis from cache");
                self.stores.results.put_result(id, &cached).await?;
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => warn!(task_id = %id, error = %e, "Cache lookup failed, analyzing"),
        }

        let result = self.analyzer.analyze(request).await?;

        if !self.stores.results.put_result(id, &result).await? {
            debug!(task_id = %id, "Result already stored, keeping the first");
        }
        if let Err(e) = self
            .stores
            .cache
            .put_cached(&key, &result, self.cache_ttl)
            .await
        {
            warn!(task_id = %id, cache_key = %key, error = %e, "Failed to cache analysis");
        }

        Ok(())
    }

    /// Put the job back on the queue once the retry delay has passed
    fn schedule_retry(&self, job: Job, cause: &Error) {
        warn!(
            task_id = %job.id,
            next_attempt = job.attempt,
            delay = ?self.retry.delay,
            error = %cause,
            "Task failed, retrying"
        );

        let delay = self.retry.delay;
        let requeue = self.requeue.clone();
        let tasks = self.stores.tasks.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let id = job.id.clone();
            let attempts = job.attempt - 1;
            if requeue.send(job).is_err() {
                warn!(task_id = %id, "Queue closed before retry");
                let message = Error::Queue("queue closed before retry".to_string()).to_string();
                if let Err(e) = tasks
                    .update_task(&id, TaskStatus::Failed, attempts, Some(&message))
                    .await
                {
                    error!(task_id = %id, error = %e, "Failed to record task status");
                }
            }
        });
    }

    async fn set_status(&self, id: &TaskId, status: TaskStatus, attempts: u32, error: Option<&str>) {
        if let Err(e) = self
            .stores
            .tasks
            .update_task(id, status, attempts, error)
            .await
        {
            error!(task_id = %id, %status, error = %e, "Failed to record task status");
        }
    }
}
