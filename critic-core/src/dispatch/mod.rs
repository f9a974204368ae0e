//! Task dispatch
//!
//! Submissions are recorded as pending and pushed onto an in-process queue.
//! A fixed pool of tokio workers drains the queue, serving each task from the
//! cache when possible and running the [`Analyzer`] otherwise. Transient
//! failures are retried after a fixed delay.

mod retry;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::model::{AnalysisRequest, AnalysisResult, TaskId, TaskStatus};
use crate::store::{CacheStore, Stores};
use crate::{Error, Result};

pub use retry::RetryPolicy;
use worker::{Job, Worker};

const RESULTS_NOT_FOUND: &str = "Results not found or task not completed.";

/// Worker pool sizing and timing
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub workers: usize,
    pub retry: RetryPolicy,
    pub cache_ttl: Duration,
    pub purge_interval: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.server.workers,
            retry: config.retry.clone().into(),
            cache_ttl: config.cache.ttl,
            purge_interval: config.cache.purge_interval,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Handle for submitting tasks and querying their progress
#[derive(Clone)]
pub struct Dispatcher {
    queue: mpsc::UnboundedSender<Job>,
    stores: Stores,
    shutdown: Arc<watch::Sender<bool>>,
    handles: Arc<std::sync::Mutex<Vec<JoinHandle<()>>>>,
}

impl Dispatcher {
    /// Start the worker pool and the cache purge loop
    ///
    /// Tasks a previous process left unfinished are marked failed first,
    /// since the queue they were waiting in did not survive.
    pub async fn start(analyzer: Analyzer, stores: Stores, settings: DispatchSettings) -> Self {
        match stores.tasks.fail_interrupted().await {
            Ok(0) => {}
            Ok(count) => warn!(count, "Marked interrupted tasks as failed"),
            Err(e) => warn!(error = %e, "Failed to recover interrupted tasks"),
        }

        let (queue, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let (shutdown, shutdown_rx) = watch::channel(false);

        let workers = settings.workers.max(1);
        let mut handles = Vec::with_capacity(workers + 1);
        for index in 0..workers {
            let worker = Worker {
                index,
                analyzer: analyzer.clone(),
                stores: stores.clone(),
                retry: settings.retry,
                cache_ttl: settings.cache_ttl,
                queue: receiver.clone(),
                requeue: queue.clone(),
                shutdown: shutdown_rx.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }
        handles.push(spawn_cache_purger(
            stores.cache.clone(),
            settings.purge_interval,
            shutdown_rx,
        ));

        info!(
            workers,
            max_retries = settings.retry.max_retries,
            retry_delay = ?settings.retry.delay,
            cache_ttl = ?settings.cache_ttl,
            "Dispatcher started"
        );

        Self {
            queue,
            stores,
            shutdown: Arc::new(shutdown),
            handles: Arc::new(std::sync::Mutex::new(handles)),
        }
    }

    /// Record a task as pending and enqueue it; returns without waiting
    pub async fn submit(&self, request: AnalysisRequest) -> Result<TaskId> {
        if self.queue.is_closed() {
            return Err(Error::Queue("task queue is closed".to_string()));
        }

        let id = TaskId::generate();
        self.stores.tasks.create_task(&id, &request).await?;

        info!(
            task_id = %id,
            repo = %request.repo_url,
            pr = request.pr_number,
            "Task submitted"
        );

        let job = Job {
            id: id.clone(),
            request,
            attempt: 1,
        };
        if self.queue.send(job).is_err() {
            let err = Error::Queue("task queue is closed".to_string());
            let message = err.to_string();
            if let Err(e) = self
                .stores
                .tasks
                .update_task(&id, TaskStatus::Failed, 0, Some(&message))
                .await
            {
                warn!(task_id = %id, error = %e, "Failed to record task status");
            }
            return Err(err);
        }

        Ok(id)
    }

    /// Current status; ids the store does not know report `unknown`
    pub async fn status(&self, id: &TaskId) -> TaskStatus {
        match self.stores.tasks.get_task(id).await {
            Ok(Some(record)) => record.status,
            Ok(None) => TaskStatus::Unknown,
            Err(e) => {
                warn!(task_id = %id, error = %e, "Failed to read task status");
                TaskStatus::Unknown
            }
        }
    }

    /// Stored result of a completed task
    pub async fn results(&self, id: &TaskId) -> Result<AnalysisResult> {
        self.stores
            .results
            .get_result(id)
            .await?
            .ok_or_else(|| Error::NotFound(RESULTS_NOT_FOUND.to_string()))
    }

    /// Stop the workers and wait for them to exit
    ///
    /// Jobs still queued are dropped; afterwards `submit` fails with
    /// [`Error::Queue`].
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);

        let handles: Vec<_> = match self.handles.lock() {
            Ok(mut handles) => handles.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker exited abnormally");
            }
        }
        info!("Dispatcher stopped");
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.queue.is_closed())
            .finish_non_exhaustive()
    }
}

/// Periodically drop expired cache entries
fn spawn_cache_purger(
    cache: Arc<dyn CacheStore>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if every.is_zero() {
            return;
        }

        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }

            match cache.purge_expired().await {
                Ok(purged) => debug!(purged, "Cache purge finished"),
                Err(e) => warn!(error = %e, "Cache purge failed"),
            }
        }
    })
}
