// Work Manager - runs named unique chains of work requests
//
// One runner task per enqueued chain. Stages run strictly in order, each
// stage's output is overlaid on the next stage's input, and every state
// transition is published as a ChainSnapshot on a watch channel.

use crate::application::worker::constants::{CONSTRAINT_POLL_INTERVAL, DEFAULT_MIN_FREE_STORAGE_MB};
use crate::application::worker::{
    cancellation_channel, CancellationSender, CancellationToken, Worker, WorkerParameters,
};
use crate::domain::{ChainSnapshot, WorkData, WorkInfo, WorkResult};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, SystemProbe};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Conditions that must hold before a request starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub requires_storage_not_low: bool,
}

/// One stage of a chain: a worker plus its own input and tags
#[derive(Clone)]
pub struct WorkRequest {
    worker: Arc<dyn Worker>,
    input: WorkData,
    tags: Vec<String>,
    constraints: Constraints,
}

impl WorkRequest {
    pub fn new(worker: Arc<dyn Worker>) -> Self {
        Self {
            worker,
            input: WorkData::new(),
            tags: Vec::new(),
            constraints: Constraints::default(),
        }
    }

    pub fn with_input(mut self, input: WorkData) -> Self {
        self.input = input;
        self
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// What to do when a chain with the same name is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingWorkPolicy {
    /// Cancel the running chain, then start the new one
    Replace,
    /// Leave the running chain alone and drop the new one
    Keep,
}

/// Result of enqueueing a unique chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Started { run: u64 },
    /// The existing run was kept; nothing new was started
    Kept { run: u64 },
}

impl EnqueueOutcome {
    pub fn run(self) -> u64 {
        match self {
            EnqueueOutcome::Started { run } | EnqueueOutcome::Kept { run } => run,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkManagerConfig {
    pub constraint_poll_interval: Duration,
    pub min_free_storage_mb: u64,
}

impl Default for WorkManagerConfig {
    fn default() -> Self {
        Self {
            constraint_poll_interval: CONSTRAINT_POLL_INTERVAL,
            min_free_storage_mb: DEFAULT_MIN_FREE_STORAGE_MB,
        }
    }
}

struct ActiveRun {
    run: u64,
    cancel: CancellationSender,
    handle: JoinHandle<()>,
}

/// Per-name state: the published snapshot and the current runner
struct ChainSlot {
    snapshot: Arc<watch::Sender<ChainSnapshot>>,
    active: tokio::sync::Mutex<Option<ActiveRun>>,
}

/// Builder returned by `WorkManager::begin_unique_work`
pub struct WorkContinuation<'a> {
    manager: &'a WorkManager,
    name: String,
    policy: ExistingWorkPolicy,
    requests: Vec<WorkRequest>,
}

impl<'a> WorkContinuation<'a> {
    /// Append a stage that runs after the previous one succeeds
    pub fn then(mut self, request: WorkRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub async fn enqueue(self) -> Result<EnqueueOutcome> {
        self.manager
            .enqueue_chain(&self.name, self.policy, self.requests)
            .await
    }
}

/// In-process work scheduler for unique named chains
pub struct WorkManager {
    system_probe: Arc<dyn SystemProbe>,
    id_provider: Arc<dyn IdProvider>,
    config: WorkManagerConfig,
    chains: Mutex<HashMap<String, Arc<ChainSlot>>>,
}

impl WorkManager {
    pub fn new(
        system_probe: Arc<dyn SystemProbe>,
        id_provider: Arc<dyn IdProvider>,
        config: WorkManagerConfig,
    ) -> Self {
        Self {
            system_probe,
            id_provider,
            config,
            chains: Mutex::new(HashMap::new()),
        }
    }

    /// Start building a unique chain named `name`
    pub fn begin_unique_work(
        &self,
        name: impl Into<String>,
        policy: ExistingWorkPolicy,
        first: WorkRequest,
    ) -> WorkContinuation<'_> {
        WorkContinuation {
            manager: self,
            name: name.into(),
            policy,
            requests: vec![first],
        }
    }

    /// Watch the snapshots of chain `name` (Idle until something is enqueued)
    pub fn observe(&self, name: &str) -> Result<watch::Receiver<ChainSnapshot>> {
        Ok(self.slot(name)?.snapshot.subscribe())
    }

    pub fn snapshot(&self, name: &str) -> Result<ChainSnapshot> {
        let slot = self.slot(name)?;
        let snapshot = slot.snapshot.borrow().clone();
        Ok(snapshot)
    }

    /// Every stage of every known chain carrying `tag`
    pub fn work_infos_by_tag(&self, tag: &str) -> Result<Vec<WorkInfo>> {
        let chains = self.chains_guard()?;
        Ok(chains
            .values()
            .flat_map(|slot| {
                slot.snapshot
                    .borrow()
                    .stages
                    .iter()
                    .filter(|s| s.has_tag(tag))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    /// Cancel the running chain `name`, if any, and wait until its
    /// remaining stages are marked Cancelled
    pub async fn cancel_unique_work(&self, name: &str) -> Result<()> {
        let slot = self.slot(name)?;
        let mut active = slot.active.lock().await;
        if let Some(current) = active.take() {
            info!(chain = %name, run = current.run, "Cancelling chain");
            Self::stop(current).await;
        }
        Ok(())
    }

    /// Wait until run `run` of chain `name` is finished (or superseded)
    pub async fn wait_for_run(&self, name: &str, run: u64) -> Result<ChainSnapshot> {
        let mut rx = self.observe(name)?;
        let snapshot = rx
            .wait_for(|s| s.run > run || (s.run == run && s.status().is_finished()))
            .await
            .map_err(|_| AppError::Internal(format!("chain {name} is gone")))?
            .clone();
        Ok(snapshot)
    }

    async fn enqueue_chain(
        &self,
        name: &str,
        policy: ExistingWorkPolicy,
        requests: Vec<WorkRequest>,
    ) -> Result<EnqueueOutcome> {
        let slot = self.slot(name)?;
        let mut active = slot.active.lock().await;

        if let Some(current) = active.take() {
            // The final snapshot is published just before the runner task returns
            let published_finished = {
                let snap = slot.snapshot.borrow();
                snap.run == current.run && snap.status().is_finished()
            };
            if !current.handle.is_finished() && !published_finished {
                match policy {
                    ExistingWorkPolicy::Keep => {
                        let run = current.run;
                        info!(chain = %name, run, "Chain already running, keeping it");
                        *active = Some(current);
                        return Ok(EnqueueOutcome::Kept { run });
                    }
                    ExistingWorkPolicy::Replace => {
                        info!(chain = %name, run = current.run, "Replacing running chain");
                        Self::stop(current).await;
                    }
                }
            }
        }

        let run = slot.snapshot.borrow().run + 1;
        let stages: Vec<WorkInfo> = requests
            .iter()
            .map(|r| WorkInfo::new(self.id_provider.generate_id(), r.worker.name(), r.tags.clone()))
            .collect();
        slot.snapshot.send_replace(ChainSnapshot {
            name: name.to_string(),
            run,
            stages,
        });

        let (cancel, token) = cancellation_channel();
        let runner = ChainRunner {
            name: name.to_string(),
            run,
            requests,
            snapshot: Arc::clone(&slot.snapshot),
            system_probe: Arc::clone(&self.system_probe),
            config: self.config.clone(),
            token,
        };
        let handle = tokio::spawn(runner.run());
        info!(chain = %name, run, "Chain enqueued");

        *active = Some(ActiveRun { run, cancel, handle });
        Ok(EnqueueOutcome::Started { run })
    }

    async fn stop(current: ActiveRun) {
        current.cancel.cancel();
        if let Err(e) = current.handle.await {
            error!(run = current.run, error = %e, "Chain runner did not stop cleanly");
        }
    }

    fn slot(&self, name: &str) -> Result<Arc<ChainSlot>> {
        let mut chains = self.chains_guard()?;
        let slot = chains.entry(name.to_string()).or_insert_with(|| {
            let (tx, _rx) = watch::channel(ChainSnapshot::idle(name));
            Arc::new(ChainSlot {
                snapshot: Arc::new(tx),
                active: tokio::sync::Mutex::new(None),
            })
        });
        Ok(Arc::clone(slot))
    }

    fn chains_guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Arc<ChainSlot>>>> {
        self.chains
            .lock()
            .map_err(|_| AppError::Internal("work manager state poisoned".to_string()))
    }
}

/// Drives one run of a chain to completion
struct ChainRunner {
    name: String,
    run: u64,
    requests: Vec<WorkRequest>,
    snapshot: Arc<watch::Sender<ChainSnapshot>>,
    system_probe: Arc<dyn SystemProbe>,
    config: WorkManagerConfig,
    token: CancellationToken,
}

impl ChainRunner {
    async fn run(mut self) {
        let mut previous_output = WorkData::new();
        let requests = std::mem::take(&mut self.requests);

        for (index, request) in requests.into_iter().enumerate() {
            let stage = request.worker.name();
            if self.token.is_cancelled() {
                self.finish_remaining(index, Finish::Cancelled);
                return;
            }

            if request.constraints.requires_storage_not_low && !self.wait_for_storage(index).await {
                self.finish_remaining(index, Finish::Cancelled);
                return;
            }

            let work_id = self.update(index, |info| info.start());
            debug!(chain = %self.name, run = self.run, stage, "Stage started");

            let params = WorkerParameters {
                id: work_id,
                input: request.input.merged(&previous_output),
                cancellation: self.token.clone(),
            };
            let worker = Arc::clone(&request.worker);
            let mut handle = tokio::spawn(async move { worker.do_work(params).await });

            let joined = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                joined = &mut handle => Some(joined),
            };
            let Some(joined) = joined else {
                handle.abort();
                info!(chain = %self.name, run = self.run, stage, "Stage cancelled");
                self.finish_remaining(index, Finish::Cancelled);
                return;
            };

            match joined {
                Ok(WorkResult::Success(output)) => {
                    info!(chain = %self.name, run = self.run, stage, "Stage succeeded");
                    self.update(index, |info| info.succeed(output.clone()));
                    previous_output = output;
                }
                Ok(WorkResult::Failure) => {
                    warn!(chain = %self.name, run = self.run, stage, "Stage failed");
                    self.finish_remaining(index, Finish::Failed);
                    return;
                }
                Err(e) => {
                    error!(
                        chain = %self.name,
                        run = self.run,
                        stage,
                        error = %e,
                        "Stage panicked"
                    );
                    self.finish_remaining(index, Finish::Failed);
                    return;
                }
            }
        }
        info!(chain = %self.name, run = self.run, "Chain finished");
    }

    /// Block stage `index` until storage is not low. false if cancelled.
    async fn wait_for_storage(&mut self, index: usize) -> bool {
        loop {
            if !self
                .system_probe
                .is_storage_low(self.config.min_free_storage_mb)
                .await
            {
                return true;
            }
            self.update(index, |info| info.block());
            debug!(chain = %self.name, run = self.run, "Storage low, stage blocked");
            if !self.token.sleep(self.config.constraint_poll_interval).await {
                return false;
            }
        }
    }

    /// Apply `transition` to stage `index` and publish. Snapshots of a newer
    /// run are left untouched. Returns the stage's work id.
    fn update<F>(&self, index: usize, transition: F) -> String
    where
        F: FnOnce(&mut WorkInfo) -> crate::domain::error::Result<()>,
    {
        let mut work_id = String::new();
        let run = self.run;
        self.snapshot.send_if_modified(|snap| {
            if snap.run != run {
                return false;
            }
            let Some(info) = snap.stages.get_mut(index) else {
                return false;
            };
            work_id = info.id.clone();
            match transition(&mut *info) {
                Ok(()) => true,
                Err(e) => {
                    warn!(run, stage = %info.stage, error = %e, "Ignored stage transition");
                    false
                }
            }
        });
        work_id
    }

    /// Mark stage `from` and every later unfinished stage
    fn finish_remaining(&self, from: usize, how: Finish) {
        let run = self.run;
        self.snapshot.send_if_modified(|snap| {
            if snap.run != run {
                return false;
            }
            let mut modified = false;
            for info in snap.stages.iter_mut().skip(from) {
                if info.state.is_finished() {
                    continue;
                }
                let res = match how {
                    Finish::Failed => info.fail(),
                    Finish::Cancelled => info.cancel(),
                };
                modified |= res.is_ok();
            }
            modified
        });
    }
}

#[derive(Clone, Copy)]
enum Finish {
    Failed,
    Cancelled,
}
