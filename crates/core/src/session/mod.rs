//! Async driver for [`RenderStage`].
//!
//! Each run is one tokio task that sleeps until the next scheduled offset,
//! advances the stage and publishes a [`RenderSnapshot`] on a watch channel.
//! The task is cancellable and never outlives its [`RenderSession`].

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::{sync::watch, task::JoinHandle, time::Instant};

use crate::{
    config::RenderTiming,
    render::{RenderSnapshot, RenderStage, RenderStatus, StartOutcome},
    timeline::PlaybackClock,
    DirectorsChairError, Result,
};

struct Shared {
    stage: RenderStage,
    snapshots: watch::Sender<RenderSnapshot>,
}

impl Shared {
    fn publish(&self) {
        self.snapshots.send_replace(self.stage.snapshot());
    }
}

pub struct RenderSession {
    shared: Arc<Mutex<Shared>>,
    task: Option<JoinHandle<()>>,
}

impl RenderSession {
    pub fn new(timing: RenderTiming) -> Self {
        let stage = RenderStage::new(timing);
        let (snapshots, _) = watch::channel(stage.snapshot());
        Self {
            shared: Arc::new(Mutex::new(Shared { stage, snapshots })),
            task: None,
        }
    }

    /// Starts a run on the current tokio runtime.
    ///
    /// Ignored while a run is still developing. Must be called from within a
    /// runtime context.
    pub fn start(&mut self) -> Result<StartOutcome> {
        let run = {
            let mut shared = lock(&self.shared)?;
            if shared.stage.start() == StartOutcome::AlreadyRunning {
                return Ok(StartOutcome::AlreadyRunning);
            }
            shared.publish();
            shared.stage.run()
        };

        if let Some(previous) = self.task.take() {
            previous.abort();
        }
        let started_at = Instant::now();
        self.task = Some(tokio::spawn(drive(self.shared.clone(), run, started_at)));
        Ok(StartOutcome::Started)
    }

    /// Stops the in-flight run, if any, and returns the stage to `IDLE`.
    pub fn cancel(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let mut shared = lock(&self.shared)?;
        if shared.stage.status() == RenderStatus::Developing {
            tracing::info!(run = shared.stage.run(), "render cancelled");
        }
        shared.stage.reset();
        shared.publish();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<RenderSnapshot> {
        Ok(lock(&self.shared)?.stage.snapshot())
    }

    pub fn status(&self) -> Result<RenderStatus> {
        Ok(lock(&self.shared)?.stage.status())
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> Result<watch::Receiver<RenderSnapshot>> {
        Ok(lock(&self.shared)?.snapshots.subscribe())
    }

    /// Resolves with the final snapshot once the current run leaves
    /// `DEVELOPING`, either by finishing or by being cancelled.
    pub async fn settled(&self) -> Result<RenderSnapshot> {
        let mut rx = self.subscribe()?;
        let snapshot = rx
            .wait_for(|snapshot| snapshot.status != RenderStatus::Developing)
            .await
            .map_err(|_| DirectorsChairError::msg("render session has shut down"))?;
        Ok(snapshot.clone())
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(RenderTiming::default())
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("active", &self.task.as_ref().map(|t| !t.is_finished()))
            .finish()
    }
}

async fn drive(shared: Arc<Mutex<Shared>>, run: u64, started_at: Instant) {
    loop {
        let deadline = {
            let Ok(shared) = shared.lock() else { return };
            if shared.stage.run() != run {
                return;
            }
            match shared.stage.next_deadline() {
                Some(deadline) => deadline,
                None => return,
            }
        };

        tokio::time::sleep_until(started_at + deadline).await;

        let Ok(mut shared) = shared.lock() else { return };
        if shared.stage.run() != run {
            return;
        }
        let clock = PlaybackClock::at(started_at.elapsed());
        if !shared.stage.advance(&clock).is_empty() {
            shared.publish();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> Result<MutexGuard<'_, Shared>> {
    shared
        .lock()
        .map_err(|_| DirectorsChairError::msg("render stage has been poisoned"))
}
