//! Staged render simulator.
//!
//! A run walks `IDLE -> DEVELOPING -> DONE`, emitting a canned engine log at a
//! fixed pace and finally exposing a fixed set of shot records. Time is passed
//! in through a [`PlaybackClock`] measured from the start of the run, so the
//! state machine itself never sleeps. See [`crate::session`] for the async
//! driver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::RenderTiming,
    timeline::{PlaybackClock, ScheduledEvent, Scheduler},
};

/// Engine log played back during every run, in order.
pub const RENDER_LOG: [&str; 6] = [
    "Initializing FIBO Neural Engine...",
    "Parsing JSON constraints...",
    "Locking Camera: 35mm / f1.8...",
    "Calculating Lightmaps (Raytracing)...",
    "Applying Color Palette: 'Noir'...",
    "Rendering Final Output...",
];

const SHOT_ISO: u16 = 400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderStatus {
    #[default]
    Idle,
    Developing,
    Done,
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderStatus::Idle => "IDLE",
            RenderStatus::Developing => "DEVELOPING",
            RenderStatus::Done => "DONE",
        })
    }
}

/// One entry of the result grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub id: u8,
    pub label: String,
    pub lens: String,
    pub iso: u16,
}

impl ShotRecord {
    fn new(id: u8, label: &str, lens: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            lens: lens.to_string(),
            iso: SHOT_ISO,
        }
    }
}

/// The fixed results every run ends with. They do not depend on the scene
/// configuration.
pub fn mock_shots() -> Vec<ShotRecord> {
    vec![
        ShotRecord::new(1, "Front View", "35mm"),
        ShotRecord::new(2, "Side Profile", "50mm"),
        ShotRecord::new(3, "Cinematic Close", "85mm"),
        ShotRecord::new(4, "Wide Angle", "16mm"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEvent {
    Log(String),
    Done,
}

/// Builds the run schedule: log line `i` at `i * log_interval`, completion
/// `settle_delay` after the last line.
pub fn render_schedule(timing: &RenderTiming) -> Vec<ScheduledEvent<RenderEvent>> {
    let interval = timing.log_interval();
    let mut events: Vec<_> = RENDER_LOG
        .iter()
        .enumerate()
        .map(|(index, line)| {
            ScheduledEvent::new(interval * index as u32, RenderEvent::Log(line.to_string()))
        })
        .collect();
    let last = interval * (RENDER_LOG.len() as u32 - 1);
    events.push(ScheduledEvent::new(
        last + timing.settle_delay(),
        RenderEvent::Done,
    ));
    events
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A run is still developing; the request was ignored.
    AlreadyRunning,
}

/// Observable state of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Sequence number of the run, `0` before the first start.
    pub run: u64,
    pub status: RenderStatus,
    pub log_lines: Vec<String>,
    pub results: Vec<ShotRecord>,
}

#[derive(Debug, Clone)]
pub struct RenderStage {
    timing: RenderTiming,
    status: RenderStatus,
    run: u64,
    log_lines: Vec<String>,
    results: Vec<ShotRecord>,
    scheduler: Scheduler<RenderEvent>,
}

impl Default for RenderStage {
    fn default() -> Self {
        Self::new(RenderTiming::default())
    }
}

impl RenderStage {
    pub fn new(timing: RenderTiming) -> Self {
        Self {
            timing,
            status: RenderStatus::Idle,
            run: 0,
            log_lines: Vec::new(),
            results: Vec::new(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn status(&self) -> RenderStatus {
        self.status
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    pub fn results(&self) -> &[ShotRecord] {
        &self.results
    }

    pub fn timing(&self) -> &RenderTiming {
        &self.timing
    }

    /// Begins a new run. Nothing is emitted until the first [`advance`].
    ///
    /// Starting from `DONE` discards the previous run's output. Starting while
    /// `DEVELOPING` is ignored.
    ///
    /// [`advance`]: RenderStage::advance
    pub fn start(&mut self) -> StartOutcome {
        if self.status == RenderStatus::Developing {
            tracing::warn!(run = self.run, "render already in progress; start ignored");
            return StartOutcome::AlreadyRunning;
        }

        self.run += 1;
        self.status = RenderStatus::Developing;
        self.log_lines.clear();
        self.results.clear();
        self.scheduler.set_events(render_schedule(&self.timing));
        tracing::info!(run = self.run, "render started");
        StartOutcome::Started
    }

    /// Applies every event due at `clock` (time since start) and returns them.
    pub fn advance(&mut self, clock: &PlaybackClock) -> Vec<RenderEvent> {
        if self.status != RenderStatus::Developing {
            return Vec::new();
        }

        let due = self.scheduler.drain_due(clock);
        for event in &due {
            match event {
                RenderEvent::Log(line) => {
                    tracing::debug!(run = self.run, line = line.as_str(), "render log");
                    self.log_lines.push(line.clone());
                }
                RenderEvent::Done => {
                    self.status = RenderStatus::Done;
                    self.results = mock_shots();
                    tracing::info!(run = self.run, shots = self.results.len(), "render finished");
                }
            }
        }
        due
    }

    /// Time since start at which the next event fires, while developing.
    pub fn next_deadline(&self) -> Option<std::time::Duration> {
        if self.status == RenderStatus::Developing {
            self.scheduler.next_deadline()
        } else {
            None
        }
    }

    /// Returns to `IDLE`, dropping output and any pending events.
    ///
    /// The run number is kept. A driver task still holding this run number
    /// finds no pending deadline once the stage is idle and exits on its
    /// own; only [`start`](RenderStage::start) hands out a new number.
    pub fn reset(&mut self) {
        self.status = RenderStatus::Idle;
        self.log_lines.clear();
        self.results.clear();
        self.scheduler.clear();
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            run: self.run,
            status: self.status,
            log_lines: self.log_lines.clone(),
            results: self.results.clone(),
        }
    }
}
