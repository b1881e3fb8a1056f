//! Timer driven polling of the backend for one screen.
//!
//! A monitor owns a single task that holds the view state. Fetches run in a
//! [`JoinSet`] owned by that task and report back to it; only the task writes
//! the view, which it publishes over a [`watch`] channel. Stopping the monitor
//! aborts the task and every fetch it started, so a response arriving after
//! the screen went away is never applied.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant};

use crate::configs::Polling;
use crate::error::{Error, Result};

pub mod dashboard;
pub mod parking;

pub use dashboard::{DashboardScreen, DashboardSnapshot};
pub use parking::{ParkingScreen, ParkingSnapshot, Spot, SpotIndicator};

/// Text shown in place of a metric that could not be fetched.
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Displaying,
    ErrorDisplayed,
}

#[async_trait]
pub trait Screen: Send + Sync + 'static {
    type Snapshot: Clone + fmt::Debug + Send + Sync + 'static;

    const NAME: &'static str;

    /// Snapshot shown before the first fetch completes.
    fn initial(&self) -> Self::Snapshot;

    async fn fetch(&self, previous: Self::Snapshot) -> Result<Self::Snapshot>;

    /// Snapshot shown after a failed fetch.
    fn on_error(&self, previous: &Self::Snapshot, error: &Error) -> Self::Snapshot;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState<T> {
    pub state: PollState,
    pub snapshot: T,
    /// Seconds since the last successful fetch, `None` while the indicator is hidden.
    pub seconds_since_update: Option<u64>,
    pub error: Option<String>,
}

impl<T> ScreenState<T> {
    fn idle(snapshot: T) -> Self {
        Self {
            state: PollState::Idle,
            snapshot,
            seconds_since_update: None,
            error: None,
        }
    }

    /// Age of the displayed data, shown only while a successful fetch is on screen.
    pub fn elapsed_label(&self) -> Option<String> {
        match self.state {
            PollState::Displaying => self.seconds_since_update.map(elapsed_label),
            _ => None,
        }
    }
}

/// Human readable age of the displayed data.
pub fn elapsed_label(seconds: u64) -> String {
    match seconds {
        0 => "Just now".to_string(),
        1 => "1 second".to_string(),
        2..=59 => format!("{seconds} seconds"),
        60..=119 => "1 minute".to_string(),
        _ => format!("{} minutes", seconds / 60),
    }
}

enum Command {
    Refresh,
}

/// Owner side of a running monitor. Dropping it stops the monitor.
pub struct MonitorHandle<T> {
    receiver: watch::Receiver<ScreenState<T>>,
    commands: mpsc::UnboundedSender<Command>,
    stopped: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl<T: Clone> MonitorHandle<T> {
    pub fn subscribe(&self) -> watch::Receiver<ScreenState<T>> {
        self.receiver.clone()
    }

    pub fn current(&self) -> ScreenState<T> {
        self.receiver.borrow().clone()
    }

    /// Requests an immediate one-shot fetch. Returns `false` once stopped.
    pub fn refresh(&self) -> bool {
        self.is_active() && self.commands.send(Command::Refresh).is_ok()
    }

    pub fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::Acquire) && !self.task.is_finished()
    }

    /// Cancels both recurring tasks and any fetch in flight.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.task.abort();
        }
    }
}

impl<T> Drop for MonitorHandle<T> {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.task.abort();
    }
}

pub struct Monitor<S: Screen> {
    screen: Arc<S>,
    polling: Polling,
    view: ScreenState<S::Snapshot>,
    fetches: JoinSet<Result<S::Snapshot>>,
}

impl<S: Screen> Monitor<S> {
    /// Starts polling `screen`: one fetch right away, then one per refresh period.
    pub fn start(screen: S, polling: &Polling) -> MonitorHandle<S::Snapshot> {
        let view = ScreenState::idle(screen.initial());
        let (publisher, receiver) = watch::channel(view.clone());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let monitor = Self {
            screen: Arc::new(screen),
            polling: polling.at_least_one_second(),
            view,
            fetches: JoinSet::new(),
        };

        tracing::info!("{} screen started", S::NAME);

        let task = tokio::spawn(monitor.run(publisher, command_rx));

        MonitorHandle {
            receiver,
            commands,
            stopped: Arc::new(AtomicBool::new(false)),
            task,
        }
    }

    async fn run(
        mut self,
        publisher: watch::Sender<ScreenState<S::Snapshot>>,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        let now = Instant::now();
        let refresh_period = self.polling.refresh_period();
        let tick_period = self.polling.tick_period();
        let mut refresh = time::interval_at(now + refresh_period, refresh_period);
        let mut ticker = time::interval_at(now + tick_period, tick_period);

        self.begin_fetch();
        publisher.send_replace(self.view.clone());

        loop {
            tokio::select! {
                biased;

                Some(joined) = self.fetches.join_next() => match joined {
                    Ok(Ok(snapshot)) => {
                        self.view.state = PollState::Displaying;
                        self.view.snapshot = snapshot;
                        self.view.seconds_since_update = Some(0);
                        self.view.error = None;
                        ticker.reset();
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("{} refresh failed: {}", S::NAME, e);

                        self.view.state = PollState::ErrorDisplayed;
                        self.view.snapshot = self.screen.on_error(&self.view.snapshot, &e);
                        self.view.seconds_since_update = None;
                        self.view.error = Some(e.to_string());
                    }
                    Err(e) if e.is_cancelled() => continue,
                    Err(e) => {
                        tracing::error!("{} fetch task failed: {}", S::NAME, e);
                        continue;
                    }
                },
                Some(Command::Refresh) = commands.recv() => self.begin_fetch(),
                _ = refresh.tick() => self.begin_fetch(),
                _ = ticker.tick() => match self.view.seconds_since_update.as_mut() {
                    Some(seconds) => *seconds += self.polling.tick_interval,
                    None => continue,
                },
            }

            publisher.send_replace(self.view.clone());
        }
    }

    /// Starts a fetch, superseding any still in flight.
    fn begin_fetch(&mut self) {
        self.fetches.abort_all();

        let screen = Arc::clone(&self.screen);
        let previous = self.view.snapshot.clone();
        self.fetches.spawn(async move { screen.fetch(previous).await });

        self.view.state = PollState::Fetching;
    }
}

impl<S: Screen> Drop for Monitor<S> {
    fn drop(&mut self) {
        tracing::info!("{} screen stopped", S::NAME);
    }
}
