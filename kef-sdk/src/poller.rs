//! Background poller for one media player
//!
//! The worker thread owns the [`MediaPlayer`]. It refreshes on a fixed
//! interval and whenever a command asks for it, and publishes every
//! successful refresh as a [`PlayerSnapshot`]. The sync [`Poller`] handle
//! talks to the worker over an `mpsc` channel.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Result, SdkError};
use crate::media_player::{MediaPlayer, PlayerCommand, PlayerSnapshot};

/// Longest the worker schedules ahead; larger delays are clamped to this
const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Commands sent from the [`Poller`] handle to the worker
#[derive(Debug)]
pub enum PollerCommand {
    /// Refresh now
    Refresh,
    /// Refresh once the delay has passed
    RefreshAfter(Duration),
    /// Run a player command, then refresh after the delay it returns
    Execute(PlayerCommand),
    Shutdown,
}

/// Counters reported when the worker exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub commands: u64,
    pub command_failures: u64,
}

/// Handle to a running poller
///
/// Dropping the handle stops the worker and waits for it.
pub struct Poller {
    command_tx: mpsc::Sender<PollerCommand>,
    handle: Option<JoinHandle<PollerStats>>,
}

impl Poller {
    /// Start polling; snapshots arrive on the returned receiver
    ///
    /// The first refresh happens immediately. The worker stops when the
    /// receiver is dropped.
    pub fn spawn(player: MediaPlayer) -> Result<(Self, mpsc::Receiver<PlayerSnapshot>)> {
        player.config().validate()?;

        let (command_tx, command_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("kef-poller-{}", player.speaker().host()))
            .spawn(move || run_poll_loop(player, command_rx, snapshot_tx))
            .map_err(|_| SdkError::WorkerStopped)?;

        let poller = Self {
            command_tx,
            handle: Some(handle),
        };
        Ok((poller, snapshot_rx))
    }

    pub fn refresh(&self) -> Result<()> {
        self.send(PollerCommand::Refresh)
    }

    pub fn refresh_after(&self, delay: Duration) -> Result<()> {
        self.send(PollerCommand::RefreshAfter(delay))
    }

    /// Queue a player command
    pub fn execute(&self, command: PlayerCommand) -> Result<()> {
        self.send(PollerCommand::Execute(command))
    }

    /// Stop the worker and return its counters
    pub fn shutdown(mut self) -> Result<PollerStats> {
        let _ = self.command_tx.send(PollerCommand::Shutdown);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| SdkError::WorkerStopped),
            None => Err(SdkError::WorkerStopped),
        }
    }

    fn send(&self, command: PollerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| SdkError::WorkerStopped)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.command_tx.send(PollerCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run_poll_loop(
    mut player: MediaPlayer,
    command_rx: mpsc::Receiver<PollerCommand>,
    snapshot_tx: mpsc::Sender<PlayerSnapshot>,
) -> PollerStats {
    let interval = player.config().poll_interval.min(MAX_DELAY);
    let mut stats = PollerStats::default();
    let mut next_poll = Instant::now();
    let mut requested: Option<Instant> = None;

    tracing::info!(host = %player.speaker().host(), ?interval, "poller started");

    loop {
        let now = Instant::now();
        let due = requested.map_or(next_poll, |at| at.min(next_poll));

        if due <= now {
            requested = None;
            next_poll = now + interval;

            match player.update() {
                Ok(()) => {
                    stats.refreshes += 1;
                    if snapshot_tx.send(player.snapshot()).is_err() {
                        tracing::debug!("snapshot receiver dropped, shutting down poller");
                        break;
                    }
                }
                Err(e) => {
                    stats.refresh_failures += 1;
                    tracing::warn!(host = %player.speaker().host(), error = %e, "refresh failed");
                }
            }
            continue;
        }

        let schedule = |requested: &mut Option<Instant>, delay: Duration| {
            let at = Instant::now() + delay.min(MAX_DELAY);
            *requested = Some(requested.map_or(at, |existing| existing.min(at)));
        };

        match command_rx.recv_timeout(due - now) {
            Ok(PollerCommand::Refresh) => schedule(&mut requested, Duration::ZERO),
            Ok(PollerCommand::RefreshAfter(delay)) => schedule(&mut requested, delay),
            Ok(PollerCommand::Execute(command)) => {
                stats.commands += 1;
                match player.execute(&command) {
                    Ok(Some(delay)) => schedule(&mut requested, delay),
                    Ok(None) => {}
                    Err(e) => {
                        stats.command_failures += 1;
                        tracing::warn!(command = command.name(), error = %e, "command failed");
                    }
                }
            }
            Ok(PollerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    tracing::info!(
        host = %player.speaker().host(),
        refreshes = stats.refreshes,
        failures = stats.refresh_failures,
        "poller stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use kef_api::KefConnector;

    fn offline_player(interval: Duration) -> MediaPlayer {
        MediaPlayer::with_config(
            KefConnector::new("127.0.0.1:1"),
            PlayerConfig::default().with_poll_interval(interval),
        )
    }

    #[test]
    fn test_failures_are_counted_not_fatal() {
        let (poller, snapshots) = Poller::spawn(offline_player(Duration::from_secs(60))).unwrap();

        poller.refresh().unwrap();
        poller.execute(PlayerCommand::NextTrack).unwrap();
        thread::sleep(Duration::from_millis(300));

        let stats = poller.shutdown().unwrap();
        assert!(stats.refresh_failures >= 1);
        assert_eq!(stats.refreshes, 0);
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.command_failures, 1);
        assert!(snapshots.try_recv().is_err());
    }

    #[test]
    fn test_oversized_delays_are_clamped() {
        let (poller, _snapshots) = Poller::spawn(offline_player(Duration::MAX)).unwrap();

        poller.refresh_after(Duration::MAX).unwrap();
        thread::sleep(Duration::from_millis(100));

        // The worker is still alive and answers further requests
        poller.refresh().unwrap();
        thread::sleep(Duration::from_millis(200));
        let stats = poller.shutdown().unwrap();
        assert!(stats.refresh_failures >= 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Poller::spawn(offline_player(Duration::ZERO));
        assert!(matches!(result, Err(SdkError::Configuration(_))));
    }

    #[test]
    fn test_drop_stops_worker() {
        let (poller, snapshots) = Poller::spawn(offline_player(Duration::from_secs(60))).unwrap();
        drop(poller);

        // The worker owned the sender; it is gone once the thread has exited
        assert!(matches!(
            snapshots.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }
}
