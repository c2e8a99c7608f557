use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use facewatch_protocol::AlertSignal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn};

use super::{AlertConfig, AlertHandler};
use crate::engine::InferenceEngine;

const THREAD_NAME: &str = "facewatch-alert";

/// Handle to the running alert poll thread.
///
/// Cancellation is cooperative: the loop checks the token before every engine
/// call and the parked thread is woken on cancel, so at most the call already
/// in flight completes after [`cancel`](Self::cancel). [`stop`](Self::stop)
/// additionally waits for the thread to exit. Dropping the handle stops it.
pub struct AlertPoller {
    token: CancellationToken,
    handle: Option<JoinHandle<u64>>,
    interval: Duration,
}

impl AlertPoller {
    pub fn spawn(
        engine: Arc<dyn InferenceEngine>,
        handler: Arc<dyn AlertHandler>,
        config: &AlertConfig,
    ) -> io::Result<Self> {
        let token = CancellationToken::new();
        let interval = config.interval();
        let loop_token = token.clone();
        let enabled = config.enabled;
        let only_changes = config.only_changes;

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                if !enabled {
                    debug!("alert polling disabled; task exits immediately");
                    return 0;
                }
                poll_loop(
                    engine.as_ref(),
                    handler.as_ref(),
                    &loop_token,
                    interval,
                    only_changes,
                )
            })?;

        Ok(Self {
            token,
            handle: Some(handle),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request the loop to exit without waiting for it.
    pub fn cancel(&self) {
        self.token.cancel();
        if let Some(handle) = &self.handle {
            handle.thread().unpark();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the thread; returns how many polls it made.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.cancel();
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.join() {
            Ok(polls) => polls,
            Err(_) => {
                warn!("alert poller thread panicked");
                0
            }
        }
    }
}

impl Drop for AlertPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    engine: &dyn InferenceEngine,
    handler: &dyn AlertHandler,
    token: &CancellationToken,
    interval: Duration,
    only_changes: bool,
) -> u64 {
    let span = info_span!("alert_poller", interval_ms = interval.as_millis() as u64);
    let _enter = span.enter();

    let mut polls = 0u64;
    let mut last: Option<AlertSignal> = None;

    while !token.is_cancelled() {
        let signal = engine.alert_trigger();
        polls += 1;

        if !only_changes || last != Some(signal) {
            debug!(%signal, polls, "alert poll");
            handler.on_alert(signal);
            last = Some(signal);
        }

        if token.is_cancelled() {
            break;
        }
        // Spurious wakeups just poll early; cancel() unparks us.
        thread::park_timeout(interval);
    }

    debug!(polls, "alert poller exiting");
    polls
}
