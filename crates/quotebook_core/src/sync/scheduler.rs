//! Cancellable periodic ticker.
//!
//! # Responsibility
//! - Emit `Tick` messages at a fixed interval on a background timer thread.
//! - Stop promptly when the handle is cancelled or dropped.
//!
//! # Invariants
//! - The timer thread never touches quote state; it only sends ticks.
//! - No tick is sent after `cancel()` returns.

use log::{debug, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// One timer firing; `sequence` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub sequence: u64,
}

/// Owner handle for a running ticker.
pub struct TickerHandle {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stops the ticker and waits for the timer thread to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!("event=ticker_stop module=sync status=ok");
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Starts a ticker firing every `interval`.
///
/// Returns the cancellation handle and the receiving end of the tick channel.
/// The ticker also stops on its own once the receiver is dropped.
pub fn spawn_ticker(interval: Duration) -> std::io::Result<(TickerHandle, Receiver<Tick>)> {
    let (tick_tx, tick_rx) = mpsc::channel::<Tick>();
    let handle = spawn_ticker_into(interval, tick_tx, |tick| tick)?;
    Ok((handle, tick_rx))
}

/// Starts a ticker that delivers `wrap(tick)` into an existing event channel.
///
/// Lets an owner multiplex ticks with other events (user input, file reads)
/// on one receiver.
pub fn spawn_ticker_into<T: Send + 'static>(
    interval: Duration,
    events: Sender<T>,
    wrap: fn(Tick) -> T,
) -> std::io::Result<TickerHandle> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let worker = std::thread::Builder::new()
        .name("quotebook-ticker".to_string())
        .spawn(move || {
            let mut sequence = 0u64;
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        sequence += 1;
                        if events.send(wrap(Tick { sequence })).is_err() {
                            debug!("event=ticker_stop module=sync status=receiver_gone");
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })?;

    info!(
        "event=ticker_start module=sync status=ok interval_ms={}",
        interval.as_millis()
    );
    Ok(TickerHandle {
        stop: Some(stop_tx),
        worker: Some(worker),
    })
}

#[cfg(test)]
mod tests {
    use super::{spawn_ticker, spawn_ticker_into, Tick};
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum Event {
        Tick(u64),
        Input,
    }

    fn wrap(tick: Tick) -> Event {
        Event::Tick(tick.sequence)
    }

    #[test]
    fn emits_sequential_ticks() {
        let (handle, ticks) = spawn_ticker(Duration::from_millis(5)).unwrap();
        let first = ticks.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = ticks.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        handle.cancel();
    }

    #[test]
    fn cancel_stops_further_ticks() {
        let (handle, ticks) = spawn_ticker(Duration::from_millis(5)).unwrap();
        ticks.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.cancel();

        while ticks.try_recv().is_ok() {}
        assert!(ticks.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn long_interval_cancels_without_waiting_for_tick() {
        let (handle, ticks) = spawn_ticker(Duration::from_secs(3600)).unwrap();
        assert!(handle.is_running());
        let started = std::time::Instant::now();
        handle.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(ticks.try_recv().is_err());
    }

    #[test]
    fn ticks_share_a_channel_with_other_events() {
        let (tx, rx) = mpsc::channel::<Event>();
        tx.send(Event::Input).unwrap();
        let handle = spawn_ticker_into(Duration::from_millis(5), tx.clone(), wrap).unwrap();

        assert_eq!(rx.recv().unwrap(), Event::Input);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Event::Tick(1)
        );
        handle.cancel();
    }
}
