//! Fixed-timestep scheduler for the local simulation loop.
//!
//! The client runs one simulation task next to the command loop:
//!
//! ```ignore
//! let mut scheduler = TickScheduler::with_rate(30);
//! loop {
//!     let info = scheduler.wait_for_tick().await;
//!     game.lock().await.update(info.dt.as_millis() as u64);
//! }
//! ```
//!
//! A tick rate of 0 puts the scheduler into event-driven mode:
//! [`TickScheduler::wait_for_tick`] pends forever, which is the right
//! behavior when the world only changes on server snapshots.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// Configuration for the simulation scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = event-driven (tick never fires).
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added to the first tick so the
    /// simulation task does not wake in lockstep with other timers.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Config for a specific tick rate with default jitter.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick. `None` in event-driven mode.
    pub fn tick_duration(&self) -> Option<Duration> {
        if self.tick_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
        }
    }
}

/// Information about a fired tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Fixed delta time for this tick (always `1 / tick_rate`).
    /// Simulation logic should use this, not wall-clock elapsed time.
    pub dt: Duration,
    /// `true` if this tick fired late.
    pub overrun: bool,
    /// How many ticks were skipped due to overrun.
    pub ticks_skipped: u64,
}

/// Fixed-timestep tick scheduler.
///
/// Overruns are handled by skipping: the next tick is scheduled from
/// now rather than from the missed deadline, so a slow tick never
/// snowballs into a catch-up burst.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Option<Duration>,
    tick_count: u64,
    next_tick: Option<TokioInstant>,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let next_tick = tick_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            TokioInstant::now() + d + jitter
        });

        if config.tick_rate_hz == 0 {
            debug!("tick scheduler created in event-driven mode");
        } else {
            debug!(rate_hz = config.tick_rate_hz, "tick scheduler created");
        }

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
        }
    }

    /// Scheduler for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// In event-driven mode this future pends forever — it never
    /// resolves on its own, but `tokio::select!` will still process
    /// other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let (next, tick_dur) = match (self.next_tick, self.tick_duration) {
            (Some(next), Some(dur)) => (next, dur),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > tick_dur / 10; // >10% late = overrun
        let mut ticks_skipped = 0u64;
        if overrun {
            ticks_skipped =
                late_by.as_nanos() as u64 / tick_dur.as_nanos() as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun, skipping ahead"
                );
            }
        }
        // Always schedule from now, not from the missed deadline.
        self.next_tick = Some(now + tick_dur);

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: tick_dur,
            overrun,
            ticks_skipped,
        }
    }

    /// Whether this scheduler is in event-driven mode (tick rate = 0).
    pub fn is_event_driven(&self) -> bool {
        self.tick_duration.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// The fixed tick duration, or `None` in event-driven mode.
    pub fn tick_duration(&self) -> Option<Duration> {
        self.tick_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_clamps_excessive_rate() {
        let config = TickConfig::with_rate(10_000).validated();
        assert_eq!(config.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
    }

    #[test]
    fn test_tick_duration_zero_rate_is_none() {
        assert!(TickConfig::with_rate(0).tick_duration().is_none());
        assert_eq!(
            TickConfig::with_rate(50).tick_duration(),
            Some(Duration::from_millis(20))
        );
    }

    #[tokio::test]
    async fn test_wait_for_tick_counts_up_with_fixed_dt() {
        let mut scheduler = TickScheduler::new(TickConfig {
            tick_rate_hz: 100,
            initial_jitter_us: 0,
        });

        let first = scheduler.wait_for_tick().await;
        let second = scheduler.wait_for_tick().await;

        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert_eq!(first.dt, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_event_driven_scheduler_pends() {
        let mut scheduler = TickScheduler::with_rate(0);
        assert!(scheduler.is_event_driven());

        let waited = tokio::time::timeout(
            Duration::from_millis(20),
            scheduler.wait_for_tick(),
        )
        .await;

        assert!(waited.is_err(), "event-driven tick should never fire");
    }
}
