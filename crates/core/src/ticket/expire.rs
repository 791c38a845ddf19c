//! Age-based expiration of ticketed entries.
//!
//! A sweep removes every regular file whose modification time plus the TTL
//! lies strictly before the current second. The TTL defaults to
//! [`DEFAULT_TTL`] and never drops below [`MIN_TTL`].
//!
//! The periodic runner only operates on spaces in sequencing mode: it sweeps
//! once immediately, then once per interval until cancelled.

use std::fs::{self, DirEntry};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::metrics;

use super::{TicketError, TicketSpace};

/// TTL applied when none has been set.
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Smallest TTL a sweep will use.
pub const MIN_TTL: Duration = Duration::from_secs(60 * 60);

/// Period of the background sweep.
pub const EXPIRE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// TTL the sweep compared against.
    pub ttl: Duration,
    /// Regular files examined.
    pub scanned: usize,
    /// Entries deleted.
    pub removed: usize,
    /// Expired entries that could not be inspected or deleted.
    pub failed: usize,
}

impl TicketSpace {
    /// Current TTL; zero until set explicitly or resolved by a sweep.
    pub fn ttl(&self) -> Duration {
        *self.ttl.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a TTL for subsequent sweeps. The 1-hour floor is applied at
    /// sweep time.
    pub fn set_ttl(&self, ttl: Duration) -> &Self {
        *self.ttl.write().unwrap_or_else(|e| e.into_inner()) = ttl;
        self
    }

    /// Sweeps aged entries now.
    ///
    /// `age` replaces the TTL when non-zero; `None` falls back to the stored
    /// TTL, defaulting it to 12 hours if never set. Returns `None` if the
    /// directory cannot be read. Per-entry failures are skipped.
    pub fn expire(&self, age: Option<Duration>) -> Option<SweepReport> {
        match self.try_expire(age) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!(error = %e, "Sweep aborted");
                None
            }
        }
    }

    /// Sweeps aged entries now, reporting a directory read failure.
    ///
    /// The listing is read in full before anything is deleted, so a read
    /// failure never leaves a partial sweep behind.
    pub fn try_expire(&self, age: Option<Duration>) -> Result<SweepReport, TicketError> {
        let ttl = self.resolve_ttl(age);

        let entries = fs::read_dir(self.path())
            .and_then(|dir| dir.collect::<Result<Vec<DirEntry>, _>>())
            .map_err(|source| {
                metrics::SWEEPS.with_label_values(&["error"]).inc();
                TicketError::Scan {
                    path: self.path().to_path_buf(),
                    source,
                }
            })?;

        let report = self.sweep_entries(entries, ttl);

        metrics::SWEEPS.with_label_values(&["ok"]).inc();
        metrics::ENTRIES_EXPIRED.inc_by(report.removed as u64);

        if report.removed > 0 {
            info!(
                path = %self.path().display(),
                ttl_secs = ttl.as_secs(),
                scanned = report.scanned,
                removed = report.removed,
                failed = report.failed,
                "Expired tickets removed"
            );
        } else {
            debug!(
                path = %self.path().display(),
                scanned = report.scanned,
                "Sweep found nothing to expire"
            );
        }

        Ok(report)
    }

    /// Deletes the expired regular files among `entries`, skipping and
    /// counting any entry that cannot be inspected or removed.
    fn sweep_entries(&self, entries: Vec<DirEntry>, ttl: Duration) -> SweepReport {
        let now = truncate_to_second(SystemTime::now());
        let mut report = SweepReport {
            ttl,
            ..SweepReport::default()
        };

        for entry in entries {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            report.scanned += 1;

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    debug!(entry = ?entry.path(), error = %e, "Skipping unreadable entry");
                    report.failed += 1;
                    continue;
                }
            };

            let expired = modified
                .checked_add(ttl)
                .map(|expiry| expiry < now)
                .unwrap_or(false);
            if !expired {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    debug!(entry = ?entry.path(), error = %e, "Failed to remove expired entry");
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn resolve_ttl(&self, age: Option<Duration>) -> Duration {
        let mut ttl = self.ttl.write().unwrap_or_else(|e| e.into_inner());

        match age {
            Some(age) if !age.is_zero() => *ttl = age,
            None if ttl.is_zero() => *ttl = DEFAULT_TTL,
            _ => {}
        }

        if *ttl < MIN_TTL {
            *ttl = MIN_TTL;
        }

        *ttl
    }

    /// Runs the hourly expiration loop until `cancel` fires.
    ///
    /// Returns immediately when sequencing is disabled.
    pub async fn run_periodic(&self, cancel: CancellationToken) {
        self.run_periodic_every(EXPIRE_INTERVAL, cancel).await
    }

    /// Runs the expiration loop with a custom period until `cancel` fires.
    ///
    /// Sweeps once right away, then once per `period`. Cancellation preempts
    /// a pending tick and no final sweep is made.
    pub async fn run_periodic_every(&self, period: Duration, cancel: CancellationToken) {
        if !self.is_sequencing() {
            debug!(path = %self.path().display(), "Sequencing disabled, expiration loop not started");
            return;
        }

        if let Err(e) = self.ensure_dir() {
            warn!(error = %e, "Ticket directory unavailable");
        }
        self.expire(None);

        // A zero period would spin and one too large overflows the clock.
        let (start, period) = match Instant::now()
            .checked_add(period)
            .filter(|_| !period.is_zero())
        {
            Some(start) => (start, period),
            None => {
                warn!(
                    period_secs = period.as_secs(),
                    "Expiration period out of range, using {:?}", EXPIRE_INTERVAL
                );
                (Instant::now() + EXPIRE_INTERVAL, EXPIRE_INTERVAL)
            }
        };
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            path = %self.path().display(),
            interval_secs = period.as_secs(),
            ttl_secs = self.ttl().as_secs(),
            "Expiration loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(path = %self.path().display(), "Expiration loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.expire(None);
                }
            }
        }
    }
}

/// Spawns the expiration loop for `space` on the current tokio runtime.
///
/// Cancel the returned token to stop the loop; the handle completes once it
/// has exited.
pub fn spawn_expiration_task(
    space: Arc<TicketSpace>,
    period: Duration,
) -> (CancellationToken, JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    let handle = tokio::spawn(async move {
        space.run_periodic_every(period, cancel_clone).await;
    });

    (cancel, handle)
}

fn truncate_to_second(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => UNIX_EPOCH + Duration::from_secs(since.as_secs()),
        Err(_) => time,
    }
}
